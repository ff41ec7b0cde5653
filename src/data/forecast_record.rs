use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::Diagnostic;
use crate::swell::{decode_swells, SwellComponent};
use crate::tools::date::SourceZone;
use crate::tools::math::{floor_to_tenth, numeric_or_zero, round_to_tenth};
use crate::units::{CardinalDirection, Unit, WindRelation};
use crate::window::WindowFilter;

use super::column_index::{ColumnIndex, ForecastField};
use super::csv_line::{tokenize, unquote};
use super::parseable_data_record::{DataRecordParsingError, ParseableDataRecord};

/// One hourly forecast sample
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub instant: DateTime<Utc>,
    /// Hour of day, 0-23, on the source's wall clock
    pub local_hour: u32,
    pub temperature_c: f64,
    pub tide_height_m: f64,
    pub wind_speed_mps: f64,
    pub wind_angle_deg: f64,
    pub wind_direction_type: String,
    pub weather_icon_code: String,
    /// Components with a positive height, in source order
    pub swells: Vec<SwellComponent>,
    /// Largest swell height, 0 without swells
    pub wave_height_raw: f64,
    /// `wave_height_raw` truncated to one decimal, never above it
    pub wave_height_display: f64,
}

impl ForecastRecord {
    /// Builds the record for a row whose timestamp has already been interpreted as
    /// `instant`. Every field falls back to 0 or empty text, so this cannot fail.
    pub fn normalize(row: &[&str], layout: &ForecastRowLayout, instant: DateTime<Utc>) -> ForecastRecord {
        let text = |field: ForecastField| layout.columns.get(field, row).map(unquote).unwrap_or("");
        let number = |field: ForecastField| numeric_or_zero(text(field));

        let swells: Vec<SwellComponent> = layout
            .columns
            .get(ForecastField::Swells, row)
            .map(decode_swells)
            .unwrap_or_default()
            .into_iter()
            .filter(|swell| swell.height > 0.0)
            .collect();
        let wave_height_raw = swells.iter().map(|swell| swell.height).fold(0.0, f64::max);

        let wind_speed_kph = number(ForecastField::WindSpeedKph);

        ForecastRecord {
            instant,
            local_hour: layout.zone.local_hour(&instant),
            temperature_c: round_to_tenth(number(ForecastField::Temperature)),
            tide_height_m: number(ForecastField::TideHeight),
            wind_speed_mps: round_to_tenth(
                Unit::KilometersPerHour.convert(&Unit::MetersPerSecond, wind_speed_kph),
            ),
            wind_angle_deg: number(ForecastField::WindAngle),
            wind_direction_type: text(ForecastField::DirectionType).to_string(),
            weather_icon_code: text(ForecastField::Condition).to_string(),
            swells,
            wave_height_raw,
            wave_height_display: floor_to_tenth(wave_height_raw),
        }
    }

    /// Wall clock reading of this record in `zone`
    pub fn local_datetime(&self, zone: &SourceZone) -> Option<NaiveDateTime> {
        zone.to_local(&self.instant)
    }

    pub fn wind_cardinal(&self) -> CardinalDirection {
        CardinalDirection::from_degrees(self.wind_angle_deg)
    }

    pub fn wind_relation(&self) -> WindRelation {
        WindRelation::classify(&self.wind_direction_type)
    }
}

/// What a data row needs to be read: the resolved header, the source zone and the
/// window rows must fall in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecastRowLayout {
    pub columns: ColumnIndex,
    pub zone: SourceZone,
    pub window: WindowFilter,
}

impl ParseableDataRecord for ForecastRecord {
    type Metadata = ForecastRowLayout;

    fn from_data_row(
        metadata: Option<&Self::Metadata>,
        row: &[&str],
    ) -> Result<ForecastRecord, DataRecordParsingError> {
        let layout = metadata.ok_or(DataRecordParsingError::InvalidData)?;

        let raw_timestamp = layout
            .columns
            .get(ForecastField::Timestamp, row)
            .map(unquote)
            .filter(|ts| !ts.is_empty())
            .ok_or(DataRecordParsingError::InvalidData)?;

        let instant = layout.zone.interpret(raw_timestamp).ok_or_else(|| {
            DataRecordParsingError::ParseFailure(format!("invalid timestamp {raw_timestamp:?}"))
        })?;

        if !layout.window.included(&instant) {
            return Err(DataRecordParsingError::OutsideWindow);
        }

        Ok(ForecastRecord::normalize(row, layout, instant))
    }
}

/// Orders records by instant. The sort is stable, so records sharing an instant keep
/// their input order.
pub fn sequence(mut records: Vec<ForecastRecord>) -> Vec<ForecastRecord> {
    records.sort_by_key(|record| record.instant);
    records
}

/// Records from one pipeline run plus anything the caller may want to know about why
/// there are none
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForecastParseOutcome {
    pub records: Vec<ForecastRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ForecastParseOutcome {
    fn failed(diagnostic: Diagnostic) -> Self {
        ForecastParseOutcome {
            records: vec![],
            diagnostics: vec![diagnostic],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Forecast CSV text: a header row followed by one hourly sample per line
pub struct ForecastRecordCollection<'a> {
    data: &'a str,
}

impl<'a> ForecastRecordCollection<'a> {
    pub fn from_data(data: &'a str) -> Self {
        ForecastRecordCollection { data }
    }

    fn non_blank_lines(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.data.lines().filter(|line| !line.trim().is_empty())
    }

    /// Header fields of the first non-blank line
    pub fn header(&self) -> Option<Vec<&'a str>> {
        self.non_blank_lines().next().map(tokenize)
    }

    /// Runs the pipeline, resolving any rolling window against the current time
    pub fn records(&self, config: &PipelineConfig) -> ForecastParseOutcome {
        self.records_at(config, &Utc::now())
    }

    /// Runs the pipeline with `now` as the reference time for a rolling window
    pub fn records_at(&self, config: &PipelineConfig, now: &DateTime<Utc>) -> ForecastParseOutcome {
        self.records_with_filter(config.zone(), &config.window_filter(now))
    }

    pub fn records_with_filter(&self, zone: SourceZone, window: &WindowFilter) -> ForecastParseOutcome {
        let mut lines = self.non_blank_lines();
        let header = match lines.next() {
            Some(line) => tokenize(line),
            None => return ForecastParseOutcome::failed(Diagnostic::EmptyInput),
        };

        let columns = ColumnIndex::resolve(&header);
        if !columns.has_timestamp() {
            let header: Vec<String> = header.iter().map(|h| unquote(h).to_string()).collect();
            warn!(?header, "forecast data has no timestamp column");
            return ForecastParseOutcome::failed(Diagnostic::MissingTimestampColumn { header });
        }

        let layout = ForecastRowLayout {
            columns,
            zone,
            window: *window,
        };
        let mut invalid_rows = 0usize;
        let mut outside_window = 0usize;

        let records: Vec<ForecastRecord> = lines
            .map(tokenize)
            .filter_map(|row| match ForecastRecord::from_data_row(Some(&layout), &row) {
                Ok(record) => Some(record),
                Err(DataRecordParsingError::OutsideWindow) => {
                    outside_window += 1;
                    None
                }
                Err(_) => {
                    invalid_rows += 1;
                    None
                }
            })
            .collect();

        debug!(
            accepted = records.len(),
            invalid_rows,
            outside_window,
            "parsed forecast rows"
        );

        ForecastParseOutcome {
            records: sequence(records),
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::prelude::*;

    use super::*;

    fn layout() -> ForecastRowLayout {
        let header = tokenize("timestamp,temperature,condition,height,speed,direction,directionType,swells");
        ForecastRowLayout {
            columns: ColumnIndex::resolve(&header),
            zone: SourceZone::JST,
            window: WindowFilter::unrestricted(),
        }
    }

    fn parse_row(line: &str) -> Result<ForecastRecord, DataRecordParsingError> {
        ForecastRecord::from_data_row(Some(&layout()), &tokenize(line))
    }

    #[test]
    fn test_forecast_row_parse() {
        let record = parse_row(
            r#"2025-10-07 03:00:00,18.6,CLEAR,0.42,14.4,270,offshore,"[{""height"":1.05,""period"":11.2,""direction"":250}]""#,
        )
        .unwrap();

        assert_eq!(record.instant, Utc.with_ymd_and_hms(2025, 10, 6, 18, 0, 0).unwrap());
        assert_eq!(record.local_hour, 3);
        assert_eq!(record.temperature_c, 18.6);
        assert_eq!(record.tide_height_m, 0.42);
        assert_eq!(record.wind_speed_mps, 4.0);
        assert_eq!(record.wind_angle_deg, 270.0);
        assert_eq!(record.wind_direction_type, "offshore");
        assert_eq!(record.weather_icon_code, "CLEAR");
        assert_eq!(record.wave_height_raw, 1.05);
        assert_eq!(record.wave_height_display, 1.0);
        assert_eq!(record.swells, vec![SwellComponent::new(1.05, 11.2, 250.0)]);
        assert_eq!(record.wind_relation(), WindRelation::Offshore);
        assert_eq!(record.wind_cardinal(), CardinalDirection::West);
    }

    #[test]
    fn test_wind_speed_rounding() {
        let record = parse_row("2025-10-07 03:00:00,18,CLEAR,0,36,0,,").unwrap();
        assert_eq!(record.wind_speed_mps, 10.0);

        let record = parse_row("2025-10-07 03:00:00,18,CLEAR,0,37,0,,").unwrap();
        assert_eq!(record.wind_speed_mps, 10.3);
    }

    #[test]
    fn test_fields_default_when_unparseable() {
        let record = parse_row("2025-10-07 05:00:00,warm,,n/a,,NaN,  ,garbage").unwrap();
        assert_eq!(record.temperature_c, 0.0);
        assert_eq!(record.tide_height_m, 0.0);
        assert_eq!(record.wind_speed_mps, 0.0);
        assert_eq!(record.wind_angle_deg, 0.0);
        assert_eq!(record.wind_direction_type, "");
        assert_eq!(record.weather_icon_code, "");
        assert!(record.swells.is_empty());
        assert_eq!(record.wave_height_raw, 0.0);
        assert_eq!(record.wave_height_display, 0.0);
        assert_eq!(record.wind_relation(), WindRelation::Unknown);
    }

    #[test]
    fn test_short_row_defaults_missing_cells() {
        let record = parse_row("2025-10-07 06:00:00,21.04").unwrap();
        assert_eq!(record.local_hour, 6);
        assert_eq!(record.temperature_c, 21.0);
        assert!(record.swells.is_empty());
    }

    #[test]
    fn test_swell_height_filter_and_display_floor() {
        let record = parse_row(
            "2025-10-07 03:00:00,18,CLEAR,0,0,0,cross,[{'height': 0, 'period': 5}, {'height': 1.29, 'period': 9, 'direction': 180}, {'height': -1}, {'height': 0.5}]",
        )
        .unwrap();
        assert_eq!(
            record.swells,
            vec![
                SwellComponent::new(1.29, 9.0, 180.0),
                SwellComponent::new(0.5, 0.0, 0.0),
            ]
        );
        assert_eq!(record.wave_height_raw, 1.29);
        assert_eq!(record.wave_height_display, 1.2);
        assert!(record.swells.iter().all(|s| s.height > 0.0));
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        assert!(matches!(
            parse_row(",18.6,CLEAR"),
            Err(DataRecordParsingError::InvalidData)
        ));
        assert!(matches!(
            parse_row("yesterday,18.6,CLEAR"),
            Err(DataRecordParsingError::ParseFailure(_))
        ));
        assert!(matches!(
            ForecastRecord::from_data_row(None, &["2025-10-07 03:00:00"]),
            Err(DataRecordParsingError::InvalidData)
        ));
    }

    #[test]
    fn test_stray_quote_keeps_later_columns() {
        let header = tokenize("timestamp,condition,speed,swells");
        let layout = ForecastRowLayout {
            columns: ColumnIndex::resolve(&header),
            zone: SourceZone::JST,
            window: WindowFilter::unrestricted(),
        };
        let row = tokenize(r#"2025-10-07 03:00:00,6" surf,36,[{"height":1.2}]"#);
        let record = ForecastRecord::from_data_row(Some(&layout), &row).unwrap();

        assert_eq!(record.weather_icon_code, r#"6" surf"#);
        assert_eq!(record.wind_speed_mps, 10.0);
        assert_eq!(record.swells, vec![SwellComponent::new(1.2, 0.0, 0.0)]);
    }

    #[test]
    fn test_rows_outside_window_are_rejected_before_normalizing() {
        let zone = SourceZone::JST;
        let policy = crate::window::WindowPolicy::FixedCalendarWindow {
            start: NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 10, 8).unwrap(),
        };
        let layout = ForecastRowLayout {
            window: WindowFilter::new(&policy, &zone, &Utc::now()),
            ..layout()
        };

        let inside = tokenize("2025-10-07 23:00:00,18.6");
        let outside = tokenize("2025-10-08 00:00:00,18.6");
        assert!(ForecastRecord::from_data_row(Some(&layout), &inside).is_ok());
        assert_eq!(
            ForecastRecord::from_data_row(Some(&layout), &outside),
            Err(DataRecordParsingError::OutsideWindow)
        );
    }

    #[test]
    fn test_sequence_is_stable() {
        let layout = layout();
        let first = parse_row("2025-10-07 04:00:00,1").unwrap();
        let second = parse_row("2025-10-07 04:00:00,2").unwrap();
        let earlier = parse_row("2025-10-07 02:00:00,3").unwrap();

        let ordered = sequence(vec![first, second, earlier]);
        let temperatures: Vec<f64> = ordered.iter().map(|r| r.temperature_c).collect();
        assert_eq!(temperatures, vec![3.0, 1.0, 2.0]);
        assert_eq!(ordered[0].local_datetime(&layout.zone).unwrap().hour(), 2);
    }
}
