use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Sanity bound on the time-of-day portion of a timestamp, in seconds. Fields past a
/// day roll over onto the following date, but nothing this large is a real clock reading.
const MAX_TIME_OF_DAY_SECONDS: i64 = 366 * 24 * 3600;

/// A fixed UTC offset, in whole hours, that the forecast source writes its wall-clock
/// timestamps in. There are no daylight saving rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceZone {
    offset_hours: i32,
}

impl SourceZone {
    /// Japan Standard Time, the default source zone
    pub const JST: SourceZone = SourceZone { offset_hours: 9 };

    pub fn new(offset_hours: i32) -> SourceZone {
        SourceZone { offset_hours }
    }

    pub fn offset_hours(&self) -> i32 {
        self.offset_hours
    }

    fn offset(&self) -> Duration {
        Duration::hours(self.offset_hours as i64)
    }

    /// Converts a local wall-clock reading into an absolute instant
    pub fn to_instant(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        local
            .checked_sub_signed(self.offset())
            .map(|utc| Utc.from_utc_datetime(&utc))
    }

    /// The local wall-clock reading at the given instant
    pub fn to_local(&self, instant: &DateTime<Utc>) -> Option<NaiveDateTime> {
        instant.naive_utc().checked_add_signed(self.offset())
    }

    /// The local hour of day at the given instant
    pub fn local_hour(&self, instant: &DateTime<Utc>) -> u32 {
        self.to_local(instant).map(|local| local.hour()).unwrap_or(0)
    }

    /// The local calendar date at the given instant
    pub fn local_date(&self, instant: &DateTime<Utc>) -> Option<NaiveDate> {
        self.to_local(instant).map(|local| local.date())
    }

    /// The instant of local midnight starting the given calendar date
    pub fn local_midnight(&self, date: &NaiveDate) -> Option<DateTime<Utc>> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|midnight| self.to_instant(&midnight))
    }

    /// Interprets `YYYY-MM-DD HH:mm:ss` (time optional) as a local wall-clock reading
    /// in this zone.
    ///
    /// Missing or non-numeric components count as 0. Time fields past their usual
    /// range roll over into the next minute, hour or day. Returns `None` when the date
    /// portion does not name a real calendar day.
    pub fn interpret(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        let (date_part, time_part) = match text.find(|c: char| c == ' ' || c == 'T') {
            Some(split) => (&text[..split], text[split + 1..].trim()),
            None => (text, ""),
        };

        let date_fields = date_part
            .split('-')
            .map(leading_integer)
            .collect::<Option<Vec<_>>>()?;
        let [year, month, day] = nth_or_zero(&date_fields);

        let date = NaiveDate::from_ymd_opt(
            i32::try_from(year).ok()?,
            u32::try_from(month).ok()?,
            u32::try_from(day).ok()?,
        )?;

        let time_fields = time_part
            .split(':')
            .map(leading_integer)
            .collect::<Option<Vec<_>>>()?;
        let [hour, minute, second] = nth_or_zero(&time_fields);

        let seconds = hour
            .checked_mul(3600)?
            .checked_add(minute.checked_mul(60)?)?
            .checked_add(second)?;
        if seconds.abs() > MAX_TIME_OF_DAY_SECONDS {
            return None;
        }

        let local = date
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::seconds(seconds))?;
        self.to_instant(&local)
    }
}

impl Default for SourceZone {
    fn default() -> Self {
        SourceZone::JST
    }
}

/// Parses the leading (optionally negative) run of digits, 0 if there is none and
/// `None` if it does not fit
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Some(0);
    }
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// The first three fields, missing ones read as 0
fn nth_or_zero(fields: &[i64]) -> [i64; 3] {
    let field = |i: usize| fields.get(i).copied().unwrap_or(0);
    [field(0), field(1), field(2)]
}
