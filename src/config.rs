use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::tools::date::SourceZone;
use crate::window::{WindowFilter, WindowPolicy};

const DEFAULT_SOURCE_ZONE_OFFSET_HOURS: i32 = 9;

fn default_source_zone_offset_hours() -> i32 {
    DEFAULT_SOURCE_ZONE_OFFSET_HOURS
}

/// Options for one run of the forecast pipeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub window_policy: WindowPolicy,
    #[serde(default = "default_source_zone_offset_hours")]
    pub source_zone_offset_hours: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            window_policy: WindowPolicy::Unrestricted,
            source_zone_offset_hours: DEFAULT_SOURCE_ZONE_OFFSET_HOURS,
        }
    }
}

impl PipelineConfig {
    pub fn with_window_policy(mut self, window_policy: WindowPolicy) -> Self {
        self.window_policy = window_policy;
        self
    }

    pub fn with_source_zone_offset_hours(mut self, offset_hours: i32) -> Self {
        self.source_zone_offset_hours = offset_hours;
        self
    }

    pub fn from_json(data: &str) -> Result<Self, ForecastError> {
        let config: PipelineConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(-23..=23).contains(&self.source_zone_offset_hours) {
            return Err(ForecastError::Config(format!(
                "source zone offset {} is outside -23..=23 hours",
                self.source_zone_offset_hours
            )));
        }
        Ok(())
    }

    pub fn zone(&self) -> SourceZone {
        SourceZone::new(self.source_zone_offset_hours)
    }

    /// Resolves the window policy against `now`
    pub fn window_filter(&self, now: &DateTime<Utc>) -> WindowFilter {
        WindowFilter::new(&self.window_policy, &self.zone(), now)
    }

    /// Identifies the settings that change a run's output at `now`, for cache keys.
    /// A rolling window contributes the day it resolves to.
    pub fn cache_key(&self, now: &DateTime<Utc>) -> String {
        format!(
            "{:?}@{}:{:?}",
            self.window_policy,
            self.source_zone_offset_hours,
            self.window_filter(now).range()
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::prelude::*;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.zone(), SourceZone::JST);
        assert_eq!(config.window_policy, WindowPolicy::Unrestricted);
    }

    #[test]
    fn test_from_json() {
        let config = PipelineConfig::from_json(
            r#"{"windowPolicy":{"type":"rollingWindow","hours":48},"sourceZoneOffsetHours":-3}"#,
        )
        .unwrap();
        assert_eq!(config.window_policy, WindowPolicy::rolling_48h());
        assert_eq!(config.source_zone_offset_hours, -3);
    }

    #[test]
    fn test_rejects_bad_offset() {
        let result = PipelineConfig::from_json(r#"{"sourceZoneOffsetHours":30}"#);
        assert!(matches!(result, Err(ForecastError::Config(_))));

        let result = PipelineConfig::from_json(r#"{"windowPolicy":{"type":"sometimes"}}"#);
        assert!(matches!(result, Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_cache_key_follows_rolling_day() {
        let config = PipelineConfig::default().with_window_policy(WindowPolicy::rolling_48h());
        // 23:58 and 00:01 JST on either side of local midnight
        let before_midnight = Utc.with_ymd_and_hms(2025, 10, 7, 14, 58, 0).unwrap();
        let after_midnight = Utc.with_ymd_and_hms(2025, 10, 7, 15, 1, 0).unwrap();
        let same_day = Utc.with_ymd_and_hms(2025, 10, 7, 3, 0, 0).unwrap();

        assert_ne!(config.cache_key(&before_midnight), config.cache_key(&after_midnight));
        assert_eq!(config.cache_key(&before_midnight), config.cache_key(&same_day));
    }

    #[test]
    fn test_cache_key_distinguishes_settings() {
        let now = Utc::now();
        let base = PipelineConfig::default();
        assert_eq!(base.cache_key(&now), PipelineConfig::default().cache_key(&now));
        assert_ne!(
            base.cache_key(&now),
            base.clone().with_source_zone_offset_hours(0).cache_key(&now)
        );
        assert_ne!(
            base.cache_key(&now),
            base.clone().with_window_policy(WindowPolicy::today()).cache_key(&now)
        );
    }
}
