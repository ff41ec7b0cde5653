use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tools::date::SourceZone;

/// Which records, by instant, a pipeline run keeps
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WindowPolicy {
    /// Keep everything
    #[default]
    Unrestricted,
    /// Keep `[start 00:00 local, end 00:00 local)`
    FixedCalendarWindow { start: NaiveDate, end: NaiveDate },
    /// Keep `hours` hours starting at local midnight of the current day
    RollingWindow { hours: u32 },
}

impl WindowPolicy {
    /// Today and tomorrow in the source zone
    pub fn rolling_48h() -> WindowPolicy {
        WindowPolicy::RollingWindow { hours: 48 }
    }

    /// Only the current local day
    pub fn today() -> WindowPolicy {
        WindowPolicy::RollingWindow { hours: 24 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bounds {
    Unbounded,
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Empty,
}

/// A [`WindowPolicy`] resolved to concrete instants. A rolling window reads the clock
/// once, here, so every row of a run is judged against the same day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowFilter {
    bounds: Bounds,
}

impl WindowFilter {
    pub fn new(policy: &WindowPolicy, zone: &SourceZone, now: &DateTime<Utc>) -> WindowFilter {
        let bounds = match policy {
            WindowPolicy::Unrestricted => Some(Bounds::Unbounded),
            WindowPolicy::FixedCalendarWindow { start, end } => zone
                .local_midnight(start)
                .zip(zone.local_midnight(end))
                .map(|(start, end)| Bounds::Between { start, end }),
            WindowPolicy::RollingWindow { hours } => zone
                .local_date(now)
                .and_then(|today| zone.local_midnight(&today))
                .and_then(|start| {
                    start
                        .checked_add_signed(Duration::hours(*hours as i64))
                        .map(|end| Bounds::Between { start, end })
                }),
        };

        WindowFilter {
            bounds: bounds.unwrap_or(Bounds::Empty),
        }
    }

    pub fn unrestricted() -> WindowFilter {
        WindowFilter {
            bounds: Bounds::Unbounded,
        }
    }

    /// Whether a record at `instant` is kept. The lower bound is inclusive and the
    /// upper bound exclusive.
    pub fn included(&self, instant: &DateTime<Utc>) -> bool {
        match self.bounds {
            Bounds::Unbounded => true,
            Bounds::Between { start, end } => start <= *instant && *instant < end,
            Bounds::Empty => false,
        }
    }

    /// `(start, end)` of the window, `None` when unrestricted or unresolvable
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self.bounds {
            Bounds::Between { start, end } => Some((start, end)),
            _ => None,
        }
    }
}

impl Default for WindowFilter {
    fn default() -> Self {
        WindowFilter::unrestricted()
    }
}
