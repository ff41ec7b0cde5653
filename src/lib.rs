pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod swell;
pub mod tools;
pub mod units;
pub mod window;

pub use config::PipelineConfig;
pub use data::column_index::{ColumnIndex, ForecastField};
pub use data::forecast_record::{sequence, ForecastParseOutcome, ForecastRecord, ForecastRecordCollection};
pub use error::{Diagnostic, ForecastError};
pub use swell::{decode_swells, SwellComponent};
pub use tools::date::SourceZone;
pub use window::{WindowFilter, WindowPolicy};
