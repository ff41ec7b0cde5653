use std::fmt;

use serde::{Deserialize, Serialize};

/// Conditions a pipeline run reports alongside its (possibly empty) records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    EmptyInput,
    MissingTimestampColumn { header: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyInput => write!(f, "no header row found in forecast data"),
            Diagnostic::MissingTimestampColumn { header } => write!(
                f,
                "no timestamp column found in header [{}]",
                header.join(", ")
            ),
        }
    }
}

#[derive(Debug)]
pub enum ForecastError {
    Http(String),
    Status(u16),
    Config(String),
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastError::Http(reason) => write!(f, "failed to fetch forecast data: {reason}"),
            ForecastError::Status(status) => write!(f, "forecast request returned status {status}"),
            ForecastError::Config(reason) => write!(f, "invalid pipeline configuration: {reason}"),
        }
    }
}

impl std::error::Error for ForecastError {}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        ForecastError::Http(e.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::Config(e.to_string())
    }
}
