use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataRecordParsingError {
    NotImplemented,
    InvalidData,
    OutsideWindow,
    ParseFailure(String),
}

impl std::fmt::Display for DataRecordParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataRecordParsingError::NotImplemented => write!(f, "Encountered not implemented behavior"),
            DataRecordParsingError::InvalidData => write!(f, "Invalid data encountered while parsing data"),
            DataRecordParsingError::OutsideWindow => write!(f, "Record falls outside the requested window"),
            DataRecordParsingError::ParseFailure(reason) => write!(f, "Data parse failure: {reason}"),
        }
    }
}

impl std::error::Error for DataRecordParsingError {}

/// A record built from one tokenized data row. `Metadata` carries whatever the row
/// needs to be interpreted, such as the resolved header layout.
pub trait ParseableDataRecord {
    type Metadata;

    fn from_data_row(_metadata: Option<&Self::Metadata>, _row: &[&str]) -> Result<Self, DataRecordParsingError> where Self: Sized {
        Err(DataRecordParsingError::NotImplemented)
    }
}
