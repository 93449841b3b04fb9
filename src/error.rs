use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("CSV file is empty")]
    EmptyInput,
    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::Processing(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for TrackerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        TrackerError::Processing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
