//! Record-level failures raised while cleaning a listing.
//!
//! A [`RecordError`] never aborts a run: the cleaning pipeline drops the
//! offending record, logs the reason, and tallies it in the clean summary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("model text is empty")]
    EmptyModel,
    #[error("'{value}' is not a calendar date")]
    InvalidDate { value: String },
    #[error("column '{column}' holds non-numeric value '{value}'")]
    InvalidNumber { column: &'static str, value: String },
    #[error("column '{column}' is missing a value")]
    MissingValue { column: &'static str },
}

impl RecordError {
    /// Short stable label used when tallying rejections.
    pub fn reason(&self) -> &'static str {
        match self {
            RecordError::EmptyModel => "empty model",
            RecordError::InvalidDate { .. } => "invalid date",
            RecordError::InvalidNumber { .. } => "invalid number",
            RecordError::MissingValue { .. } => "missing value",
        }
    }
}
