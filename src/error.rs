//! Error types for the outlier scoring service.

use thiserror::Error;

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for request validation and outlier scoring
#[derive(Debug, Error)]
pub enum Error {
    /// Required top-level field missing from the request payload
    #[error("Invalid request. Missing {0} field.")]
    MissingField(&'static str),

    /// Check request without its data / currentValue fields
    #[error("Unable to perform anomaly detection as minimum 3 values required!")]
    CheckFieldsMissing,

    /// Batch item without its data / currentValue fields
    #[error("Invalid data item. Missing data or currentValue field.")]
    ItemFieldsMissing,

    /// Sample below the minimum supported size
    #[error("Invalid data. At least one more values are required.")]
    TooFewValues,

    /// Token that does not parse as a number
    #[error("could not convert string to float: '{0}'")]
    InvalidNumber(String),

    /// Candidate value not found in the sample
    #[error("Value {0} is not present in the given data.")]
    ValueNotPresent(f64),

    /// Estimator failure during fit or scoring
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code this error maps to
    pub fn http_status(&self) -> u16 {
        match self {
            Error::MissingField(_)
            | Error::CheckFieldsMissing
            | Error::ItemFieldsMissing
            | Error::TooFewValues
            | Error::ValueNotPresent(_) => 400,
            _ => 500,
        }
    }

    /// Message as rendered into an `error` response field.
    ///
    /// Validation errors keep their fixed wording; processing failures are
    /// reported behind the generic prefix.
    pub fn response_message(&self) -> String {
        if self.http_status() == 400 {
            self.to_string()
        } else {
            format!("An error occurred. {}", self)
        }
    }
}

/// Estimator-level failures
#[derive(Debug, Error)]
pub enum DetectError {
    /// Not enough points to fit the estimator
    #[error("at least {required} samples are required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Input contains NaN or infinity
    #[error("input contains a non-finite value")]
    NonFinite,
}
