//! Error types for the relay pipeline

use thiserror::Error;

use crate::publisher::PublishError;

/// Errors raised while relaying a hearing event.
///
/// Both variants are fatal to the request; neither is retried here.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The court centre code is too short to hold a court code
    #[error("Court centre code '{code}' has {length} character(s), fewer than the 5 needed for a court code")]
    CourtCodeOutOfRange { code: String, length: usize },

    /// Publishing to the topic failed after telemetry was recorded
    #[error("Publish failed: {0}")]
    Publish(#[from] PublishError),
}

impl RelayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayError::CourtCodeOutOfRange { .. } => "COURT_CODE_OUT_OF_RANGE",
            RelayError::Publish(_) => "PUBLISH_FAILED",
        }
    }
}

pub type RelayResult<T> = std::result::Result<T, RelayError>;
