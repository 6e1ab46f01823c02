//! Errors raised while turning business parameters into a locked request.

use thiserror::Error;

use cairn_protocol::types::LockError;
use cairn_protocol::DraftError;

/// A business service could not prepare its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceSetupError {
    /// The lock the service asked for is malformed.
    #[error("lock rejected: {0}")]
    Lock(#[from] LockError),

    /// A business parameter is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidParameter {
        /// Parameter name as the caller supplied it.
        field: String,
        reason: String,
    },
}

impl ServiceSetupError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceSetupError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Setup failures surface to callers as validation errors, so they branch
/// on [`cairn_protocol::ErrorKind::Validation`] like any other bad input.
impl From<ServiceSetupError> for DraftError {
    fn from(e: ServiceSetupError) -> Self {
        match e {
            ServiceSetupError::Lock(lock) => DraftError::validation("lock", lock.to_string()),
            ServiceSetupError::InvalidParameter { field, reason } => {
                DraftError::Validation { field, reason }
            }
        }
    }
}
