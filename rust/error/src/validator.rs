use crate::{ErrorCodes, TrellisError};
use thiserror::Error;

/// Range and shape violations reported by `validator` derives on
/// declarative directives.
#[derive(Debug, Error)]
#[error("Validation error: {0}")]
pub struct TrellisValidationError(#[from] validator::ValidationErrors);

impl TrellisError for TrellisValidationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}
