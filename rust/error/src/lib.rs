// Error codes shared by every Trellis crate. The numbering follows the gRPC
// status codes so that a transport layer sitting on top of the schema engine
// can map them without a lookup table of its own.
use std::error::Error;

#[cfg(feature = "validator")]
mod validator;
#[cfg(feature = "validator")]
pub use validator::*;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ErrorCodes {
    // Success is used instead of Ok, which would shadow the Result variant.
    Success = 0,
    // UNKNOWN indicates an error that could not be classified.
    Unknown = 2,
    // INVALID_ARGUMENT indicates the caller supplied malformed input, such as a
    // declarative type description the synthesizer cannot compile.
    InvalidArgument = 3,
    // NOT_FOUND means a requested collection or hook does not exist.
    NotFound = 5,
    // ALREADY_EXISTS means an entity we attempted to create already exists.
    AlreadyExists = 6,
    // FAILED_PRECONDITION indicates a data shape does not conform to the schema
    // it is about to be used against.
    FailedPrecondition = 9,
    // UNIMPLEMENTED indicates operation is not implemented or not supported.
    Unimplemented = 12,
    // INTERNAL errors are invariant violations inside the engine.
    Internal = 13,
    // UNAVAILABLE indicates the schema source could not be reached.
    Unavailable = 14,
}

impl ErrorCodes {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCodes::InvalidArgument => "InvalidArgumentError",
            ErrorCodes::NotFound => "NotFoundError",
            ErrorCodes::FailedPrecondition => "FailedPreconditionError",
            ErrorCodes::Internal => "InternalError",
            ErrorCodes::Unavailable => "UnavailableError",
            _ => "TrellisError",
        }
    }
}

impl std::fmt::Display for ErrorCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub trait TrellisError: Error + Send {
    fn code(&self) -> ErrorCodes;
    fn boxed(self) -> Box<dyn TrellisError>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
    fn should_trace_error(&self) -> bool {
        true
    }
}

impl Error for Box<dyn TrellisError> {}

impl TrellisError for Box<dyn TrellisError> {
    fn code(&self) -> ErrorCodes {
        self.as_ref().code()
    }

    fn should_trace_error(&self) -> bool {
        self.as_ref().should_trace_error()
    }
}

impl TrellisError for std::io::Error {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::Unknown
    }
}
