use crate::hooks::HookSignature;
use thiserror::Error;
use trellis_error::{ErrorCodes, TrellisError, TrellisValidationError};
use trellis_types::{DataKind, NameScope};

/// A malformed declarative description. Synthesis stops at the first one.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Field '{field}' of '{type_name}' has type {value_type} which maps to no data kind")]
    UnsupportedType {
        type_name: String,
        field: String,
        value_type: String,
    },
    #[error("Hook '{method}' not found on '{owner}'")]
    MethodNotFound { owner: String, method: String },
    #[error("Hook '{method}' on '{owner}' is {found}, expected {expected}")]
    InvalidSignature {
        owner: String,
        method: String,
        expected: HookSignature,
        found: HookSignature,
    },
    #[error("Vector '{vector}' is self-provided and cannot set {parameter}")]
    SelfProvidedWithParameters {
        vector: String,
        parameter: &'static str,
    },
    #[error("Vector '{vector}' uses {module} which requires {parameter}")]
    MissingVectorizerParameter {
        vector: String,
        module: &'static str,
        parameter: &'static str,
    },
    #[error("Vector '{vector}' reads '{property}' which is not a {expected} of the collection")]
    UnknownSourceProperty {
        vector: String,
        property: String,
        expected: &'static str,
    },
    #[error("Field '{field}' sets tokenization but its kind {kind} is not text")]
    InvalidTokenization { field: String, kind: DataKind },
    #[error("Field '{field}' has kind {kind} but no nested type to describe it")]
    MissingNestedType { field: String, kind: DataKind },
    #[error("Field '{field}' carries both a vector and a reference directive")]
    ConflictingDirectives { field: String },
    #[error("Duplicate {scope} name '{name}'")]
    DuplicateName { scope: NameScope, name: String },
    #[error("Field '{field}' nests deeper than {max_depth} levels")]
    NestingTooDeep { field: String, max_depth: usize },
    #[error("Collection setting {setting} is {value}, outside the u32 range")]
    SettingOutOfRange { setting: &'static str, value: i64 },
    #[error("Invalid collection directive: {0}")]
    InvalidDirective(#[from] TrellisValidationError),
}

impl TrellisError for ConfigurationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}
