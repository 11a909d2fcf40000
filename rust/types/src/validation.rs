use crate::DataKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use trellis_error::{ErrorCodes, TrellisError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    TypeMismatch,
    /// Array against scalar of the same element kind, or the reverse.
    ArrayMismatch,
    /// The field's value type has no kind mapping.
    UnsupportedType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationWarningKind {
    /// The shape has a field the schema does not.
    ExtraProperty,
    /// The schema has a property or reference no field maps to.
    MissingProperty,
    /// The shape declares a vector the schema does not have.
    UnknownVector,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub property_name: String,
    pub message: String,
    pub kind: ValidationErrorKind,
    /// Kind recorded in the schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<DataKind>,
    /// Kind the model field maps to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_type: Option<DataKind>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_name, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub property_name: String,
    pub message: String,
    pub kind: ValidationWarningKind,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property_name, self.message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn warnings_of(&self, kind: ValidationWarningKind) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn errors_of(&self, kind: ValidationErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Keeps the warnings on success. On failure every error moves into the
    /// returned [`SchemaMismatchError`].
    pub fn into_result(self) -> Result<ValidationResult, SchemaMismatchError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SchemaMismatchError {
                collection: None,
                errors: self.errors,
            })
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub struct SchemaMismatchError {
    pub collection: Option<String>,
    pub errors: Vec<ValidationError>,
}

impl SchemaMismatchError {
    pub fn for_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
}

impl fmt::Display for SchemaMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.collection {
            Some(collection) => write!(
                f,
                "Model does not match schema of collection '{}' ({} error(s))",
                collection,
                self.errors.len()
            )?,
            None => write!(
                f,
                "Model does not match schema ({} error(s))",
                self.errors.len()
            )?,
        }
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl TrellisError for SchemaMismatchError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::FailedPrecondition
    }
}
