use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use trellis_error::{ErrorCodes, TrellisError};

/// The bounded set of value kinds a collection property can hold.
///
/// Every primitive kind except geo coordinates, phone numbers and blobs has an
/// array counterpart. The serialized names match what the server reports in a
/// property's `dataType` list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "text[]")]
    TextArray,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "boolean")]
    Bool,
    #[serde(rename = "boolean[]")]
    BoolArray,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "date[]")]
    DateArray,
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "uuid[]")]
    UuidArray,
    #[serde(rename = "geoCoordinates")]
    GeoCoordinate,
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "blob")]
    Blob,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "object[]")]
    ObjectArray,
}

pub const ALL_DATA_KINDS: [DataKind; 17] = [
    DataKind::Text,
    DataKind::TextArray,
    DataKind::Int,
    DataKind::IntArray,
    DataKind::Number,
    DataKind::NumberArray,
    DataKind::Bool,
    DataKind::BoolArray,
    DataKind::Date,
    DataKind::DateArray,
    DataKind::Uuid,
    DataKind::UuidArray,
    DataKind::GeoCoordinate,
    DataKind::PhoneNumber,
    DataKind::Blob,
    DataKind::Object,
    DataKind::ObjectArray,
];

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Text => "text",
            DataKind::TextArray => "text[]",
            DataKind::Int => "int",
            DataKind::IntArray => "int[]",
            DataKind::Number => "number",
            DataKind::NumberArray => "number[]",
            DataKind::Bool => "boolean",
            DataKind::BoolArray => "boolean[]",
            DataKind::Date => "date",
            DataKind::DateArray => "date[]",
            DataKind::Uuid => "uuid",
            DataKind::UuidArray => "uuid[]",
            DataKind::GeoCoordinate => "geoCoordinates",
            DataKind::PhoneNumber => "phoneNumber",
            DataKind::Blob => "blob",
            DataKind::Object => "object",
            DataKind::ObjectArray => "object[]",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DataKind::TextArray
                | DataKind::IntArray
                | DataKind::NumberArray
                | DataKind::BoolArray
                | DataKind::DateArray
                | DataKind::UuidArray
                | DataKind::ObjectArray
        )
    }

    /// The scalar kind held by an array kind. Scalar kinds map to themselves.
    pub fn element_kind(&self) -> DataKind {
        match self {
            DataKind::TextArray => DataKind::Text,
            DataKind::IntArray => DataKind::Int,
            DataKind::NumberArray => DataKind::Number,
            DataKind::BoolArray => DataKind::Bool,
            DataKind::DateArray => DataKind::Date,
            DataKind::UuidArray => DataKind::Uuid,
            DataKind::ObjectArray => DataKind::Object,
            scalar => *scalar,
        }
    }

    /// The array kind holding this scalar kind, if the server supports one.
    pub fn array_kind(&self) -> Option<DataKind> {
        match self {
            DataKind::Text => Some(DataKind::TextArray),
            DataKind::Int => Some(DataKind::IntArray),
            DataKind::Number => Some(DataKind::NumberArray),
            DataKind::Bool => Some(DataKind::BoolArray),
            DataKind::Date => Some(DataKind::DateArray),
            DataKind::Uuid => Some(DataKind::UuidArray),
            DataKind::Object => Some(DataKind::ObjectArray),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataKind::Text | DataKind::TextArray)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataKind::Object | DataKind::ObjectArray)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown data kind '{0}'")]
pub struct UnknownDataKind(pub String);

impl TrellisError for UnknownDataKind {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

impl FromStr for DataKind {
    type Err = UnknownDataKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_DATA_KINDS
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownDataKind(s.to_string()))
    }
}
