//! The fixed mapping from field value types to data kinds. The synthesizer
//! and the validator both infer kinds through [`kind_of`].

use crate::description::{ScalarType, ValueType};
use trellis_types::DataKind;

fn scalar_kind(scalar: ScalarType) -> Option<DataKind> {
    match scalar {
        ScalarType::String | ScalarType::Char => Some(DataKind::Text),
        ScalarType::I8
        | ScalarType::I16
        | ScalarType::I32
        | ScalarType::I64
        | ScalarType::U8
        | ScalarType::U16
        | ScalarType::U32
        | ScalarType::U64 => Some(DataKind::Int),
        // The server's int is 64 bits wide.
        ScalarType::I128 | ScalarType::U128 => None,
        ScalarType::F32 | ScalarType::F64 => Some(DataKind::Number),
        ScalarType::Bool => Some(DataKind::Bool),
        ScalarType::DateTime => Some(DataKind::Date),
        ScalarType::Uuid => Some(DataKind::Uuid),
        ScalarType::GeoCoordinate => Some(DataKind::GeoCoordinate),
        ScalarType::PhoneNumber => Some(DataKind::PhoneNumber),
    }
}

/// The data kind a value type maps to, or `None` when it has no mapping.
///
/// Options map to their inner kind. A list of bytes is a blob; any other list
/// maps to the array kind of its element, and lists of lists have no mapping.
pub fn kind_of(value_type: &ValueType) -> Option<DataKind> {
    match value_type {
        ValueType::Scalar(scalar) => scalar_kind(*scalar),
        ValueType::Optional(inner) => kind_of(inner),
        ValueType::List(inner) => {
            if **inner == ValueType::Scalar(ScalarType::U8) {
                return Some(DataKind::Blob);
            }
            let element = kind_of(inner)?;
            if element.is_array() {
                return None;
            }
            element.array_kind()
        }
        ValueType::Nested(_) => Some(DataKind::Object),
        ValueType::Opaque(_) => None,
    }
}
