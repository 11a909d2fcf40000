//! Canonical naming for properties, vectors and collections.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Converts a field identifier to lower-initial camelCase.
///
/// `first_name` and `FirstName` both become `firstName`, `URLPath` becomes
/// `urlPath`.
pub fn to_camel_case(ident: &str) -> String {
    ident.to_lower_camel_case()
}

/// Collection names are UpperCamelCase.
pub fn to_collection_name(type_name: &str) -> String {
    type_name.to_upper_camel_case()
}
