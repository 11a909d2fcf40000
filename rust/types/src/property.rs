use crate::DataKind;
use serde::{Deserialize, Serialize};

/// How the server splits text values into tokens for keyword search and
/// filtering. Only meaningful for text kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tokenization {
    Word,
    Lowercase,
    Whitespace,
    Field,
    Trigram,
    Gse,
    KagomeKr,
    KagomeJa,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    /// Declared kinds. Servers may report more than one entry for polymorphic
    /// properties; the first entry is the primary kind.
    pub data_type: Vec<DataKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_filterable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_searchable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_range_filters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenization: Option<Tokenization>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_properties: Vec<PropertyDescriptor>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            data_type: vec![kind],
            description: None,
            index_filterable: None,
            index_searchable: None,
            index_range_filters: None,
            tokenization: None,
            nested_properties: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_nested(mut self, nested: Vec<PropertyDescriptor>) -> Self {
        self.nested_properties = nested;
        self
    }

    pub fn with_tokenization(mut self, tokenization: Tokenization) -> Self {
        self.tokenization = Some(tokenization);
        self
    }

    pub fn primary_kind(&self) -> Option<DataKind> {
        self.data_type.first().copied()
    }

    pub fn nested_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.nested_properties.iter().find(|p| p.name == name)
    }
}

/// A cross-reference from one collection to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDescriptor {
    pub name: String,
    pub target_collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReferenceDescriptor {
    pub fn new(name: impl Into<String>, target_collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_collection: target_collection.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_kind_is_first_entry() {
        let mut property = PropertyDescriptor::new("author", DataKind::Text);
        property.data_type.push(DataKind::Uuid);
        assert_eq!(property.primary_kind(), Some(DataKind::Text));

        property.data_type.clear();
        assert_eq!(property.primary_kind(), None);
    }

    #[test]
    fn test_serializes_without_unset_flags() {
        let property = PropertyDescriptor::new("tags", DataKind::TextArray)
            .with_tokenization(Tokenization::Field);
        let value = serde_json::to_value(&property).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "tags",
                "dataType": ["text[]"],
                "tokenization": "field",
            })
        );
    }

    #[test]
    fn test_nested_properties_deserialize() {
        let property: PropertyDescriptor = serde_json::from_value(json!({
            "name": "address",
            "dataType": ["object"],
            "nestedProperties": [
                {"name": "city", "dataType": ["text"], "tokenization": "kagome_ja"}
            ]
        }))
        .unwrap();
        let city = property.nested_property("city").unwrap();
        assert_eq!(city.primary_kind(), Some(DataKind::Text));
        assert_eq!(city.tokenization, Some(Tokenization::KagomeJa));
    }
}
