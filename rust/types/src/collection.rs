use crate::{
    InvertedIndexConfig, MultiTenancyConfig, PropertyDescriptor, ReferenceDescriptor,
    ReplicationConfig, ShardingConfig, VectorDescriptor,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical, normalized description of one collection.
///
/// Properties and references keep declaration order. Descriptors are plain
/// values: every component that derives a new descriptor clones rather than
/// mutating its input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub references: Vec<ReferenceDescriptor>,
    #[serde(default)]
    pub vectors: Vec<VectorDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverted_index_config: Option<InvertedIndexConfig>,
    #[serde(default)]
    pub replication_config: ReplicationConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharding_config: Option<ShardingConfig>,
    #[serde(default)]
    pub multi_tenancy_config: MultiTenancyConfig,
}

/// Which uniqueness scope a name collided in. Properties and references share
/// one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameScope {
    Property,
    Vector,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::Property => f.write_str("property"),
            NameScope::Vector => f.write_str("vector"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateName {
    pub scope: NameScope,
    pub name: String,
}

impl CollectionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn reference(&self, name: &str) -> Option<&ReferenceDescriptor> {
        self.references.iter().find(|r| r.name == name)
    }

    pub fn vector(&self, name: &str) -> Option<&VectorDescriptor> {
        self.vectors.iter().find(|v| v.name == name)
    }

    pub fn find_property_ignore_case(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn find_reference_ignore_case(&self, name: &str) -> Option<&ReferenceDescriptor> {
        self.references
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn find_vector_ignore_case(&self, name: &str) -> Option<&VectorDescriptor> {
        self.vectors
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Names that appear more than once in their scope, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<DuplicateName> {
        let properties = self
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.references.iter().map(|r| r.name.as_str()))
            .duplicates()
            .map(|name| DuplicateName {
                scope: NameScope::Property,
                name: name.to_string(),
            });
        let vectors = self
            .vectors
            .iter()
            .map(|v| v.name.as_str())
            .duplicates()
            .map(|name| DuplicateName {
                scope: NameScope::Vector,
                name: name.to_string(),
            });
        properties.chain(vectors).collect()
    }
}
