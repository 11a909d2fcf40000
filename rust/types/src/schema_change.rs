use crate::{PropertyDescriptor, ReferenceDescriptor, VectorDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix carried by the description of every unsafe change.
pub const BREAKING_MARKER: &str = "BREAKING";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChangeType {
    AddProperty,
    RemoveProperty,
    ModifyPropertyType,
    UpdatePropertyDescription,
    AddReference,
    RemoveReference,
    UpdateReferenceDescription,
    AddVector,
    RemoveVector,
    UpdateDescription,
    UpdateReplication,
    UpdateMultiTenancy,
}

/// The descriptor a change is about, when the change concerns a single
/// property, reference or vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "descriptor", rename_all = "snake_case")]
pub enum ChangeSubject {
    Property(PropertyDescriptor),
    Reference(ReferenceDescriptor),
    Vector(VectorDescriptor),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaChange {
    pub change_type: SchemaChangeType,
    pub is_safe: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<ChangeSubject>,
}

impl SchemaChange {
    pub fn safe(change_type: SchemaChangeType, description: impl Into<String>) -> Self {
        Self {
            change_type,
            is_safe: true,
            description: description.into(),
            old_value: None,
            new_value: None,
            subject: None,
        }
    }

    /// An unsafe change. The description is prefixed with [`BREAKING_MARKER`].
    pub fn breaking(change_type: SchemaChangeType, description: impl AsRef<str>) -> Self {
        Self {
            change_type,
            is_safe: false,
            description: format!("{}: {}", BREAKING_MARKER, description.as_ref()),
            old_value: None,
            new_value: None,
            subject: None,
        }
    }

    pub fn with_values(
        mut self,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_subject(mut self, subject: ChangeSubject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn is_breaking(&self) -> bool {
        !self.is_safe
    }
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_safe { "safe" } else { "unsafe" };
        write!(f, "[{}] {}", marker, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataKind;
    use serde_json::json;

    #[test]
    fn test_breaking_prefixes_marker() {
        let change = SchemaChange::breaking(
            SchemaChangeType::RemoveProperty,
            "Removing property 'title' deletes its data",
        );
        assert!(!change.is_safe);
        assert!(change.is_breaking());
        assert!(change.description.starts_with(BREAKING_MARKER));
        assert_eq!(
            change.to_string(),
            "[unsafe] BREAKING: Removing property 'title' deletes its data"
        );
    }

    #[test]
    fn test_subject_serialization() {
        let change = SchemaChange::safe(SchemaChangeType::AddProperty, "Add property 'title'")
            .with_values(None, Some(json!("text")))
            .with_subject(ChangeSubject::Property(PropertyDescriptor::new(
                "title",
                DataKind::Text,
            )));
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["changeType"], json!("add_property"));
        assert_eq!(value["newValue"], json!("text"));
        assert_eq!(value["subject"]["kind"], json!("property"));
        assert_eq!(value["subject"]["descriptor"]["name"], json!("title"));
        assert_eq!(value["isSafe"], json!(true));
        assert!(value.get("oldValue").is_none());
    }
}
