//! Compares a collection's current schema with a target schema.
//!
//! The comparison is total and deterministic. Changes come out in a fixed
//! order: description, properties, references, vectors, then replication and
//! multi-tenancy. Within properties and references, additions follow target
//! order, removals follow current order and modifications follow target
//! order. Vector configuration, reference targets and inverted index settings
//! are not compared.

use serde_json::Value;
use std::fmt;
use trellis_types::{
    ChangeSubject, CollectionDescriptor, PropertyDescriptor, ReferenceDescriptor, SchemaChange,
    SchemaChangeType, VectorDescriptor,
};

pub fn compare(
    current: Option<&CollectionDescriptor>,
    target: &CollectionDescriptor,
) -> Vec<SchemaChange> {
    let changes = match current {
        None => creation_changes(target),
        Some(current) => {
            let mut changes = Vec::new();
            compare_description(current, target, &mut changes);
            compare_properties(current, target, &mut changes);
            compare_references(current, target, &mut changes);
            compare_vectors(current, target, &mut changes);
            compare_replication(current, target, &mut changes);
            compare_multi_tenancy(current, target, &mut changes);
            changes
        }
    };
    tracing::debug!(
        collection = %target.name,
        exists = current.is_some(),
        changes = changes.len(),
        breaking = changes.iter().filter(|c| !c.is_safe).count(),
        "Compared collection schemas"
    );
    changes
}

fn kinds(property: &PropertyDescriptor) -> Value {
    Value::Array(
        property
            .data_type
            .iter()
            .map(|kind| Value::from(kind.as_str()))
            .collect(),
    )
}

fn kind_label(property: &PropertyDescriptor) -> String {
    match property.primary_kind() {
        Some(kind) => kind.to_string(),
        None => "no kind".to_string(),
    }
}

fn add_property(property: &PropertyDescriptor) -> SchemaChange {
    SchemaChange::safe(
        SchemaChangeType::AddProperty,
        format!("Add property '{}' ({})", property.name, kind_label(property)),
    )
    .with_values(None, Some(kinds(property)))
    .with_subject(ChangeSubject::Property(property.clone()))
}

fn add_reference(reference: &ReferenceDescriptor) -> SchemaChange {
    SchemaChange::safe(
        SchemaChangeType::AddReference,
        format!(
            "Add reference '{}' to '{}'",
            reference.name, reference.target_collection
        ),
    )
    .with_values(None, Some(Value::from(reference.target_collection.as_str())))
    .with_subject(ChangeSubject::Reference(reference.clone()))
}

fn add_vector(vector: &VectorDescriptor) -> SchemaChange {
    SchemaChange::safe(
        SchemaChangeType::AddVector,
        format!(
            "Add vector '{}' ({})",
            vector.name,
            vector.vectorizer.module_name()
        ),
    )
    .with_values(None, Some(Value::from(vector.vectorizer.module_name())))
    .with_subject(ChangeSubject::Vector(vector.clone()))
}

fn creation_changes(target: &CollectionDescriptor) -> Vec<SchemaChange> {
    target
        .properties
        .iter()
        .map(add_property)
        .chain(target.references.iter().map(add_reference))
        .chain(target.vectors.iter().map(add_vector))
        .collect()
}

fn optional_string(value: &Option<String>) -> Option<Value> {
    value.as_deref().map(Value::from)
}

fn compare_description(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    if current.description != target.description {
        changes.push(
            SchemaChange::safe(
                SchemaChangeType::UpdateDescription,
                format!("Update description of collection '{}'", target.name),
            )
            .with_values(
                optional_string(&current.description),
                optional_string(&target.description),
            ),
        );
    }
}

fn compare_properties(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    for property in &target.properties {
        if current.property(&property.name).is_none() {
            changes.push(add_property(property));
        }
    }

    for property in &current.properties {
        if target.property(&property.name).is_none() {
            changes.push(
                SchemaChange::breaking(
                    SchemaChangeType::RemoveProperty,
                    format!(
                        "Remove property '{}'; data stored in it will be lost",
                        property.name
                    ),
                )
                .with_values(Some(kinds(property)), None)
                .with_subject(ChangeSubject::Property(property.clone())),
            );
        }
    }

    for property in &target.properties {
        let Some(existing) = current.property(&property.name) else {
            continue;
        };
        if existing.primary_kind() != property.primary_kind() {
            changes.push(
                SchemaChange::breaking(
                    SchemaChangeType::ModifyPropertyType,
                    format!(
                        "Change type of property '{}' from {} to {}; the property must be recreated and its data will be lost",
                        property.name,
                        kind_label(existing),
                        kind_label(property)
                    ),
                )
                .with_values(Some(kinds(existing)), Some(kinds(property)))
                .with_subject(ChangeSubject::Property(property.clone())),
            );
        } else if existing.description != property.description {
            changes.push(
                SchemaChange::safe(
                    SchemaChangeType::UpdatePropertyDescription,
                    format!("Update description of property '{}'", property.name),
                )
                .with_values(
                    optional_string(&existing.description),
                    optional_string(&property.description),
                )
                .with_subject(ChangeSubject::Property(property.clone())),
            );
        }
    }
}

fn compare_references(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    for reference in &target.references {
        if current.reference(&reference.name).is_none() {
            changes.push(add_reference(reference));
        }
    }

    for reference in &current.references {
        if target.reference(&reference.name).is_none() {
            changes.push(
                SchemaChange::breaking(
                    SchemaChangeType::RemoveReference,
                    format!(
                        "Remove reference '{}'; links stored in it will be lost",
                        reference.name
                    ),
                )
                .with_values(Some(Value::from(reference.target_collection.as_str())), None)
                .with_subject(ChangeSubject::Reference(reference.clone())),
            );
        }
    }

    // Target collection changes are not detected.
    for reference in &target.references {
        let Some(existing) = current.reference(&reference.name) else {
            continue;
        };
        if existing.description != reference.description {
            changes.push(
                SchemaChange::safe(
                    SchemaChangeType::UpdateReferenceDescription,
                    format!("Update description of reference '{}'", reference.name),
                )
                .with_values(
                    optional_string(&existing.description),
                    optional_string(&reference.description),
                )
                .with_subject(ChangeSubject::Reference(reference.clone())),
            );
        }
    }
}

fn compare_vectors(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    for vector in &target.vectors {
        if current.vector(&vector.name).is_none() {
            changes.push(add_vector(vector));
        }
    }

    for vector in &current.vectors {
        if target.vector(&vector.name).is_none() {
            changes.push(
                SchemaChange::breaking(
                    SchemaChangeType::RemoveVector,
                    format!(
                        "Remove vector '{}'; its stored embeddings will be lost",
                        vector.name
                    ),
                )
                .with_values(Some(Value::from(vector.vectorizer.module_name())), None)
                .with_subject(ChangeSubject::Vector(vector.clone())),
            );
        }
    }
}

fn compare_replication(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    // An unset target factor leaves the server's value alone.
    let Some(factor) = target.replication_config.factor else {
        return;
    };
    if current.replication_config.factor != Some(factor) {
        changes.push(
            SchemaChange::safe(
                SchemaChangeType::UpdateReplication,
                format!("Update replication factor to {}", factor),
            )
            .with_values(
                current.replication_config.factor.map(Value::from),
                Some(Value::from(factor)),
            ),
        );
    }
}

fn compare_multi_tenancy(
    current: &CollectionDescriptor,
    target: &CollectionDescriptor,
    changes: &mut Vec<SchemaChange>,
) {
    let before = &current.multi_tenancy_config;
    let after = &target.multi_tenancy_config;
    if before.enabled != after.enabled {
        changes.push(
            SchemaChange::breaking(
                SchemaChangeType::UpdateMultiTenancy,
                format!(
                    "{} multi-tenancy; it cannot change after creation and the collection must be recreated",
                    if after.enabled { "Enable" } else { "Disable" }
                ),
            )
            .with_values(Some(Value::from(before.enabled)), Some(Value::from(after.enabled))),
        );
    } else if before.auto_tenant_creation != after.auto_tenant_creation
        || before.auto_tenant_activation != after.auto_tenant_activation
    {
        let settings = |config: &trellis_types::MultiTenancyConfig| {
            serde_json::json!({
                "autoTenantCreation": config.auto_tenant_creation,
                "autoTenantActivation": config.auto_tenant_activation,
            })
        };
        changes.push(
            SchemaChange::safe(
                SchemaChangeType::UpdateMultiTenancy,
                "Update automatic tenant creation and activation",
            )
            .with_values(Some(settings(before)), Some(settings(after))),
        );
    }
}

/// An ordered set of changes that moves a collection to a target schema.
#[derive(Clone, Debug, PartialEq)]
pub struct MigrationPlan {
    pub collection: String,
    pub changes: Vec<SchemaChange>,
}

impl MigrationPlan {
    pub fn between(current: Option<&CollectionDescriptor>, target: &CollectionDescriptor) -> Self {
        Self {
            collection: target.name.clone(),
            changes: compare(current, target),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// True when every change can be applied without data loss.
    pub fn is_safe(&self) -> bool {
        self.changes.iter().all(|c| c.is_safe)
    }

    pub fn breaking_changes(&self) -> impl Iterator<Item = &SchemaChange> {
        self.changes.iter().filter(|c| !c.is_safe)
    }

    pub fn safe_changes(&self) -> impl Iterator<Item = &SchemaChange> {
        self.changes.iter().filter(|c| c.is_safe)
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Collection '{}' is up to date", self.collection);
        }
        write!(
            f,
            "Migration plan for '{}': {} change(s), {} breaking",
            self.collection,
            self.changes.len(),
            self.breaking_changes().count()
        )?;
        for change in &self.changes {
            write!(f, "\n  {}", change)?;
        }
        Ok(())
    }
}
