use proptest::prelude::*;
use trellis_schema::{
    compare, plan_migration, synthesize, validate, ChangeSubject, CollectionDescriptor,
    ConfigurationError, DataKind, FieldDescription, InMemorySchemaSource, MigrationPlan,
    MultiTenancyConfig, PropertyDescriptor, SchemaChangeType, TypeDescription,
    ValidationErrorKind, VectorDirective, ALL_DATA_KINDS, BREAKING_MARKER,
};

fn collection(properties: Vec<PropertyDescriptor>) -> CollectionDescriptor {
    CollectionDescriptor {
        properties,
        ..CollectionDescriptor::new("Article")
    }
}

#[test]
fn test_add_property() {
    let current = collection(vec![PropertyDescriptor::new("a", DataKind::Text)]);
    let target = collection(vec![
        PropertyDescriptor::new("a", DataKind::Text),
        PropertyDescriptor::new("b", DataKind::Int),
    ]);
    let changes = compare(Some(&current), &target);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, SchemaChangeType::AddProperty);
    assert!(changes[0].is_safe);
    assert_eq!(
        changes[0].subject,
        Some(ChangeSubject::Property(PropertyDescriptor::new(
            "b",
            DataKind::Int
        )))
    );
}

#[test]
fn test_remove_property() {
    let current = collection(vec![
        PropertyDescriptor::new("a", DataKind::Text),
        PropertyDescriptor::new("b", DataKind::Int),
    ]);
    let target = collection(vec![PropertyDescriptor::new("a", DataKind::Text)]);
    let changes = compare(Some(&current), &target);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, SchemaChangeType::RemoveProperty);
    assert!(!changes[0].is_safe);
    assert!(changes[0].description.contains(BREAKING_MARKER));
}

#[test]
fn test_type_change() {
    let current = collection(vec![PropertyDescriptor::new("a", DataKind::Text)]);
    let target = collection(vec![PropertyDescriptor::new("a", DataKind::Int)]);
    let changes = compare(Some(&current), &target);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, SchemaChangeType::ModifyPropertyType);
    assert!(!changes[0].is_safe);
    assert!(changes[0].description.contains(BREAKING_MARKER));
}

#[test]
fn test_multi_tenancy_toggle() {
    let current = collection(vec![PropertyDescriptor::new("a", DataKind::Text)]);
    let target = CollectionDescriptor {
        multi_tenancy_config: MultiTenancyConfig {
            enabled: true,
            ..Default::default()
        },
        ..current.clone()
    };
    let changes = compare(Some(&current), &target);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, SchemaChangeType::UpdateMultiTenancy);
    assert!(!changes[0].is_safe);
    assert!(changes[0].description.contains(BREAKING_MARKER));
}

#[test]
fn test_validator_array_mismatch() {
    let schema = collection(vec![PropertyDescriptor::new("tags", DataKind::TextArray)]);
    let shape = TypeDescription::new("Article").field(FieldDescription::of::<String>("tags"));
    let result = validate(&shape, &schema);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].property_name, "tags");
    assert_eq!(result.errors[0].kind, ValidationErrorKind::ArrayMismatch);
}

#[test_log::test(tokio::test)]
async fn test_plan_from_synthesized_target() {
    let source = InMemorySchemaSource::new();
    source.insert(collection(vec![
        PropertyDescriptor::new("title", DataKind::Text),
        PropertyDescriptor::new("legacyScore", DataKind::Number),
    ]));

    let target = synthesize(
        &TypeDescription::new("Article")
            .field(FieldDescription::of::<String>("title"))
            .field(FieldDescription::of::<Vec<String>>("tags")),
    )
    .unwrap();
    let plan = plan_migration(&source, &target).await.unwrap();
    assert!(!plan.is_safe());
    assert_eq!(
        plan.changes
            .iter()
            .map(|c| c.change_type)
            .collect::<Vec<_>>(),
        vec![SchemaChangeType::AddProperty, SchemaChangeType::RemoveProperty]
    );
}

proptest! {
    #[test]
    fn comparing_a_descriptor_with_itself_is_empty(d in any::<CollectionDescriptor>()) {
        prop_assert!(compare(Some(&d), &d).is_empty());
        prop_assert!(MigrationPlan::between(Some(&d), &d).is_empty());
    }

    #[test]
    fn creating_a_collection_adds_everything_safely(d in any::<CollectionDescriptor>()) {
        let changes = compare(None, &d);
        prop_assert_eq!(
            changes.len(),
            d.properties.len() + d.references.len() + d.vectors.len()
        );
        prop_assert!(changes.iter().all(|c| c.is_safe));
    }

    #[test]
    fn removals_are_breaking(d in any::<CollectionDescriptor>(), index in any::<prop::sample::Index>()) {
        let mut target = d.clone();
        let expected = if !target.properties.is_empty() {
            target.properties.remove(index.index(target.properties.len()));
            SchemaChangeType::RemoveProperty
        } else if !target.references.is_empty() {
            target.references.remove(index.index(target.references.len()));
            SchemaChangeType::RemoveReference
        } else if !target.vectors.is_empty() {
            target.vectors.remove(index.index(target.vectors.len()));
            SchemaChangeType::RemoveVector
        } else {
            return Ok(());
        };
        let changes = compare(Some(&d), &target);
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(changes[0].change_type, expected);
        prop_assert!(!changes[0].is_safe);
        prop_assert!(changes[0].description.contains(BREAKING_MARKER));
    }

    #[test]
    fn kind_changes_are_breaking(
        d in any::<CollectionDescriptor>(),
        index in any::<prop::sample::Index>(),
        kind in prop::sample::select(ALL_DATA_KINDS.to_vec()),
    ) {
        prop_assume!(!d.properties.is_empty());
        let mut target = d.clone();
        let position = index.index(target.properties.len());
        prop_assume!(target.properties[position].primary_kind() != Some(kind));
        target.properties[position].data_type = vec![kind];

        let changes = compare(Some(&d), &target);
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(changes[0].change_type, SchemaChangeType::ModifyPropertyType);
        prop_assert!(!changes[0].is_safe);
        prop_assert!(changes[0].description.contains(BREAKING_MARKER));
        prop_assert_eq!(
            changes[0].subject.clone(),
            Some(ChangeSubject::Property(target.properties[position].clone()))
        );
    }

    #[test]
    fn multi_tenancy_toggle_is_breaking(d in any::<CollectionDescriptor>()) {
        let mut target = d.clone();
        target.multi_tenancy_config.enabled = !d.multi_tenancy_config.enabled;
        let changes = compare(Some(&d), &target);
        prop_assert_eq!(changes.len(), 1);
        prop_assert!(!changes[0].is_safe);
        prop_assert!(changes[0].description.contains(BREAKING_MARKER));
    }

    #[test]
    fn self_provided_vectors_reject_model_and_sources(
        model in proptest::option::of("[a-z0-9-]{1,20}"),
        sources in proptest::collection::btree_set("[a-z]{1,8}", 0..3),
    ) {
        prop_assume!(model.is_some() || !sources.is_empty());
        let mut directive = VectorDirective::self_provided().source_properties(sources.clone());
        if let Some(model) = model {
            directive = directive.model(model);
        }
        let mut description = TypeDescription::new("Doc");
        for source in &sources {
            description = description.field(FieldDescription::of::<String>(source.clone()));
        }
        let description =
            description.field(FieldDescription::of::<Vec<f32>>("embedding").vector(directive));
        let rejected = matches!(
            synthesize(&description),
            Err(ConfigurationError::SelfProvidedWithParameters { .. })
        );
        prop_assert!(rejected);
    }
}
