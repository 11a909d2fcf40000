use crate::{
    CollectionDescriptor, DataKind, Distance, MultiTenancyConfig, PropertyDescriptor,
    ReferenceDescriptor, ReplicationConfig, VectorDescriptor, VectorIndexKind, Vectorizer,
    ALL_DATA_KINDS,
};
use proptest::{collection, prelude::*, sample::select, string::string_regex};

/**
 * Strategy for property, reference and vector names.
 * Lower-initial camelCase identifiers, the form the synthesizer emits.
 */
pub fn arbitrary_name() -> impl Strategy<Value = String> {
    string_regex("[a-z][a-zA-Z0-9]{0,11}").unwrap()
}

fn scalar_kind() -> impl Strategy<Value = DataKind> {
    select(
        ALL_DATA_KINDS
            .iter()
            .copied()
            .filter(|kind| !kind.is_object())
            .collect::<Vec<_>>(),
    )
}

fn description() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(string_regex("[A-Za-z ]{1,24}").unwrap())
}

/**
 * Strategy for a property of the given name.
 * Object kinds receive up to three scalar nested properties.
 */
pub fn arbitrary_property(name: String) -> impl Strategy<Value = PropertyDescriptor> {
    (select(ALL_DATA_KINDS.to_vec()), description()).prop_flat_map(move |(kind, description)| {
        let nested_count = if kind.is_object() { 0..4usize } else { 0..1usize };
        let name = name.clone();
        collection::btree_map(arbitrary_name(), scalar_kind(), nested_count).prop_map(
            move |nested| {
                let mut property = PropertyDescriptor::new(name.clone(), kind);
                property.description = description.clone();
                property.nested_properties = nested
                    .into_iter()
                    .map(|(name, kind)| PropertyDescriptor::new(name, kind))
                    .collect();
                property
            },
        )
    })
}

fn arbitrary_vector(name: String) -> impl Strategy<Value = VectorDescriptor> {
    let index = prop_oneof![
        Just(VectorIndexKind::Hnsw),
        Just(VectorIndexKind::Flat),
        Just(VectorIndexKind::Dynamic),
    ];
    let distance = prop_oneof![
        Just(Distance::Cosine),
        Just(Distance::Dot),
        Just(Distance::L2Squared),
    ];
    (index, distance).prop_map(move |(index, distance)| {
        VectorDescriptor::new(
            name.clone(),
            Vectorizer::SelfProvided,
            index.default_config(distance),
        )
    })
}

#[derive(Debug, Clone)]
pub struct CollectionDescriptorStrategyParams {
    pub max_properties: usize,
    pub max_references: usize,
    pub max_vectors: usize,
}

impl Default for CollectionDescriptorStrategyParams {
    fn default() -> Self {
        Self {
            max_properties: 8,
            max_references: 3,
            max_vectors: 3,
        }
    }
}

/**
 * Strategy for collection descriptors whose names are unique in their scope.
 * Properties and references draw from one name set so they never collide.
 */
impl Arbitrary for CollectionDescriptor {
    type Parameters = CollectionDescriptorStrategyParams;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        let field_names = collection::btree_set(
            arbitrary_name(),
            0..=(args.max_properties + args.max_references),
        );
        let vector_names = collection::btree_set(arbitrary_name(), 0..=args.max_vectors);
        let max_references = args.max_references;

        (
            string_regex("[A-Z][a-zA-Z0-9]{0,15}").unwrap(),
            description(),
            field_names,
            vector_names,
            proptest::option::of(1u32..5),
            proptest::bool::ANY,
        )
            .prop_flat_map(
                move |(name, description, field_names, vector_names, factor, multi_tenant)| {
                    let field_names: Vec<String> = field_names.into_iter().collect();
                    let reference_count = field_names.len().min(max_references);
                    let split = field_names.len() - reference_count;
                    let references: Vec<ReferenceDescriptor> = field_names[split..]
                        .iter()
                        .map(|name| ReferenceDescriptor::new(name.clone(), "Target"))
                        .collect();
                    let properties: Vec<_> = field_names[..split]
                        .iter()
                        .cloned()
                        .map(arbitrary_property)
                        .collect();
                    let vectors: Vec<_> = vector_names.into_iter().map(arbitrary_vector).collect();

                    (properties, vectors).prop_map(move |(properties, vectors)| {
                        CollectionDescriptor {
                            name: name.clone(),
                            description: description.clone(),
                            properties,
                            references: references.clone(),
                            vectors,
                            inverted_index_config: None,
                            replication_config: ReplicationConfig {
                                factor,
                                ..Default::default()
                            },
                            sharding_config: None,
                            multi_tenancy_config: MultiTenancyConfig {
                                enabled: multi_tenant,
                                ..Default::default()
                            },
                        }
                    })
                },
            )
            .boxed()
    }
}
