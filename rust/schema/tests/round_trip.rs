use proptest::prelude::*;
use trellis_schema::{
    synthesize, validate, CollectionDirective, DataKind, Describe, FieldDescription,
    GeoCoordinate, PhoneNumber, ReferenceDirective, SchemaSynthesizer, Tokenization,
    TypeDescription, ValidationResult, ValidationWarningKind, VectorDirective, VectorizerKind,
};

struct Address;

impl Describe for Address {
    fn describe() -> TypeDescription {
        TypeDescription::new("Address")
            .field(FieldDescription::of::<String>("street_name"))
            .field(FieldDescription::of::<Option<String>>("city"))
            .field(FieldDescription::of::<GeoCoordinate>("location"))
    }
}

struct Comment;

impl Describe for Comment {
    fn describe() -> TypeDescription {
        TypeDescription::new("Comment")
            .field(FieldDescription::of::<String>("body"))
            .field(FieldDescription::of::<chrono::DateTime<chrono::Utc>>("posted_at"))
            .field(FieldDescription::nested_list::<Comment>("replies"))
    }
}

struct Article;

impl Describe for Article {
    fn describe() -> TypeDescription {
        TypeDescription::new("Article")
            .with_collection(CollectionDirective {
                description: Some("Published articles".to_string()),
                replication_factor: 2,
                multi_tenancy: true,
                ..Default::default()
            })
            .field(
                FieldDescription::of::<String>("title")
                    .searchable(true)
                    .tokenization(Tokenization::Word),
            )
            .field(FieldDescription::of::<Vec<String>>("tags").filterable(true))
            .field(FieldDescription::of::<i64>("WordCount"))
            .field(FieldDescription::of::<f64>("rating"))
            .field(FieldDescription::of::<bool>("is_draft"))
            .field(FieldDescription::of::<Vec<u8>>("cover_image"))
            .field(FieldDescription::of::<PhoneNumber>("contact"))
            .field(FieldDescription::of::<uuid::Uuid>("external_id").named("sourceId"))
            .field(FieldDescription::of::<String>("summary_json").kind(DataKind::Text))
            .field(FieldDescription::nested::<Address>("address"))
            .field(FieldDescription::nested_list::<Comment>("comments"))
            .field(
                FieldDescription::of::<uuid::Uuid>("author")
                    .reference(ReferenceDirective::to("Author")),
            )
            .field(
                FieldDescription::of::<Vec<f32>>("title_vector").vector(
                    VectorDirective::new(VectorizerKind::Text2VecOpenAi)
                        .model("text-embedding-3-small")
                        .source_properties(["title"]),
                ),
            )
            .field(
                FieldDescription::of::<Vec<f32>>("embedding")
                    .vector(VectorDirective::self_provided().named("default")),
            )
    }
}

fn assert_round_trip(result: &ValidationResult) {
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    assert_eq!(
        result
            .warnings_of(ValidationWarningKind::ExtraProperty)
            .count(),
        0,
        "unexpected warnings: {:?}",
        result.warnings
    );
    assert_eq!(
        result
            .warnings_of(ValidationWarningKind::MissingProperty)
            .count(),
        0,
        "unexpected warnings: {:?}",
        result.warnings
    );
}

#[test_log::test]
fn test_article_round_trips() {
    let schema = SchemaSynthesizer::default()
        .synthesize_type::<Article>()
        .unwrap();
    assert_eq!(schema.properties.len(), 11);
    assert_eq!(
        schema.property("coverImage").unwrap().primary_kind(),
        Some(DataKind::Blob)
    );
    assert_eq!(
        schema.property("sourceId").unwrap().primary_kind(),
        Some(DataKind::Uuid)
    );

    let result = validate(&Article::describe(), &schema);
    assert_round_trip(&result);
    assert!(result.warnings.is_empty());
}

#[test_log::test]
fn test_recursive_type_round_trips() {
    let schema = synthesize(&Comment::describe()).unwrap();
    let replies = schema.property("replies").unwrap();
    assert_eq!(replies.primary_kind(), Some(DataKind::ObjectArray));
    assert_round_trip(&validate(&Comment::describe(), &schema));
}

#[test]
fn test_case_insensitive_match() {
    let schema = synthesize(&Article::describe()).unwrap();
    let shape = TypeDescription::new("ArticleView")
        .field(FieldDescription::of::<String>("TITLE").named("TITLE"))
        .field(FieldDescription::of::<Vec<String>>("Tags"));
    let result = validate(&shape, &schema);
    assert!(result.is_valid());
    assert_eq!(result.warnings_of(ValidationWarningKind::ExtraProperty).count(), 0);
}

#[test]
fn test_names_differing_only_in_case_round_trip() {
    let description = TypeDescription::new("Doc")
        .field(FieldDescription::of::<String>("title"))
        .field(FieldDescription::of::<i64>("title_count").named("Title"))
        .field(FieldDescription::nested::<Address>("address"))
        .field(FieldDescription::of::<bool>("is_public").named("Address"));
    let schema = synthesize(&description).unwrap();
    assert_eq!(
        schema
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>(),
        vec!["title", "Title", "address", "Address"]
    );
    let result = validate(&description, &schema);
    assert_round_trip(&result);
    assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
}

fn value_field(ident: String) -> impl Strategy<Value = FieldDescription> {
    (0usize..13).prop_map(move |choice| match choice {
        0 => FieldDescription::of::<String>(ident.clone()),
        1 => FieldDescription::of::<i64>(ident.clone()),
        2 => FieldDescription::of::<f32>(ident.clone()),
        3 => FieldDescription::of::<bool>(ident.clone()),
        4 => FieldDescription::of::<uuid::Uuid>(ident.clone()),
        5 => FieldDescription::of::<chrono::NaiveDateTime>(ident.clone()),
        6 => FieldDescription::of::<Vec<String>>(ident.clone()),
        7 => FieldDescription::of::<Option<Vec<i32>>>(ident.clone()),
        8 => FieldDescription::of::<Vec<u8>>(ident.clone()),
        9 => FieldDescription::of::<GeoCoordinate>(ident.clone()),
        10 => FieldDescription::nested::<Address>(ident.clone()),
        11 => FieldDescription::nested_list::<Comment>(ident.clone()),
        _ => FieldDescription::of::<String>(ident.clone()).tokenization(Tokenization::Field),
    })
}

fn arbitrary_description() -> impl Strategy<Value = TypeDescription> {
    (
        proptest::collection::btree_set("[a-z]{1,10}", 1..12),
        proptest::collection::btree_set("[a-z]{1,6}", 0..3),
        proptest::collection::btree_set("[a-z]{1,6}", 0..3),
    )
        .prop_flat_map(|(idents, references, vectors)| {
            let fields: Vec<_> = idents.into_iter().map(value_field).collect();
            fields.prop_map(move |fields| {
                let mut description = TypeDescription::new("Generated");
                description.fields = fields;
                for reference in &references {
                    description = description.field(
                        FieldDescription::of::<uuid::Uuid>(format!("ref_{}", reference))
                            .reference(ReferenceDirective::to("Target")),
                    );
                }
                for vector in &vectors {
                    description = description.field(
                        FieldDescription::of::<Vec<f32>>(format!("vec_{}", vector))
                            .vector(VectorDirective::self_provided()),
                    );
                }
                description
            })
        })
}

proptest! {
    #[test]
    fn synthesized_schema_validates_its_own_shape(description in arbitrary_description()) {
        let schema = synthesize(&description).unwrap();
        let result = validate(&description, &schema);
        prop_assert!(result.is_valid(), "errors: {:?}", result.errors);
        prop_assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    }
}
