use crate::description::{FieldDescription, ModelShape};
use crate::kind_table::kind_of;
use crate::naming::to_camel_case;
use trellis_types::{
    CollectionDescriptor, DataKind, PropertyDescriptor, SchemaMismatchError, ValidationError,
    ValidationErrorKind, ValidationResult, ValidationWarning, ValidationWarningKind,
};

/// Checks that a model shape can be read from and written to a collection.
///
/// Names are resolved the way the synthesizer resolves them and matched to the
/// schema exactly, falling back to a case-insensitive match among schema names
/// no other field claimed. Kinds must be equal: an `int` field against a
/// `number` property is a mismatch. Only errors affect validity; warnings
/// report fields and properties that exist on one side only.
pub fn validate(shape: &ModelShape, schema: &CollectionDescriptor) -> ValidationResult {
    let mut result = ValidationResult::default();
    let mut stack = Vec::new();

    let properties: Vec<&FieldDescription> =
        shape.fields.iter().filter(|f| f.is_property()).collect();
    validate_properties(&properties, &schema.properties, "", &mut stack, &mut result);

    let names: Vec<(&FieldDescription, String)> = shape
        .fields
        .iter()
        .filter_map(|field| {
            let name = match (&field.vector, &field.reference) {
                (Some(vector), _) => vector.name.clone(),
                (None, Some(reference)) => reference.name.clone(),
                (None, None) => return None,
            };
            Some((field, name.unwrap_or_else(|| to_camel_case(&field.ident))))
        })
        .collect();
    let (vector_fields, reference_fields): (Vec<_>, Vec<_>) =
        names.iter().partition(|(field, _)| field.vector.is_some());

    let vector_matches = match_names(
        vector_fields.iter().map(|(_, name)| name.as_str()),
        schema.vectors.iter().map(|v| v.name.as_str()),
    );
    for ((_, name), _) in vector_fields
        .iter()
        .zip(vector_matches)
        .filter(|(_, index)| index.is_none())
    {
        result.warnings.push(ValidationWarning {
            message: format!("Vector '{}' is not defined on the collection", name),
            property_name: name.clone(),
            kind: ValidationWarningKind::UnknownVector,
        });
    }

    let reference_matches = match_names(
        reference_fields.iter().map(|(_, name)| name.as_str()),
        schema.references.iter().map(|r| r.name.as_str()),
    );
    let mut matched_references = vec![false; schema.references.len()];
    for ((_, name), index) in reference_fields.iter().zip(reference_matches) {
        match index {
            Some(i) => matched_references[i] = true,
            None => result.warnings.push(ValidationWarning {
                message: format!(
                    "Reference '{}' is not defined on the collection and will be ignored",
                    name
                ),
                property_name: name.clone(),
                kind: ValidationWarningKind::ExtraProperty,
            }),
        }
    }
    for (reference, _) in schema
        .references
        .iter()
        .zip(matched_references)
        .filter(|(_, matched)| !matched)
    {
        result.warnings.push(ValidationWarning {
            property_name: reference.name.clone(),
            message: format!(
                "Reference '{}' is not populated by the model",
                reference.name
            ),
            kind: ValidationWarningKind::MissingProperty,
        });
    }

    tracing::debug!(
        collection = %schema.name,
        model = %shape.type_name,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated model against collection schema"
    );
    result
}

/// Like [`validate`], but fails with every collected error when any exist.
pub fn validate_strict(
    shape: &ModelShape,
    schema: &CollectionDescriptor,
) -> Result<ValidationResult, SchemaMismatchError> {
    validate(shape, schema)
        .into_result()
        .map_err(|e| e.for_collection(schema.name.clone()))
}

/// Pairs each field name with a schema name. Exact matches are claimed first;
/// the remaining fields then match unclaimed schema names ignoring case.
fn match_names<'a>(
    fields: impl Iterator<Item = &'a str>,
    schema: impl Iterator<Item = &'a str>,
) -> Vec<Option<usize>> {
    let fields: Vec<&str> = fields.collect();
    let schema: Vec<&str> = schema.collect();
    let mut claimed = vec![false; schema.len()];
    let mut matches = vec![None; fields.len()];

    for (field, slot) in fields.iter().zip(matches.iter_mut()) {
        if let Some(index) = (0..schema.len()).find(|&i| !claimed[i] && schema[i] == *field) {
            claimed[index] = true;
            *slot = Some(index);
        }
    }
    for (field, slot) in fields.iter().zip(matches.iter_mut()) {
        if slot.is_some() {
            continue;
        }
        if let Some(index) =
            (0..schema.len()).find(|&i| !claimed[i] && schema[i].eq_ignore_ascii_case(field))
        {
            claimed[index] = true;
            *slot = Some(index);
        }
    }
    matches
}

fn path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn kind_error(path: String, expected: DataKind, actual: DataKind) -> ValidationError {
    let array_mismatch =
        expected.element_kind() == actual.element_kind() && expected.is_array() != actual.is_array();
    let (kind, message) = if array_mismatch {
        (
            ValidationErrorKind::ArrayMismatch,
            format!(
                "Schema declares {} but the model field is {}; array and scalar values are not interchangeable",
                expected, actual
            ),
        )
    } else {
        (
            ValidationErrorKind::TypeMismatch,
            format!(
                "Schema declares {} but the model field is {}",
                expected, actual
            ),
        )
    };
    ValidationError {
        property_name: path,
        message,
        kind,
        expected_type: Some(expected),
        actual_type: Some(actual),
    }
}

fn validate_properties(
    fields: &[&FieldDescription],
    properties: &[PropertyDescriptor],
    prefix: &str,
    stack: &mut Vec<&'static str>,
    result: &mut ValidationResult,
) {
    let names: Vec<String> = fields.iter().map(|f| f.resolved_name()).collect();
    let matches = match_names(
        names.iter().map(String::as_str),
        properties.iter().map(|p| p.name.as_str()),
    );
    let mut matched = vec![false; properties.len()];

    for ((field, name), index) in fields.iter().zip(&names).zip(matches) {
        let field_path = path(prefix, name);
        let Some(index) = index else {
            result.warnings.push(ValidationWarning {
                message: format!(
                    "Field '{}' has no property in the schema and will be ignored",
                    field.ident
                ),
                property_name: field_path,
                kind: ValidationWarningKind::ExtraProperty,
            });
            continue;
        };
        matched[index] = true;
        let property = &properties[index];

        let Some(actual) = field
            .property
            .data_kind
            .or_else(|| kind_of(&field.value_type))
        else {
            result.errors.push(ValidationError {
                message: format!(
                    "Field type {} maps to no data kind",
                    field.value_type
                ),
                property_name: field_path,
                kind: ValidationErrorKind::UnsupportedType,
                expected_type: property.primary_kind(),
                actual_type: None,
            });
            continue;
        };
        let Some(expected) = property.primary_kind() else {
            continue;
        };

        if expected != actual {
            result.errors.push(kind_error(field_path, expected, actual));
            continue;
        }

        if !actual.is_object() || property.nested_properties.is_empty() {
            continue;
        }
        let Some(nested) = field.value_type.nested_type() else {
            continue;
        };
        if stack.contains(&nested.type_name) {
            continue;
        }
        stack.push(nested.type_name);
        let description = (nested.describe)();
        let nested_fields: Vec<&FieldDescription> = description
            .fields
            .iter()
            .filter(|f| f.is_property())
            .collect();
        validate_properties(
            &nested_fields,
            &property.nested_properties,
            &field_path,
            stack,
            result,
        );
        stack.pop();
    }

    for (property, _) in properties
        .iter()
        .zip(matched)
        .filter(|(_, matched)| !matched)
    {
        result.warnings.push(ValidationWarning {
            property_name: path(prefix, &property.name),
            message: format!(
                "Property '{}' is not populated by the model",
                property.name
            ),
            kind: ValidationWarningKind::MissingProperty,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{
        Describe, ReferenceDirective, TypeDescription, VectorDirective,
    };
    use trellis_error::{ErrorCodes, TrellisError};
    use trellis_types::{ReferenceDescriptor, VectorDescriptor};

    struct Address;

    impl Describe for Address {
        fn describe() -> TypeDescription {
            TypeDescription::new("Address")
                .field(FieldDescription::of::<String>("city"))
                .field(FieldDescription::of::<i64>("zip"))
        }
    }

    fn schema() -> CollectionDescriptor {
        CollectionDescriptor {
            properties: vec![
                PropertyDescriptor::new("title", DataKind::Text),
                PropertyDescriptor::new("tags", DataKind::TextArray),
                PropertyDescriptor::new("score", DataKind::Number),
                PropertyDescriptor::new("address", DataKind::Object).with_nested(vec![
                    PropertyDescriptor::new("city", DataKind::Text),
                    PropertyDescriptor::new("zip", DataKind::Text),
                ]),
            ],
            references: vec![ReferenceDescriptor::new("author", "Author")],
            vectors: vec![VectorDescriptor::self_provided("default")],
            ..CollectionDescriptor::new("Article")
        }
    }

    #[test]
    fn test_matching_shape_is_valid() {
        let shape = TypeDescription::new("Article")
            .field(FieldDescription::of::<String>("Title"))
            .field(FieldDescription::of::<Vec<String>>("tags"))
            .field(FieldDescription::of::<f64>("score"))
            .field(
                FieldDescription::of::<uuid::Uuid>("author")
                    .reference(ReferenceDirective::to("Author")),
            )
            .field(
                FieldDescription::of::<Vec<f32>>("default")
                    .vector(VectorDirective::self_provided()),
            );
        let result = validate(&shape, &schema());
        assert!(result.is_valid());
        // Only the address is left unpopulated.
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].property_name, "address");
        assert_eq!(result.warnings[0].kind, ValidationWarningKind::MissingProperty);
    }

    #[test]
    fn test_exact_names_win_over_case_insensitive_matches() {
        let schema = CollectionDescriptor {
            properties: vec![
                PropertyDescriptor::new("title", DataKind::Text),
                PropertyDescriptor::new("Title", DataKind::Int),
            ],
            references: vec![
                ReferenceDescriptor::new("author", "Author"),
                ReferenceDescriptor::new("Author", "Person"),
            ],
            ..CollectionDescriptor::new("Doc")
        };
        let shape = TypeDescription::new("Doc")
            .field(FieldDescription::of::<i64>("title_count").named("Title"))
            .field(FieldDescription::of::<String>("title"))
            .field(
                FieldDescription::of::<uuid::Uuid>("writer")
                    .reference(ReferenceDirective::to("Person").named("Author")),
            )
            .field(
                FieldDescription::of::<uuid::Uuid>("author")
                    .reference(ReferenceDirective::to("Author")),
            );
        let result = validate(&shape, &schema);
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);

        // A field differing only in case still claims a property left unmatched.
        let shape = TypeDescription::new("Doc")
            .field(FieldDescription::of::<String>("title"))
            .field(FieldDescription::of::<i64>("TITLE").named("TITLE"));
        let result = validate(&shape, &schema);
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert_eq!(
            result
                .warnings_of(ValidationWarningKind::MissingProperty)
                .map(|w| w.property_name.as_str())
                .collect::<Vec<_>>(),
            vec!["author", "Author"]
        );
        assert_eq!(result.warnings_of(ValidationWarningKind::ExtraProperty).count(), 0);
    }

    #[test]
    fn test_array_mismatch() {
        let shape = TypeDescription::new("Article").field(FieldDescription::of::<String>("tags"));
        let result = validate(&shape, &schema());
        assert_eq!(result.errors.len(), 1);
        let error = &result.errors[0];
        assert_eq!(error.property_name, "tags");
        assert_eq!(error.kind, ValidationErrorKind::ArrayMismatch);
        assert_eq!(error.expected_type, Some(DataKind::TextArray));
        assert_eq!(error.actual_type, Some(DataKind::Text));
    }

    #[test]
    fn test_no_numeric_widening() {
        let shape = TypeDescription::new("Article").field(FieldDescription::of::<i32>("score"));
        let result = validate(&shape, &schema());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::TypeMismatch);
        assert_eq!(result.errors[0].expected_type, Some(DataKind::Number));
        assert_eq!(result.errors[0].actual_type, Some(DataKind::Int));
    }

    #[test]
    fn test_nested_errors_use_dotted_paths() {
        let shape =
            TypeDescription::new("Article").field(FieldDescription::nested::<Address>("address"));
        let result = validate(&shape, &schema());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].property_name, "address.zip");
        assert_eq!(result.errors[0].kind, ValidationErrorKind::TypeMismatch);
    }

    #[test]
    fn test_unsupported_and_extra_fields() {
        let shape = TypeDescription::new("Article")
            .field(FieldDescription::of::<serde_json::Value>("title"))
            .field(FieldDescription::of::<bool>("draft"))
            .field(
                FieldDescription::of::<Vec<f32>>("summary_vector")
                    .vector(VectorDirective::self_provided()),
            )
            .field(
                FieldDescription::of::<uuid::Uuid>("editor")
                    .reference(ReferenceDirective::to("Person")),
            );
        let result = validate(&shape, &schema());
        assert_eq!(
            result
                .errors_of(ValidationErrorKind::UnsupportedType)
                .map(|e| e.property_name.as_str())
                .collect::<Vec<_>>(),
            vec!["title"]
        );
        assert_eq!(
            result
                .warnings_of(ValidationWarningKind::ExtraProperty)
                .map(|w| w.property_name.as_str())
                .collect::<Vec<_>>(),
            vec!["draft", "editor"]
        );
        assert_eq!(
            result
                .warnings_of(ValidationWarningKind::UnknownVector)
                .map(|w| w.property_name.as_str())
                .collect::<Vec<_>>(),
            vec!["summaryVector"]
        );
        assert_eq!(
            result
                .warnings_of(ValidationWarningKind::MissingProperty)
                .map(|w| w.property_name.as_str())
                .collect::<Vec<_>>(),
            vec!["tags", "score", "address", "author"]
        );
    }

    #[test]
    fn test_explicit_kind_is_honored() {
        let shape = TypeDescription::new("Article")
            .field(FieldDescription::of::<String>("score").kind(DataKind::Number));
        assert!(validate(&shape, &schema()).is_valid());
    }

    #[test]
    fn test_validate_strict_reports_every_error() {
        let shape = TypeDescription::new("Article")
            .field(FieldDescription::of::<String>("tags"))
            .field(FieldDescription::of::<i32>("score"));
        let err = validate_strict(&shape, &schema()).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.collection.as_deref(), Some("Article"));
        assert_eq!(err.code(), ErrorCodes::FailedPrecondition);

        let shape = TypeDescription::new("Article").field(FieldDescription::of::<String>("title"));
        let result = validate_strict(&shape, &schema()).unwrap();
        assert!(!result.warnings.is_empty());
    }
}
