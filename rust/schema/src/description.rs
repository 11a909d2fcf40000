//! Declarative, per-type descriptions of how an application type maps to a
//! collection.
//!
//! Application types implement [`Describe`] once, listing their fields in
//! declaration order together with any directives. The synthesizer and the
//! validator both walk the resulting [`TypeDescription`]; nothing inspects the
//! type itself at runtime.

use crate::hooks::{Hook, HookRef, HookTable};
use crate::naming::{to_camel_case, to_collection_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use trellis_types::{
    DataKind, DeletionStrategy, Distance, InvertedIndexConfig, Quantizer, Tokenization,
    VectorIndexConfig,
};
use validator::{Validate, ValidationError};

/// Integer collection settings use this value for "let the server decide".
pub const SERVER_DEFAULT: i64 = -1;

/// Integer collection settings are [`SERVER_DEFAULT`] or fit in a `u32`.
fn validate_server_setting(value: i64) -> Result<(), ValidationError> {
    if value == SERVER_DEFAULT || u32::try_from(value).is_ok() {
        return Ok(());
    }
    Err(ValidationError::new("server_setting").with_message(
        format!(
            "Expected {} for the server default or a value in 0..={}. Got: {}",
            SERVER_DEFAULT,
            u32::MAX,
            value
        )
        .into(),
    ))
}

// ============================================================================
// VALUE TYPES
// ============================================================================

/// A latitude/longitude pair stored as a `geoCoordinates` property.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f32,
    pub longitude: f32,
}

/// A phone number stored as a `phoneNumber` property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_country: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    DateTime,
    Uuid,
    GeoCoordinate,
    PhoneNumber,
}

impl ScalarType {
    pub fn rust_name(&self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Char => "char",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::I128 => "i128",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::U128 => "u128",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Bool => "bool",
            ScalarType::DateTime => "DateTime",
            ScalarType::Uuid => "Uuid",
            ScalarType::GeoCoordinate => "GeoCoordinate",
            ScalarType::PhoneNumber => "PhoneNumber",
        }
    }
}

/// A type that can describe itself as a collection.
pub trait Describe {
    fn describe() -> TypeDescription;
}

/// A nested type referenced by a field. The description is produced lazily
/// so types that contain themselves can be described.
#[derive(Clone, Copy)]
pub struct NestedType {
    pub type_name: &'static str,
    pub describe: fn() -> TypeDescription,
}

impl NestedType {
    pub fn of<T: Describe>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            describe: T::describe,
        }
    }

    /// The unqualified type name, without module path or generics.
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for NestedType {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl fmt::Debug for NestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedType").field(&self.type_name).finish()
    }
}

/// The Rust value type of a field, as far as the schema cares.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType {
    Scalar(ScalarType),
    Optional(Box<ValueType>),
    List(Box<ValueType>),
    Nested(NestedType),
    /// A type with no schema mapping. Carries the name for error messages.
    Opaque(&'static str),
}

impl ValueType {
    /// The nested type held by this value, looking through options and lists.
    pub fn nested_type(&self) -> Option<NestedType> {
        match self {
            ValueType::Nested(nested) => Some(*nested),
            ValueType::Optional(inner) | ValueType::List(inner) => inner.nested_type(),
            ValueType::Scalar(_) | ValueType::Opaque(_) => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(scalar) => f.write_str(scalar.rust_name()),
            ValueType::Optional(inner) => write!(f, "Option<{}>", inner),
            ValueType::List(inner) => write!(f, "Vec<{}>", inner),
            ValueType::Nested(nested) => f.write_str(nested.short_name()),
            ValueType::Opaque(name) => f.write_str(name),
        }
    }
}

/// Maps a Rust type to its [`ValueType`].
pub trait HasValueType {
    fn value_type() -> ValueType;
}

macro_rules! impl_scalar_value_type {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl HasValueType for $ty {
                fn value_type() -> ValueType {
                    ValueType::Scalar(ScalarType::$scalar)
                }
            }
        )*
    };
}

impl_scalar_value_type!(
    String => String,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    chrono::NaiveDate => DateTime,
    chrono::NaiveDateTime => DateTime,
    uuid::Uuid => Uuid,
    GeoCoordinate => GeoCoordinate,
    PhoneNumber => PhoneNumber,
);

impl<Tz: chrono::TimeZone> HasValueType for chrono::DateTime<Tz> {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarType::DateTime)
    }
}

impl<T: HasValueType> HasValueType for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Optional(Box::new(T::value_type()))
    }
}

impl<T: HasValueType> HasValueType for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }
}

impl<K, V> HasValueType for HashMap<K, V> {
    fn value_type() -> ValueType {
        ValueType::Opaque("HashMap")
    }
}

impl<K, V> HasValueType for BTreeMap<K, V> {
    fn value_type() -> ValueType {
        ValueType::Opaque("BTreeMap")
    }
}

impl HasValueType for serde_json::Value {
    fn value_type() -> ValueType {
        ValueType::Opaque("serde_json::Value")
    }
}

// ============================================================================
// DIRECTIVES
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyDirective {
    /// Overrides the camelCase form of the field identifier.
    pub name: Option<String>,
    /// Overrides the kind inferred from the value type.
    pub data_kind: Option<DataKind>,
    pub description: Option<String>,
    pub index_filterable: Option<bool>,
    pub index_searchable: Option<bool>,
    pub index_range_filters: Option<bool>,
    pub tokenization: Option<Tokenization>,
}

/// Vectorizer modules a vector directive can select. Parameters live on the
/// directive itself and are checked per module during synthesis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VectorizerKind {
    #[default]
    SelfProvided,
    Text2VecOpenAi,
    Text2VecCohere,
    Text2VecTransformers,
    Text2VecOllama,
    Multi2VecClip,
    Ref2VecCentroid,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorDirective {
    pub name: Option<String>,
    pub vectorizer: VectorizerKind,
    pub model: Option<String>,
    /// Properties the module reads. For `Ref2VecCentroid` these are
    /// reference names, for `Multi2VecClip` the text fields.
    pub source_properties: Vec<String>,
    /// Image fields read by `Multi2VecClip`.
    pub image_fields: Vec<String>,
    pub dimensions: Option<u32>,
    pub base_url: Option<String>,
    pub index: Option<VectorIndexConfig>,
    pub distance: Option<Distance>,
    pub quantizer: Option<Quantizer>,
    pub hook: Option<HookRef>,
}

impl VectorDirective {
    pub fn new(vectorizer: VectorizerKind) -> Self {
        Self {
            vectorizer,
            ..Default::default()
        }
    }

    pub fn self_provided() -> Self {
        Self::new(VectorizerKind::SelfProvided)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn source_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn index(mut self, index: impl Into<VectorIndexConfig>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn distance(mut self, distance: Distance) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn quantizer(mut self, quantizer: Quantizer) -> Self {
        self.quantizer = Some(quantizer);
        self
    }

    pub fn hook(mut self, hook: HookRef) -> Self {
        self.hook = Some(hook);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceDirective {
    pub target_collection: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ReferenceDirective {
    pub fn to(target_collection: impl Into<String>) -> Self {
        Self {
            target_collection: target_collection.into(),
            name: None,
            description: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct ShardingDirective {
    #[validate(custom(function = "validate_server_setting"))]
    pub desired_count: i64,
    #[validate(custom(function = "validate_server_setting"))]
    pub virtual_per_physical: i64,
    pub key: Option<String>,
}

impl Default for ShardingDirective {
    fn default() -> Self {
        Self {
            desired_count: SERVER_DEFAULT,
            virtual_per_physical: SERVER_DEFAULT,
            key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Validate)]
pub struct CollectionDirective {
    /// Defaults to the type name with an uppercase initial.
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(nested)]
    pub sharding: ShardingDirective,
    #[validate(custom(function = "validate_server_setting"))]
    pub replication_factor: i64,
    pub async_replication: Option<bool>,
    pub deletion_strategy: Option<DeletionStrategy>,
    pub multi_tenancy: bool,
    pub auto_tenant_creation: Option<bool>,
    pub auto_tenant_activation: Option<bool>,
    pub inverted_index: Option<InvertedIndexConfig>,
    pub hook: Option<HookRef>,
}

impl Default for CollectionDirective {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            sharding: ShardingDirective::default(),
            replication_factor: SERVER_DEFAULT,
            async_replication: None,
            deletion_strategy: None,
            multi_tenancy: false,
            auto_tenant_creation: None,
            auto_tenant_activation: None,
            inverted_index: None,
            hook: None,
        }
    }
}

// ============================================================================
// FIELD AND TYPE DESCRIPTIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescription {
    /// The field identifier as written in the Rust type.
    pub ident: String,
    pub value_type: ValueType,
    pub property: PropertyDirective,
    pub vector: Option<VectorDirective>,
    pub reference: Option<ReferenceDirective>,
}

impl FieldDescription {
    pub fn new(ident: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            ident: ident.into(),
            value_type,
            property: PropertyDirective::default(),
            vector: None,
            reference: None,
        }
    }

    pub fn of<T: HasValueType>(ident: impl Into<String>) -> Self {
        Self::new(ident, T::value_type())
    }

    pub fn nested<T: Describe>(ident: impl Into<String>) -> Self {
        Self::new(ident, ValueType::Nested(NestedType::of::<T>()))
    }

    pub fn nested_list<T: Describe>(ident: impl Into<String>) -> Self {
        Self::new(
            ident,
            ValueType::List(Box::new(ValueType::Nested(NestedType::of::<T>()))),
        )
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.property.name = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: DataKind) -> Self {
        self.property.data_kind = Some(kind);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.property.description = Some(description.into());
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.property.index_filterable = Some(filterable);
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.property.index_searchable = Some(searchable);
        self
    }

    pub fn range_filters(mut self, range_filters: bool) -> Self {
        self.property.index_range_filters = Some(range_filters);
        self
    }

    pub fn tokenization(mut self, tokenization: Tokenization) -> Self {
        self.property.tokenization = Some(tokenization);
        self
    }

    pub fn vector(mut self, directive: VectorDirective) -> Self {
        self.vector = Some(directive);
        self
    }

    pub fn reference(mut self, directive: ReferenceDirective) -> Self {
        self.reference = Some(directive);
        self
    }

    /// Whether the field becomes a property. Vector and reference fields do not.
    pub fn is_property(&self) -> bool {
        self.vector.is_none() && self.reference.is_none()
    }

    /// The property name: the override, else the camelCase identifier.
    pub fn resolved_name(&self) -> String {
        match &self.property.name {
            Some(name) => name.clone(),
            None => to_camel_case(&self.ident),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeDescription {
    pub type_name: String,
    pub collection: CollectionDirective,
    pub fields: Vec<FieldDescription>,
    pub hooks: HookTable,
}

/// The validator reads the same description the synthesizer builds from.
pub type ModelShape = TypeDescription;

impl TypeDescription {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            collection: CollectionDirective::default(),
            fields: Vec::new(),
            hooks: HookTable::default(),
        }
    }

    pub fn with_collection(mut self, collection: CollectionDirective) -> Self {
        self.collection = collection;
        self
    }

    pub fn field(mut self, field: FieldDescription) -> Self {
        self.fields.push(field);
        self
    }

    pub fn hook(mut self, name: impl Into<String>, hook: Hook) -> Self {
        self.hooks.insert(name, hook);
        self
    }

    pub fn collection_name(&self) -> String {
        match &self.collection.name {
            Some(name) => name.clone(),
            None => to_collection_name(&self.type_name),
        }
    }
}
