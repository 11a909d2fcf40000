use crate::config::SynthesizerConfig;
use crate::description::{
    CollectionDirective, Describe, FieldDescription, TypeDescription, VectorDirective,
    VectorizerKind, SERVER_DEFAULT,
};
use crate::errors::ConfigurationError;
use crate::hooks::{HookRegistry, HookScope};
use crate::kind_table::kind_of;
use crate::naming::to_camel_case;
use itertools::Itertools;
use trellis_error::TrellisValidationError;
use trellis_types::{
    CollectionDescriptor, MultiTenancyConfig, NameScope, PropertyDescriptor, ReferenceDescriptor,
    ReplicationConfig, ShardingConfig, VectorDescriptor, Vectorizer,
};
use validator::Validate;

/// Builds canonical collection descriptors from type descriptions.
///
/// Synthesis either returns a complete descriptor or the first
/// [`ConfigurationError`] it meets. Hooks named with an external owner are
/// looked up in the synthesizer's [`HookRegistry`].
#[derive(Clone, Debug, Default)]
pub struct SchemaSynthesizer {
    config: SynthesizerConfig,
    hooks: HookRegistry,
}

/// Synthesizes with the default configuration and no external hooks.
pub fn synthesize(description: &TypeDescription) -> Result<CollectionDescriptor, ConfigurationError> {
    SchemaSynthesizer::default().synthesize(description)
}

impl SchemaSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self {
            config,
            hooks: HookRegistry::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn synthesize_type<T: Describe>(&self) -> Result<CollectionDescriptor, ConfigurationError> {
        self.synthesize(&T::describe())
    }

    pub fn synthesize(
        &self,
        description: &TypeDescription,
    ) -> Result<CollectionDescriptor, ConfigurationError> {
        let directive = &description.collection;
        directive.validate().map_err(TrellisValidationError::from)?;

        let scope = HookScope {
            declaring_type: &description.type_name,
            local: &description.hooks,
            registry: &self.hooks,
        };

        let mut collection = CollectionDescriptor::new(description.collection_name());
        collection.description = directive.description.clone();

        let mut vector_fields = Vec::new();
        for field in &description.fields {
            match (&field.vector, &field.reference) {
                (Some(_), Some(_)) => {
                    return Err(ConfigurationError::ConflictingDirectives {
                        field: field.ident.clone(),
                    })
                }
                (Some(vector), None) => vector_fields.push((field, vector)),
                (None, Some(reference)) => {
                    collection.references.push(ReferenceDescriptor {
                        name: reference
                            .name
                            .clone()
                            .unwrap_or_else(|| to_camel_case(&field.ident)),
                        target_collection: reference.target_collection.clone(),
                        description: reference.description.clone(),
                    });
                }
                (None, None) => {
                    let mut stack = Vec::new();
                    let property = self.property(&description.type_name, field, &mut stack)?;
                    collection.properties.push(property);
                }
            }
        }
        check_unique(&collection)?;

        // Vectors come last so their source properties can name any field.
        for (field, directive) in vector_fields {
            let vector = self.vector(field, directive, &collection, &scope)?;
            collection.vectors.push(vector);
        }
        check_unique(&collection)?;

        apply_collection_settings(&mut collection, directive)?;

        if let Some(hook) = &directive.hook {
            let hook = scope.collection_hook(hook)?;
            collection = hook(collection);
            check_unique(&collection)?;
        }

        tracing::debug!(
            collection = %collection.name,
            properties = collection.properties.len(),
            references = collection.references.len(),
            vectors = collection.vectors.len(),
            "Synthesized collection schema"
        );
        Ok(collection)
    }

    fn property(
        &self,
        type_name: &str,
        field: &FieldDescription,
        stack: &mut Vec<&'static str>,
    ) -> Result<PropertyDescriptor, ConfigurationError> {
        let name = field.resolved_name();
        let kind = field
            .property
            .data_kind
            .or_else(|| kind_of(&field.value_type))
            .ok_or_else(|| ConfigurationError::UnsupportedType {
                type_name: type_name.to_string(),
                field: field.ident.clone(),
                value_type: field.value_type.to_string(),
            })?;

        if field.property.tokenization.is_some() && !kind.is_text() {
            return Err(ConfigurationError::InvalidTokenization { field: name, kind });
        }

        let mut nested_properties = Vec::new();
        if kind.is_object() {
            let nested = field
                .value_type
                .nested_type()
                .ok_or_else(|| ConfigurationError::MissingNestedType {
                    field: name.clone(),
                    kind,
                })?;
            if stack.contains(&nested.type_name) {
                tracing::debug!(
                    field = %name,
                    nested_type = nested.short_name(),
                    "Nested type already being synthesized, emitting object without nested properties"
                );
            } else if stack.len() >= self.config.max_nesting_depth {
                return Err(ConfigurationError::NestingTooDeep {
                    field: name,
                    max_depth: self.config.max_nesting_depth,
                });
            } else {
                stack.push(nested.type_name);
                let description = (nested.describe)();
                for nested_field in description.fields.iter().filter(|f| f.is_property()) {
                    nested_properties.push(self.property(
                        &description.type_name,
                        nested_field,
                        stack,
                    )?);
                }
                stack.pop();

                if let Some(duplicate) = nested_properties
                    .iter()
                    .map(|p| p.name.as_str())
                    .duplicates()
                    .next()
                {
                    return Err(ConfigurationError::DuplicateName {
                        scope: NameScope::Property,
                        name: format!("{}.{}", name, duplicate),
                    });
                }
            }
        }

        Ok(PropertyDescriptor {
            name,
            data_type: vec![kind],
            description: field.property.description.clone(),
            index_filterable: field.property.index_filterable,
            index_searchable: field.property.index_searchable,
            index_range_filters: field.property.index_range_filters,
            tokenization: field.property.tokenization,
            nested_properties,
        })
    }

    fn vector(
        &self,
        field: &FieldDescription,
        directive: &VectorDirective,
        collection: &CollectionDescriptor,
        scope: &HookScope<'_>,
    ) -> Result<VectorDescriptor, ConfigurationError> {
        let name = directive
            .name
            .clone()
            .unwrap_or_else(|| to_camel_case(&field.ident));
        let vectorizer = vectorizer(&name, directive)?;

        let (expected, known): (&'static str, Vec<&str>) = match vectorizer {
            Vectorizer::Ref2VecCentroid { .. } => (
                "reference",
                collection.references.iter().map(|r| r.name.as_str()).collect(),
            ),
            _ => (
                "property",
                collection.properties.iter().map(|p| p.name.as_str()).collect(),
            ),
        };
        if let Some(unknown) = vectorizer
            .source_properties()
            .into_iter()
            .find(|source| !known.contains(source))
        {
            return Err(ConfigurationError::UnknownSourceProperty {
                vector: name,
                property: unknown.to_string(),
                expected,
            });
        }

        let mut index = match &directive.index {
            Some(index) => index.clone(),
            None => self
                .config
                .default_vector_index
                .default_config(self.config.default_distance),
        };
        if let Some(distance) = directive.distance {
            index = index.with_distance(distance);
        }
        if let Some(quantizer) = &directive.quantizer {
            index = index.with_quantizer(quantizer.clone());
        }

        let mut vector = VectorDescriptor::new(name, vectorizer, index);
        if let Some(hook) = &directive.hook {
            let hook = scope.vector_hook(hook)?;
            let name = vector.name.clone();
            vector = hook(&name, vector);
        }
        Ok(vector)
    }
}

fn vectorizer(name: &str, directive: &VectorDirective) -> Result<Vectorizer, ConfigurationError> {
    let vectorizer = match directive.vectorizer {
        VectorizerKind::SelfProvided => {
            let parameter = if directive.model.is_some() {
                Some("a model")
            } else if directive.dimensions.is_some() {
                Some("dimensions")
            } else if directive.base_url.is_some() {
                Some("a base url")
            } else if !directive.source_properties.is_empty() {
                Some("source properties")
            } else if !directive.image_fields.is_empty() {
                Some("image fields")
            } else {
                None
            };
            if let Some(parameter) = parameter {
                return Err(ConfigurationError::SelfProvidedWithParameters {
                    vector: name.to_string(),
                    parameter,
                });
            }
            Vectorizer::SelfProvided
        }
        VectorizerKind::Text2VecOpenAi => Vectorizer::Text2VecOpenAi {
            model: directive.model.clone(),
            dimensions: directive.dimensions,
            base_url: directive.base_url.clone(),
            source_properties: directive.source_properties.clone(),
            vectorize_collection_name: None,
        },
        VectorizerKind::Text2VecCohere => Vectorizer::Text2VecCohere {
            model: directive.model.clone(),
            truncate: None,
            source_properties: directive.source_properties.clone(),
        },
        VectorizerKind::Text2VecTransformers => Vectorizer::Text2VecTransformers {
            pooling_strategy: None,
            inference_url: directive.base_url.clone(),
            source_properties: directive.source_properties.clone(),
        },
        VectorizerKind::Text2VecOllama => Vectorizer::Text2VecOllama {
            model: directive.model.clone().ok_or_else(|| {
                ConfigurationError::MissingVectorizerParameter {
                    vector: name.to_string(),
                    module: "text2vec-ollama",
                    parameter: "a model",
                }
            })?,
            api_endpoint: directive.base_url.clone(),
            source_properties: directive.source_properties.clone(),
        },
        VectorizerKind::Multi2VecClip => Vectorizer::Multi2VecClip {
            inference_url: directive.base_url.clone(),
            image_fields: directive.image_fields.clone(),
            text_fields: directive.source_properties.clone(),
        },
        VectorizerKind::Ref2VecCentroid => {
            if directive.source_properties.is_empty() {
                return Err(ConfigurationError::MissingVectorizerParameter {
                    vector: name.to_string(),
                    module: "ref2vec-centroid",
                    parameter: "reference properties",
                });
            }
            Vectorizer::Ref2VecCentroid {
                reference_properties: directive.source_properties.clone(),
                method: None,
            }
        }
    };
    Ok(vectorizer)
}

fn check_unique(collection: &CollectionDescriptor) -> Result<(), ConfigurationError> {
    match collection.duplicate_names().into_iter().next() {
        Some(duplicate) => Err(ConfigurationError::DuplicateName {
            scope: duplicate.scope,
            name: duplicate.name,
        }),
        None => Ok(()),
    }
}

/// `-1` means "server default" and is omitted; anything else must fit in a `u32`.
fn server_default_or(setting: &'static str, value: i64) -> Result<Option<u32>, ConfigurationError> {
    if value == SERVER_DEFAULT {
        return Ok(None);
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| ConfigurationError::SettingOutOfRange { setting, value })
}

fn apply_collection_settings(
    collection: &mut CollectionDescriptor,
    directive: &CollectionDirective,
) -> Result<(), ConfigurationError> {
    collection.replication_config = ReplicationConfig {
        factor: server_default_or("replication_factor", directive.replication_factor)?,
        async_enabled: directive.async_replication,
        deletion_strategy: directive.deletion_strategy,
    };

    let sharding = ShardingConfig {
        desired_count: server_default_or("desired_count", directive.sharding.desired_count)?,
        virtual_per_physical: server_default_or(
            "virtual_per_physical",
            directive.sharding.virtual_per_physical,
        )?,
        key: directive.sharding.key.clone(),
    };
    collection.sharding_config = (!sharding.is_empty()).then_some(sharding);

    collection.multi_tenancy_config = MultiTenancyConfig {
        enabled: directive.multi_tenancy,
        auto_tenant_creation: directive.auto_tenant_creation,
        auto_tenant_activation: directive.auto_tenant_activation,
    };
    collection.inverted_index_config = directive.inverted_index.clone();
    Ok(())
}
