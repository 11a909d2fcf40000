use serde::{Deserialize, Serialize};

// ============================================================================
// VECTORIZERS
// ============================================================================

/// The module that produces vectors for a named vector.
///
/// The variant set is closed: the synthesizer validates each variant's
/// parameters exhaustively, so adding a module means adding a variant here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Vectorizer {
    /// The caller supplies raw vectors on write.
    #[serde(rename = "none")]
    SelfProvided,
    #[serde(rename = "text2vec-openai")]
    Text2VecOpenAi {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        source_properties: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vectorize_collection_name: Option<bool>,
    },
    #[serde(rename = "text2vec-cohere")]
    Text2VecCohere {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        truncate: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        source_properties: Vec<String>,
    },
    #[serde(rename = "text2vec-transformers")]
    Text2VecTransformers {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pooling_strategy: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inference_url: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        source_properties: Vec<String>,
    },
    #[serde(rename = "text2vec-ollama")]
    Text2VecOllama {
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_endpoint: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        source_properties: Vec<String>,
    },
    #[serde(rename = "multi2vec-clip")]
    Multi2VecClip {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inference_url: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        image_fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        text_fields: Vec<String>,
    },
    #[serde(rename = "ref2vec-centroid")]
    Ref2VecCentroid {
        reference_properties: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
    },
}

impl Vectorizer {
    pub fn module_name(&self) -> &'static str {
        match self {
            Vectorizer::SelfProvided => "none",
            Vectorizer::Text2VecOpenAi { .. } => "text2vec-openai",
            Vectorizer::Text2VecCohere { .. } => "text2vec-cohere",
            Vectorizer::Text2VecTransformers { .. } => "text2vec-transformers",
            Vectorizer::Text2VecOllama { .. } => "text2vec-ollama",
            Vectorizer::Multi2VecClip { .. } => "multi2vec-clip",
            Vectorizer::Ref2VecCentroid { .. } => "ref2vec-centroid",
        }
    }

    pub fn is_self_provided(&self) -> bool {
        matches!(self, Vectorizer::SelfProvided)
    }

    /// Every property or reference name the module reads from.
    pub fn source_properties(&self) -> Vec<&str> {
        match self {
            Vectorizer::SelfProvided => Vec::new(),
            Vectorizer::Text2VecOpenAi {
                source_properties, ..
            }
            | Vectorizer::Text2VecCohere {
                source_properties, ..
            }
            | Vectorizer::Text2VecTransformers {
                source_properties, ..
            }
            | Vectorizer::Text2VecOllama {
                source_properties, ..
            } => source_properties.iter().map(String::as_str).collect(),
            Vectorizer::Multi2VecClip {
                image_fields,
                text_fields,
                ..
            } => image_fields
                .iter()
                .chain(text_fields.iter())
                .map(String::as_str)
                .collect(),
            Vectorizer::Ref2VecCentroid {
                reference_properties,
                ..
            } => reference_properties.iter().map(String::as_str).collect(),
        }
    }
}

// ============================================================================
// VECTOR INDEX CONFIGURATION
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distance {
    Cosine,
    Dot,
    L2Squared,
    Hamming,
    Manhattan,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Quantizer {
    /// Product quantization.
    Pq {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        segments: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        centroids: Option<u32>,
    },
    /// Binary quantization.
    Bq {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache: Option<bool>,
    },
    /// Scalar quantization.
    Sq {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        training_limit: Option<u32>,
    },
    /// Rotational quantization.
    Rq {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bits: Option<u8>,
    },
}

/// Configuration for HNSW vector index parameters. `None` leaves the value
/// to the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HnswIndexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ef: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ef_construction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantizer: Option<Quantizer>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatIndexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_cache_max_objects: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantizer: Option<Quantizer>,
}

/// Starts as a flat index and switches to HNSW once `threshold` objects exist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicIndexConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    #[serde(default)]
    pub hnsw: HnswIndexConfig,
    #[serde(default)]
    pub flat: FlatIndexConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorIndexConfig {
    Hnsw(HnswIndexConfig),
    Flat(FlatIndexConfig),
    Dynamic(DynamicIndexConfig),
}

impl VectorIndexConfig {
    pub fn kind(&self) -> VectorIndexKind {
        match self {
            VectorIndexConfig::Hnsw(_) => VectorIndexKind::Hnsw,
            VectorIndexConfig::Flat(_) => VectorIndexKind::Flat,
            VectorIndexConfig::Dynamic(_) => VectorIndexKind::Dynamic,
        }
    }

    pub fn distance(&self) -> Option<Distance> {
        match self {
            VectorIndexConfig::Hnsw(hnsw) => hnsw.distance,
            VectorIndexConfig::Flat(flat) => flat.distance,
            VectorIndexConfig::Dynamic(dynamic) => dynamic.distance,
        }
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        match &mut self {
            VectorIndexConfig::Hnsw(hnsw) => hnsw.distance = Some(distance),
            VectorIndexConfig::Flat(flat) => flat.distance = Some(distance),
            VectorIndexConfig::Dynamic(dynamic) => dynamic.distance = Some(distance),
        }
        self
    }

    /// Sets the quantizer. A dynamic index applies it to both stages.
    pub fn with_quantizer(mut self, quantizer: Quantizer) -> Self {
        match &mut self {
            VectorIndexConfig::Hnsw(hnsw) => hnsw.quantizer = Some(quantizer),
            VectorIndexConfig::Flat(flat) => flat.quantizer = Some(quantizer),
            VectorIndexConfig::Dynamic(dynamic) => {
                dynamic.hnsw.quantizer = Some(quantizer.clone());
                dynamic.flat.quantizer = Some(quantizer);
            }
        }
        self
    }
}

impl From<HnswIndexConfig> for VectorIndexConfig {
    fn from(config: HnswIndexConfig) -> Self {
        VectorIndexConfig::Hnsw(config)
    }
}

impl From<FlatIndexConfig> for VectorIndexConfig {
    fn from(config: FlatIndexConfig) -> Self {
        VectorIndexConfig::Flat(config)
    }
}

impl From<DynamicIndexConfig> for VectorIndexConfig {
    fn from(config: DynamicIndexConfig) -> Self {
        VectorIndexConfig::Dynamic(config)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorIndexKind {
    #[default]
    #[serde(alias = "HNSW")]
    Hnsw,
    #[serde(alias = "FLAT")]
    Flat,
    #[serde(alias = "DYNAMIC")]
    Dynamic,
}

impl VectorIndexKind {
    /// An index of this family with only the distance metric set.
    pub fn default_config(self, distance: Distance) -> VectorIndexConfig {
        let config: VectorIndexConfig = match self {
            VectorIndexKind::Hnsw => HnswIndexConfig::default().into(),
            VectorIndexKind::Flat => FlatIndexConfig::default().into(),
            VectorIndexKind::Dynamic => DynamicIndexConfig::default().into(),
        };
        config.with_distance(distance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorDescriptor {
    pub name: String,
    pub vectorizer: Vectorizer,
    pub vector_index_config: VectorIndexConfig,
}

impl VectorDescriptor {
    pub fn new(
        name: impl Into<String>,
        vectorizer: Vectorizer,
        vector_index_config: VectorIndexConfig,
    ) -> Self {
        Self {
            name: name.into(),
            vectorizer,
            vector_index_config,
        }
    }

    pub fn self_provided(name: impl Into<String>) -> Self {
        Self::new(
            name,
            Vectorizer::SelfProvided,
            VectorIndexKind::Hnsw.default_config(Distance::Cosine),
        )
    }
}
