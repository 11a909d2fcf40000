use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_error::{ErrorCodes, TrellisError};
use trellis_types::{Distance, VectorIndexKind};

const DEFAULT_CONFIG_PATH: &str = "./trellis_schema.yaml";

fn default_distance() -> Distance {
    Distance::Cosine
}

fn default_max_nesting_depth() -> usize {
    16
}

/// Defaults applied by the synthesizer where a directive leaves a choice open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    /// Index family for vectors whose directive sets no index.
    #[serde(default)]
    pub default_vector_index: VectorIndexKind,
    /// Distance metric for vectors whose directive sets none.
    #[serde(default = "default_distance")]
    pub default_distance: Distance,
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            default_vector_index: VectorIndexKind::default(),
            default_distance: default_distance(),
            max_nesting_depth: default_max_nesting_depth(),
        }
    }
}

#[derive(Debug, Error)]
#[error("Error loading synthesizer config: {0}")]
pub struct ConfigLoadError(#[from] Box<figment::Error>);

impl TrellisError for ConfigLoadError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }
}

impl SynthesizerConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Reads `path` if it exists and overlays `TRELLIS_SCHEMA_` environment
    /// variables. A double underscore in a variable name separates nested keys.
    pub fn load_from_path(path: &str) -> Result<Self, ConfigLoadError> {
        let mut f = figment::Figment::from(
            Env::prefixed("TRELLIS_SCHEMA_").map(|k| k.as_str().replace("__", ".").into()),
        );
        if std::path::Path::new(path).exists() {
            f = figment::Figment::from(Yaml::file(path)).merge(f);
        }
        f.extract().map_err(|e| ConfigLoadError(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_| {
            let config = SynthesizerConfig::load().unwrap();
            assert_eq!(config, SynthesizerConfig::default());
            assert_eq!(config.default_vector_index, VectorIndexKind::Hnsw);
            assert_eq!(config.default_distance, Distance::Cosine);
            assert_eq!(config.max_nesting_depth, 16);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_file() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file(
                "trellis_schema.yaml",
                r#"
                default_vector_index: flat
                default_distance: l2-squared
                max_nesting_depth: 4
                "#,
            );
            let config = SynthesizerConfig::load().unwrap();
            assert_eq!(config.default_vector_index, VectorIndexKind::Flat);
            assert_eq!(config.default_distance, Distance::L2Squared);
            assert_eq!(config.max_nesting_depth, 4);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            let _ = jail.create_file(
                "random_path.yaml",
                r#"
                default_vector_index: dynamic
                max_nesting_depth: 4
                "#,
            );
            jail.set_env("TRELLIS_SCHEMA_MAX_NESTING_DEPTH", 8);
            jail.set_env("TRELLIS_SCHEMA_DEFAULT_DISTANCE", "dot");
            let config = SynthesizerConfig::load_from_path("random_path.yaml").unwrap();
            assert_eq!(config.default_vector_index, VectorIndexKind::Dynamic);
            assert_eq!(config.default_distance, Distance::Dot);
            assert_eq!(config.max_nesting_depth, 8);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("TRELLIS_SCHEMA_DEFAULT_DISTANCE", "euclid");
            let err = SynthesizerConfig::load().unwrap_err();
            assert_eq!(err.code(), ErrorCodes::InvalidArgument);
            Ok(())
        });
    }
}
