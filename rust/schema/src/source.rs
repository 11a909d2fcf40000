use crate::differ::MigrationPlan;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use trellis_error::{ErrorCodes, TrellisError};
use trellis_types::CollectionDescriptor;

/// Fetches the schema a collection currently has on the server.
///
/// `Ok(None)` means the collection does not exist yet. Transport, caching and
/// mapping from the server's wire format live behind implementations of this
/// trait.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch_current_schema(
        &self,
        collection: &str,
    ) -> Result<Option<CollectionDescriptor>, Box<dyn TrellisError>>;
}

/// Schemas held in memory, for offline planning and tests.
#[derive(Debug, Default)]
pub struct InMemorySchemaSource {
    schemas: RwLock<HashMap<String, CollectionDescriptor>>,
}

impl InMemorySchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `schema` under its own name, returning any schema it replaces.
    pub fn insert(&self, schema: CollectionDescriptor) -> Option<CollectionDescriptor> {
        self.schemas.write().insert(schema.name.clone(), schema)
    }

    pub fn remove(&self, collection: &str) -> Option<CollectionDescriptor> {
        self.schemas.write().remove(collection)
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

#[async_trait]
impl SchemaSource for InMemorySchemaSource {
    async fn fetch_current_schema(
        &self,
        collection: &str,
    ) -> Result<Option<CollectionDescriptor>, Box<dyn TrellisError>> {
        Ok(self.schemas.read().get(collection).cloned())
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to fetch current schema of '{collection}': {source}")]
    Fetch {
        collection: String,
        source: Box<dyn TrellisError>,
    },
}

impl TrellisError for PlanError {
    fn code(&self) -> ErrorCodes {
        match self {
            PlanError::Fetch { source, .. } => source.code(),
        }
    }

    fn should_trace_error(&self) -> bool {
        match self {
            PlanError::Fetch { source, .. } => source.should_trace_error(),
        }
    }
}

/// Fetches the current schema of `target`'s collection and plans the changes
/// that bring it to `target`.
pub async fn plan_migration(
    source: &dyn SchemaSource,
    target: &CollectionDescriptor,
) -> Result<MigrationPlan, PlanError> {
    let current = source
        .fetch_current_schema(&target.name)
        .await
        .map_err(|source| PlanError::Fetch {
            collection: target.name.clone(),
            source,
        })?;
    let plan = MigrationPlan::between(current.as_ref(), target);
    if !plan.is_safe() {
        tracing::info!(
            collection = %plan.collection,
            breaking = plan.breaking_changes().count(),
            "Migration plan contains breaking changes"
        );
    }
    Ok(plan)
}
