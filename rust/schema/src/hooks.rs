//! Customization hooks applied after declarative construction.
//!
//! A hook is registered under a name, either on the declaring type's
//! [`HookTable`] or on an external owner in a [`HookRegistry`]. Directives
//! name the hook with a [`HookRef`]; the synthesizer resolves each reference
//! once and checks that the registered hook has the shape the directive
//! needs.

use crate::errors::ConfigurationError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use trellis_types::{CollectionDescriptor, VectorDescriptor};

pub type CollectionHookFn = dyn Fn(CollectionDescriptor) -> CollectionDescriptor + Send + Sync;
pub type VectorHookFn = dyn Fn(&str, VectorDescriptor) -> VectorDescriptor + Send + Sync;

#[derive(Clone)]
pub enum Hook {
    /// Receives the fully built descriptor and returns the final one.
    Collection(Arc<CollectionHookFn>),
    /// Receives a vector name and its prebuilt descriptor.
    Vector(Arc<VectorHookFn>),
}

impl Hook {
    pub fn collection<F>(f: F) -> Self
    where
        F: Fn(CollectionDescriptor) -> CollectionDescriptor + Send + Sync + 'static,
    {
        Hook::Collection(Arc::new(f))
    }

    pub fn vector<F>(f: F) -> Self
    where
        F: Fn(&str, VectorDescriptor) -> VectorDescriptor + Send + Sync + 'static,
    {
        Hook::Vector(Arc::new(f))
    }

    pub fn signature(&self) -> HookSignature {
        match self {
            Hook::Collection(_) => HookSignature::Collection,
            Hook::Vector(_) => HookSignature::Vector,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({})", self.signature())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookSignature {
    Collection,
    Vector,
}

impl fmt::Display for HookSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookSignature::Collection => {
                f.write_str("fn(CollectionDescriptor) -> CollectionDescriptor")
            }
            HookSignature::Vector => f.write_str("fn(&str, VectorDescriptor) -> VectorDescriptor"),
        }
    }
}

/// Hooks registered on one type, by exact name.
#[derive(Clone, Default)]
pub struct HookTable {
    hooks: BTreeMap<String, Hook>,
}

impl HookTable {
    pub fn insert(&mut self, name: impl Into<String>, hook: Hook) {
        self.hooks.insert(name.into(), hook);
    }

    pub fn with(mut self, name: impl Into<String>, hook: Hook) -> Self {
        self.insert(name, hook);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.hooks.iter()).finish()
    }
}

/// Hook tables of external owner types, keyed by owner name.
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    owners: HashMap<String, HookTable>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, owner: impl Into<String>, name: impl Into<String>, hook: Hook) {
        self.owners.entry(owner.into()).or_default().insert(name, hook);
    }

    pub fn register_table(&mut self, owner: impl Into<String>, table: HookTable) {
        self.owners.insert(owner.into(), table);
    }

    pub fn owner(&self, owner: &str) -> Option<&HookTable> {
        self.owners.get(owner)
    }
}

/// Names a hook, optionally on an external owner type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookRef {
    pub method: String,
    pub owner: Option<String>,
}

impl HookRef {
    /// A hook registered on the declaring type.
    pub fn local(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            owner: None,
        }
    }

    /// A hook registered on `owner` in the synthesizer's registry.
    pub fn on(owner: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            owner: Some(owner.into()),
        }
    }
}

/// Where hook references of one type description are resolved.
pub(crate) struct HookScope<'a> {
    pub(crate) declaring_type: &'a str,
    pub(crate) local: &'a HookTable,
    pub(crate) registry: &'a HookRegistry,
}

impl HookScope<'_> {
    fn lookup(&self, hook: &HookRef) -> Result<&Hook, ConfigurationError> {
        let (owner, table) = match &hook.owner {
            Some(owner) => (owner.as_str(), self.registry.owner(owner)),
            None => (self.declaring_type, Some(self.local)),
        };
        table
            .and_then(|table| table.get(&hook.method))
            .ok_or_else(|| ConfigurationError::MethodNotFound {
                owner: owner.to_string(),
                method: hook.method.clone(),
            })
    }

    fn owner_name<'b>(&'b self, hook: &'b HookRef) -> &'b str {
        hook.owner.as_deref().unwrap_or(self.declaring_type)
    }

    pub(crate) fn collection_hook(
        &self,
        hook: &HookRef,
    ) -> Result<Arc<CollectionHookFn>, ConfigurationError> {
        match self.lookup(hook)? {
            Hook::Collection(f) => Ok(f.clone()),
            other => Err(ConfigurationError::InvalidSignature {
                owner: self.owner_name(hook).to_string(),
                method: hook.method.clone(),
                expected: HookSignature::Collection,
                found: other.signature(),
            }),
        }
    }

    pub(crate) fn vector_hook(
        &self,
        hook: &HookRef,
    ) -> Result<Arc<VectorHookFn>, ConfigurationError> {
        match self.lookup(hook)? {
            Hook::Vector(f) => Ok(f.clone()),
            other => Err(ConfigurationError::InvalidSignature {
                owner: self.owner_name(hook).to_string(),
                method: hook.method.clone(),
                expected: HookSignature::Vector,
                found: other.signature(),
            }),
        }
    }
}
