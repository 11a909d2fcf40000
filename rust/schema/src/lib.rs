//! Schema engine for Trellis collections.
//!
//! Application types describe how they map to a collection once, through
//! [`Describe`]. From that description this crate can:
//!
//! - **synthesize** the canonical [`CollectionDescriptor`] the collection
//!   should have ([`SchemaSynthesizer`]),
//! - **plan** the changes between a collection's current schema and that
//!   target, classified as safe or breaking ([`compare`], [`MigrationPlan`]),
//! - **validate** that a model shape agrees with a schema fetched from the
//!   server before reading or writing with it ([`validate`]).
//!
//! Synthesis, diffing and validation are pure and synchronous. The only async
//! surface is [`SchemaSource`], the boundary to whatever fetches current
//! schemas.
//!
//! # Example
//!
//! ```
//! use trellis_schema::{
//!     compare, synthesize, validate, Describe, FieldDescription, ReferenceDirective,
//!     TypeDescription, VectorDirective, VectorizerKind,
//! };
//!
//! struct Article;
//!
//! impl Describe for Article {
//!     fn describe() -> TypeDescription {
//!         TypeDescription::new("Article")
//!             .field(FieldDescription::of::<String>("title"))
//!             .field(FieldDescription::of::<Vec<String>>("tags"))
//!             .field(
//!                 FieldDescription::of::<uuid::Uuid>("author")
//!                     .reference(ReferenceDirective::to("Author")),
//!             )
//!             .field(
//!                 FieldDescription::of::<Vec<f32>>("title_vector").vector(
//!                     VectorDirective::new(VectorizerKind::Text2VecOpenAi)
//!                         .source_properties(["title"]),
//!                 ),
//!             )
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = synthesize(&Article::describe())?;
//! assert_eq!(target.properties.len(), 2);
//!
//! // Nothing exists yet, so every change is an addition.
//! let changes = compare(None, &target);
//! assert!(changes.iter().all(|change| change.is_safe));
//!
//! assert!(validate(&Article::describe(), &target).is_valid());
//! # Ok(())
//! # }
//! ```

mod config;
mod description;
mod differ;
mod errors;
mod hooks;
mod kind_table;
mod naming;
mod source;
mod synthesizer;
mod validator;

pub use config::*;
pub use description::*;
pub use differ::*;
pub use errors::*;
pub use hooks::{CollectionHookFn, Hook, HookRef, HookRegistry, HookSignature, HookTable, VectorHookFn};
pub use kind_table::kind_of;
pub use naming::{to_camel_case, to_collection_name};
pub use source::*;
pub use synthesizer::*;
pub use validator::*;

pub use trellis_types::*;
