mod collection;
mod collection_configuration;
mod data_kind;
mod property;
mod schema_change;
#[cfg(any(test, feature = "testing"))]
pub mod strategies;
mod validation;
mod vector_configuration;

pub use collection::*;
pub use collection_configuration::*;
pub use data_kind::*;
pub use property::*;
pub use schema_change::*;
pub use validation::*;
pub use vector_configuration::*;
