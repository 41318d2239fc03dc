//! Storage and conceptual model representation

mod conceptual;
mod diagnostics;
mod ids;
mod store;
mod types;

pub use conceptual::*;
pub use diagnostics::{Built, EdmSchemaError, ModelBuilderErrorCode, Severity};
pub use ids::*;
pub use store::*;
pub use types::{Facets, PrimitiveTypeKind, StoreGeneratedPattern, TypeUsage};
