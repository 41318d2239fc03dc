//! Schema discovery rows and the utilities that shape them

mod filter;
mod loader;
mod query;
mod rows;
mod split;

pub use filter::{FilterEffect, SchemaFilter, SchemaFilterEntry, SchemaObjectKind};
pub use loader::{load_store_schema, parse_store_schema};
pub use query::{SchemaQuery, SchemaQueryGenerator};
pub use rows::{
    FullyQualifiedName, FunctionDetailsRow, FunctionDetailsRowV1, FunctionRowShape,
    RelationshipDetailsRow, StoreSchemaDetails, TableDetailsRow,
};
pub use split::{split_function_rows, split_rows, split_table_rows};
