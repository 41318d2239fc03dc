//! Loading discovery rows from a JSON document

use std::path::Path;

use serde::Deserialize;

use super::{
    FunctionDetailsRow, FunctionDetailsRowV1, FunctionRowShape, RelationshipDetailsRow,
    StoreSchemaDetails, TableDetailsRow,
};
use crate::error::EdmGenError;

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    function_row_shape: FunctionRowShape,
    #[serde(default)]
    tables: Vec<TableDetailsRow>,
    #[serde(default)]
    views: Vec<TableDetailsRow>,
    #[serde(default)]
    relationships: Vec<RelationshipDetailsRow>,
    #[serde(default)]
    functions: Vec<serde_json::Value>,
    #[serde(default)]
    tvf_columns: Vec<TableDetailsRow>,
}

/// Parse a schema document from JSON text
pub fn parse_store_schema(json: &str) -> Result<StoreSchemaDetails, serde_json::Error> {
    let document: SchemaDocument = serde_json::from_str(json)?;

    let function_details = match document.function_row_shape {
        FunctionRowShape::V1 => document
            .functions
            .into_iter()
            .map(|v| {
                serde_json::from_value::<FunctionDetailsRowV1>(v).map(FunctionDetailsRow::from)
            })
            .collect::<Result<Vec<_>, _>>()?,
        FunctionRowShape::V3 => document
            .functions
            .into_iter()
            .map(serde_json::from_value::<FunctionDetailsRow>)
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(StoreSchemaDetails {
        table_details: document.tables,
        view_details: document.views,
        relationship_details: document.relationships,
        function_details,
        tvf_return_type_details: document.tvf_columns,
    })
}

/// Load a schema document from a JSON file
pub fn load_store_schema(path: &Path) -> Result<StoreSchemaDetails, EdmGenError> {
    let content = std::fs::read_to_string(path).map_err(|e| EdmGenError::SchemaReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_store_schema(&content).map_err(|e| EdmGenError::SchemaParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
