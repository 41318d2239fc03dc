//! Typed rows produced by schema discovery
//!
//! Every nullable column of the discovery result is an `Option`; empty
//! strings are normalized to `None` on load so downstream code never has to
//! distinguish "absent" from "blank".

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an optional string, treating `""` as absent
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// `catalog.schema.name` identity of a table, view or routine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullyQualifiedName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl FullyQualifiedName {
    pub fn new(catalog: Option<&str>, schema: Option<&str>, name: &str) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for FullyQualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{}.", catalog)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        f.write_str(&self.name)
    }
}

/// One column of a table, view or table-valued function result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDetailsRow {
    #[serde(deserialize_with = "empty_as_none")]
    pub catalog: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub schema: Option<String>,
    pub table_name: String,
    pub column_name: String,
    pub ordinal: i32,
    pub is_nullable: bool,
    #[serde(deserialize_with = "empty_as_none")]
    pub data_type: Option<String>,
    pub maximum_length: Option<i32>,
    pub precision: Option<i32>,
    pub date_time_precision: Option<i32>,
    pub scale: Option<i32>,
    pub is_identity: bool,
    pub is_server_generated: bool,
    pub is_primary_key: bool,
}

impl TableDetailsRow {
    pub fn table_key(&self) -> FullyQualifiedName {
        FullyQualifiedName::new(self.catalog.as_deref(), self.schema.as_deref(), &self.table_name)
    }

    /// Raw store type name, `None` when missing or blank
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// One column pair of a foreign key relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipDetailsRow {
    #[serde(deserialize_with = "empty_as_none")]
    pub pk_catalog: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub pk_schema: Option<String>,
    pub pk_table: String,
    pub pk_column: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub fk_catalog: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub fk_schema: Option<String>,
    pub fk_table: String,
    pub fk_column: String,
    /// Position of the pair within a composite key
    pub ordinal: i32,
    pub relationship_name: String,
    pub relationship_id: String,
    pub is_cascade_delete: bool,
}

impl RelationshipDetailsRow {
    /// Referenced (primary key side) table
    pub fn pk_table_key(&self) -> FullyQualifiedName {
        FullyQualifiedName::new(
            self.pk_catalog.as_deref(),
            self.pk_schema.as_deref(),
            &self.pk_table,
        )
    }

    /// Referencing (foreign key side) table
    pub fn fk_table_key(&self) -> FullyQualifiedName {
        FullyQualifiedName::new(
            self.fk_catalog.as_deref(),
            self.fk_schema.as_deref(),
            &self.fk_table,
        )
    }
}

/// Layout of function detail rows reported by the schema source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionRowShape {
    /// No catalog column, no table-valued function flag
    V1,
    #[default]
    V3,
}

/// One routine parameter (or one parameterless routine) in the v3 layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDetailsRow {
    #[serde(deserialize_with = "empty_as_none")]
    pub catalog: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub schema: Option<String>,
    pub function_name: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub return_type: Option<String>,
    pub is_aggregate: bool,
    pub is_composable: bool,
    pub is_builtin: bool,
    pub is_niladic: bool,
    pub is_tvf: bool,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_type: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_direction: Option<String>,
}

impl FunctionDetailsRow {
    pub fn function_key(&self) -> FullyQualifiedName {
        FullyQualifiedName::new(
            self.catalog.as_deref(),
            self.schema.as_deref(),
            &self.function_name,
        )
    }

    /// Rows for parameterless routines carry no parameter name
    pub fn has_parameter(&self) -> bool {
        self.parameter_name.is_some()
    }
}

/// Function detail row in the v1 layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDetailsRowV1 {
    #[serde(deserialize_with = "empty_as_none")]
    pub schema: Option<String>,
    pub function_name: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub return_type: Option<String>,
    pub is_aggregate: bool,
    pub is_composable: bool,
    pub is_builtin: bool,
    pub is_niladic: bool,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_type: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parameter_direction: Option<String>,
}

impl From<FunctionDetailsRowV1> for FunctionDetailsRow {
    fn from(row: FunctionDetailsRowV1) -> Self {
        FunctionDetailsRow {
            catalog: None,
            schema: row.schema,
            function_name: row.function_name,
            return_type: row.return_type,
            is_aggregate: row.is_aggregate,
            is_composable: row.is_composable,
            is_builtin: row.is_builtin,
            is_niladic: row.is_niladic,
            is_tvf: false,
            parameter_name: row.parameter_name,
            parameter_type: row.parameter_type,
            parameter_direction: row.parameter_direction,
        }
    }
}

/// Everything schema discovery reported for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSchemaDetails {
    pub table_details: Vec<TableDetailsRow>,
    pub view_details: Vec<TableDetailsRow>,
    pub relationship_details: Vec<RelationshipDetailsRow>,
    pub function_details: Vec<FunctionDetailsRow>,
    /// Result columns of table-valued functions, keyed by the function's name
    pub tvf_return_type_details: Vec<TableDetailsRow>,
}
