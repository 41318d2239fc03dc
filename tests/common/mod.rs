//! Common test utilities for rust-edmgen tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

use rust_edmgen::project::ModelGenerationSettings;
use rust_edmgen::schema::{
    FunctionDetailsRow, RelationshipDetailsRow, StoreSchemaDetails, TableDetailsRow,
};
use rust_edmgen::{generate_model, reverse_engineer, GenerateOptions, GenerationResult};

/// Column row in the `dbo` schema
pub fn column(table: &str, name: &str, data_type: &str) -> TableDetailsRow {
    TableDetailsRow {
        schema: Some("dbo".to_string()),
        table_name: table.to_string(),
        column_name: name.to_string(),
        data_type: Some(data_type.to_string()),
        ..Default::default()
    }
}

/// Non-nullable `int` primary key column
pub fn key_column(table: &str, name: &str) -> TableDetailsRow {
    TableDetailsRow {
        is_primary_key: true,
        ..column(table, name, "int")
    }
}

/// Relationship row between two `dbo` tables
pub fn relationship(name: &str, pk: (&str, &str), fk: (&str, &str)) -> RelationshipDetailsRow {
    RelationshipDetailsRow {
        pk_schema: Some("dbo".to_string()),
        pk_table: pk.0.to_string(),
        pk_column: pk.1.to_string(),
        fk_schema: Some("dbo".to_string()),
        fk_table: fk.0.to_string(),
        fk_column: fk.1.to_string(),
        ordinal: 1,
        relationship_name: name.to_string(),
        relationship_id: name.to_string(),
        ..Default::default()
    }
}

/// Stored procedure row, with or without a parameter
pub fn procedure(name: &str, parameter: Option<(&str, &str, &str)>) -> FunctionDetailsRow {
    let mut row = FunctionDetailsRow {
        schema: Some("dbo".to_string()),
        function_name: name.to_string(),
        ..Default::default()
    };
    if let Some((parameter_name, parameter_type, direction)) = parameter {
        row.parameter_name = Some(parameter_name.to_string());
        row.parameter_type = Some(parameter_type.to_string());
        row.parameter_direction = Some(direction.to_string());
    }
    row
}

/// Fluent builder for discovery rows
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    details: StoreSchemaDetails,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table; column ordinals follow the given order
    pub fn table(mut self, columns: Vec<TableDetailsRow>) -> Self {
        self.details.table_details.extend(with_ordinals(columns));
        self
    }

    pub fn view(mut self, columns: Vec<TableDetailsRow>) -> Self {
        self.details.view_details.extend(with_ordinals(columns));
        self
    }

    pub fn relationship(mut self, row: RelationshipDetailsRow) -> Self {
        self.details.relationship_details.push(row);
        self
    }

    pub fn function(mut self, row: FunctionDetailsRow) -> Self {
        self.details.function_details.push(row);
        self
    }

    pub fn tvf_columns(mut self, columns: Vec<TableDetailsRow>) -> Self {
        self.details.tvf_return_type_details.extend(with_ordinals(columns));
        self
    }

    pub fn build(self) -> StoreSchemaDetails {
        self.details
    }
}

fn with_ordinals(columns: Vec<TableDetailsRow>) -> Vec<TableDetailsRow> {
    columns
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            if row.ordinal == 0 {
                row.ordinal = i as i32 + 1;
            }
            row
        })
        .collect()
}

/// Settings with the given namespace and defaults for everything else
pub fn settings(namespace: &str) -> ModelGenerationSettings {
    ModelGenerationSettings {
        model_namespace: namespace.to_string(),
        ..Default::default()
    }
}

/// Run the pipeline, panicking if it fails
pub fn generate(
    details: StoreSchemaDetails,
    settings: &ModelGenerationSettings,
) -> GenerationResult {
    reverse_engineer(details, settings).expect("Generation should succeed")
}

/// Test context with temporary directory for file based runs
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Write discovery rows as a schema document and return its path
    pub fn write_schema(&self, details: &StoreSchemaDetails) -> PathBuf {
        let document = json!({
            "function_row_shape": "v3",
            "tables": details.table_details,
            "views": details.view_details,
            "relationships": details.relationship_details,
            "functions": details.function_details,
            "tvf_columns": details.tvf_return_type_details,
        });
        self.write_file("schema.json", &document.to_string())
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join("out").join("report.json")
    }

    /// Run the file based pipeline, writing the report into the context
    pub fn generate(
        &self,
        schema_path: PathBuf,
        settings: ModelGenerationSettings,
    ) -> anyhow::Result<GenerationResult> {
        generate_model(GenerateOptions {
            schema_path,
            settings,
            output_path: Some(self.report_path()),
            verbose: false,
        })
    }
}
