//! Model generation settings file

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TargetSchemaVersion;
use crate::error::EdmGenError;
use crate::schema::SchemaFilterEntry;

pub const DEFAULT_PROVIDER_INVARIANT_NAME: &str = "System.Data.SqlClient";
pub const DEFAULT_PROVIDER_MANIFEST_TOKEN: &str = "2008";
pub const DEFAULT_MODEL_NAMESPACE: &str = "Model";

/// Settings for one reverse-engineering pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelGenerationSettings {
    /// Conceptual model namespace (e.g., "SchoolModel")
    pub model_namespace: String,
    /// Conceptual entity container name; defaults to `<namespace>Entities`
    pub container_name: Option<String>,
    pub target_version: TargetSchemaVersion,
    pub provider_invariant_name: String,
    pub provider_manifest_token: String,
    /// Keep foreign key columns as scalar properties on conceptual entities
    pub generate_foreign_key_properties: bool,
    /// Pluralize conceptual entity set names
    pub pluralize: bool,
    /// Schema object filters applied to the discovered rows
    pub filters: Vec<SchemaFilterEntry>,
}

impl Default for ModelGenerationSettings {
    fn default() -> Self {
        Self {
            model_namespace: DEFAULT_MODEL_NAMESPACE.to_string(),
            container_name: None,
            target_version: TargetSchemaVersion::default(),
            provider_invariant_name: DEFAULT_PROVIDER_INVARIANT_NAME.to_string(),
            provider_manifest_token: DEFAULT_PROVIDER_MANIFEST_TOKEN.to_string(),
            generate_foreign_key_properties: true,
            pluralize: true,
            filters: Vec::new(),
        }
    }
}

impl ModelGenerationSettings {
    /// Conceptual container name
    pub fn conceptual_container_name(&self) -> String {
        self.container_name
            .clone()
            .unwrap_or_else(|| format!("{}Entities", self.model_namespace))
    }

    /// Storage model namespace
    pub fn store_namespace(&self) -> String {
        format!("{}.Store", self.model_namespace)
    }

    /// Storage entity container name
    pub fn store_container_name(&self) -> String {
        format!("{}StoreContainer", self.model_namespace)
    }
}

/// Load settings from a JSON file
pub fn load_settings(path: &Path) -> Result<ModelGenerationSettings, EdmGenError> {
    let content = std::fs::read_to_string(path).map_err(|e| EdmGenError::SettingsReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| EdmGenError::SettingsParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
