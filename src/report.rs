//! JSON summary of a generation pass

use std::path::Path;

use serde::Serialize;

use crate::error::EdmGenError;
use crate::model::{ConceptualModel, EdmSchemaError, ModelBuilderErrorCode, Severity, StoreModel};
use crate::GenerationResult;

/// Summary of the conceptual model and every diagnostic raised while building it
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub namespace: String,
    pub container: String,
    pub store_namespace: String,
    pub target_version: String,
    pub entity_sets: Vec<EntitySetReport>,
    pub association_sets: Vec<AssociationSetReport>,
    pub function_imports: Vec<FunctionImportReport>,
    pub diagnostics: Vec<DiagnosticReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySetReport {
    pub name: String,
    pub entity_type: String,
    /// Physical `schema.table` the set was reverse engineered from
    pub table: Option<String>,
    pub read_only: bool,
    pub key: Vec<String>,
    pub properties: Vec<PropertyReport>,
    pub navigation_properties: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyReport {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssociationSetReport {
    pub name: String,
    pub association: String,
    pub ends: Vec<AssociationEndReport>,
    pub is_foreign_key: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssociationEndReport {
    pub role: String,
    pub entity_set: String,
    pub multiplicity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionImportReport {
    pub name: String,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub is_composable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<&EdmSchemaError> for DiagnosticReport {
    fn from(error: &EdmSchemaError) -> Self {
        Self {
            code: error.error_code(),
            severity: error.severity,
            message: error.message.clone(),
            source: error.source.clone(),
        }
    }
}

impl ModelReport {
    pub fn new(result: &GenerationResult) -> Self {
        let conceptual = &result.conceptual_model;
        let store = &result.store_model;

        Self {
            namespace: conceptual.namespace.clone(),
            container: conceptual.container_name.clone(),
            store_namespace: store.namespace.clone(),
            target_version: result.target_version.to_string(),
            entity_sets: entity_set_reports(result),
            association_sets: association_set_reports(conceptual),
            function_imports: function_import_reports(conceptual),
            diagnostics: result.diagnostics().iter().map(DiagnosticReport::from).collect(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Diagnostics carrying the given code
    pub fn diagnostics_with_code(&self, code: ModelBuilderErrorCode) -> Vec<&DiagnosticReport> {
        self.diagnostics
            .iter()
            .filter(|d| d.code == code.code())
            .collect()
    }

    pub fn to_json(&self) -> String {
        // Every field is a plain string, number or bool
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn entity_set_reports(result: &GenerationResult) -> Vec<EntitySetReport> {
    let conceptual = &result.conceptual_model;
    let store = &result.store_model;

    conceptual
        .entity_sets
        .iter()
        .map(|set| {
            let entity = conceptual.entity_type(set.entity_type);
            let store_set = store_set_for(store, result, &set.name);
            EntitySetReport {
                name: set.name.clone(),
                entity_type: format!("{}.{}", entity.namespace, entity.name),
                table: store_set.map(|s| match &s.schema {
                    Some(schema) => format!("{}.{}", schema, s.table),
                    None => s.table.clone(),
                }),
                read_only: store_set.is_some_and(|s| s.is_read_only()),
                key: entity.key_members.clone(),
                properties: entity
                    .properties
                    .iter()
                    .map(|p| PropertyReport {
                        name: p.name.clone(),
                        type_name: p.primitive.edm_name().to_string(),
                        nullable: p.nullable,
                    })
                    .collect(),
                navigation_properties: entity
                    .navigation_properties
                    .iter()
                    .map(|n| n.name.clone())
                    .collect(),
            }
        })
        .collect()
}

fn store_set_for<'a>(
    store: &'a StoreModel,
    result: &GenerationResult,
    conceptual_set_name: &str,
) -> Option<&'a crate::model::EntitySet> {
    store.entity_set_ids().find_map(|id| {
        let conceptual_id = result.mapping_context.conceptual_entity_set(id)?;
        let conceptual_set = result.conceptual_model.entity_set(conceptual_id);
        (conceptual_set.name == conceptual_set_name).then(|| store.entity_set(id))
    })
}

fn association_set_reports(conceptual: &ConceptualModel) -> Vec<AssociationSetReport> {
    conceptual
        .association_sets
        .iter()
        .map(|set| {
            let association = conceptual.association_type(set.association_type);
            AssociationSetReport {
                name: set.name.clone(),
                association: format!("{}.{}", association.namespace, association.name),
                ends: set
                    .ends
                    .iter()
                    .map(|end| AssociationEndReport {
                        role: end.role.clone(),
                        entity_set: conceptual.entity_set(end.entity_set).name.clone(),
                        multiplicity: association
                            .ends
                            .iter()
                            .find(|e| e.role == end.role)
                            .map(|e| e.multiplicity.as_str().to_string())
                            .unwrap_or_default(),
                    })
                    .collect(),
                is_foreign_key: association.is_foreign_key,
            }
        })
        .collect()
}

fn function_import_reports(conceptual: &ConceptualModel) -> Vec<FunctionImportReport> {
    conceptual
        .function_imports
        .iter()
        .map(|import| FunctionImportReport {
            name: import.name.clone(),
            parameters: import
                .parameters
                .iter()
                .map(|p| format!("{} {}", p.name, p.primitive))
                .collect(),
            return_type: import.return_type.map(|id| {
                let complex = conceptual.complex_type(id);
                format!("{}.{}", complex.namespace, complex.name)
            }),
            is_composable: import.is_composable,
        })
        .collect()
}

/// Write the report as pretty-printed JSON
pub fn write_report(report: &ModelReport, path: &Path) -> Result<(), EdmGenError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| EdmGenError::ReportWriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    std::fs::write(path, report.to_json()).map_err(|e| EdmGenError::ReportWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
