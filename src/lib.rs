//! rust-edmgen: reverse engineering of relational schemas into entity data models
//!
//! This library turns the rows returned by schema discovery queries into a
//! storage model, then projects it one-to-one into a conceptual model with
//! navigation properties, many-to-many associations and function imports.

pub mod error;
pub mod model;
pub mod naming;
pub mod project;
pub mod provider;
pub mod report;
pub mod reverse;
pub mod schema;
pub mod util;

use std::path::PathBuf;

use anyhow::Result;

pub use error::EdmGenError;

use model::{ConceptualModel, EdmSchemaError, Severity, StoreModel};
use naming::{EnglishPluralizationService, NoPluralization, PluralizationService};
use project::{ModelGenerationSettings, TargetSchemaVersion};
use reverse::{MappingContext, OneToOneMappingBuilder, StoreModelBuilder};
use schema::{SchemaFilter, StoreSchemaDetails};

/// Options for a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Path to the JSON document holding the discovery rows
    pub schema_path: PathBuf,
    pub settings: ModelGenerationSettings,
    /// Where to write the JSON report, if anywhere
    pub output_path: Option<PathBuf>,
    /// Enable verbose output
    pub verbose: bool,
}

/// Everything produced by one reverse-engineering pass
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub target_version: TargetSchemaVersion,
    pub store_model: StoreModel,
    pub conceptual_model: ConceptualModel,
    pub mapping_context: MappingContext,
}

impl GenerationResult {
    /// Storage diagnostics followed by conceptual diagnostics
    pub fn diagnostics(&self) -> Vec<EdmSchemaError> {
        let mut diagnostics = self.store_model.diagnostics();
        diagnostics.extend(self.conceptual_model.diagnostics.iter().cloned());
        diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(|d| d.severity == Severity::Error)
    }
}

/// Build the storage and conceptual models for already loaded discovery rows
pub fn reverse_engineer(
    details: StoreSchemaDetails,
    settings: &ModelGenerationSettings,
) -> Result<GenerationResult> {
    let filter = SchemaFilter::new(&settings.filters)?;
    let details = filter.apply(details);

    let manifest = provider::resolve_provider_manifest(
        &settings.provider_invariant_name,
        &settings.provider_manifest_token,
    )?;

    let store_model = StoreModelBuilder::new(
        manifest.as_ref(),
        settings.target_version,
        &settings.store_namespace(),
        &settings.store_container_name(),
    )
    .build(&details)?;

    let english = EnglishPluralizationService::new();
    let pluralization: &dyn PluralizationService = if settings.pluralize {
        &english
    } else {
        &NoPluralization
    };

    let (conceptual_model, mapping_context) = OneToOneMappingBuilder::new(
        &settings.model_namespace,
        &settings.conceptual_container_name(),
        settings.target_version,
        settings.generate_foreign_key_properties,
        pluralization,
    )
    .build(&store_model)?;

    Ok(GenerationResult {
        target_version: settings.target_version,
        store_model,
        conceptual_model,
        mapping_context,
    })
}

/// Load discovery rows from disk, generate the models and optionally write a report
pub fn generate_model(options: GenerateOptions) -> Result<GenerationResult> {
    if options.verbose {
        println!("Loading schema: {}", options.schema_path.display());
    }

    // Step 1: Load the discovery rows
    let details = schema::load_store_schema(&options.schema_path)?;

    if options.verbose {
        println!(
            "Found {} table columns, {} view columns, {} relationship columns, {} function rows",
            details.table_details.len(),
            details.view_details.len(),
            details.relationship_details.len(),
            details.function_details.len()
        );
    }

    // Step 2: Build both models
    let result = reverse_engineer(details, &options.settings)?;

    if options.verbose {
        println!(
            "Built storage model with {} entity sets and {} association sets",
            result.store_model.entity_sets.len(),
            result.store_model.association_sets.len()
        );
        println!(
            "Built conceptual model with {} entity sets, {} association sets and {} function imports",
            result.conceptual_model.entity_sets.len(),
            result.conceptual_model.association_sets.len(),
            result.conceptual_model.function_imports.len()
        );
    }

    // Step 3: Write the report
    if let Some(output_path) = &options.output_path {
        report::write_report(&report::ModelReport::new(&result), output_path)?;

        if options.verbose {
            println!("Wrote report: {}", output_path.display());
        }
    }

    Ok(result)
}
