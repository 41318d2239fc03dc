//! Storage model construction from discovered schema rows

use tracing::info;

use super::association_builder::AssociationBuilder;
use super::collapse::find_collapsible_associations;
use super::entity_builder::EntityTypeBuilder;
use super::function_builder::FunctionBuilder;
use crate::error::EdmGenError;
use crate::model::StoreModel;
use crate::project::{TargetSchemaVersion, VersionCapabilities};
use crate::provider::ProviderManifest;
use crate::schema::StoreSchemaDetails;

/// Builds the storage model for one target version and provider
pub struct StoreModelBuilder<'a> {
    manifest: &'a dyn ProviderManifest,
    capabilities: VersionCapabilities,
    namespace: String,
    container_name: String,
}

impl<'a> StoreModelBuilder<'a> {
    pub fn new(
        manifest: &'a dyn ProviderManifest,
        version: TargetSchemaVersion,
        namespace: &str,
        container_name: &str,
    ) -> Self {
        Self {
            manifest,
            capabilities: version.capabilities(),
            namespace: namespace.to_string(),
            container_name: container_name.to_string(),
        }
    }

    /// Build entities, then associations between them, then functions, then
    /// mark the junction tables.
    pub fn build(&self, details: &StoreSchemaDetails) -> Result<StoreModel, EdmGenError> {
        let entities = EntityTypeBuilder::new(self.manifest, self.capabilities, &self.namespace)
            .create_entity_sets(&details.table_details, &details.view_details)?;

        let associations =
            AssociationBuilder::new(&entities.entity_types, &entities.register, &self.namespace)
                .create_association_sets(&details.relationship_details);

        let functions = FunctionBuilder::new(self.manifest, self.capabilities, &self.namespace)
            .create_functions(&details.function_details, &details.tvf_return_type_details);

        let mut model = StoreModel {
            namespace: self.namespace.clone(),
            container_name: self.container_name.clone(),
            entity_types: entities.entity_types,
            entity_sets: entities.entity_sets,
            association_types: associations.association_types,
            association_sets: associations.association_sets,
            functions,
            collapsible_associations: Vec::new(),
            shared_foreign_keys: associations.shared_foreign_keys,
        };
        model.collapsible_associations = find_collapsible_associations(&model);

        info!(
            entity_sets = model.entity_sets.len(),
            association_sets = model.association_sets.len(),
            functions = model.functions.len(),
            junctions = model.collapsible_associations.len(),
            "built storage model"
        );
        Ok(model)
    }
}
