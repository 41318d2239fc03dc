//! Storage entity types and entity sets from table and view columns

use std::collections::HashMap;

use tracing::{debug, warn};

use super::property_builder::PropertyBuilder;
use crate::error::EdmGenError;
use crate::model::{
    Built, EdmSchemaError, EntitySet, EntitySetId, EntityType, EntityTypeId, ModelBuilderErrorCode,
    Severity, StoreObjectType,
};
use crate::naming::{NameComparer, UniqueIdentifierService};
use crate::project::VersionCapabilities;
use crate::provider::ProviderManifest;
use crate::schema::{split_table_rows, FullyQualifiedName, TableDetailsRow};
use crate::util::quote_identifier;

/// Alias of the table inside a generated defining query
const DEFINING_QUERY_ALIAS: &str = "T";

/// Read-only projection of a table over the columns that made it into the model
pub fn create_defining_query(schema: Option<&str>, table: &str, columns: &[&str]) -> String {
    let alias = quote_identifier(DEFINING_QUERY_ALIAS);
    let projection: Vec<String> = columns
        .iter()
        .map(|c| format!("{}.{} AS {}", alias, quote_identifier(c), quote_identifier(c)))
        .collect();

    let source = match schema {
        Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(table)),
        None => quote_identifier(table),
    };

    format!(
        "SELECT \n    {}\n    FROM {} AS {}",
        projection.join(", \n    "),
        source,
        alias
    )
}

/// Lookup from a store object's qualified name to the entity built for it
#[derive(Debug, Clone, Default)]
pub struct EntityRegister {
    types: HashMap<FullyQualifiedName, EntityTypeId>,
    sets: HashMap<EntityTypeId, EntitySetId>,
}

impl EntityRegister {
    pub fn entity_type(&self, key: &FullyQualifiedName) -> Option<EntityTypeId> {
        self.types.get(key).copied()
    }

    pub fn entity_set(&self, id: EntityTypeId) -> Option<EntitySetId> {
        self.sets.get(&id).copied()
    }
}

/// Entity types (valid and invalid) plus the sets of the valid ones
#[derive(Debug, Clone, Default)]
pub struct EntitySetsOutcome {
    pub entity_types: Vec<Built<EntityType>>,
    pub entity_sets: Vec<EntitySet>,
    pub register: EntityRegister,
}

/// How the key of an entity type was settled
enum KeyOutcome {
    Declared(Vec<String>),
    PartiallyDeclared(Vec<String>),
    Inferred(Vec<String>),
    Missing,
}

pub struct EntityTypeBuilder<'a> {
    properties: PropertyBuilder<'a>,
    namespace: String,
    type_names: UniqueIdentifierService,
}

impl<'a> EntityTypeBuilder<'a> {
    pub fn new(
        manifest: &'a dyn ProviderManifest,
        capabilities: VersionCapabilities,
        namespace: &str,
    ) -> Self {
        Self {
            properties: PropertyBuilder::new(manifest, capabilities),
            namespace: namespace.to_string(),
            type_names: UniqueIdentifierService::with_transform(
                NameComparer::Ordinal,
                |name: &str| name.replace('.', "_"),
            ),
        }
    }

    /// Build the entity type for the columns of one table or view.
    ///
    /// The flag is true when the type is only usable read-only, through a
    /// defining query.
    pub fn create_entity_type(
        &mut self,
        columns: &[&TableDetailsRow],
    ) -> Result<(Built<EntityType>, bool), EdmGenError> {
        let first = columns
            .first()
            .ok_or(EdmGenError::EmptyRowGroup { object: "table" })?;
        let table = first.table_key().to_string();
        let name = self.type_names.adjust_identifier(&first.table_name, None);

        let set = self.properties.create_properties(columns);
        let capabilities = *self.properties.capabilities();
        let mut diagnostics = set.errors;

        let dropped_keys: Vec<&String> = set
            .key_column_names
            .iter()
            .filter(|k| {
                set.excluded_column_names.contains(*k)
                    || set.invalid_key_type_column_names.contains(*k)
            })
            .collect();
        let surviving_keys: Vec<String> = set
            .key_column_names
            .iter()
            .filter(|k| !dropped_keys.contains(k))
            .cloned()
            .collect();

        let outcome = if !set.key_column_names.is_empty() && dropped_keys.is_empty() {
            KeyOutcome::Declared(surviving_keys)
        } else if !surviving_keys.is_empty() {
            KeyOutcome::PartiallyDeclared(surviving_keys)
        } else {
            let inferred: Vec<String> = set
                .properties
                .iter()
                .filter(|p| !p.nullable && capabilities.is_valid_key_type(p.type_usage.primitive))
                .map(|p| p.name.clone())
                .collect();
            if inferred.is_empty() {
                KeyOutcome::Missing
            } else {
                KeyOutcome::Inferred(inferred)
            }
        };

        let usable = !matches!(outcome, KeyOutcome::Missing);
        let severity = if usable { Severity::Warning } else { Severity::Error };
        let consequence = if usable {
            "The table/view has been made read-only."
        } else {
            "The table/view has been excluded."
        };
        for key in &dropped_keys {
            let (code, reason) = if set.excluded_column_names.contains(*key) {
                (ModelBuilderErrorCode::ExcludedColumnWasAKeyColumn, "was excluded")
            } else {
                (
                    ModelBuilderErrorCode::InvalidKeyTypeFound,
                    "has a data type that cannot be part of a key",
                )
            };
            diagnostics.push(
                EdmSchemaError::new(
                    code,
                    severity,
                    format!(
                        "The key column '{}' of table/view '{}' {}. {}",
                        key, table, reason, consequence
                    ),
                )
                .with_source(table.clone()),
            );
        }

        let (key_members, needs_defining_query) = match outcome {
            KeyOutcome::Declared(keys) => (keys, false),
            KeyOutcome::PartiallyDeclared(keys) => (keys, true),
            KeyOutcome::Inferred(keys) => {
                diagnostics.push(
                    EdmSchemaError::warning(
                        ModelBuilderErrorCode::NoPrimaryKeyDefined,
                        format!(
                            "The table/view '{}' does not have a primary key defined. The key has been inferred and the definition was created as a read-only table/view.",
                            table
                        ),
                    )
                    .with_source(table.clone()),
                );
                (keys, true)
            }
            KeyOutcome::Missing => {
                diagnostics.push(
                    EdmSchemaError::error(
                        ModelBuilderErrorCode::CannotCreateEntityWithoutPrimaryKey,
                        format!(
                            "The table/view '{}' does not have a primary key defined and no valid primary key could be inferred. This table/view has been excluded.",
                            table
                        ),
                    )
                    .with_source(table.clone()),
                );
                (Vec::new(), false)
            }
        };

        let entity_type = EntityType {
            name,
            namespace: self.namespace.clone(),
            properties: set.properties,
            key_members,
        };

        if usable {
            Ok((Built::valid(entity_type, diagnostics), needs_defining_query))
        } else {
            warn!(table = %table, "entity type is invalid");
            Ok((Built::invalid(entity_type, diagnostics), false))
        }
    }

    /// Build entity types for every table and view, and sets for the valid ones
    pub fn create_entity_sets(
        &mut self,
        table_rows: &[TableDetailsRow],
        view_rows: &[TableDetailsRow],
    ) -> Result<EntitySetsOutcome, EdmGenError> {
        let mut outcome = EntitySetsOutcome::default();

        let sources = [
            (StoreObjectType::Tables, table_rows),
            (StoreObjectType::Views, view_rows),
        ];
        for (object_type, rows) in sources {
            for (key, columns) in split_table_rows(rows) {
                let (entity_type, needs_defining_query) = self.create_entity_type(&columns)?;
                let type_id = EntityTypeId(outcome.entity_types.len());
                outcome.register.types.insert(key.clone(), type_id);

                if let Some(valid) = entity_type.as_valid() {
                    let defining_query = needs_defining_query.then(|| {
                        let names: Vec<&str> =
                            valid.properties.iter().map(|p| p.name.as_str()).collect();
                        create_defining_query(key.schema.as_deref(), &key.name, &names)
                    });
                    debug!(
                        entity = %valid.name,
                        read_only = defining_query.is_some(),
                        "created entity set"
                    );

                    let set_id = EntitySetId(outcome.entity_sets.len());
                    outcome.entity_sets.push(EntitySet {
                        name: valid.name.clone(),
                        entity_type: type_id,
                        catalog: key.catalog.clone(),
                        schema: key.schema.clone(),
                        table: key.name.clone(),
                        store_object_type: object_type,
                        defining_query,
                    });
                    outcome.register.sets.insert(type_id, set_id);
                }
                outcome.entity_types.push(entity_type);
            }
        }
        Ok(outcome)
    }
}
