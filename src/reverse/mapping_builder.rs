//! One-to-one projection of a storage model into a conceptual model
//!
//! Every valid storage entity set becomes a conceptual entity set, every
//! association set an association set, except junction tables, which become
//! a single many-to-many association. Stored procedures and table-valued
//! functions become function imports.

use std::collections::HashSet;

use tracing::{debug, info};

use super::mapping_context::{ConceptualItem, MappingContext, StoreItem};
use crate::error::EdmGenError;
use crate::model::{
    AssociationSetId, AssociationTypeId, CollapsibleAssociation, ComplexType, ComplexTypeId,
    ConceptualAssociationEnd, ConceptualAssociationSet, ConceptualAssociationSetEnd,
    ConceptualAssociationSetId, ConceptualAssociationType, ConceptualAssociationTypeId,
    ConceptualEntitySet, ConceptualEntitySetId, ConceptualEntityType, ConceptualEntityTypeId,
    ConceptualModel, ConceptualProperty, EdmProperty, EdmSchemaError, EntityTypeId, FunctionId,
    FunctionImport, FunctionImportId, FunctionImportParameter, ModelBuilderErrorCode,
    NavigationProperty, OperationAction, ReferentialConstraint, RelationshipMultiplicity,
    ReturnParameter, StoreFunction, StoreModel, LAZY_LOADING_ENABLED_ANNOTATION,
};
use crate::naming::{
    create_valid_ecma_name, NameComparer, PluralizationService, UniqueIdentifierService,
};
use crate::project::{TargetSchemaVersion, VersionCapabilities};

/// Prefix for conceptual names that cannot start an identifier
const NAME_PREFIX: char = 'C';

fn conceptual_property(name: String, property: &EdmProperty) -> ConceptualProperty {
    ConceptualProperty {
        name,
        primitive: property.type_usage.primitive,
        facets: property.type_usage.facets.clone(),
        nullable: property.nullable,
        store_generated_pattern: property.store_generated_pattern,
    }
}

/// Projects a storage model into a conceptual model
pub struct OneToOneMappingBuilder<'a> {
    namespace: String,
    container_name: String,
    capabilities: VersionCapabilities,
    generate_foreign_key_properties: bool,
    pluralization: &'a dyn PluralizationService,
}

impl<'a> OneToOneMappingBuilder<'a> {
    pub fn new(
        namespace: &str,
        container_name: &str,
        version: TargetSchemaVersion,
        generate_foreign_key_properties: bool,
        pluralization: &'a dyn PluralizationService,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            container_name: container_name.to_string(),
            capabilities: version.capabilities(),
            generate_foreign_key_properties,
            pluralization,
        }
    }

    /// Foreign key columns stay scalar properties on every association
    fn keeps_foreign_key_properties(&self) -> bool {
        self.capabilities.supports_foreign_key_associations && self.generate_foreign_key_properties
    }

    pub fn build(
        &self,
        store: &StoreModel,
    ) -> Result<(ConceptualModel, MappingContext), EdmGenError> {
        let mut mapper = Mapper::new(self, store)?;

        let dropped = mapper.foreign_key_properties_to_drop();
        mapper.map_entity_sets(&dropped);
        mapper.map_association_sets();
        for collapsible in &store.collapsible_associations {
            mapper.map_collapsed_association(collapsible);
        }
        mapper.map_function_imports();

        if self.capabilities.supports_lazy_loading_annotation {
            mapper
                .model
                .container_annotations
                .push((LAZY_LOADING_ENABLED_ANNOTATION.to_string(), "true".to_string()));
        }

        info!(
            entity_sets = mapper.model.entity_sets.len(),
            association_sets = mapper.model.association_sets.len(),
            function_imports = mapper.model.function_imports.len(),
            "built conceptual model"
        );
        Ok((mapper.model, mapper.context))
    }
}

/// State of one projection pass
struct Mapper<'a, 'b> {
    options: &'b OneToOneMappingBuilder<'a>,
    store: &'b StoreModel,
    model: ConceptualModel,
    context: MappingContext,
    /// Entity, association and complex type names
    type_names: UniqueIdentifierService,
    /// Entity set, association set and function import names
    set_names: UniqueIdentifierService,
    /// Property and navigation property names, one scope per entity type
    member_names: Vec<UniqueIdentifierService>,
}

impl<'a, 'b> Mapper<'a, 'b> {
    fn new(
        options: &'b OneToOneMappingBuilder<'a>,
        store: &'b StoreModel,
    ) -> Result<Self, EdmGenError> {
        let mut set_names = UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
        set_names.register_used_identifier(&options.container_name)?;

        Ok(Self {
            options,
            store,
            model: ConceptualModel {
                namespace: options.namespace.clone(),
                container_name: options.container_name.clone(),
                ..Default::default()
            },
            context: MappingContext::new(),
            type_names: UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase),
            set_names,
            member_names: Vec::new(),
        })
    }

    fn collapsed_association_sets(&self) -> HashSet<AssociationSetId> {
        self.store
            .collapsible_associations
            .iter()
            .flat_map(|c| c.association_sets)
            .collect()
    }

    /// Foreign key columns that do not become conceptual properties. Key
    /// columns always survive and are recorded as preserved.
    fn foreign_key_properties_to_drop(&mut self) -> HashSet<(EntityTypeId, usize)> {
        let store = self.store;
        let mut dropped = HashSet::new();
        if self.options.keeps_foreign_key_properties() {
            return dropped;
        }

        let collapsed = self.collapsed_association_sets();
        for set_id in store.association_set_ids() {
            if collapsed.contains(&set_id) {
                continue;
            }
            let association =
                store.association_type(store.association_set(set_id).association_type);
            let Some(dependent_end) = association.dependent_end() else {
                continue;
            };
            let dependent = store.entity_type(dependent_end.entity_type);

            for column in &association.dependent_properties {
                let Some(index) = dependent.properties.iter().position(|p| &p.name == column) else {
                    continue;
                };
                if dependent.is_key_member(column) {
                    self.context.add_preserved_foreign_key(dependent_end.entity_type, index);
                } else {
                    dropped.insert((dependent_end.entity_type, index));
                }
            }
        }
        dropped
    }

    fn map_entity_sets(&mut self, dropped: &HashSet<(EntityTypeId, usize)>) {
        let store = self.store;
        for set_id in store.entity_set_ids() {
            if store.is_collapsed(set_id) {
                continue;
            }
            let set = store.entity_set(set_id);
            let store_type_id = set.entity_type;
            let store_type = store.entity_type(store_type_id);
            let type_id = ConceptualEntityTypeId(self.model.entity_types.len());

            let name = self
                .type_names
                .adjust_identifier(&create_valid_ecma_name(&store_type.name, NAME_PREFIX), None);
            let mut members: UniqueIdentifierService =
                UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
            members.adjust_identifier(&name, None);

            let mut properties = Vec::new();
            for (index, property) in store_type.properties.iter().enumerate() {
                if dropped.contains(&(store_type_id, index)) {
                    continue;
                }
                let property_name = members
                    .adjust_identifier(&create_valid_ecma_name(&property.name, NAME_PREFIX), None);
                self.context.add(
                    StoreItem::Property(store_type_id, index),
                    ConceptualItem::Property(type_id, properties.len()),
                );
                properties.push(conceptual_property(property_name, property));
            }

            let key_members = store_type
                .key_members
                .iter()
                .filter_map(|key| {
                    let index = store_type.properties.iter().position(|p| &p.name == key)?;
                    let (_, conceptual_index) =
                        self.context.conceptual_property(store_type_id, index)?;
                    Some(properties[conceptual_index].name.clone())
                })
                .collect();

            let set_name = self
                .set_names
                .adjust_identifier(&self.options.pluralization.pluralize(&name), None);
            debug!(entity_type = %name, entity_set = %set_name, "mapped entity set");

            self.model.entity_types.push(ConceptualEntityType {
                name,
                namespace: self.options.namespace.clone(),
                properties,
                key_members,
                navigation_properties: Vec::new(),
            });
            self.member_names.push(members);
            self.context
                .add(StoreItem::EntityType(store_type_id), ConceptualItem::EntityType(type_id));

            let conceptual_set_id = ConceptualEntitySetId(self.model.entity_sets.len());
            self.model.entity_sets.push(ConceptualEntitySet {
                name: set_name,
                entity_type: type_id,
            });
            self.context
                .add(StoreItem::EntitySet(set_id), ConceptualItem::EntitySet(conceptual_set_id));
        }
    }

    /// Conceptual name of a storage property, if the property was mapped
    fn conceptual_property_name(&self, entity: EntityTypeId, column: &str) -> Option<String> {
        let index = self
            .store
            .entity_type(entity)
            .properties
            .iter()
            .position(|p| p.name == column)?;
        let (type_id, property_index) = self.context.conceptual_property(entity, index)?;
        Some(self.model.entity_type(type_id).properties[property_index].name.clone())
    }

    fn map_association_sets(&mut self) {
        let store = self.store;
        let collapsed = self.collapsed_association_sets();

        for set_id in store.association_set_ids() {
            if collapsed.contains(&set_id) {
                continue;
            }
            let set = store.association_set(set_id);
            let store_type_id = set.association_type;
            let association = store.association_type(store_type_id);

            let (Some(principal), Some(dependent)) =
                (association.principal_end(), association.dependent_end())
            else {
                continue;
            };
            let ends = (
                self.context.conceptual_entity_type(principal.entity_type),
                self.context.conceptual_entity_type(dependent.entity_type),
                set.ends.first().and_then(|e| self.context.conceptual_entity_set(e.entity_set)),
                set.ends.get(1).and_then(|e| self.context.conceptual_entity_set(e.entity_set)),
            );
            let (
                Some(principal_type),
                Some(dependent_type),
                Some(principal_set),
                Some(dependent_set),
            ) = ends
            else {
                self.model.diagnostics.push(
                    EdmSchemaError::error(
                        ModelBuilderErrorCode::UnknownError,
                        format!(
                            "The association '{}' references an entity that was not mapped.",
                            association.name
                        ),
                    )
                    .with_source(association.name.clone()),
                );
                continue;
            };

            let name = self
                .type_names
                .adjust_identifier(&create_valid_ecma_name(&association.name, NAME_PREFIX), None);
            let mut roles: UniqueIdentifierService =
                UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
            let principal_role =
                roles.adjust_identifier(&self.model.entity_type(principal_type).name, None);
            let dependent_role =
                roles.adjust_identifier(&self.model.entity_type(dependent_type).name, None);

            let identifying = association.referential_constraint.is_some();
            let wants_constraint = self.options.capabilities.supports_foreign_key_associations
                && (self.options.generate_foreign_key_properties || identifying);
            let referential_constraint = if wants_constraint {
                let principal_properties: Option<Vec<String>> = association
                    .principal_properties
                    .iter()
                    .map(|c| self.conceptual_property_name(principal.entity_type, c))
                    .collect();
                let dependent_properties: Option<Vec<String>> = association
                    .dependent_properties
                    .iter()
                    .map(|c| self.conceptual_property_name(dependent.entity_type, c))
                    .collect();
                principal_properties.zip(dependent_properties).map(|(p, d)| ReferentialConstraint {
                    principal_role: principal_role.clone(),
                    dependent_role: dependent_role.clone(),
                    principal_properties: p,
                    dependent_properties: d,
                })
            } else {
                None
            };

            let type_id = ConceptualAssociationTypeId(self.model.association_types.len());
            self.model.association_types.push(ConceptualAssociationType {
                name: name.clone(),
                namespace: self.options.namespace.clone(),
                ends: vec![
                    ConceptualAssociationEnd {
                        role: principal_role.clone(),
                        entity_type: principal_type,
                        multiplicity: principal.multiplicity,
                        delete_behavior: principal.delete_behavior,
                    },
                    ConceptualAssociationEnd {
                        role: dependent_role.clone(),
                        entity_type: dependent_type,
                        multiplicity: dependent.multiplicity,
                        delete_behavior: dependent.delete_behavior,
                    },
                ],
                is_foreign_key: referential_constraint.is_some(),
                referential_constraint,
            });
            self.context.add(
                StoreItem::AssociationType(store_type_id),
                ConceptualItem::AssociationType(type_id),
            );

            let set_name = self
                .set_names
                .adjust_identifier(&create_valid_ecma_name(&set.name, NAME_PREFIX), None);
            self.push_association_set(
                StoreItem::AssociationSet(set_id),
                set_name,
                type_id,
                [
                    (principal_role.clone(), principal_set),
                    (dependent_role.clone(), dependent_set),
                ],
            );

            self.add_navigation(
                principal_type,
                dependent_type,
                dependent.multiplicity,
                type_id,
                &principal_role,
                &dependent_role,
            );
            self.add_navigation(
                dependent_type,
                principal_type,
                principal.multiplicity,
                type_id,
                &dependent_role,
                &principal_role,
            );
        }
    }

    /// Replace a junction entity set with a many-to-many association
    fn map_collapsed_association(&mut self, collapsible: &CollapsibleAssociation) {
        let store = self.store;
        let junction_set = store.entity_set(collapsible.entity_set);
        let junction_type_id = junction_set.entity_type;

        let mut ends = Vec::with_capacity(2);
        for set_id in collapsible.association_sets {
            let Some(principal) = store.association_set(set_id).ends.first() else {
                return;
            };
            let principal_set = principal.entity_set;
            let principal_type = store.entity_set(principal_set).entity_type;
            match (
                self.context.conceptual_entity_type(principal_type),
                self.context.conceptual_entity_set(principal_set),
            ) {
                (Some(t), Some(s)) => ends.push((t, s)),
                _ => return,
            }
        }
        let [(a_type, a_set), (b_type, b_set)] = ends[..] else {
            return;
        };

        let junction_type = store.entity_type(junction_type_id);
        let name = self
            .type_names
            .adjust_identifier(&create_valid_ecma_name(&junction_type.name, NAME_PREFIX), None);
        let mut roles: UniqueIdentifierService =
            UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
        let a_role = roles.adjust_identifier(&self.model.entity_type(a_type).name, None);
        let b_role = roles.adjust_identifier(&self.model.entity_type(b_type).name, None);

        let many_end = |role: &str, entity_type| ConceptualAssociationEnd {
            role: role.to_string(),
            entity_type,
            multiplicity: RelationshipMultiplicity::Many,
            delete_behavior: OperationAction::None,
        };

        let type_id = ConceptualAssociationTypeId(self.model.association_types.len());
        self.model.association_types.push(ConceptualAssociationType {
            name,
            namespace: self.options.namespace.clone(),
            ends: vec![many_end(&a_role, a_type), many_end(&b_role, b_type)],
            referential_constraint: None,
            is_foreign_key: false,
        });
        self.context
            .add(StoreItem::EntityType(junction_type_id), ConceptualItem::AssociationType(type_id));

        let set_name = self
            .set_names
            .adjust_identifier(&create_valid_ecma_name(&junction_set.name, NAME_PREFIX), None);
        debug!(association_set = %set_name, "mapped junction table as many-to-many association");
        self.push_association_set(
            StoreItem::EntitySet(collapsible.entity_set),
            set_name,
            type_id,
            [(a_role.clone(), a_set), (b_role.clone(), b_set)],
        );

        let many = RelationshipMultiplicity::Many;
        self.add_navigation(a_type, b_type, many, type_id, &a_role, &b_role);
        self.add_navigation(b_type, a_type, many, type_id, &b_role, &a_role);
    }

    fn push_association_set(
        &mut self,
        source: StoreItem,
        name: String,
        association_type: ConceptualAssociationTypeId,
        ends: [(String, ConceptualEntitySetId); 2],
    ) {
        let set_id = ConceptualAssociationSetId(self.model.association_sets.len());
        self.model.association_sets.push(ConceptualAssociationSet {
            name,
            association_type,
            ends: ends
                .into_iter()
                .map(|(role, entity_set)| ConceptualAssociationSetEnd { role, entity_set })
                .collect(),
        });
        self.context.add(source, ConceptualItem::AssociationSet(set_id));
    }

    /// Navigation property on `from` leading to `to`, named after the target
    /// type (pluralized when the target end is many)
    fn add_navigation(
        &mut self,
        from: ConceptualEntityTypeId,
        to: ConceptualEntityTypeId,
        to_multiplicity: RelationshipMultiplicity,
        association_type: ConceptualAssociationTypeId,
        from_role: &str,
        to_role: &str,
    ) {
        let target = &self.model.entity_type(to).name;
        let proposed = if to_multiplicity == RelationshipMultiplicity::Many {
            self.options.pluralization.pluralize(target)
        } else {
            target.clone()
        };
        let name = self.member_names[from.index()].adjust_identifier(&proposed, None);

        self.model.entity_types[from.index()]
            .navigation_properties
            .push(NavigationProperty {
                name,
                association_type,
                from_role: from_role.to_string(),
                to_role: to_role.to_string(),
            });
    }

    fn is_importable(&self, function: &StoreFunction) -> bool {
        let stored_procedure = !function.is_composable
            && !function.is_builtin
            && !function.is_niladic
            && !function.is_aggregate;
        let table_valued = function.is_tvf
            && self.options.capabilities.supports_table_valued_functions
            && matches!(function.return_parameter, Some(ReturnParameter::Table(_)));
        stored_procedure || table_valued
    }

    fn map_function_imports(&mut self) {
        let store = self.store;
        for function_id in store.function_ids() {
            let Some(function) = store.function(function_id).as_valid() else {
                continue;
            };
            if !self.is_importable(function) {
                continue;
            }
            self.map_function_import(function_id, function);
        }
    }

    fn map_function_import(&mut self, function_id: FunctionId, function: &StoreFunction) {
        let name = self
            .set_names
            .adjust_identifier(&create_valid_ecma_name(&function.name, NAME_PREFIX), None);

        let mut parameter_names: UniqueIdentifierService =
            UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
        let parameters = function
            .parameters
            .iter()
            .map(|p| FunctionImportParameter {
                name: parameter_names
                    .adjust_identifier(&create_valid_ecma_name(&p.name, 'p'), None),
                primitive: p.type_usage.primitive,
                facets: p.type_usage.facets.clone(),
                mode: p.mode,
            })
            .collect();

        let return_type = match &function.return_parameter {
            Some(ReturnParameter::Table(row_type)) if function.is_tvf => {
                let complex_name = self
                    .type_names
                    .adjust_identifier(&format!("{}_Result", name), None);
                let mut members: UniqueIdentifierService =
                    UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);
                members.adjust_identifier(&complex_name, None);
                let properties = row_type
                    .properties
                    .iter()
                    .map(|p| {
                        let name = create_valid_ecma_name(&p.name, NAME_PREFIX);
                        conceptual_property(members.adjust_identifier(&name, None), p)
                    })
                    .collect();

                let complex_id = ComplexTypeId(self.model.complex_types.len());
                self.model.complex_types.push(ComplexType {
                    name: complex_name,
                    namespace: self.options.namespace.clone(),
                    properties,
                });
                self.context
                    .add(StoreItem::RowType(function_id), ConceptualItem::ComplexType(complex_id));
                Some(complex_id)
            }
            _ => None,
        };

        debug!(function_import = %name, "mapped function import");
        let import_id = FunctionImportId(self.model.function_imports.len());
        self.model.function_imports.push(FunctionImport {
            name,
            parameters,
            return_type,
            is_composable: function.is_tvf,
        });
        self.context
            .add(StoreItem::Function(function_id), ConceptualItem::FunctionImport(import_id));
    }
}

/// Association type of a conceptual association set, for callers that only
/// hold the storage id it was derived from
pub fn conceptual_association_for(
    context: &MappingContext,
    store_association: AssociationTypeId,
) -> Option<ConceptualAssociationTypeId> {
    match context.conceptual(StoreItem::AssociationType(store_association))? {
        ConceptualItem::AssociationType(id) => Some(id),
        _ => None,
    }
}
