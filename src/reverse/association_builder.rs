//! Storage associations from foreign key relationship rows

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use super::entity_builder::EntityRegister;
use crate::model::{
    AssociationEndMember, AssociationSet, AssociationSetEnd, AssociationType,
    AssociationTypeId, Built, EdmSchemaError, EntityType, EntityTypeId, ModelBuilderErrorCode,
    OperationAction, ReferentialConstraint, RelationshipMultiplicity,
};
use crate::naming::{NameComparer, UniqueIdentifierService};
use crate::schema::{split_rows, FullyQualifiedName, RelationshipDetailsRow};

/// Association types (valid and invalid), the sets of the valid ones and
/// the types whose foreign key columns back more than one relationship
#[derive(Debug, Clone, Default)]
pub struct AssociationsOutcome {
    pub association_types: Vec<Built<AssociationType>>,
    pub association_sets: Vec<AssociationSet>,
    pub shared_foreign_keys: Vec<AssociationTypeId>,
}

pub struct AssociationBuilder<'a> {
    entity_types: &'a [Built<EntityType>],
    register: &'a EntityRegister,
    namespace: String,
    type_names: UniqueIdentifierService,
}

impl<'a> AssociationBuilder<'a> {
    pub fn new(
        entity_types: &'a [Built<EntityType>],
        register: &'a EntityRegister,
        namespace: &str,
    ) -> Self {
        Self {
            entity_types,
            register,
            namespace: namespace.to_string(),
            type_names: UniqueIdentifierService::with_transform(
                NameComparer::Ordinal,
                |name: &str| name.replace('.', "_"),
            ),
        }
    }

    /// Resolve one end of a relationship to a valid entity type
    fn resolve_end(
        &self,
        key: &FullyQualifiedName,
        relationship: &str,
    ) -> Result<EntityTypeId, EdmSchemaError> {
        let problem = match self.register.entity_type(key) {
            Some(id) if self.entity_types[id.0].is_valid() => return Ok(id),
            Some(_) => "is invalid",
            None => "cannot be found",
        };
        Err(EdmSchemaError::warning(
            ModelBuilderErrorCode::MissingEntity,
            format!(
                "The table '{}' referenced by relationship '{}' {}. The relationship was excluded.",
                key, relationship, problem
            ),
        )
        .with_source(relationship.to_string()))
    }

    fn entity(&self, id: EntityTypeId) -> &EntityType {
        self.entity_types[id.0].item()
    }

    /// Build the association type for the rows of one relationship and, when
    /// it is valid, its association set. The type is appended to
    /// `association_types` either way.
    pub fn try_create_association_set(
        &mut self,
        rows: &[&RelationshipDetailsRow],
        association_types: &mut Vec<Built<AssociationType>>,
    ) -> Option<AssociationSet> {
        let mut rows: Vec<&RelationshipDetailsRow> = rows.to_vec();
        rows.sort_by_key(|r| r.ordinal);
        let first = *rows.first()?;

        let relationship = first.relationship_name.as_str();
        let mut association_type = AssociationType {
            name: self.type_names.adjust_identifier(relationship, None),
            namespace: self.namespace.clone(),
            relationship_id: first.relationship_id.clone(),
            ends: Vec::new(),
            principal_properties: rows.iter().map(|r| r.pk_column.clone()).collect(),
            dependent_properties: rows.iter().map(|r| r.fk_column.clone()).collect(),
            referential_constraint: None,
        };

        let pk_end = self.resolve_end(&first.pk_table_key(), relationship);
        let fk_end = self.resolve_end(&first.fk_table_key(), relationship);
        let (pk_id, fk_id) = match (pk_end, fk_end) {
            (Ok(pk), Ok(fk)) => (pk, fk),
            (pk, fk) => {
                let errors = [pk.err(), fk.err()].into_iter().flatten().collect();
                association_types.push(Built::invalid(association_type, errors));
                return None;
            }
        };

        if let Err(error) = self.validate(&rows, pk_id, fk_id) {
            warn!(relationship, code = error.error_code(), "relationship excluded");
            association_types.push(Built::invalid(association_type, vec![error]));
            return None;
        }

        let pk_entity = self.entity(pk_id);
        let fk_entity = self.entity(fk_id);
        let fk_columns: BTreeSet<&str> = rows.iter().map(|r| r.fk_column.as_str()).collect();
        let fk_keys: BTreeSet<&str> = fk_entity.key_members.iter().map(String::as_str).collect();

        let (principal_multiplicity, dependent_multiplicity) = if fk_columns == fk_keys {
            (RelationshipMultiplicity::One, RelationshipMultiplicity::ZeroOrOne)
        } else {
            let all_required = rows
                .iter()
                .filter_map(|r| fk_entity.property(&r.fk_column))
                .all(|p| !p.nullable);
            let principal = if all_required {
                RelationshipMultiplicity::One
            } else {
                RelationshipMultiplicity::ZeroOrOne
            };
            (principal, RelationshipMultiplicity::Many)
        };

        let mut roles: UniqueIdentifierService =
            UniqueIdentifierService::new(NameComparer::Ordinal);
        let principal_role = roles.adjust_identifier(&pk_entity.name, None);
        let dependent_role = roles.adjust_identifier(&fk_entity.name, None);

        if fk_columns.is_subset(&fk_keys) {
            association_type.referential_constraint = Some(ReferentialConstraint {
                principal_role: principal_role.clone(),
                dependent_role: dependent_role.clone(),
                principal_properties: association_type.principal_properties.clone(),
                dependent_properties: association_type.dependent_properties.clone(),
            });
        }

        association_type.ends = vec![
            AssociationEndMember {
                role: principal_role.clone(),
                entity_type: pk_id,
                multiplicity: principal_multiplicity,
                delete_behavior: if first.is_cascade_delete {
                    OperationAction::Cascade
                } else {
                    OperationAction::None
                },
            },
            AssociationEndMember {
                role: dependent_role.clone(),
                entity_type: fk_id,
                multiplicity: dependent_multiplicity,
                delete_behavior: OperationAction::None,
            },
        ];

        let ends = match (self.register.entity_set(pk_id), self.register.entity_set(fk_id)) {
            (Some(pk_set), Some(fk_set)) => vec![
                AssociationSetEnd {
                    role: principal_role,
                    entity_set: pk_set,
                },
                AssociationSetEnd {
                    role: dependent_role,
                    entity_set: fk_set,
                },
            ],
            _ => {
                association_types.push(Built::invalid(
                    association_type,
                    vec![EdmSchemaError::error(
                        ModelBuilderErrorCode::UnknownError,
                        format!(
                            "No entity set was created for an end of relationship '{}'.",
                            relationship
                        ),
                    )],
                ));
                return None;
            }
        };

        debug!(
            association = %association_type.name,
            principal = principal_multiplicity.as_str(),
            dependent = dependent_multiplicity.as_str(),
            "created association"
        );

        let set = AssociationSet {
            name: association_type.name.clone(),
            association_type: AssociationTypeId(association_types.len()),
            ends,
        };
        association_types.push(Built::valid(association_type, Vec::new()));
        Some(set)
    }

    /// Structural checks on a relationship whose ends both resolved
    fn validate(
        &self,
        rows: &[&RelationshipDetailsRow],
        pk_id: EntityTypeId,
        fk_id: EntityTypeId,
    ) -> Result<(), EdmSchemaError> {
        let first = rows[0];
        let relationship = first.relationship_name.as_str();
        let pk_entity = self.entity(pk_id);
        let fk_entity = self.entity(fk_id);

        let mut ordinals = HashSet::new();
        let consistent = rows.iter().all(|r| {
            r.pk_table_key() == first.pk_table_key()
                && r.fk_table_key() == first.fk_table_key()
                && ordinals.insert(r.ordinal)
        });
        if !consistent {
            return Err(EdmSchemaError::warning(
                ModelBuilderErrorCode::UnsupportedDbRelationship,
                format!(
                    "The relationship '{}' has rows that do not describe a single pair of tables. The relationship was excluded.",
                    relationship
                ),
            )
            .with_source(relationship.to_string()));
        }

        for row in rows {
            let missing = if pk_entity.property(&row.pk_column).is_none() {
                Some((&row.pk_column, &pk_entity.name))
            } else if fk_entity.property(&row.fk_column).is_none() {
                Some((&row.fk_column, &fk_entity.name))
            } else {
                None
            };
            if let Some((column, entity)) = missing {
                return Err(EdmSchemaError::warning(
                    ModelBuilderErrorCode::AssociationMissingKeyColumn,
                    format!(
                        "The relationship '{}' references column '{}' of '{}', which is not part of the model. The relationship was excluded.",
                        relationship, column, entity
                    ),
                )
                .with_source(relationship.to_string()));
            }
        }

        let pk_columns: BTreeSet<&str> = rows.iter().map(|r| r.pk_column.as_str()).collect();
        let pk_keys: BTreeSet<&str> = pk_entity.key_members.iter().map(String::as_str).collect();
        if pk_columns != pk_keys {
            return Err(EdmSchemaError::warning(
                ModelBuilderErrorCode::UnsupportedDbRelationship,
                format!(
                    "The relationship '{}' has columns that are not part of the key of the table on the primary side of the relationship. The relationship was excluded.",
                    relationship
                ),
            )
            .with_source(relationship.to_string()));
        }

        let in_key = rows.iter().filter(|r| fk_entity.is_key_member(&r.fk_column)).count();
        if in_key > 0 && in_key < rows.len() {
            return Err(EdmSchemaError::warning(
                ModelBuilderErrorCode::UnsupportedForeignKeyPattern,
                format!(
                    "The relationship '{}' uses the set of foreign keys that are partially contained in the set of primary keys of the dependent table. This kind of relationship is not supported. The relationship was excluded.",
                    relationship
                ),
            )
            .with_source(relationship.to_string()));
        }

        Ok(())
    }

    /// Build an association for every relationship, in first-seen order.
    ///
    /// When two relationships use the same foreign key columns of the same
    /// table, the later one is excluded and both are recorded as shared.
    pub fn create_association_sets(
        &mut self,
        rows: &[RelationshipDetailsRow],
    ) -> AssociationsOutcome {
        let mut outcome = AssociationsOutcome::default();
        let mut claimed: HashMap<(FullyQualifiedName, BTreeSet<String>), AssociationTypeId> =
            HashMap::new();

        for (_, group) in split_rows(rows, |r| r.relationship_id.clone()) {
            let fk_key = (
                group[0].fk_table_key(),
                group.iter().map(|r| r.fk_column.clone()).collect::<BTreeSet<String>>(),
            );

            if let Some(&owner) = claimed.get(&fk_key) {
                let first = group[0];
                let duplicate_id = AssociationTypeId(outcome.association_types.len());
                let name = self.type_names.adjust_identifier(&first.relationship_name, None);
                warn!(relationship = %first.relationship_name, "foreign key columns already used");
                outcome.association_types.push(Built::invalid(
                    AssociationType {
                        name,
                        namespace: self.namespace.clone(),
                        relationship_id: first.relationship_id.clone(),
                        ends: Vec::new(),
                        principal_properties: group.iter().map(|r| r.pk_column.clone()).collect(),
                        dependent_properties: group.iter().map(|r| r.fk_column.clone()).collect(),
                        referential_constraint: None,
                    },
                    vec![EdmSchemaError::warning(
                        ModelBuilderErrorCode::SharedForeignKey,
                        format!(
                            "The relationship '{}' uses the same foreign key columns of table '{}' as another relationship. The relationship was excluded.",
                            first.relationship_name, fk_key.0
                        ),
                    )
                    .with_source(first.relationship_name.clone())],
                ));
                for id in [owner, duplicate_id] {
                    if !outcome.shared_foreign_keys.contains(&id) {
                        outcome.shared_foreign_keys.push(id);
                    }
                }
                continue;
            }

            let built = self.try_create_association_set(&group, &mut outcome.association_types);
            if let Some(set) = built {
                claimed.insert(fk_key, set.association_type);
                outcome.association_sets.push(set);
            }
        }

        outcome
    }
}
