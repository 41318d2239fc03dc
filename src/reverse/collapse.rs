//! Detection of pure junction tables
//!
//! A junction entity set C is collapsible when it is the many end of exactly
//! two association sets, the two principals are distinct from each other and
//! from C, and the two foreign keys together cover every column of C, which
//! are all key columns. Associations backed by shared foreign key columns
//! never collapse.

use std::collections::HashSet;

use tracing::debug;

use crate::model::{
    AssociationSetId, CollapsibleAssociation, EntitySetId, RelationshipMultiplicity, StoreModel,
};

/// Junction entity sets of `model` that can become many-to-many associations
pub fn find_collapsible_associations(model: &StoreModel) -> Vec<CollapsibleAssociation> {
    model
        .entity_set_ids()
        .filter_map(|set_id| collapsible(model, set_id))
        .collect()
}

fn collapsible(model: &StoreModel, junction: EntitySetId) -> Option<CollapsibleAssociation> {
    let participating: Vec<AssociationSetId> = model
        .association_set_ids()
        .filter(|id| {
            model
                .association_set(*id)
                .ends
                .iter()
                .any(|end| end.entity_set == junction)
        })
        .collect();
    let [first, second] = participating.as_slice() else {
        return None;
    };

    let junction_type = model.entity_type(model.entity_set(junction).entity_type);
    let mut principals = Vec::with_capacity(2);
    let mut covered: HashSet<&str> = HashSet::new();

    for id in [*first, *second] {
        let set = model.association_set(id);
        let association_type_id = set.association_type;
        if model.shared_foreign_keys.contains(&association_type_id) {
            return None;
        }

        let association = model.association_type(association_type_id);
        let dependent = association.dependent_end()?;
        if set.ends.get(1)?.entity_set != junction
            || dependent.multiplicity != RelationshipMultiplicity::Many
            || association.referential_constraint.is_none()
        {
            return None;
        }

        let principal_set = set.ends.first()?.entity_set;
        if principal_set == junction {
            return None;
        }
        principals.push(principal_set);

        for column in &association.dependent_properties {
            if !covered.insert(column.as_str()) {
                return None;
            }
        }
    }

    if principals[0] == principals[1] {
        return None;
    }

    let all_covered = junction_type.properties.len() == covered.len()
        && junction_type
            .properties
            .iter()
            .all(|p| covered.contains(p.name.as_str()) && junction_type.is_key_member(&p.name));
    if !all_covered {
        return None;
    }

    debug!(
        junction = %model.entity_set(junction).name,
        "junction table collapses into a many-to-many association"
    );
    Some(CollapsibleAssociation {
        entity_set: junction,
        association_sets: [*first, *second],
    })
}
