//! Bidirectional correspondence between storage and conceptual objects

use std::collections::{HashMap, HashSet};

use crate::model::{
    AssociationSetId, AssociationTypeId, ComplexTypeId, ConceptualAssociationSetId,
    ConceptualAssociationTypeId, ConceptualEntitySetId, ConceptualEntityTypeId, EntitySetId,
    EntityTypeId, FunctionId, FunctionImportId,
};

/// Handle to a storage object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreItem {
    EntityType(EntityTypeId),
    EntitySet(EntitySetId),
    /// Property by position within its entity type
    Property(EntityTypeId, usize),
    AssociationType(AssociationTypeId),
    AssociationSet(AssociationSetId),
    Function(FunctionId),
    /// Result row of a table-valued function
    RowType(FunctionId),
}

/// Handle to a conceptual object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConceptualItem {
    EntityType(ConceptualEntityTypeId),
    EntitySet(ConceptualEntitySetId),
    Property(ConceptualEntityTypeId, usize),
    AssociationType(ConceptualAssociationTypeId),
    AssociationSet(ConceptualAssociationSetId),
    FunctionImport(FunctionImportId),
    ComplexType(ComplexTypeId),
}

/// Record of which conceptual object was derived from which storage object
#[derive(Debug, Clone, Default)]
pub struct MappingContext {
    store_to_conceptual: HashMap<StoreItem, ConceptualItem>,
    conceptual_to_store: HashMap<ConceptualItem, StoreItem>,
    preserved_foreign_keys: HashSet<(EntityTypeId, usize)>,
}

impl MappingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `conceptual` was derived from `store`
    pub fn add(&mut self, store: StoreItem, conceptual: ConceptualItem) {
        self.store_to_conceptual.insert(store, conceptual);
        self.conceptual_to_store.insert(conceptual, store);
    }

    pub fn conceptual(&self, store: StoreItem) -> Option<ConceptualItem> {
        self.store_to_conceptual.get(&store).copied()
    }

    pub fn store(&self, conceptual: ConceptualItem) -> Option<StoreItem> {
        self.conceptual_to_store.get(&conceptual).copied()
    }

    pub fn len(&self) -> usize {
        self.store_to_conceptual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store_to_conceptual.is_empty()
    }

    pub fn conceptual_entity_type(&self, id: EntityTypeId) -> Option<ConceptualEntityTypeId> {
        match self.conceptual(StoreItem::EntityType(id))? {
            ConceptualItem::EntityType(c) => Some(c),
            _ => None,
        }
    }

    pub fn conceptual_entity_set(&self, id: EntitySetId) -> Option<ConceptualEntitySetId> {
        match self.conceptual(StoreItem::EntitySet(id))? {
            ConceptualItem::EntitySet(c) => Some(c),
            _ => None,
        }
    }

    pub fn conceptual_property(
        &self,
        entity: EntityTypeId,
        index: usize,
    ) -> Option<(ConceptualEntityTypeId, usize)> {
        match self.conceptual(StoreItem::Property(entity, index))? {
            ConceptualItem::Property(c, i) => Some((c, i)),
            _ => None,
        }
    }

    /// Foreign key column kept on the conceptual entity only because it is
    /// part of the entity key
    pub fn add_preserved_foreign_key(&mut self, entity: EntityTypeId, property: usize) {
        self.preserved_foreign_keys.insert((entity, property));
    }

    pub fn is_preserved_foreign_key(&self, entity: EntityTypeId, property: usize) -> bool {
        self.preserved_foreign_keys.contains(&(entity, property))
    }

    pub fn preserved_foreign_key_count(&self) -> usize {
        self.preserved_foreign_keys.len()
    }
}
