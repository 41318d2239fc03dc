//! Conceptual-space object graph

use super::{
    ComplexTypeId, ConceptualAssociationSetId, ConceptualAssociationTypeId,
    ConceptualEntitySetId, ConceptualEntityTypeId, EdmSchemaError, Facets, FunctionImportId,
    OperationAction, ParameterMode, PrimitiveTypeKind, ReferentialConstraint,
    RelationshipMultiplicity, StoreGeneratedPattern,
};

pub const LAZY_LOADING_ENABLED_ANNOTATION: &str = "LazyLoadingEnabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualProperty {
    pub name: String,
    pub primitive: PrimitiveTypeKind,
    pub facets: Facets,
    pub nullable: bool,
    pub store_generated_pattern: StoreGeneratedPattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationProperty {
    pub name: String,
    pub association_type: ConceptualAssociationTypeId,
    pub from_role: String,
    pub to_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualEntityType {
    pub name: String,
    pub namespace: String,
    pub properties: Vec<ConceptualProperty>,
    pub key_members: Vec<String>,
    pub navigation_properties: Vec<NavigationProperty>,
}

impl ConceptualEntityType {
    pub fn property(&self, name: &str) -> Option<&ConceptualProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualEntitySet {
    pub name: String,
    pub entity_type: ConceptualEntityTypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualAssociationEnd {
    pub role: String,
    pub entity_type: ConceptualEntityTypeId,
    pub multiplicity: RelationshipMultiplicity,
    pub delete_behavior: OperationAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualAssociationType {
    pub name: String,
    pub namespace: String,
    pub ends: Vec<ConceptualAssociationEnd>,
    pub referential_constraint: Option<ReferentialConstraint>,
    /// Whether the association is a foreign key association (backed by scalar properties)
    pub is_foreign_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualAssociationSetEnd {
    pub role: String,
    pub entity_set: ConceptualEntitySetId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptualAssociationSet {
    pub name: String,
    pub association_type: ConceptualAssociationTypeId,
    pub ends: Vec<ConceptualAssociationSetEnd>,
}

/// Shape of the rows returned by a table-valued function import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: String,
    pub namespace: String,
    pub properties: Vec<ConceptualProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionImportParameter {
    pub name: String,
    pub primitive: PrimitiveTypeKind,
    pub facets: Facets,
    pub mode: ParameterMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionImport {
    pub name: String,
    pub parameters: Vec<FunctionImportParameter>,
    /// Collection-of-complex-type result for table-valued functions
    pub return_type: Option<ComplexTypeId>,
    pub is_composable: bool,
}

/// Conceptual model projected one-to-one from a storage model
#[derive(Debug, Clone, Default)]
pub struct ConceptualModel {
    pub namespace: String,
    pub container_name: String,
    pub entity_types: Vec<ConceptualEntityType>,
    pub entity_sets: Vec<ConceptualEntitySet>,
    pub association_types: Vec<ConceptualAssociationType>,
    pub association_sets: Vec<ConceptualAssociationSet>,
    pub complex_types: Vec<ComplexType>,
    pub function_imports: Vec<FunctionImport>,
    /// Container annotations as (name, value) pairs
    pub container_annotations: Vec<(String, String)>,
    pub diagnostics: Vec<EdmSchemaError>,
}

impl ConceptualModel {
    pub fn entity_type(&self, id: ConceptualEntityTypeId) -> &ConceptualEntityType {
        &self.entity_types[id.0]
    }

    pub fn entity_set(&self, id: ConceptualEntitySetId) -> &ConceptualEntitySet {
        &self.entity_sets[id.0]
    }

    pub fn association_type(&self, id: ConceptualAssociationTypeId) -> &ConceptualAssociationType {
        &self.association_types[id.0]
    }

    pub fn association_set(&self, id: ConceptualAssociationSetId) -> &ConceptualAssociationSet {
        &self.association_sets[id.0]
    }

    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.0]
    }

    pub fn function_import(&self, id: FunctionImportId) -> &FunctionImport {
        &self.function_imports[id.0]
    }

    pub fn find_entity_type(&self, name: &str) -> Option<&ConceptualEntityType> {
        self.entity_types.iter().find(|t| t.name == name)
    }

    pub fn find_entity_set(&self, name: &str) -> Option<&ConceptualEntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn find_association_set(&self, name: &str) -> Option<&ConceptualAssociationSet> {
        self.association_sets.iter().find(|s| s.name == name)
    }

    pub fn find_function_import(&self, name: &str) -> Option<&FunctionImport> {
        self.function_imports.iter().find(|f| f.name == name)
    }

    pub fn container_annotation(&self, name: &str) -> Option<&str> {
        self.container_annotations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
