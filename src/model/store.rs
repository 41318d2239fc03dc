//! Storage-space object graph

use super::{
    AssociationSetId, AssociationTypeId, Built, EdmSchemaError, EntitySetId, EntityTypeId,
    FunctionId, StoreGeneratedPattern, TypeUsage,
};

/// Storage property (one table column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmProperty {
    /// Column name
    pub name: String,
    pub type_usage: TypeUsage,
    pub nullable: bool,
    pub store_generated_pattern: StoreGeneratedPattern,
}

/// Storage entity type (one table or view)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    pub name: String,
    pub namespace: String,
    pub properties: Vec<EdmProperty>,
    /// Names of the key properties, in column ordinal order
    pub key_members: Vec<String>,
}

impl EntityType {
    pub fn property(&self, name: &str) -> Option<&EdmProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_key_member(&self, name: &str) -> bool {
        self.key_members.iter().any(|k| k == name)
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Which kind of store object an entity set maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreObjectType {
    Tables,
    Views,
}

impl StoreObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreObjectType::Tables => "Tables",
            StoreObjectType::Views => "Views",
        }
    }
}

/// Storage entity set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub name: String,
    pub entity_type: EntityTypeId,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    /// Physical table or view name
    pub table: String,
    pub store_object_type: StoreObjectType,
    /// Query substituted for the table when the entity cannot be fully key-mapped
    pub defining_query: Option<String>,
}

impl EntitySet {
    /// Entities mapped through a defining query cannot be updated
    pub fn is_read_only(&self) -> bool {
        self.defining_query.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipMultiplicity {
    ZeroOrOne,
    One,
    Many,
}

impl RelationshipMultiplicity {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipMultiplicity::ZeroOrOne => "0..1",
            RelationshipMultiplicity::One => "1",
            RelationshipMultiplicity::Many => "*",
        }
    }
}

/// Delete behavior of an association end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OperationAction {
    #[default]
    None,
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEndMember {
    pub role: String,
    pub entity_type: EntityTypeId,
    pub multiplicity: RelationshipMultiplicity,
    pub delete_behavior: OperationAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraint {
    pub principal_role: String,
    pub dependent_role: String,
    pub principal_properties: Vec<String>,
    pub dependent_properties: Vec<String>,
}

/// Storage association type built from one database relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationType {
    pub name: String,
    pub namespace: String,
    /// Relationship id reported by the schema source
    pub relationship_id: String,
    /// Principal end first, dependent end second; empty when the ends could not be resolved
    pub ends: Vec<AssociationEndMember>,
    /// Referenced columns, in relationship ordinal order
    pub principal_properties: Vec<String>,
    /// Referencing columns, paired positionally with `principal_properties`
    pub dependent_properties: Vec<String>,
    pub referential_constraint: Option<ReferentialConstraint>,
}

impl AssociationType {
    pub fn principal_end(&self) -> Option<&AssociationEndMember> {
        self.ends.first()
    }

    pub fn dependent_end(&self) -> Option<&AssociationEndMember> {
        self.ends.get(1)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.referential_constraint.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSetEnd {
    pub role: String,
    pub entity_set: EntitySetId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSet {
    pub name: String,
    pub association_type: AssociationTypeId,
    pub ends: Vec<AssociationSetEnd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterMode {
    In,
    Out,
    InOut,
}

impl ParameterMode {
    /// Parse a schema direction string; only `IN`, `OUT` and `INOUT` are valid
    pub fn from_direction(direction: &str) -> Option<Self> {
        match direction {
            "IN" => Some(ParameterMode::In),
            "OUT" => Some(ParameterMode::Out),
            "INOUT" => Some(ParameterMode::InOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParameter {
    pub name: String,
    pub type_usage: TypeUsage,
    pub mode: ParameterMode,
}

/// Row shape returned by a table-valued function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowType {
    /// Fully qualified name of the function the row type belongs to
    pub name: String,
    pub properties: Vec<EdmProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnParameter {
    Scalar(TypeUsage),
    Table(RowType),
}

/// Storage function, procedure or table-valued function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFunction {
    pub name: String,
    pub namespace: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    /// Original routine name when `name` had to be sanitized or uniquified
    pub store_function_name: Option<String>,
    pub is_aggregate: bool,
    pub is_builtin: bool,
    pub is_niladic: bool,
    pub is_composable: bool,
    pub is_tvf: bool,
    pub parameters: Vec<FunctionParameter>,
    pub return_parameter: Option<ReturnParameter>,
}

impl StoreFunction {
    /// Name of the routine in the database
    pub fn routine_name(&self) -> &str {
        self.store_function_name.as_deref().unwrap_or(&self.name)
    }
}

/// A junction entity set replaced by a many-to-many association in conceptual space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleAssociation {
    pub entity_set: EntitySetId,
    /// The two association sets whose dependent end is the junction set
    pub association_sets: [AssociationSetId; 2],
}

/// Complete storage-space model produced by one reverse-engineering pass
#[derive(Debug, Clone, Default)]
pub struct StoreModel {
    pub namespace: String,
    pub container_name: String,
    pub entity_types: Vec<Built<EntityType>>,
    pub entity_sets: Vec<EntitySet>,
    pub association_types: Vec<Built<AssociationType>>,
    pub association_sets: Vec<AssociationSet>,
    pub functions: Vec<Built<StoreFunction>>,
    pub collapsible_associations: Vec<CollapsibleAssociation>,
    /// Association types whose foreign key columns also back another relationship
    pub shared_foreign_keys: Vec<AssociationTypeId>,
}

impl StoreModel {
    pub fn entity_type(&self, id: EntityTypeId) -> &EntityType {
        self.entity_types[id.0].item()
    }

    pub fn entity_set(&self, id: EntitySetId) -> &EntitySet {
        &self.entity_sets[id.0]
    }

    pub fn association_type(&self, id: AssociationTypeId) -> &AssociationType {
        self.association_types[id.0].item()
    }

    pub fn association_set(&self, id: AssociationSetId) -> &AssociationSet {
        &self.association_sets[id.0]
    }

    pub fn function(&self, id: FunctionId) -> &Built<StoreFunction> {
        &self.functions[id.0]
    }

    pub fn entity_set_ids(&self) -> impl Iterator<Item = EntitySetId> {
        (0..self.entity_sets.len()).map(EntitySetId)
    }

    pub fn association_set_ids(&self) -> impl Iterator<Item = AssociationSetId> {
        (0..self.association_sets.len()).map(AssociationSetId)
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> {
        (0..self.functions.len()).map(FunctionId)
    }

    pub fn find_entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_sets.iter().find(|s| s.name == name)
    }

    pub fn find_association_set(&self, name: &str) -> Option<&AssociationSet> {
        self.association_sets.iter().find(|s| s.name == name)
    }

    /// Entity set mapping the given entity type, if one was created
    pub fn entity_set_for_type(&self, id: EntityTypeId) -> Option<EntitySetId> {
        self.entity_sets
            .iter()
            .position(|s| s.entity_type == id)
            .map(EntitySetId)
    }

    pub fn is_collapsed(&self, id: EntitySetId) -> bool {
        self.collapsible_associations.iter().any(|c| c.entity_set == id)
    }

    /// Every diagnostic attached to any object of the model, in build order
    pub fn diagnostics(&self) -> Vec<EdmSchemaError> {
        let entity = self.entity_types.iter().flat_map(|t| t.diagnostics());
        let association = self.association_types.iter().flat_map(|t| t.diagnostics());
        let function = self.functions.iter().flat_map(|f| f.diagnostics());
        entity.chain(association).chain(function).cloned().collect()
    }
}
