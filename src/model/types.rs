//! Primitive types, facets and type usages shared by both model spaces

use serde::Serialize;

/// EDM primitive type kinds a store type can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Geography,
    Geometry,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
    Time,
}

impl PrimitiveTypeKind {
    pub fn is_spatial(self) -> bool {
        matches!(self, PrimitiveTypeKind::Geography | PrimitiveTypeKind::Geometry)
    }

    /// Date/time kinds whose precision comes from the datetime precision column
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PrimitiveTypeKind::DateTime
                | PrimitiveTypeKind::DateTimeOffset
                | PrimitiveTypeKind::Time
        )
    }

    /// Name of the type in the `Edm` namespace
    pub fn edm_name(self) -> &'static str {
        match self {
            PrimitiveTypeKind::Binary => "Binary",
            PrimitiveTypeKind::Boolean => "Boolean",
            PrimitiveTypeKind::Byte => "Byte",
            PrimitiveTypeKind::DateTime => "DateTime",
            PrimitiveTypeKind::DateTimeOffset => "DateTimeOffset",
            PrimitiveTypeKind::Decimal => "Decimal",
            PrimitiveTypeKind::Double => "Double",
            PrimitiveTypeKind::Geography => "Geography",
            PrimitiveTypeKind::Geometry => "Geometry",
            PrimitiveTypeKind::Guid => "Guid",
            PrimitiveTypeKind::Int16 => "Int16",
            PrimitiveTypeKind::Int32 => "Int32",
            PrimitiveTypeKind::Int64 => "Int64",
            PrimitiveTypeKind::Single => "Single",
            PrimitiveTypeKind::String => "String",
            PrimitiveTypeKind::Time => "Time",
        }
    }
}

impl std::fmt::Display for PrimitiveTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.edm_name())
    }
}

/// Facet values attached to a type usage. Unset facets do not apply to the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub max_length: Option<i32>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

/// How the store populates a column on insert/update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StoreGeneratedPattern {
    #[default]
    None,
    Identity,
    Computed,
}

impl StoreGeneratedPattern {
    /// Identity wins when a column is flagged as both identity and server-generated
    pub fn from_flags(is_identity: bool, is_server_generated: bool) -> Self {
        if is_identity {
            StoreGeneratedPattern::Identity
        } else if is_server_generated {
            StoreGeneratedPattern::Computed
        } else {
            StoreGeneratedPattern::None
        }
    }
}

/// A resolved store type plus its facet values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeUsage {
    /// Provider type name (e.g., "nvarchar(max)")
    pub store_type_name: String,
    pub primitive: PrimitiveTypeKind,
    pub facets: Facets,
}
