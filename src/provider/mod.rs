//! Provider manifests: resolution of store type names to EDM primitive types

mod sql_server;

pub use sql_server::{SqlServerManifest, SqlServerManifestToken};

use crate::error::EdmGenError;
use crate::model::PrimitiveTypeKind;

/// Bounds and default of one numeric facet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetDescription {
    pub min: i32,
    pub max: i32,
    pub default: i32,
    /// Constant facets always carry `default`, whatever the schema reports
    pub is_constant: bool,
}

impl FacetDescription {
    pub const fn ranged(min: i32, max: i32, default: i32) -> Self {
        Self {
            min,
            max,
            default,
            is_constant: false,
        }
    }

    pub const fn constant(value: i32) -> Self {
        Self {
            min: value,
            max: value,
            default: value,
            is_constant: true,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A provider type and the facets it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTypeDescriptor {
    pub name: &'static str,
    pub primitive: PrimitiveTypeKind,
    pub max_length: Option<FacetDescription>,
    pub precision: Option<FacetDescription>,
    pub scale: Option<FacetDescription>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
}

impl StoreTypeDescriptor {
    pub const fn simple(name: &'static str, primitive: PrimitiveTypeKind) -> Self {
        Self {
            name,
            primitive,
            max_length: None,
            precision: None,
            scale: None,
            fixed_length: None,
            unicode: None,
        }
    }
}

/// Maps provider type names to primitive kinds and facet rules
pub trait ProviderManifest {
    /// Invariant name of the provider (e.g., "System.Data.SqlClient")
    fn invariant_name(&self) -> &str;

    /// Manifest token the manifest was created for (e.g., "2008")
    fn manifest_token(&self) -> &str;

    /// Resolve a store type name; `None` when the provider does not know the type
    fn store_type(&self, name: &str) -> Option<&StoreTypeDescriptor>;
}

/// Create the manifest for a provider invariant name and manifest token
pub fn resolve_provider_manifest(
    invariant_name: &str,
    manifest_token: &str,
) -> Result<Box<dyn ProviderManifest>, EdmGenError> {
    match invariant_name {
        "System.Data.SqlClient" | "Microsoft.Data.SqlClient" => {
            let token: SqlServerManifestToken =
                manifest_token
                    .parse()
                    .map_err(|_| EdmGenError::UnsupportedManifestToken {
                        invariant_name: invariant_name.to_string(),
                        token: manifest_token.to_string(),
                    })?;
            Ok(Box::new(SqlServerManifest::new(invariant_name, token)))
        }
        _ => Err(EdmGenError::UnsupportedProvider {
            invariant_name: invariant_name.to_string(),
        }),
    }
}
