//! Target Entity Framework schema version and the behaviors it gates

use serde::{Deserialize, Serialize};

use crate::error::EdmGenError;
use crate::model::PrimitiveTypeKind;

/// Target EDM schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetSchemaVersion {
    V1, // EF 3.5
    V2, // EF 4
    V3, // EF 5 / 6
}

impl Default for TargetSchemaVersion {
    fn default() -> Self {
        TargetSchemaVersion::V3
    }
}

impl std::str::FromStr for TargetSchemaVersion {
    type Err = EdmGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" | "1.0" | "3.5" => Ok(TargetSchemaVersion::V1),
            "v2" | "2" | "2.0" | "4.0" => Ok(TargetSchemaVersion::V2),
            "v3" | "3" | "3.0" | "5.0" | "6.0" => Ok(TargetSchemaVersion::V3),
            _ => Err(EdmGenError::UnknownTargetVersion {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TargetSchemaVersion {
    type Error = EdmGenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetSchemaVersion> for String {
    fn from(version: TargetSchemaVersion) -> Self {
        version.to_string()
    }
}

impl std::fmt::Display for TargetSchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TargetSchemaVersion::V1 => "v1",
            TargetSchemaVersion::V2 => "v2",
            TargetSchemaVersion::V3 => "v3",
        };
        f.write_str(name)
    }
}

impl TargetSchemaVersion {
    /// The behavior switches for this version
    pub fn capabilities(&self) -> VersionCapabilities {
        match self {
            TargetSchemaVersion::V1 => VersionCapabilities {
                version: *self,
                supports_spatial: false,
                supports_foreign_key_associations: false,
                supports_lazy_loading_annotation: false,
                supports_table_valued_functions: false,
                supports_binary_keys: false,
            },
            TargetSchemaVersion::V2 => VersionCapabilities {
                version: *self,
                supports_spatial: false,
                supports_foreign_key_associations: false,
                supports_lazy_loading_annotation: true,
                supports_table_valued_functions: false,
                supports_binary_keys: true,
            },
            TargetSchemaVersion::V3 => VersionCapabilities {
                version: *self,
                supports_spatial: true,
                supports_foreign_key_associations: true,
                supports_lazy_loading_annotation: true,
                supports_table_valued_functions: true,
                supports_binary_keys: true,
            },
        }
    }
}

/// Everything that differs between target versions, resolved once per pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCapabilities {
    pub version: TargetSchemaVersion,
    pub supports_spatial: bool,
    pub supports_foreign_key_associations: bool,
    pub supports_lazy_loading_annotation: bool,
    pub supports_table_valued_functions: bool,
    pub supports_binary_keys: bool,
}

impl VersionCapabilities {
    /// Whether a column of `kind` may be used at all
    pub fn is_supported_type(&self, kind: PrimitiveTypeKind) -> bool {
        !kind.is_spatial() || self.supports_spatial
    }

    /// Whether a column of `kind` may be an entity key member
    pub fn is_valid_key_type(&self, kind: PrimitiveTypeKind) -> bool {
        match kind {
            PrimitiveTypeKind::Geography | PrimitiveTypeKind::Geometry => false,
            PrimitiveTypeKind::Binary => self.supports_binary_keys,
            _ => true,
        }
    }
}
