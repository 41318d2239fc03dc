//! SQL Server provider manifest

use once_cell::sync::Lazy;

use super::{FacetDescription, ProviderManifest, StoreTypeDescriptor};
use crate::model::PrimitiveTypeKind;
use crate::util::eq_ci;

/// Fixed length of `nvarchar(max)`, `ntext` and `xml`
pub const UNICODE_MAX_LENGTH: i32 = 1_073_741_823;
/// Fixed length of `varchar(max)`, `text`, `varbinary(max)` and `image`
pub const NON_UNICODE_MAX_LENGTH: i32 = 2_147_483_647;

/// SQL Server manifest token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SqlServerManifestToken {
    Sql2005,
    Sql2008,
    Sql2012,
}

impl std::str::FromStr for SqlServerManifestToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2005" => Ok(SqlServerManifestToken::Sql2005),
            "2008" => Ok(SqlServerManifestToken::Sql2008),
            "2012" => Ok(SqlServerManifestToken::Sql2012),
            _ => Err(format!("Unknown SQL Server manifest token: {}", s)),
        }
    }
}

impl SqlServerManifestToken {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlServerManifestToken::Sql2005 => "2005",
            SqlServerManifestToken::Sql2008 => "2008",
            SqlServerManifestToken::Sql2012 => "2012",
        }
    }
}

fn string_type(
    name: &'static str,
    max_length: FacetDescription,
    fixed_length: bool,
    unicode: bool,
) -> StoreTypeDescriptor {
    StoreTypeDescriptor {
        max_length: Some(max_length),
        fixed_length: Some(fixed_length),
        unicode: Some(unicode),
        ..StoreTypeDescriptor::simple(name, PrimitiveTypeKind::String)
    }
}

fn binary_type(
    name: &'static str,
    max_length: FacetDescription,
    fixed_length: bool,
) -> StoreTypeDescriptor {
    StoreTypeDescriptor {
        max_length: Some(max_length),
        fixed_length: Some(fixed_length),
        ..StoreTypeDescriptor::simple(name, PrimitiveTypeKind::Binary)
    }
}

fn decimal_type(
    name: &'static str,
    precision: FacetDescription,
    scale: FacetDescription,
) -> StoreTypeDescriptor {
    StoreTypeDescriptor {
        precision: Some(precision),
        scale: Some(scale),
        ..StoreTypeDescriptor::simple(name, PrimitiveTypeKind::Decimal)
    }
}

fn temporal_type(
    name: &'static str,
    primitive: PrimitiveTypeKind,
    precision: FacetDescription,
) -> StoreTypeDescriptor {
    StoreTypeDescriptor {
        precision: Some(precision),
        ..StoreTypeDescriptor::simple(name, primitive)
    }
}

/// Types available from SQL Server 2005 on
static SQL2005_TYPES: Lazy<Vec<StoreTypeDescriptor>> = Lazy::new(|| {
    use PrimitiveTypeKind::*;
    vec![
        StoreTypeDescriptor::simple("bigint", Int64),
        StoreTypeDescriptor::simple("int", Int32),
        StoreTypeDescriptor::simple("smallint", Int16),
        StoreTypeDescriptor::simple("tinyint", Byte),
        StoreTypeDescriptor::simple("bit", Boolean),
        StoreTypeDescriptor::simple("float", Double),
        StoreTypeDescriptor::simple("real", Single),
        StoreTypeDescriptor::simple("uniqueidentifier", Guid),
        decimal_type(
            "decimal",
            FacetDescription::ranged(1, 38, 18),
            FacetDescription::ranged(0, 38, 0),
        ),
        decimal_type(
            "numeric",
            FacetDescription::ranged(1, 38, 18),
            FacetDescription::ranged(0, 38, 0),
        ),
        decimal_type("money", FacetDescription::constant(19), FacetDescription::constant(4)),
        decimal_type("smallmoney", FacetDescription::constant(10), FacetDescription::constant(4)),
        temporal_type("datetime", DateTime, FacetDescription::constant(3)),
        StoreTypeDescriptor::simple("smalldatetime", DateTime),
        string_type("char", FacetDescription::ranged(1, 8000, 8000), true, false),
        string_type("varchar", FacetDescription::ranged(1, 8000, 8000), false, false),
        string_type(
            "varchar(max)",
            FacetDescription::constant(NON_UNICODE_MAX_LENGTH),
            false,
            false,
        ),
        string_type("text", FacetDescription::constant(NON_UNICODE_MAX_LENGTH), false, false),
        string_type("nchar", FacetDescription::ranged(1, 4000, 4000), true, true),
        string_type("nvarchar", FacetDescription::ranged(1, 4000, 4000), false, true),
        string_type("nvarchar(max)", FacetDescription::constant(UNICODE_MAX_LENGTH), false, true),
        string_type("ntext", FacetDescription::constant(UNICODE_MAX_LENGTH), false, true),
        string_type("xml", FacetDescription::constant(UNICODE_MAX_LENGTH), false, true),
        binary_type("binary", FacetDescription::ranged(1, 8000, 8000), true),
        binary_type("varbinary", FacetDescription::ranged(1, 8000, 8000), false),
        binary_type("varbinary(max)", FacetDescription::constant(NON_UNICODE_MAX_LENGTH), false),
        binary_type("image", FacetDescription::constant(NON_UNICODE_MAX_LENGTH), false),
        binary_type("rowversion", FacetDescription::constant(8), true),
        binary_type("timestamp", FacetDescription::constant(8), true),
    ]
});

/// Types added in SQL Server 2008
static SQL2008_TYPES: Lazy<Vec<StoreTypeDescriptor>> = Lazy::new(|| {
    use PrimitiveTypeKind::*;
    vec![
        StoreTypeDescriptor::simple("date", DateTime),
        temporal_type("time", Time, FacetDescription::ranged(0, 7, 7)),
        temporal_type("datetime2", DateTime, FacetDescription::ranged(0, 7, 7)),
        temporal_type("datetimeoffset", DateTimeOffset, FacetDescription::ranged(0, 7, 7)),
        StoreTypeDescriptor::simple("geography", Geography),
        StoreTypeDescriptor::simple("geometry", Geometry),
    ]
});

/// SQL Server type resolution for one manifest token
#[derive(Debug, Clone)]
pub struct SqlServerManifest {
    invariant_name: String,
    token: SqlServerManifestToken,
}

impl SqlServerManifest {
    pub fn new(invariant_name: &str, token: SqlServerManifestToken) -> Self {
        Self {
            invariant_name: invariant_name.to_string(),
            token,
        }
    }

    fn types(&self) -> impl Iterator<Item = &'static StoreTypeDescriptor> {
        let newer: &'static [StoreTypeDescriptor] =
            if self.token >= SqlServerManifestToken::Sql2008 {
                &SQL2008_TYPES
            } else {
                &[]
            };
        SQL2005_TYPES.iter().chain(newer.iter())
    }
}

impl Default for SqlServerManifest {
    fn default() -> Self {
        Self::new("System.Data.SqlClient", SqlServerManifestToken::Sql2008)
    }
}

impl ProviderManifest for SqlServerManifest {
    fn invariant_name(&self) -> &str {
        &self.invariant_name
    }

    fn manifest_token(&self) -> &str {
        self.token.as_str()
    }

    fn store_type(&self, name: &str) -> Option<&StoreTypeDescriptor> {
        let name = name.trim();
        self.types().find(|t| eq_ci(t.name, name))
    }
}
