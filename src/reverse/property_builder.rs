//! Column row to storage property conversion
//!
//! A column whose type cannot be resolved, is gated out of the target
//! version, or carries an out-of-range facet is excluded with a diagnostic.
//! The rest of the table is still built.

use tracing::debug;

use crate::model::{
    EdmProperty, EdmSchemaError, Facets, ModelBuilderErrorCode, StoreGeneratedPattern, TypeUsage,
};
use crate::naming::{NameComparer, UniqueIdentifierService};
use crate::project::VersionCapabilities;
use crate::provider::{FacetDescription, ProviderManifest, StoreTypeDescriptor};
use crate::schema::TableDetailsRow;

/// Why a store type name could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolutionError {
    /// No type name was reported
    Missing,
    /// The provider does not know the type
    Unknown(String),
    /// The type exists but the target version does not support it
    NotSupportedByVersion(String),
}

/// Resolve a store type name against the provider and the target version
pub fn resolve_store_type<'m>(
    manifest: &'m dyn ProviderManifest,
    capabilities: &VersionCapabilities,
    type_name: Option<&str>,
) -> Result<&'m StoreTypeDescriptor, TypeResolutionError> {
    let type_name = type_name
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TypeResolutionError::Missing)?;

    let descriptor = manifest
        .store_type(type_name)
        .ok_or_else(|| TypeResolutionError::Unknown(type_name.to_string()))?;

    if !capabilities.is_supported_type(descriptor.primitive) {
        return Err(TypeResolutionError::NotSupportedByVersion(type_name.to_string()));
    }
    Ok(descriptor)
}

/// Facet values a type takes when nothing is reported (function parameters)
pub fn default_facets(descriptor: &StoreTypeDescriptor) -> Facets {
    Facets {
        max_length: descriptor.max_length.map(|f| f.default),
        fixed_length: descriptor.fixed_length,
        unicode: descriptor.unicode,
        precision: descriptor.precision.map(|f| f.default as u8),
        scale: descriptor.scale.map(|f| f.default as u8),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FacetKind {
    MaxLength,
    Precision,
    Scale,
}

impl FacetKind {
    fn name(self) -> &'static str {
        match self {
            FacetKind::MaxLength => "MaxLength",
            FacetKind::Precision => "Precision",
            FacetKind::Scale => "Scale",
        }
    }
}

struct FacetOutOfRange {
    kind: FacetKind,
    value: i32,
    description: FacetDescription,
}

/// Value a facet takes for a column.
///
/// Constant lengths ignore the reported value (the `(max)` types report -1).
/// Constant precision/scale only accept the constant itself.
fn facet_value(
    kind: FacetKind,
    description: Option<FacetDescription>,
    reported: Option<i32>,
) -> Result<Option<i32>, FacetOutOfRange> {
    let Some(description) = description else {
        return Ok(None);
    };

    match reported {
        None => Ok(Some(description.default)),
        Some(_) if description.is_constant && kind == FacetKind::MaxLength => {
            Ok(Some(description.default))
        }
        Some(value) if description.contains(value) => Ok(Some(value)),
        Some(value) => Err(FacetOutOfRange {
            kind,
            value,
            description,
        }),
    }
}

/// Result of converting all columns of one table
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    /// Usable properties in ordinal order
    pub properties: Vec<EdmProperty>,
    /// Property names of every column flagged as primary key, excluded or not
    pub key_column_names: Vec<String>,
    /// Columns dropped because their property failed validation
    pub excluded_column_names: Vec<String>,
    /// Primary key columns whose type cannot be a key
    pub invalid_key_type_column_names: Vec<String>,
    pub errors: Vec<EdmSchemaError>,
}

/// Builds storage properties from column rows
pub struct PropertyBuilder<'a> {
    manifest: &'a dyn ProviderManifest,
    capabilities: VersionCapabilities,
}

impl<'a> PropertyBuilder<'a> {
    pub fn new(manifest: &'a dyn ProviderManifest, capabilities: VersionCapabilities) -> Self {
        Self {
            manifest,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &VersionCapabilities {
        &self.capabilities
    }

    /// Convert one column into a property, or explain why it is excluded
    pub fn create_property(&self, row: &TableDetailsRow) -> Result<EdmProperty, EdmSchemaError> {
        let table = row.table_key().to_string();

        let descriptor = resolve_store_type(self.manifest, &self.capabilities, row.data_type())
            .map_err(|e| unsupported_column_type(&e, row, &table))?;

        let precision_reported = if descriptor.primitive.is_temporal() {
            row.date_time_precision
        } else {
            row.precision
        };

        let facets = (|| {
            let max_length =
                facet_value(FacetKind::MaxLength, descriptor.max_length, row.maximum_length)?;
            let precision =
                facet_value(FacetKind::Precision, descriptor.precision, precision_reported)?;
            let scale = facet_value(FacetKind::Scale, descriptor.scale, row.scale)?;
            Ok::<Facets, FacetOutOfRange>(Facets {
                max_length,
                fixed_length: descriptor.fixed_length,
                unicode: descriptor.unicode,
                precision: precision.map(|v| v as u8),
                scale: scale.map(|v| v as u8),
            })
        })()
        .map_err(|e| {
            EdmSchemaError::warning(
                ModelBuilderErrorCode::FacetValueOutOfRange,
                format!(
                    "The {} value {} of column '{}' in table '{}' is out of range [{}, {}] for data type '{}'. The column was excluded.",
                    e.kind.name(),
                    e.value,
                    row.column_name,
                    table,
                    e.description.min,
                    e.description.max,
                    descriptor.name
                ),
            )
            .with_source(table.clone())
        })?;

        Ok(EdmProperty {
            name: row.column_name.clone(),
            type_usage: TypeUsage {
                store_type_name: descriptor.name.to_string(),
                primitive: descriptor.primitive,
                facets,
            },
            nullable: row.is_nullable,
            store_generated_pattern: StoreGeneratedPattern::from_flags(
                row.is_identity,
                row.is_server_generated,
            ),
        })
    }

    /// Convert the columns of one table in ordinal order
    pub fn create_properties(&self, rows: &[&TableDetailsRow]) -> PropertySet {
        let mut ordered: Vec<&TableDetailsRow> = rows.to_vec();
        ordered.sort_by_key(|r| r.ordinal);

        let mut names: UniqueIdentifierService =
            UniqueIdentifierService::new(NameComparer::Ordinal);
        let mut set = PropertySet::default();

        for row in ordered {
            match self.create_property(row) {
                Ok(mut property) => {
                    property.name = names.adjust_identifier(&property.name, None);
                    if row.is_primary_key {
                        set.key_column_names.push(property.name.clone());
                        if !self.capabilities.is_valid_key_type(property.type_usage.primitive) {
                            set.invalid_key_type_column_names.push(property.name.clone());
                        }
                        if property.nullable {
                            property.nullable = false;
                            set.errors.push(nullable_key_coerced(row));
                        }
                    }
                    set.properties.push(property);
                }
                Err(error) => {
                    debug!(column = %row.column_name, table = %row.table_key(), "column excluded");
                    set.excluded_column_names.push(row.column_name.clone());
                    if row.is_primary_key {
                        set.key_column_names.push(row.column_name.clone());
                    }
                    set.errors.push(error);
                }
            }
        }
        set
    }
}

fn nullable_key_coerced(row: &TableDetailsRow) -> EdmSchemaError {
    EdmSchemaError::warning(
        ModelBuilderErrorCode::CoercingNullablePrimaryKeyPropertyToNonNullable,
        format!(
            "The nullable column '{}' in table '{}' is part of the primary key and was made non-nullable.",
            row.column_name,
            row.table_key()
        ),
    )
    .with_source(row.table_key().to_string())
}

fn unsupported_column_type(
    error: &TypeResolutionError,
    row: &TableDetailsRow,
    table: &str,
) -> EdmSchemaError {
    let message = match error {
        TypeResolutionError::Missing => format!(
            "The column '{}' in table '{}' has no data type. The column was excluded.",
            row.column_name, table
        ),
        TypeResolutionError::Unknown(type_name) => format!(
            "The data type '{}' is not supported; the column '{}' in table '{}' was excluded.",
            type_name, row.column_name, table
        ),
        TypeResolutionError::NotSupportedByVersion(type_name) => format!(
            "The data type '{}' is currently not supported for the target Entity Framework version; the column '{}' in table '{}' was excluded.",
            type_name, row.column_name, table
        ),
    };
    EdmSchemaError::warning(ModelBuilderErrorCode::UnsupportedType, message).with_source(table)
}
