//! Unit tests for column to property conversion

use rust_edmgen::model::{ModelBuilderErrorCode, PrimitiveTypeKind, Severity, StoreGeneratedPattern};
use rust_edmgen::project::TargetSchemaVersion;
use rust_edmgen::provider::SqlServerManifest;
use rust_edmgen::reverse::PropertyBuilder;
use rust_edmgen::schema::TableDetailsRow;

use crate::common::column;

fn decimal(precision: i32, scale: i32) -> TableDetailsRow {
    TableDetailsRow {
        precision: Some(precision),
        scale: Some(scale),
        ..column("Invoice", "Total", "decimal")
    }
}

// ============================================================================
// Facet Tests
// ============================================================================

#[test]
fn test_decimal_precision_out_of_range() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    for precision in [0, 39, 255] {
        let err = builder.create_property(&decimal(precision, 0)).unwrap_err();
        assert_eq!(err.code, ModelBuilderErrorCode::FacetValueOutOfRange);
        assert_eq!(err.error_code(), 6006);
        assert_eq!(err.severity, Severity::Warning);
    }
}

#[test]
fn test_decimal_precision_and_scale_in_range_are_kept() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    for (precision, scale) in [(1, 0), (18, 2), (38, 38)] {
        let property = builder.create_property(&decimal(precision, scale)).unwrap();
        assert_eq!(property.type_usage.primitive, PrimitiveTypeKind::Decimal);
        assert_eq!(property.type_usage.facets.precision, Some(precision as u8));
        assert_eq!(property.type_usage.facets.scale, Some(scale as u8));
    }
}

#[test]
fn test_max_length_of_max_types_is_constant() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    for reported in [None, Some(-1), Some(0), Some(50), Some(i32::MAX)] {
        let row = TableDetailsRow {
            maximum_length: reported,
            ..column("Note", "Body", "nvarchar(max)")
        };
        let property = builder.create_property(&row).unwrap();
        assert_eq!(property.type_usage.facets.max_length, Some(1073741823));
        assert_eq!(property.type_usage.facets.unicode, Some(true));
    }
}

#[test]
fn test_length_out_of_range() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let row = TableDetailsRow {
        maximum_length: Some(9000),
        ..column("Note", "Title", "nvarchar")
    };
    let err = builder.create_property(&row).unwrap_err();
    assert_eq!(err.code, ModelBuilderErrorCode::FacetValueOutOfRange);
    assert_eq!(err.source.as_deref(), Some("dbo.Note"));
}

#[test]
fn test_temporal_precision_comes_from_date_time_precision() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let row = TableDetailsRow {
        precision: Some(99),
        date_time_precision: Some(3),
        ..column("Event", "At", "datetime2")
    };
    let property = builder.create_property(&row).unwrap();
    assert_eq!(property.type_usage.primitive, PrimitiveTypeKind::DateTime);
    assert_eq!(property.type_usage.facets.precision, Some(3));
}

// ============================================================================
// Type Resolution Tests
// ============================================================================

#[test]
fn test_unknown_type_is_unsupported() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let err = builder
        .create_property(&column("Node", "Path", "hierarchyid"))
        .unwrap_err();
    assert_eq!(err.code, ModelBuilderErrorCode::UnsupportedType);
    assert_eq!(err.error_code(), 6005);
}

#[test]
fn test_spatial_types_gated_by_version() {
    let manifest = SqlServerManifest::default();
    let row = column("Store", "Location", "geography");

    let v2 = PropertyBuilder::new(&manifest, TargetSchemaVersion::V2.capabilities());
    assert_eq!(
        v2.create_property(&row).unwrap_err().code,
        ModelBuilderErrorCode::UnsupportedType
    );

    let v3 = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());
    assert_eq!(
        v3.create_property(&row).unwrap().type_usage.primitive,
        PrimitiveTypeKind::Geography
    );
}

#[test]
fn test_store_generated_pattern() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let identity = TableDetailsRow {
        is_identity: true,
        is_server_generated: true,
        ..column("T", "Id", "int")
    };
    let computed = TableDetailsRow {
        is_server_generated: true,
        ..column("T", "Total", "int")
    };

    assert_eq!(
        builder.create_property(&identity).unwrap().store_generated_pattern,
        StoreGeneratedPattern::Identity
    );
    assert_eq!(
        builder.create_property(&computed).unwrap().store_generated_pattern,
        StoreGeneratedPattern::Computed
    );
}

// ============================================================================
// Property Set Tests
// ============================================================================

#[test]
fn test_properties_ordered_by_ordinal_and_excluded_columns_recorded() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let rows = [
        TableDetailsRow {
            ordinal: 3,
            ..column("T", "C", "int")
        },
        TableDetailsRow {
            ordinal: 1,
            is_primary_key: true,
            ..column("T", "A", "int")
        },
        TableDetailsRow {
            ordinal: 2,
            ..column("T", "B", "hierarchyid")
        },
    ];
    let refs: Vec<&TableDetailsRow> = rows.iter().collect();
    let set = builder.create_properties(&refs);

    let names: Vec<&str> = set.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
    assert_eq!(set.key_column_names, vec!["A".to_string()]);
    assert_eq!(set.excluded_column_names, vec!["B".to_string()]);
    assert_eq!(set.errors.len(), 1);
}

#[test]
fn test_nullable_key_column_is_coerced() {
    let manifest = SqlServerManifest::default();
    let builder = PropertyBuilder::new(&manifest, TargetSchemaVersion::V3.capabilities());

    let row = TableDetailsRow {
        ordinal: 1,
        is_primary_key: true,
        is_nullable: true,
        ..column("T", "Id", "int")
    };
    let set = builder.create_properties(&[&row]);

    assert!(!set.properties[0].nullable);
    assert_eq!(
        set.errors[0].code,
        ModelBuilderErrorCode::CoercingNullablePrimaryKeyPropertyToNonNullable
    );
}
