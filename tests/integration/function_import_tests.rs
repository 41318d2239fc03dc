//! Integration tests for storage functions and conceptual function imports

use pretty_assertions::assert_eq;

use rust_edmgen::model::{ModelBuilderErrorCode, ParameterMode, PrimitiveTypeKind};
use rust_edmgen::project::TargetSchemaVersion;
use rust_edmgen::schema::{FunctionDetailsRow, TableDetailsRow};

use crate::common::{column, generate, procedure, settings, SchemaBuilder};

fn table_valued(name: &str) -> FunctionDetailsRow {
    FunctionDetailsRow {
        is_composable: true,
        is_tvf: true,
        ..procedure(name, None)
    }
}

fn scalar(name: &str, return_type: &str) -> FunctionDetailsRow {
    FunctionDetailsRow {
        is_composable: true,
        return_type: Some(return_type.to_string()),
        ..procedure(name, None)
    }
}

#[test]
fn test_stored_procedure_becomes_function_import() {
    let details = SchemaBuilder::new()
        .function(procedure("GetOrders", Some(("@CustomerId", "int", "IN"))))
        .function(procedure("GetOrders", Some(("@Total", "decimal", "OUT"))))
        .build();

    let result = generate(details, &settings("Shop"));

    let import = result
        .conceptual_model
        .find_function_import("GetOrders")
        .expect("Function import GetOrders");
    let parameters: Vec<(&str, PrimitiveTypeKind, ParameterMode)> = import
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.primitive, p.mode))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("CustomerId", PrimitiveTypeKind::Int32, ParameterMode::In),
            ("Total", PrimitiveTypeKind::Decimal, ParameterMode::Out),
        ]
    );
    assert!(import.return_type.is_none());
    assert!(!import.is_composable);
}

#[test]
fn test_scalar_function_is_not_imported() {
    let details = SchemaBuilder::new()
        .function(scalar("fnTax", "decimal"))
        .build();

    let result = generate(details, &settings("Shop"));

    assert_eq!(result.store_model.functions.len(), 1);
    assert!(result.store_model.functions[0].is_valid());
    assert!(result.conceptual_model.function_imports.is_empty());
}

#[test]
fn test_table_valued_function_gets_result_complex_type() {
    let details = SchemaBuilder::new()
        .function(table_valued("TopCustomers"))
        .tvf_columns(vec![
            column("TopCustomers", "Id", "int"),
            TableDetailsRow {
                is_nullable: true,
                ..column("TopCustomers", "Name", "nvarchar")
            },
        ])
        .build();

    let result = generate(details, &settings("Shop"));
    let conceptual = &result.conceptual_model;

    let import = conceptual.find_function_import("TopCustomers").unwrap();
    assert!(import.is_composable);
    let complex = conceptual.complex_type(import.return_type.expect("TVF result type"));
    assert_eq!(complex.name, "TopCustomers_Result");
    let names: Vec<&str> = complex.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Id", "Name"]);
    assert!(complex.properties[1].nullable);
}

#[test]
fn test_table_valued_function_without_columns() {
    let details = SchemaBuilder::new()
        .function(table_valued("Broken"))
        .build();

    let result = generate(details, &settings("Shop"));

    assert!(!result.store_model.functions[0].is_valid());
    assert!(result.store_model.functions[0].has_code(ModelBuilderErrorCode::MissingTvfReturnTable));
    assert!(result.conceptual_model.function_imports.is_empty());
}

#[test]
fn test_table_valued_function_before_v3() {
    let details = SchemaBuilder::new()
        .function(table_valued("TopCustomers"))
        .tvf_columns(vec![column("TopCustomers", "Id", "int")])
        .build();

    let mut options = settings("Shop");
    options.target_version = TargetSchemaVersion::V2;
    let result = generate(details, &options);

    let not_supported = ModelBuilderErrorCode::TableValuedFunctionsNotSupported;
    assert!(result.store_model.functions[0].has_code(not_supported));
    assert!(result.conceptual_model.function_imports.is_empty());
}

#[test]
fn test_invalid_parameter_direction() {
    let details = SchemaBuilder::new()
        .function(procedure("Archive", Some(("@before", "datetime", "SIDEWAYS"))))
        .build();

    let result = generate(details, &settings("Shop"));

    let function = &result.store_model.functions[0];
    assert!(!function.is_valid());
    assert!(function.has_code(ModelBuilderErrorCode::ParameterDirectionNotValid));
    assert!(result.conceptual_model.function_imports.is_empty());
}

#[test]
fn test_function_import_names_share_scope_with_sets() {
    let details = SchemaBuilder::new()
        .table(vec![crate::common::key_column("Orders", "Id")])
        .function(procedure("Orders", None))
        .build();

    let result = generate(details, &settings("Shop"));

    assert!(result.conceptual_model.find_entity_set("Orders").is_some());
    assert!(result.conceptual_model.find_function_import("Orders1").is_some());
}
