//! Integration tests for the storage to conceptual pipeline

use pretty_assertions::assert_eq;

use rust_edmgen::model::{
    ModelBuilderErrorCode, RelationshipMultiplicity, Severity, LAZY_LOADING_ENABLED_ANNOTATION,
};
use rust_edmgen::project::TargetSchemaVersion;
use rust_edmgen::reverse::{ConceptualItem, StoreItem};
use rust_edmgen::schema::TableDetailsRow;

use crate::common::{column, generate, key_column, relationship, settings, SchemaBuilder};

fn nullable(row: TableDetailsRow) -> TableDetailsRow {
    TableDetailsRow {
        is_nullable: true,
        ..row
    }
}

// ============================================================================
// Relationship Scenarios
// ============================================================================

#[test]
fn test_foreign_key_inside_composite_key_is_one_to_many() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("A", "Id")])
        .table(vec![key_column("C", "Id"), key_column("C", "Col1")])
        .relationship(relationship("R1", ("A", "Id"), ("C", "Id")))
        .build();

    let result = generate(details, &settings("M"));
    let store = &result.store_model;

    assert!(store.collapsible_associations.is_empty());
    let set = store.find_association_set("R1").expect("Store association set R1");
    let association = store.association_type(set.association_type);
    assert_eq!(association.ends[0].role, "A");
    assert_eq!(association.ends[0].multiplicity, RelationshipMultiplicity::One);
    assert_eq!(association.ends[1].role, "C");
    // C.Id alone does not identify a C row, so one A can own many C rows
    assert_eq!(association.ends[1].multiplicity, RelationshipMultiplicity::Many);
    let constraint = association
        .referential_constraint
        .as_ref()
        .expect("Referential constraint on R1");
    assert_eq!(constraint.principal_properties, vec!["Id".to_string()]);
    assert_eq!(constraint.dependent_properties, vec!["Id".to_string()]);

    let conceptual = &result.conceptual_model;
    let conceptual_set = conceptual
        .find_association_set("R1")
        .expect("Conceptual association set R1");
    assert!(conceptual.association_type(conceptual_set.association_type).is_foreign_key);
    assert_eq!(conceptual.entity_sets.len(), 2);
}

#[test]
fn test_junction_table_becomes_many_to_many() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("A", "Id")])
        .table(vec![key_column("B", "Col1")])
        .table(vec![key_column("C", "Id"), key_column("C", "Col1")])
        .relationship(relationship("R1", ("A", "Id"), ("C", "Id")))
        .relationship(relationship("R2", ("B", "Col1"), ("C", "Col1")))
        .build();

    let result = generate(details, &settings("M"));

    let store = &result.store_model;
    assert_eq!(store.collapsible_associations.len(), 1);
    let junction = store.find_entity_set("C").expect("Store keeps the junction set");
    assert_eq!(junction.table, "C");

    let conceptual = &result.conceptual_model;
    let set_names: Vec<&str> = conceptual.entity_sets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(set_names, vec!["As", "Bs"]);
    assert!(conceptual.find_entity_type("C").is_none());

    assert_eq!(conceptual.association_sets.len(), 1);
    let set = conceptual.find_association_set("C").expect("Many-to-many association set C");
    let association = conceptual.association_type(set.association_type);
    assert!(association.referential_constraint.is_none());
    assert!(!association.is_foreign_key);
    let ends: Vec<(&str, RelationshipMultiplicity)> = association
        .ends
        .iter()
        .map(|e| (e.role.as_str(), e.multiplicity))
        .collect();
    assert_eq!(
        ends,
        vec![
            ("A", RelationshipMultiplicity::Many),
            ("B", RelationshipMultiplicity::Many)
        ]
    );

    let a = conceptual.find_entity_type("A").unwrap();
    assert!(a.navigation_property("Bs").is_some());
    let b = conceptual.find_entity_type("B").unwrap();
    assert!(b.navigation_property("As").is_some());

    let junction_id = store
        .entity_set_ids()
        .find(|id| store.entity_set(*id).name == "C")
        .unwrap();
    assert!(matches!(
        result.mapping_context.conceptual(StoreItem::EntitySet(junction_id)),
        Some(ConceptualItem::AssociationSet(_))
    ));
}

#[test]
fn test_junction_with_payload_column_is_not_collapsed() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("A", "Id")])
        .table(vec![key_column("B", "Id")])
        .table(vec![
            key_column("AB", "AId"),
            key_column("AB", "BId"),
            column("AB", "Weight", "int"),
        ])
        .relationship(relationship("FK_AB_A", ("A", "Id"), ("AB", "AId")))
        .relationship(relationship("FK_AB_B", ("B", "Id"), ("AB", "BId")))
        .build();

    let result = generate(details, &settings("M"));

    assert!(result.store_model.collapsible_associations.is_empty());
    assert!(result.conceptual_model.find_entity_set("ABs").is_some());
    assert_eq!(result.conceptual_model.association_sets.len(), 2);
}

#[test]
fn test_one_to_many_navigation_properties() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Customer", "Id"), column("Customer", "Name", "nvarchar")])
        .table(vec![key_column("Order", "Id"), column("Order", "CustomerId", "int")])
        .relationship(relationship(
            "FK_Order_Customer",
            ("Customer", "Id"),
            ("Order", "CustomerId"),
        ))
        .build();

    let result = generate(details, &settings("Shop"));
    let conceptual = &result.conceptual_model;

    let customer = conceptual.find_entity_type("Customer").unwrap();
    let orders = customer.navigation_property("Orders").expect("Customer.Orders");
    assert_eq!(orders.from_role, "Customer");
    assert_eq!(orders.to_role, "Order");

    let order = conceptual.find_entity_type("Order").unwrap();
    assert!(order.navigation_property("Customer").is_some());
    assert!(order.property("CustomerId").is_some());

    let set = conceptual.find_association_set("FK_Order_Customer").unwrap();
    let association = conceptual.association_type(set.association_type);
    assert_eq!(association.ends[0].multiplicity, RelationshipMultiplicity::One);
    assert_eq!(association.ends[1].multiplicity, RelationshipMultiplicity::Many);
    let constraint = association.referential_constraint.as_ref().unwrap();
    assert_eq!(constraint.dependent_properties, vec!["CustomerId".to_string()]);
}

#[test]
fn test_nullable_foreign_key_gives_optional_principal() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Customer", "Id")])
        .table(vec![
            key_column("Order", "Id"),
            nullable(column("Order", "CustomerId", "int")),
        ])
        .relationship(relationship(
            "FK_Order_Customer",
            ("Customer", "Id"),
            ("Order", "CustomerId"),
        ))
        .build();

    let result = generate(details, &settings("Shop"));
    let set = result.conceptual_model.find_association_set("FK_Order_Customer").unwrap();
    let association = result.conceptual_model.association_type(set.association_type);
    assert_eq!(association.ends[0].multiplicity, RelationshipMultiplicity::ZeroOrOne);
}

#[test]
fn test_relationship_to_missing_table() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("A", "Id")])
        .relationship(relationship("R1", ("A", "Id"), ("Missing", "AId")))
        .build();

    let result = generate(details, &settings("M"));
    let store = &result.store_model;

    assert!(store.association_sets.is_empty());
    assert_eq!(store.association_types.len(), 1);
    assert!(!store.association_types[0].is_valid());
    let diagnostics = store.association_types[0].diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ModelBuilderErrorCode::MissingEntity);
    assert_eq!(diagnostics[0].error_code(), 6004);
    assert!(result.conceptual_model.association_sets.is_empty());
}

#[test]
fn test_relationship_on_shared_columns_is_excluded() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("A", "Id")])
        .table(vec![key_column("B", "Id")])
        .table(vec![key_column("C", "Id"), column("C", "RefId", "int")])
        .relationship(relationship("FK_C_A", ("A", "Id"), ("C", "RefId")))
        .relationship(relationship("FK_C_B", ("B", "Id"), ("C", "RefId")))
        .build();

    let result = generate(details, &settings("M"));
    let store = &result.store_model;

    assert_eq!(store.association_sets.len(), 1);
    assert_eq!(store.shared_foreign_keys.len(), 2);
    assert!(result
        .diagnostics()
        .iter()
        .any(|d| d.code == ModelBuilderErrorCode::SharedForeignKey));
}

// ============================================================================
// Key Policy Scenarios
// ============================================================================

#[test]
fn test_table_without_key_is_inferred_and_read_only() {
    let details = SchemaBuilder::new()
        .table(vec![
            column("Log", "Id", "int"),
            nullable(column("Log", "Message", "nvarchar")),
        ])
        .build();

    let result = generate(details, &settings("M"));

    let set = result.store_model.find_entity_set("Log").unwrap();
    assert!(set.is_read_only());
    let query = set.defining_query.as_deref().unwrap();
    assert!(query.contains("[Log].[Id] AS [Id]"));
    assert!(query.contains("FROM [dbo].[Log] AS [Log]"));

    let entity = result.conceptual_model.find_entity_type("Log").unwrap();
    assert_eq!(entity.key_members, vec!["Id".to_string()]);
    assert!(result.diagnostics().iter().any(|d| {
        d.code == ModelBuilderErrorCode::NoPrimaryKeyDefined && d.severity == Severity::Warning
    }));
}

#[test]
fn test_table_without_usable_key_is_excluded() {
    let details = SchemaBuilder::new()
        .table(vec![nullable(column("Blob", "Data", "varbinary"))])
        .table(vec![key_column("Kept", "Id")])
        .build();

    let result = generate(details, &settings("M"));

    assert!(result.store_model.find_entity_set("Blob").is_none());
    assert!(result.conceptual_model.find_entity_set("Blobs").is_none());
    assert!(result.conceptual_model.find_entity_set("Kepts").is_some());
    assert!(result.has_errors());
}

#[test]
fn test_key_column_with_unsupported_type_makes_entity_read_only() {
    let details = SchemaBuilder::new()
        .table(vec![
            key_column("Node", "Id"),
            TableDetailsRow {
                is_primary_key: true,
                ..column("Node", "Path", "hierarchyid")
            },
            column("Node", "Label", "nvarchar"),
        ])
        .build();

    let result = generate(details, &settings("M"));

    let set = result.store_model.find_entity_set("Node").unwrap();
    assert!(set.is_read_only());
    let entity = result.store_model.entity_type(set.entity_type);
    assert_eq!(entity.key_members, vec!["Id".to_string()]);
    assert!(entity.property("Path").is_none());
    assert!(result
        .diagnostics()
        .iter()
        .any(|d| d.code == ModelBuilderErrorCode::ExcludedColumnWasAKeyColumn));
}

// ============================================================================
// Naming Scenarios
// ============================================================================

#[test]
fn test_same_table_name_in_two_schemas() {
    let mut sales_order = key_column("Order", "Id");
    sales_order.schema = Some("sales".to_string());

    let details = SchemaBuilder::new()
        .table(vec![key_column("Order", "Id")])
        .table(vec![sales_order])
        .build();

    let result = generate(details, &settings("M"));

    let type_names: Vec<&str> = result
        .conceptual_model
        .entity_types
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(type_names, vec!["Order", "Order1"]);
    let set_names: Vec<&str> = result
        .conceptual_model
        .entity_sets
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(set_names, vec!["Orders", "Order1s"]);
}

#[test]
fn test_invalid_identifiers_are_sanitized() {
    let details = SchemaBuilder::new()
        .table(vec![
            key_column("Order Details", "Line Id"),
            column("Order Details", "2ndAddress", "nvarchar"),
        ])
        .build();

    let result = generate(details, &settings("M"));

    let entity = result.conceptual_model.find_entity_type("Order_Details").unwrap();
    assert!(entity.property("Line_Id").is_some());
    assert!(entity.property("C2ndAddress").is_some());
    assert_eq!(entity.key_members, vec!["Line_Id".to_string()]);
}

#[test]
fn test_property_named_like_its_entity_is_renamed() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Tag", "Id"), column("Tag", "Tag", "nvarchar")])
        .build();

    let result = generate(details, &settings("M"));

    let entity = result.conceptual_model.find_entity_type("Tag").unwrap();
    assert!(entity.property("Tag1").is_some());
}

#[test]
fn test_pluralization_can_be_disabled() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Person", "Id")])
        .build();

    let mut options = settings("M");
    assert_eq!(
        generate(details.clone(), &options).conceptual_model.entity_sets[0].name,
        "People"
    );

    options.pluralize = false;
    assert_eq!(
        generate(details, &options).conceptual_model.entity_sets[0].name,
        "Person"
    );
}

// ============================================================================
// Target Version Scenarios
// ============================================================================

fn customer_orders() -> rust_edmgen::schema::StoreSchemaDetails {
    SchemaBuilder::new()
        .table(vec![key_column("Customer", "Id")])
        .table(vec![key_column("Order", "Id"), column("Order", "CustomerId", "int")])
        .relationship(relationship(
            "FK_Order_Customer",
            ("Customer", "Id"),
            ("Order", "CustomerId"),
        ))
        .build()
}

#[test]
fn test_without_foreign_key_properties() {
    let mut options = settings("Shop");
    options.generate_foreign_key_properties = false;

    let result = generate(customer_orders(), &options);
    let conceptual = &result.conceptual_model;

    let order = conceptual.find_entity_type("Order").unwrap();
    assert!(order.property("CustomerId").is_none());
    assert!(order.navigation_property("Customer").is_some());
    let set = conceptual.find_association_set("FK_Order_Customer").unwrap();
    assert!(!conceptual.association_type(set.association_type).is_foreign_key);
}

#[test]
fn test_v1_drops_foreign_keys_and_lazy_loading() {
    let mut options = settings("Shop");
    options.target_version = TargetSchemaVersion::V1;

    let result = generate(customer_orders(), &options);
    let conceptual = &result.conceptual_model;

    assert!(conceptual.find_entity_type("Order").unwrap().property("CustomerId").is_none());
    assert!(conceptual.association_types.iter().all(|a| a.referential_constraint.is_none()));
    assert_eq!(conceptual.container_annotation(LAZY_LOADING_ENABLED_ANNOTATION), None);
}

#[test]
fn test_v3_enables_lazy_loading() {
    let result = generate(customer_orders(), &settings("Shop"));
    assert_eq!(
        result
            .conceptual_model
            .container_annotation(LAZY_LOADING_ENABLED_ANNOTATION),
        Some("true")
    );
}

#[test]
fn test_v1_keeps_foreign_key_that_is_part_of_the_key() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Customer", "Id")])
        .table(vec![key_column("Address", "CustomerId"), key_column("Address", "Line")])
        .relationship(relationship(
            "FK_Address_Customer",
            ("Customer", "Id"),
            ("Address", "CustomerId"),
        ))
        .build();

    let mut options = settings("Shop");
    options.target_version = TargetSchemaVersion::V1;
    let result = generate(details, &options);

    let address = result.conceptual_model.find_entity_type("Address").unwrap();
    assert!(address.property("CustomerId").is_some());
    assert_eq!(result.mapping_context.preserved_foreign_key_count(), 1);
}

#[test]
fn test_spatial_column_dropped_before_v3() {
    let details = SchemaBuilder::new()
        .table(vec![key_column("Store", "Id"), column("Store", "Location", "geography")])
        .build();

    let mut options = settings("M");
    options.target_version = TargetSchemaVersion::V2;
    let result = generate(details.clone(), &options);
    let store = result.conceptual_model.find_entity_type("Store").unwrap();
    assert!(store.property("Location").is_none());
    assert!(result
        .diagnostics()
        .iter()
        .any(|d| d.code == ModelBuilderErrorCode::UnsupportedType));

    let result = generate(details, &settings("M"));
    let store = result.conceptual_model.find_entity_type("Store").unwrap();
    assert!(store.property("Location").is_some());
}

// ============================================================================
// Mapping Context
// ============================================================================

#[test]
fn test_every_conceptual_entity_maps_back_to_store() {
    let result = generate(customer_orders(), &settings("Shop"));

    for store_id in result.store_model.entity_set_ids() {
        let conceptual = result
            .mapping_context
            .conceptual(StoreItem::EntitySet(store_id))
            .expect("Every entity set is mapped");
        assert_eq!(
            result.mapping_context.store(conceptual),
            Some(StoreItem::EntitySet(store_id))
        );
    }
}

#[test]
fn test_filters_exclude_tables_before_building() {
    use rust_edmgen::schema::{SchemaFilterEntry, SchemaObjectKind};

    let mut options = settings("Shop");
    options.filters = vec![SchemaFilterEntry::exclude(None, None, Some("Order"))
        .with_object_types(&[SchemaObjectKind::Tables])];

    let result = generate(customer_orders(), &options);

    assert!(result.store_model.find_entity_set("Order").is_none());
    assert!(result.store_model.association_types.is_empty());
    assert!(result.diagnostics().is_empty());
}
