//! Unit tests for identifier uniquification, sanitization and pluralization

use rust_edmgen::naming::{
    create_valid_ecma_name, EnglishPluralizationService, NameComparer, NoPluralization,
    PluralizationService, UniqueIdentifierService,
};
use rust_edmgen::EdmGenError;

// ============================================================================
// Uniquifier Tests
// ============================================================================

#[test]
fn test_adjust_identifier_appends_smallest_free_suffix() {
    let mut names: UniqueIdentifierService = UniqueIdentifierService::new(NameComparer::Ordinal);

    assert_eq!(names.adjust_identifier("Foo", None), "Foo");
    assert_eq!(names.adjust_identifier("Foo", None), "Foo1");
    assert_eq!(names.adjust_identifier("Foo", None), "Foo2");
}

#[test]
fn test_suffix_skips_registered_names() {
    let mut names: UniqueIdentifierService = UniqueIdentifierService::new(NameComparer::Ordinal);
    names.register_used_identifier("Order").unwrap();
    names.register_used_identifier("Order1").unwrap();

    assert_eq!(names.adjust_identifier("Order", None), "Order2");
}

#[test]
fn test_case_insensitive_scope() {
    let mut names: UniqueIdentifierService =
        UniqueIdentifierService::new(NameComparer::OrdinalIgnoreCase);

    assert_eq!(names.adjust_identifier("Customer", None), "Customer");
    assert_eq!(names.adjust_identifier("CUSTOMER", None), "CUSTOMER1");
    assert!(names.is_used("customer1"));
}

#[test]
fn test_case_sensitive_scope() {
    let mut names: UniqueIdentifierService = UniqueIdentifierService::new(NameComparer::Ordinal);

    assert_eq!(names.adjust_identifier("Customer", None), "Customer");
    assert_eq!(names.adjust_identifier("customer", None), "customer");
}

#[test]
fn test_register_twice_is_an_error() {
    let mut names: UniqueIdentifierService = UniqueIdentifierService::new(NameComparer::Ordinal);
    names.register_used_identifier("Model").unwrap();

    let err = names.register_used_identifier("Model").unwrap_err();
    assert!(matches!(err, EdmGenError::IdentifierAlreadyRegistered { name } if name == "Model"));
}

#[test]
fn test_transform_applies_before_collision_check() {
    let mut names: UniqueIdentifierService =
        UniqueIdentifierService::with_transform(NameComparer::Ordinal, |n| n.replace('.', "_"));

    assert_eq!(names.adjust_identifier("dbo.Orders", None), "dbo_Orders");
    assert_eq!(names.adjust_identifier("dbo_Orders", None), "dbo_Orders1");
}

#[test]
fn test_owner_remembers_adjusted_name() {
    let mut names = UniqueIdentifierService::<u32>::new(NameComparer::Ordinal);
    names.adjust_identifier("Item", Some(1));
    names.adjust_identifier("Item", Some(2));

    assert_eq!(names.try_get_adjusted_name(&1), Some("Item"));
    assert_eq!(names.try_get_adjusted_name(&2), Some("Item1"));
    assert_eq!(names.try_get_adjusted_name(&3), None);
}

// ============================================================================
// ECMA Name Tests
// ============================================================================

#[test]
fn test_ecma_name_sanitization() {
    assert_eq!(create_valid_ecma_name("Order Details", 'C'), "Order_Details");
    assert_eq!(create_valid_ecma_name("2019Sales", 'C'), "C2019Sales");
    assert_eq!(create_valid_ecma_name("@id", 'p'), "_id");
    assert_eq!(create_valid_ecma_name("Valid_Name1", 'C'), "Valid_Name1");
}

// ============================================================================
// Pluralization Tests
// ============================================================================

#[test]
fn test_english_pluralization() {
    let service = EnglishPluralizationService::new();

    assert_eq!(service.pluralize("Order"), "Orders");
    assert_eq!(service.pluralize("Category"), "Categories");
    assert_eq!(service.pluralize("Box"), "Boxes");
    assert_eq!(service.pluralize("Person"), "People");
    assert_eq!(service.pluralize("OrderLine"), "OrderLines");
    assert_eq!(service.pluralize("Orders"), "Orders");
}

#[test]
fn test_no_pluralization_is_identity() {
    assert_eq!(NoPluralization.pluralize("Order"), "Order");
    assert_eq!(NoPluralization.pluralize("Person"), "Person");
}
