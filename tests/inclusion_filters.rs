//! Inclusion policies applied through the resolver and configuration.

mod common;

use common::{registry, sample_customer, shop_assembly, shop_type, Customer, Order};
use querygate::domain::{Describe, Entity, MemberInfo, TypeId, TypeRef};
use querygate::serialization::{NameInclusionFilter, TypeInclusionFilter};
use querygate::{AppConfig, InclusionPolicy, InclusionRules, MemberResolver, QueryGateError};
use serde_json::json;

fn member<T: Describe + ?Sized>(declaring: &str, name: &str) -> MemberInfo {
    MemberInfo::new(shop_type(declaring), name, T::type_ref())
}

#[test]
fn test_name_filter_value_members_always_included() {
    let filter = NameInclusionFilter::with_global_names(["Name"]);
    assert!(filter.is_included(&member::<i64>("Customer", "Id")));

    let filter = NameInclusionFilter::default();
    assert!(filter.is_included(&member::<i64>("Customer", "Id")));
}

#[test]
fn test_name_filter_unlisted_collection_excluded() {
    let filter = NameInclusionFilter::with_global_names(["id"]);
    assert!(!filter.is_included(&member::<Vec<Order>>("Customer", "orders")));
}

#[test]
fn test_name_filter_listed_collection_included_for_its_type_only() {
    let filter = NameInclusionFilter::with_type_names([(shop_type("Customer"), ["orders"])]);

    assert!(filter.is_included(&member::<Vec<Order>>("Customer", "orders")));
    assert!(!filter.is_included(&member::<Vec<Order>>("Supplier", "orders")));
}

#[test]
fn test_type_filter_array_of_included_home_type() {
    let filter = TypeInclusionFilter::from_types([shop_type("Order")]);
    assert!(filter.is_included(&member::<[Order; 2]>("Customer", "recent")));
    assert!(filter.is_included(&member::<Vec<Order>>("Customer", "orders")));
}

#[test]
fn test_type_filter_unlisted_home_type_excluded() {
    let filter = TypeInclusionFilter::from_types([shop_type("Order")]);
    assert!(!filter.is_included(&member::<Customer>("Order", "customer")));
}

#[test]
fn test_type_filter_foreign_types_included() {
    let filter = TypeInclusionFilter::from_types([shop_type("Order")]);
    let vendor = TypeId::new("billing", "Invoice", querygate::domain::AssemblyId::new("billing"));

    assert!(filter.is_included(&member::<chrono::DateTime<chrono::Utc>>("Order", "placed_at")));
    assert!(filter.is_included(&member::<String>("Order", "note")));
    assert!(filter.is_included(&MemberInfo::new(
        shop_type("Order"),
        "invoice",
        TypeRef::object(vendor)
    )));
}

#[test]
fn test_type_filter_unwraps_one_level_only() {
    let filter = TypeInclusionFilter::new(shop_assembly(), Vec::<TypeId>::new()).unwrap();

    assert!(!filter.is_included(&member::<Vec<Order>>("Customer", "orders")));
    assert!(filter.is_included(&member::<Vec<Vec<Order>>>("Customer", "batches")));
}

#[test]
fn test_resolver_with_name_policy_shapes_nested_graph() {
    let registry = registry();
    let filter = NameInclusionFilter::with_type_names([(shop_type("Customer"), ["orders"])]);
    let resolver = MemberResolver::new(filter);

    let value = resolver
        .to_value(&registry, &shop_type("Customer"), &sample_customer())
        .unwrap();

    assert_eq!(
        value,
        json!({
            "id": 1,
            "name": "Ann",
            "orders": [{ "id": 10, "total": 42.5 }],
        })
    );
}

#[test]
fn test_resolver_with_type_policy_shapes_nested_graph() {
    let registry = registry();
    let resolver = MemberResolver::new(TypeInclusionFilter::from_types([shop_type("Order")]));

    let value = resolver
        .to_value(&registry, &shop_type("Customer"), &sample_customer())
        .unwrap();

    assert_eq!(
        value,
        json!({
            "id": 1,
            "name": "Ann",
            "tags": ["vip"],
            "orders": [{ "id": 10, "total": 42.5 }],
        })
    );
}

#[test]
fn test_resolve_keeps_declaration_order() {
    let resolver = MemberResolver::new(NameInclusionFilter::with_global_names(["profile"]));
    let members = Customer::members();

    let names: Vec<&str> = resolver
        .resolve(&members)
        .into_iter()
        .map(|m| m.name.as_str())
        .collect();

    assert_eq!(names, vec!["id", "name", "profile"]);
}

#[test]
fn test_rules_built_from_configuration() {
    let config = AppConfig::from_yaml_str(
        "inclusion:\n  policy: by_name\n  global: [items]\n  \
         per_type:\n    \"shop::Customer\": [orders]\n",
    )
    .unwrap();

    let rules = config.inclusion.as_ref().unwrap().build(&registry()).unwrap();
    assert!(matches!(rules, InclusionRules::ByName(_)));

    let value = MemberResolver::new(rules)
        .to_value(&registry(), &shop_type("Customer"), &sample_customer())
        .unwrap();

    assert_eq!(
        value["orders"],
        json!([{ "id": 10, "total": 42.5, "items": [{ "sku": "A-1", "quantity": 2 }] }])
    );
}

#[test]
fn test_configuration_naming_unknown_type_fails() {
    let config = AppConfig::from_toml_str(
        "[inclusion]\npolicy = \"by_type\"\ntypes = [\"shop::Warehouse\"]\n",
    )
    .unwrap();

    let result = config.inclusion.as_ref().unwrap().build(&registry());

    assert!(matches!(result, Err(QueryGateError::Config { .. })));
}

#[test]
fn test_shaping_unregistered_type_fails() {
    let resolver = MemberResolver::new(NameInclusionFilter::default());
    let result = resolver.shape(&registry(), &shop_type("Warehouse"), json!({ "id": 1 }));

    assert!(matches!(result, Err(QueryGateError::NotFound { .. })));
}
