//! Shared fixtures: a small shop domain with customers, orders and items.

#![allow(dead_code)]

use querygate::domain::{AssemblyId, Describe, Entity, EntityMembers, TypeId, TypeRef};
use querygate::storage::{ColumnType, EntitySchema, SchemaCatalog};
use querygate::TypeRegistry;
use serde::Serialize;
use std::sync::Arc;

pub fn shop_assembly() -> AssemblyId {
    AssemblyId::new("shop")
}

pub fn shop_type(name: &str) -> TypeId {
    TypeId::new("shop", name, shop_assembly())
}

#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub tags: Vec<String>,
    pub profile: Profile,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub bio: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: i64,
    pub total: f64,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub sku: String,
    pub quantity: u32,
}

macro_rules! shop_entity {
    ($ty:ident, $($member:literal : $member_ty:ty),* $(,)?) => {
        impl Describe for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::object(shop_type(stringify!($ty)))
            }
        }

        impl Entity for $ty {
            fn members() -> EntityMembers {
                EntityMembers::new(shop_type(stringify!($ty)))
                    $(.member::<$member_ty>($member))*
            }
        }
    };
}

shop_entity!(
    Customer,
    "id": i64,
    "name": String,
    "tags": Vec<String>,
    "profile": Profile,
    "orders": Vec<Order>,
);
shop_entity!(Profile, "bio": String);
shop_entity!(Order, "id": i64, "total": f64, "items": Vec<Item>);
shop_entity!(Item, "sku": String, "quantity": u32);

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register::<Customer>()
        .register::<Profile>()
        .register::<Order>()
        .register::<Item>();
    registry
}

pub fn catalog() -> Arc<SchemaCatalog> {
    let mut catalog = SchemaCatalog::new();
    catalog
        .register(
            EntitySchema::new(shop_type("Customer"), "customers")
                .column("id", ColumnType::Integer)
                .column("name", ColumnType::Text)
                .column("vip", ColumnType::Boolean)
                .has_many("orders", shop_type("Order"), "id", "customer_id")
                .has_one("profile", shop_type("Profile"), "id", "customer_id"),
        )
        .expect("customers schema")
        .register(
            EntitySchema::new(shop_type("Profile"), "profiles")
                .column("customer_id", ColumnType::Integer)
                .column("bio", ColumnType::Text),
        )
        .expect("profiles schema")
        .register(
            EntitySchema::new(shop_type("Order"), "orders")
                .column("id", ColumnType::Integer)
                .column("customer_id", ColumnType::Integer)
                .column("total", ColumnType::Float)
                .has_many("items", shop_type("Item"), "id", "order_id"),
        )
        .expect("orders schema")
        .register(
            EntitySchema::new(shop_type("Item"), "order_items")
                .column("order_id", ColumnType::Integer)
                .column("sku", ColumnType::Text)
                .column("quantity", ColumnType::Integer),
        )
        .expect("items schema");
    catalog.verify_relations().expect("relations resolve");
    Arc::new(catalog)
}

pub fn sample_customer() -> Customer {
    Customer {
        id: 1,
        name: "Ann".to_string(),
        tags: vec!["vip".to_string()],
        profile: Profile {
            bio: "Collector".to_string(),
        },
        orders: vec![Order {
            id: 10,
            total: 42.5,
            items: vec![Item {
                sku: "A-1".to_string(),
                quantity: 2,
            }],
        }],
    }
}
