//! # Storage
//!
//! Relational data access: entity table mappings, the [`SqlQuery`] handle,
//! the [`SqlClauseBuilder`] collaborator that interprets clause tokens for it,
//! and PostgreSQL pool creation.

pub mod clause_builder;
pub mod pool;
pub mod schema;
pub mod sql_query;

pub use clause_builder::SqlClauseBuilder;
pub use pool::{create_pool, DbPool};
pub use schema::{Column, ColumnType, EntitySchema, Relation, RelationKind, SchemaCatalog};
pub use sql_query::{ComparisonOp, OrderTerm, Predicate, SortDirection, SqlQuery, SqlValue};
