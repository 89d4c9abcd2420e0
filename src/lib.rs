//! # querygate
//!
//! Adapter layer between a client's generic entity query and a relational
//! data-access layer, plus control over which members of server-side objects
//! reach a serialized response.
//!
//! ## Architecture
//!
//! ```text
//! EntityQuery ──► ClauseApplier ──► QueryBuilder (SqlClauseBuilder) ──► SqlQuery ──► PostgreSQL
//!                                                                                     │
//! Response  ◄── MemberResolver ◄── InclusionPolicy (by name | by type) ◄──────── JSON rows
//! ```
//!
//! ## Core Components
//!
//! - **Query Clause Applier** ([`query`]): applies where, order-by, select,
//!   skip, take and expand clauses only when present
//! - **Inclusion policies** ([`serialization`]): name-based and
//!   assembly-scoped type-based member filters
//! - **SQL handle** ([`storage`]): a `sqlx` backed query handle and the
//!   collaborator that interprets clause tokens for it
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use querygate::query::ClauseApplier;
//! use querygate::storage::{SqlClauseBuilder, SqlQuery};
//!
//! let builder = SqlClauseBuilder::new(catalog.clone());
//! let handle = SqlQuery::new(catalog, &customer)?;
//! let handle = ClauseApplier::new(&builder).apply_all(&query, handle, &customer)?;
//! let rows = handle.fetch_json(&pool).await?;
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod query;
pub mod serialization;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use domain::{EntityQuery, TypeId, TypeRegistry};
pub use errors::{QueryGateError, Result};
pub use observability::init_tracing;
pub use query::{ClauseApplier, QueryBuilder, QueryHandle};
pub use serialization::{InclusionPolicy, InclusionRules, MemberResolver};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
