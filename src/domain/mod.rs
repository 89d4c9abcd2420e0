//! Domain data contracts shared by the query and serialization layers.

pub mod member;
pub mod query;
pub mod registry;
pub mod types;

pub use member::{Entity, EntityMembers, MemberInfo};
pub use query::{EntityQuery, EntityQueryBuilder, ExpandClause};
pub use registry::TypeRegistry;
pub use types::{AssemblyId, Describe, TypeId, TypeKind, TypeRef, SYSTEM_NAMESPACE};
