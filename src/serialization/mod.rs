//! # Serialization Control
//!
//! Policies deciding which members of server-side objects may cross into a
//! serialized response, and the resolver that applies them.
//!
//! Two policies are provided and a caller picks exactly one per resolver:
//!
//! - [`NameInclusionFilter`]: allow-lists of member names, with a structural
//!   default that keeps scalars and drops collections and domain objects.
//! - [`TypeInclusionFilter`]: allow-list of member types, with types from the
//!   controlled (home) assembly excluded by default.

pub mod name_filter;
pub mod policy;
pub mod resolver;
pub mod type_filter;

pub use name_filter::NameInclusionFilter;
pub use policy::{InclusionPolicy, InclusionRules};
pub use resolver::MemberResolver;
pub use type_filter::TypeInclusionFilter;
