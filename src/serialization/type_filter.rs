//! Member inclusion by member type, scoped to a home assembly.

use super::policy::InclusionPolicy;
use crate::domain::{AssemblyId, MemberInfo, TypeId, TypeRef};
use crate::errors::{QueryGateError, Result};
use std::collections::HashSet;

/// Excludes members whose type comes from the home assembly unless the type
/// is explicitly included. Types from any other assembly pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInclusionFilter {
    home: AssemblyId,
    included: HashSet<TypeId>,
}

impl TypeInclusionFilter {
    /// Home assembly is taken from the first type, or this crate when `types`
    /// is empty.
    pub fn from_types<I: IntoIterator<Item = TypeId>>(types: I) -> Self {
        let types: Vec<TypeId> = types.into_iter().collect();
        let home = types
            .first()
            .map(|t| t.assembly().clone())
            .unwrap_or_else(AssemblyId::of_crate);

        Self {
            home,
            included: types.into_iter().collect(),
        }
    }

    /// Explicit home assembly plus included types
    pub fn new<I: IntoIterator<Item = TypeId>>(home: AssemblyId, included: I) -> Result<Self> {
        if home.is_empty() {
            return Err(QueryGateError::config(
                "Type inclusion filter requires a non-empty home assembly",
            ));
        }

        Ok(Self {
            home,
            included: included.into_iter().collect(),
        })
    }

    pub fn home_assembly(&self) -> &AssemblyId {
        &self.home
    }

    /// Decide inclusion for a member of type `member_type`
    pub fn is_type_included(&self, member_type: &TypeRef) -> bool {
        let unwrapped = member_type.unwrap_single();

        if self.included.contains(&unwrapped.id) {
            return true;
        }

        unwrapped.id.assembly() != &self.home
    }
}

impl InclusionPolicy for TypeInclusionFilter {
    fn is_included(&self, member: &MemberInfo) -> bool {
        let included = self.is_type_included(&member.member_type);
        tracing::trace!(
            declaring_type = %member.declaring_type,
            member = %member.name,
            member_type = %member.member_type,
            home_assembly = %self.home,
            included,
            "Type inclusion decision"
        );
        included
    }
}
