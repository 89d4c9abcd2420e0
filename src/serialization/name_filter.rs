//! Member inclusion by declared name.

use super::policy::InclusionPolicy;
use crate::domain::{MemberInfo, TypeId, TypeRef};
use std::collections::{HashMap, HashSet};

/// Includes members named in a global or per-declaring-type allow-list and
/// otherwise falls back to a structural default: scalars, strings and
/// platform types pass; collections and user-defined objects do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameInclusionFilter {
    global: Option<HashSet<String>>,
    per_type: Option<HashMap<TypeId, HashSet<String>>>,
}

impl NameInclusionFilter {
    /// Filter with names included on every declaring type
    pub fn with_global_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            global: Some(names.into_iter().map(Into::into).collect()),
            per_type: None,
        }
    }

    /// Filter with names included only on their declaring type
    pub fn with_type_names<I, N, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (TypeId, N)>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let per_type = rules
            .into_iter()
            .map(|(type_id, names)| (type_id, names.into_iter().map(Into::into).collect()))
            .collect();

        Self {
            global: None,
            per_type: Some(per_type),
        }
    }

    /// Add per-type names to a filter built from global names
    pub fn and_type_names<N, S>(mut self, type_id: TypeId, names: N) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.per_type
            .get_or_insert_with(HashMap::new)
            .entry(type_id)
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Decide inclusion of `member_name` of type `member_type` declared on
    /// `declaring_type`. Rules are evaluated in order; the first match wins.
    pub fn is_member_included(
        &self,
        member_type: &TypeRef,
        declaring_type: &TypeId,
        member_name: &str,
    ) -> bool {
        if self
            .global
            .as_ref()
            .is_some_and(|names| names.contains(member_name))
        {
            return true;
        }

        if self
            .per_type
            .as_ref()
            .and_then(|rules| rules.get(declaring_type))
            .is_some_and(|names| names.contains(member_name))
        {
            return true;
        }

        if member_type.is_value_like() {
            return true;
        }

        if member_type.is_sequence() {
            return false;
        }

        member_type.id.is_system()
    }
}

impl InclusionPolicy for NameInclusionFilter {
    fn is_included(&self, member: &MemberInfo) -> bool {
        let included =
            self.is_member_included(&member.member_type, &member.declaring_type, &member.name);
        tracing::trace!(
            declaring_type = %member.declaring_type,
            member = %member.name,
            member_type = %member.member_type,
            included,
            "Name inclusion decision"
        );
        included
    }
}
