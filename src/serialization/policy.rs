//! The inclusion policy seam consulted once per candidate member.

use super::name_filter::NameInclusionFilter;
use super::type_filter::TypeInclusionFilter;
use crate::domain::MemberInfo;

/// Decides whether a member may cross into a serialized response.
pub trait InclusionPolicy: Send + Sync {
    fn is_included(&self, member: &MemberInfo) -> bool;
}

impl<P: InclusionPolicy + ?Sized> InclusionPolicy for &P {
    fn is_included(&self, member: &MemberInfo) -> bool {
        (**self).is_included(member)
    }
}

impl<P: InclusionPolicy + ?Sized> InclusionPolicy for Box<P> {
    fn is_included(&self, member: &MemberInfo) -> bool {
        (**self).is_included(member)
    }
}

/// The rule set of one resolver: exactly one policy per configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionRules {
    ByName(NameInclusionFilter),
    ByType(TypeInclusionFilter),
}

impl InclusionPolicy for InclusionRules {
    fn is_included(&self, member: &MemberInfo) -> bool {
        match self {
            InclusionRules::ByName(filter) => filter.is_included(member),
            InclusionRules::ByType(filter) => filter.is_included(member),
        }
    }
}

impl From<NameInclusionFilter> for InclusionRules {
    fn from(filter: NameInclusionFilter) -> Self {
        InclusionRules::ByName(filter)
    }
}

impl From<TypeInclusionFilter> for InclusionRules {
    fn from(filter: TypeInclusionFilter) -> Self {
        InclusionRules::ByType(filter)
    }
}
