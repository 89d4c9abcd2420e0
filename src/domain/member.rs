//! Member descriptors
//!
//! A serializer asks for the candidate members of a type and prunes them with
//! an inclusion policy. Entities declare their members once, through
//! [`Entity::members`], instead of having them discovered at runtime.

use super::types::{Describe, TypeId, TypeRef};

/// A property or field of a type being serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub declaring_type: TypeId,
    pub name: String,
    pub member_type: TypeRef,
}

impl MemberInfo {
    pub fn new<S: Into<String>>(declaring_type: TypeId, name: S, member_type: TypeRef) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            member_type,
        }
    }
}

/// The ordered candidate member list of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMembers {
    type_id: TypeId,
    members: Vec<MemberInfo>,
}

impl EntityMembers {
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            members: Vec::new(),
        }
    }

    /// Declare a member whose type describes itself
    pub fn member<T: Describe + ?Sized>(self, name: &str) -> Self {
        self.member_of(name, T::type_ref())
    }

    /// Declare a member with an explicit type
    pub fn member_of(mut self, name: &str, member_type: TypeRef) -> Self {
        let info = MemberInfo::new(self.type_id.clone(), name, member_type);
        self.members.push(info);
        self
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    pub fn get(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A domain type that can be registered for serialization control.
pub trait Entity: Describe {
    fn members() -> EntityMembers;
}
