//! Registry of entity member lists keyed by type identity.

use super::member::{Entity, EntityMembers};
use super::types::TypeId;
use std::collections::HashMap;

/// Entities registered at configuration time. Immutable once shared.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entities: HashMap<TypeId, EntityMembers>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity by its own description
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.register_members(E::members())
    }

    /// Register an explicit member list, replacing any earlier one for the same type
    pub fn register_members(&mut self, members: EntityMembers) -> &mut Self {
        let type_id = members.type_id().clone();
        if self.entities.insert(type_id.clone(), members).is_some() {
            tracing::warn!(entity = %type_id, "Replaced existing entity registration");
        }
        self
    }

    pub fn get(&self, type_id: &TypeId) -> Option<&EntityMembers> {
        self.entities.get(type_id)
    }

    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.entities.contains_key(type_id)
    }

    /// Look up a registered type by its fully-qualified name
    pub fn resolve_name(&self, full_name: &str) -> Option<&TypeId> {
        self.entities.keys().find(|id| id.full_name() == full_name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
