//! Serializer-side member resolution
//!
//! The resolver asks its policy about every candidate member of a type and
//! keeps the ones it includes. `shape` applies the same pruning to an already
//! serialized JSON document, walking into nested registered entities.

use super::policy::InclusionPolicy;
use crate::domain::{EntityMembers, MemberInfo, TypeId, TypeKind, TypeRef, TypeRegistry};
use crate::errors::{QueryGateError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Prunes candidate member lists with one inclusion policy.
#[derive(Debug, Clone)]
pub struct MemberResolver<P> {
    policy: P,
}

impl<P: InclusionPolicy> MemberResolver<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Included members of `entity`, in declaration order
    pub fn resolve<'m>(&self, entity: &'m EntityMembers) -> Vec<&'m MemberInfo> {
        entity
            .members()
            .iter()
            .filter(|member| self.policy.is_included(member))
            .collect()
    }

    /// Serialize `value` as an instance of `type_id` and prune it
    pub fn to_value<T: Serialize>(
        &self,
        registry: &TypeRegistry,
        type_id: &TypeId,
        value: &T,
    ) -> Result<Value> {
        let raw = serde_json::to_value(value).map_err(|e| QueryGateError::Serialization {
            source: e,
            context: format!("Failed to serialize {}", type_id),
        })?;
        self.shape(registry, type_id, raw)
    }

    /// Drop every key of `value` that is not an included member of
    /// `type_id`. Included member values are walked along their described
    /// type, so registered entities nested at any depth of arrays, sequences
    /// or map values are shaped too. Arrays are shaped element-wise.
    pub fn shape(&self, registry: &TypeRegistry, type_id: &TypeId, value: Value) -> Result<Value> {
        let entity = registry
            .get(type_id)
            .ok_or_else(|| QueryGateError::not_found("entity type", type_id.full_name()))?;

        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.shape(registry, type_id, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(mut fields) => {
                let mut shaped = Map::new();
                for member in self.resolve(entity) {
                    let Some(field) = fields.remove(&member.name) else {
                        continue;
                    };

                    let field = self.shape_member(registry, &member.member_type, field)?;
                    shaped.insert(member.name.clone(), field);
                }

                if !fields.is_empty() {
                    tracing::debug!(
                        entity = %type_id,
                        dropped = fields.len(),
                        "Dropped members excluded from serialization"
                    );
                }
                Ok(Value::Object(shaped))
            }
            other => Ok(other),
        }
    }

    /// Shape a member value described by `member_type`. Sequences recurse
    /// into their elements (map values for maps); other generics recurse
    /// into their first argument.
    fn shape_member(
        &self,
        registry: &TypeRegistry,
        member_type: &TypeRef,
        value: Value,
    ) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        if registry.contains(&member_type.id) {
            return self.shape(registry, &member_type.id, value);
        }

        match &member_type.kind {
            TypeKind::Array(element) => self.shape_elements(registry, element, value),
            TypeKind::Generic {
                arguments,
                sequence: true,
            } => match arguments.last() {
                Some(element) => self.shape_elements(registry, element, value),
                None => Ok(value),
            },
            TypeKind::Generic { arguments, .. } => match arguments.first() {
                Some(inner) => self.shape_member(registry, inner, value),
                None => Ok(value),
            },
            _ => Ok(value),
        }
    }

    fn shape_elements(
        &self,
        registry: &TypeRegistry,
        element: &TypeRef,
        value: Value,
    ) -> Result<Value> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.shape_member(registry, element, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(key, item)| -> Result<(String, Value)> {
                    Ok((key, self.shape_member(registry, element, item)?))
                })
                .collect::<Result<Map<_, _>>>()
                .map(Value::Object),
            other => Ok(other),
        }
    }
}
