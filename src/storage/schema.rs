//! Table mappings for entity types
//!
//! Each queryable entity is registered with its table, typed columns and
//! relations. Column and table names are checked once at registration so the
//! SQL renderer can splice them as quoted identifiers.

use crate::domain::TypeId;
use crate::errors::{QueryGateError, Result};
use std::collections::HashMap;

/// Column value type, used to parse filter literals before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Parent row owns many target rows (`target.foreign = parent.local`)
    Many,
    /// At most one target row, owned (`has_one`) or referenced (`belongs_to`)
    One,
}

/// A navigable relationship from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub target: TypeId,
    pub kind: RelationKind,
    pub local_column: String,
    pub foreign_column: String,
}

/// Table mapping for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    type_id: TypeId,
    table: String,
    columns: Vec<Column>,
    relations: Vec<Relation>,
}

impl EntitySchema {
    pub fn new<S: Into<String>>(type_id: TypeId, table: S) -> Self {
        Self {
            type_id,
            table: table.into(),
            columns: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            column_type,
        });
        self
    }

    /// One-to-many relation: the target rows carry the key,
    /// `target.foreign_column = self.local_column`
    pub fn has_many(
        self,
        name: &str,
        target: TypeId,
        local_column: &str,
        foreign_column: &str,
    ) -> Self {
        self.relation(name, target, RelationKind::Many, local_column, foreign_column)
    }

    /// One-to-one relation owned by this entity: the target row carries the
    /// key, `target.foreign_column = self.local_column`
    pub fn has_one(
        self,
        name: &str,
        target: TypeId,
        local_column: &str,
        foreign_column: &str,
    ) -> Self {
        self.relation(name, target, RelationKind::One, local_column, foreign_column)
    }

    /// Many-to-one relation: this row carries the key in `local_column`,
    /// referencing `target.foreign_column`
    pub fn belongs_to(
        self,
        name: &str,
        target: TypeId,
        local_column: &str,
        foreign_column: &str,
    ) -> Self {
        self.relation(name, target, RelationKind::One, local_column, foreign_column)
    }

    fn relation(
        mut self,
        name: &str,
        target: TypeId,
        kind: RelationKind,
        local_column: &str,
        foreign_column: &str,
    ) -> Self {
        self.relations.push(Relation {
            name: name.to_string(),
            target,
            kind,
            local_column: local_column.to_string(),
            foreign_column: foreign_column.to_string(),
        });
        self
    }

    pub fn type_id(&self) -> &TypeId {
        &self.type_id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn find_relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    fn validate(&self) -> Result<()> {
        check_identifier(&self.table, "table")?;
        if self.columns.is_empty() {
            return Err(QueryGateError::config(format!(
                "Entity {} has no columns",
                self.type_id
            )));
        }
        for column in &self.columns {
            check_identifier(&column.name, "column")?;
        }
        for relation in &self.relations {
            check_identifier(&relation.name, "relation")?;
            check_identifier(&relation.foreign_column, "column")?;
            if self.find_column(&relation.local_column).is_none() {
                return Err(QueryGateError::config(format!(
                    "Relation '{}' of {} uses unknown local column '{}'",
                    relation.name, self.type_id, relation.local_column
                )));
            }
        }
        Ok(())
    }
}

fn check_identifier(name: &str, kind: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(QueryGateError::config(format!("Invalid {} name '{}'", kind, name)))
    }
}

/// All table mappings, keyed by entity type.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: HashMap<TypeId, EntitySchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping, rejecting invalid identifiers
    pub fn register(&mut self, schema: EntitySchema) -> Result<&mut Self> {
        schema.validate()?;
        tracing::debug!(
            entity = %schema.type_id,
            table = %schema.table,
            "Registered entity schema"
        );
        self.schemas.insert(schema.type_id.clone(), schema);
        Ok(self)
    }

    pub fn get(&self, type_id: &TypeId) -> Result<&EntitySchema> {
        self.schemas
            .get(type_id)
            .ok_or_else(|| QueryGateError::not_found("entity schema", type_id.full_name()))
    }

    /// Check that every relation targets a registered entity
    pub fn verify_relations(&self) -> Result<()> {
        for schema in self.schemas.values() {
            for relation in &schema.relations {
                let target = self.get(&relation.target).map_err(|_| {
                    QueryGateError::config(format!(
                        "Relation '{}' of {} targets unregistered entity {}",
                        relation.name, schema.type_id, relation.target
                    ))
                })?;
                if target.find_column(&relation.foreign_column).is_none() {
                    return Err(QueryGateError::config(format!(
                        "Relation '{}' of {} uses unknown foreign column '{}'",
                        relation.name, schema.type_id, relation.foreign_column
                    )));
                }
            }
        }
        Ok(())
    }
}
