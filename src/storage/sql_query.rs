//! SQL query handle
//!
//! [`SqlQuery`] is an immutable description of a `SELECT` over one entity
//! table. Transforms return new values; nothing touches the database until
//! [`SqlQuery::fetch_json`]. Included relations are rendered as correlated
//! JSON subqueries so a single statement returns the expanded graph.

use super::pool::DbPool;
use super::schema::{EntitySchema, RelationKind, SchemaCatalog};
use crate::db_span;
use crate::domain::TypeId;
use crate::errors::{QueryGateError, Result};
use crate::query::QueryHandle;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

const ROOT_ALIAS: &str = "t0";

/// A bound literal
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOp {
    /// Parse `eq`, `ne`, `gt`, `ge`, `lt` or `le`, case-insensitively
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: ComparisonOp,
    pub value: SqlValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub direction: SortDirection,
}

/// Include paths merged into a tree so shared prefixes render once
#[derive(Debug, Clone, PartialEq, Eq)]
struct IncludeNode {
    name: String,
    children: Vec<IncludeNode>,
}

fn include_tree(paths: &[String]) -> Vec<IncludeNode> {
    let mut roots: Vec<IncludeNode> = Vec::new();
    for path in paths {
        let mut level = &mut roots;
        for segment in path.split('.') {
            let index = match level.iter().position(|n| n.name == segment) {
                Some(index) => index,
                None => {
                    level.push(IncludeNode {
                        name: segment.to_string(),
                        children: Vec::new(),
                    });
                    level.len() - 1
                }
            };
            level = &mut level[index].children;
        }
    }
    roots
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

/// Immutable `SELECT` description over one registered entity.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    catalog: Arc<SchemaCatalog>,
    entity: TypeId,
    projection: Option<Vec<String>>,
    predicates: Vec<Predicate>,
    ordering: Vec<OrderTerm>,
    offset: Option<u32>,
    limit: Option<u32>,
    includes: Vec<String>,
}

impl SqlQuery {
    /// Start an unfiltered query over `entity`
    pub fn new(catalog: Arc<SchemaCatalog>, entity: &TypeId) -> Result<Self> {
        catalog.get(entity)?;
        Ok(Self {
            catalog,
            entity: entity.clone(),
            projection: None,
            predicates: Vec::new(),
            ordering: Vec::new(),
            offset: None,
            limit: None,
            includes: Vec::new(),
        })
    }

    pub fn entity(&self) -> &TypeId {
        &self.entity
    }

    pub fn schema(&self) -> Result<&EntitySchema> {
        self.catalog.get(&self.entity)
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[OrderTerm] {
        &self.ordering
    }

    pub fn offset(&self) -> Option<u32> {
        self.offset
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Add a predicate; predicates are combined with `AND`
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Replace the ordering
    pub fn order_by(mut self, terms: Vec<OrderTerm>) -> Self {
        self.ordering = terms;
        self
    }

    /// Replace the projected columns
    pub fn project(mut self, columns: Vec<String>) -> Self {
        self.projection = Some(columns);
        self
    }

    pub fn skip(mut self, count: u32) -> Self {
        self.offset = Some(count);
        self
    }

    pub fn take(mut self, count: u32) -> Self {
        self.limit = Some(count);
        self
    }

    /// Include the relation chain named by a dot-delimited path. Every segment
    /// must be a relation of the entity reached by the previous one.
    pub fn with_include(mut self, path: &str) -> Result<Self> {
        let mut schema = self.schema()?;
        for segment in path.split('.') {
            let relation = schema
                .find_relation(segment)
                .ok_or_else(|| QueryGateError::not_found("relation", path))?;
            schema = self.catalog.get(&relation.target)?;
        }

        if !self.includes.iter().any(|p| p == path) {
            self.includes.push(path.to_string());
        }
        Ok(self)
    }

    /// Render into a `sqlx` query builder with every literal bound
    pub fn to_query_builder(&self) -> Result<QueryBuilder<'static, Postgres>> {
        let mut builder = QueryBuilder::new("");
        self.push_select(&mut builder)?;
        Ok(builder)
    }

    /// Execute and return each row as a JSON object, included relations nested
    pub async fn fetch_json(&self, pool: &DbPool) -> Result<Vec<Value>> {
        let mut builder = QueryBuilder::new("SELECT row_to_json(q) FROM (");
        self.push_select(&mut builder)?;
        builder.push(") AS q");

        let span = db_span!("fetch_json", entity = %self.entity);
        let rows: Vec<(Value,)> = builder
            .build_query_as()
            .fetch_all(pool)
            .instrument(span)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, entity = %self.entity, "Failed to fetch entities");
                QueryGateError::Database {
                    source: e,
                    context: format!("Failed to fetch {}", self.entity),
                }
            })?;

        Ok(rows.into_iter().map(|(row,)| row).collect())
    }

    fn push_select(&self, builder: &mut QueryBuilder<'static, Postgres>) -> Result<()> {
        let schema = self.schema()?;

        builder.push("SELECT ");
        match &self.projection {
            Some(columns) => {
                let list = columns
                    .iter()
                    .map(|c| format!("{}.{}", ROOT_ALIAS, quote(c)))
                    .collect::<Vec<_>>()
                    .join(", ");
                builder.push(list);
            }
            None => {
                builder.push(format!("{}.*", ROOT_ALIAS));
            }
        }

        let mut alias_counter = 0;
        for node in include_tree(&self.includes) {
            builder.push(", (");
            self.push_relation(builder, schema, &node, ROOT_ALIAS, &mut alias_counter)?;
            builder.push(") AS ").push(quote(&node.name));
        }

        builder
            .push(" FROM ")
            .push(quote(schema.table()))
            .push(" AS ")
            .push(ROOT_ALIAS);

        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder.push(format!(
                "{}.{} {} ",
                ROOT_ALIAS,
                quote(&predicate.column),
                predicate.op.as_sql()
            ));
            match &predicate.value {
                SqlValue::Text(text) => builder.push_bind(text.clone()),
                SqlValue::Integer(number) => builder.push_bind(*number),
                SqlValue::Float(number) => builder.push_bind(*number),
                SqlValue::Boolean(flag) => builder.push_bind(*flag),
            };
        }

        if !self.ordering.is_empty() {
            let terms = self
                .ordering
                .iter()
                .map(|t| format!("{}.{} {}", ROOT_ALIAS, quote(&t.column), t.direction))
                .collect::<Vec<_>>()
                .join(", ");
            builder.push(" ORDER BY ").push(terms);
        }

        if let Some(limit) = self.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = self.offset {
            builder.push(" OFFSET ").push_bind(i64::from(offset));
        }

        Ok(())
    }

    fn push_relation(
        &self,
        builder: &mut QueryBuilder<'static, Postgres>,
        parent: &EntitySchema,
        node: &IncludeNode,
        parent_alias: &str,
        alias_counter: &mut usize,
    ) -> Result<()> {
        let relation = parent
            .find_relation(&node.name)
            .ok_or_else(|| QueryGateError::not_found("relation", node.name.as_str()))?;
        let target = self.catalog.get(&relation.target)?;

        *alias_counter += 1;
        let alias = format!("t{}", alias_counter);

        builder.push("SELECT ");
        if relation.kind == RelationKind::Many {
            builder.push("COALESCE(json_agg(");
        }
        builder.push(format!("to_jsonb({})", alias));

        if !node.children.is_empty() {
            builder.push(" || jsonb_build_object(");
            for (i, child) in node.children.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                builder.push(format!("'{}', (", child.name));
                self.push_relation(builder, target, child, &alias, alias_counter)?;
                builder.push(")");
            }
            builder.push(")");
        }

        if relation.kind == RelationKind::Many {
            builder.push("), '[]'::json)");
        }

        builder.push(format!(
            " FROM {} AS {} WHERE {}.{} = {}.{}",
            quote(target.table()),
            alias,
            alias,
            quote(&relation.foreign_column),
            parent_alias,
            quote(&relation.local_column)
        ));

        if relation.kind == RelationKind::One {
            builder.push(" LIMIT 1");
        }
        Ok(())
    }
}

impl QueryHandle for SqlQuery {
    type Error = QueryGateError;

    fn include(self, path: &str) -> Result<Self> {
        self.with_include(path)
    }
}
