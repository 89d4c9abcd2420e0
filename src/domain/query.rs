//! Client query description
//!
//! [`EntityQuery`] is the normalized form of a client's filter, sort,
//! projection, paging and expansion intent. Expression tokens stay opaque here;
//! their format belongs to whichever query builder consumes them.

use serde::{Deserialize, Serialize};

/// Ordered set of relationship paths to eagerly include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExpandClause(Vec<String>);

impl ExpandClause {
    /// Build from paths, keeping the first occurrence of each
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Self(unique)
    }

    /// Parse a comma separated list such as `orders/items,profile`
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|p| !p.is_empty()))
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for ExpandClause {
    fn from(paths: Vec<String>) -> Self {
        Self::new(paths)
    }
}

impl From<ExpandClause> for Vec<String> {
    fn from(clause: ExpandClause) -> Self {
        clause.0
    }
}

/// Normalized client query. Every clause is optional; absent clauses leave the
/// query handle untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityQuery {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    select: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    take: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expand: Option<ExpandClause>,
}

impl EntityQuery {
    pub fn builder() -> EntityQueryBuilder {
        EntityQueryBuilder::default()
    }

    pub fn where_predicate(&self) -> Option<&str> {
        self.where_predicate.as_deref()
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn select(&self) -> Option<&str> {
        self.select.as_deref()
    }

    pub fn skip(&self) -> Option<u32> {
        self.skip
    }

    pub fn take(&self) -> Option<u32> {
        self.take
    }

    pub fn expand(&self) -> Option<&ExpandClause> {
        self.expand.as_ref()
    }

    /// True when no clause is present
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Builder for [`EntityQuery`].
#[derive(Debug, Clone, Default)]
pub struct EntityQueryBuilder {
    query: EntityQuery,
}

impl EntityQueryBuilder {
    pub fn where_predicate<S: Into<String>>(mut self, predicate: S) -> Self {
        self.query.where_predicate = Some(predicate.into());
        self
    }

    pub fn order_by<S: Into<String>>(mut self, order_by: S) -> Self {
        self.query.order_by = Some(order_by.into());
        self
    }

    pub fn select<S: Into<String>>(mut self, select: S) -> Self {
        self.query.select = Some(select.into());
        self
    }

    pub fn skip(mut self, count: u32) -> Self {
        self.query.skip = Some(count);
        self
    }

    pub fn take(mut self, count: u32) -> Self {
        self.query.take = Some(count);
        self
    }

    pub fn expand<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.expand = Some(ExpandClause::new(paths));
        self
    }

    pub fn build(self) -> EntityQuery {
        self.query
    }
}
