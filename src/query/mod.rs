//! # Query Clause Application
//!
//! Layers the clauses of an [`EntityQuery`] onto a data-access handle. Each
//! clause is applied only when present; absent clauses return the handle
//! unchanged. Interpretation of the opaque where/order-by/select tokens is the
//! job of a [`QueryBuilder`] collaborator, whose failures are returned as-is.

pub mod expand;

pub use expand::{most_specific_paths, normalize_path};

use crate::domain::{EntityQuery, TypeId};
use tracing::{debug, instrument};

/// A composable data-access query. Transforms consume the handle and return
/// a new one.
pub trait QueryHandle: Sized {
    type Error;

    /// Eagerly include the related entities along a dot-delimited path
    fn include(self, path: &str) -> Result<Self, Self::Error>;
}

/// Collaborator that turns clause tokens into handle transforms.
pub trait QueryBuilder<H: QueryHandle> {
    fn apply_where(&self, handle: H, entity: &TypeId, predicate: &str) -> Result<H, H::Error>;

    fn apply_order_by(&self, handle: H, entity: &TypeId, order_by: &str) -> Result<H, H::Error>;

    fn apply_select(&self, handle: H, entity: &TypeId, select: &str) -> Result<H, H::Error>;

    fn apply_skip(&self, handle: H, entity: &TypeId, count: u32) -> Result<H, H::Error>;

    fn apply_take(&self, handle: H, entity: &TypeId, count: u32) -> Result<H, H::Error>;
}

/// Applies [`EntityQuery`] clauses through a borrowed [`QueryBuilder`].
pub struct ClauseApplier<'a, B: ?Sized> {
    builder: &'a B,
}

impl<'a, B: ?Sized> ClauseApplier<'a, B> {
    pub fn new(builder: &'a B) -> Self {
        Self { builder }
    }

    pub fn apply_where<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        match query.where_predicate() {
            Some(predicate) => {
                debug!(entity = %entity, predicate, "Applying where clause");
                self.builder.apply_where(handle, entity, predicate)
            }
            None => Ok(handle),
        }
    }

    pub fn apply_order_by<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        match query.order_by() {
            Some(order_by) => {
                debug!(entity = %entity, order_by, "Applying order-by clause");
                self.builder.apply_order_by(handle, entity, order_by)
            }
            None => Ok(handle),
        }
    }

    pub fn apply_select<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        match query.select() {
            Some(select) => {
                debug!(entity = %entity, select, "Applying select clause");
                self.builder.apply_select(handle, entity, select)
            }
            None => Ok(handle),
        }
    }

    /// Counts are passed through unvalidated
    pub fn apply_skip<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        match query.skip() {
            Some(count) => {
                debug!(entity = %entity, count, "Applying skip clause");
                self.builder.apply_skip(handle, entity, count)
            }
            None => Ok(handle),
        }
    }

    pub fn apply_take<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        match query.take() {
            Some(count) => {
                debug!(entity = %entity, count, "Applying take clause");
                self.builder.apply_take(handle, entity, count)
            }
            None => Ok(handle),
        }
    }

    pub fn apply_expand<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
    {
        apply_expand(query, handle, entity)
    }

    /// Apply every present clause: where, order-by, select, skip, take, expand
    pub fn apply_all<H>(
        &self,
        query: &EntityQuery,
        handle: H,
        entity: &TypeId,
    ) -> Result<H, H::Error>
    where
        H: QueryHandle,
        B: QueryBuilder<H>,
    {
        let _span = crate::query_span!("apply_all", entity = %entity).entered();
        let handle = self.apply_where(query, handle, entity)?;
        let handle = self.apply_order_by(query, handle, entity)?;
        let handle = self.apply_select(query, handle, entity)?;
        let handle = self.apply_skip(query, handle, entity)?;
        let handle = self.apply_take(query, handle, entity)?;
        self.apply_expand(query, handle, entity)
    }
}

/// Include the most specific expansion paths of `query` on `handle`.
///
/// Paths are normalized from `/` to `.` and any path that is a dot-bounded
/// prefix of another declared path is dropped before inclusion.
#[instrument(skip_all, fields(entity = %entity), name = "apply_expand")]
pub fn apply_expand<H: QueryHandle>(
    query: &EntityQuery,
    handle: H,
    entity: &TypeId,
) -> Result<H, H::Error> {
    let Some(expand) = query.expand() else {
        return Ok(handle);
    };

    let paths = most_specific_paths(expand.paths());
    debug!(
        declared = expand.len(),
        included = paths.len(),
        "Including related entities"
    );

    paths.iter().try_fold(handle, |handle, path| handle.include(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssemblyId;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Recorded {
        ops: Vec<String>,
    }

    impl QueryHandle for Recorded {
        type Error = String;

        fn include(mut self, path: &str) -> Result<Self, Self::Error> {
            self.ops.push(format!("include:{}", path));
            Ok(self)
        }
    }

    #[derive(Default)]
    struct CountingBuilder {
        calls: RefCell<Vec<String>>,
    }

    impl CountingBuilder {
        fn record(&self, mut handle: Recorded, op: String) -> Result<Recorded, String> {
            self.calls.borrow_mut().push(op.clone());
            handle.ops.push(op);
            Ok(handle)
        }
    }

    impl QueryBuilder<Recorded> for CountingBuilder {
        fn apply_where(
            &self,
            handle: Recorded,
            _: &TypeId,
            predicate: &str,
        ) -> Result<Recorded, String> {
            if predicate == "broken" {
                return Err("unparsable predicate".to_string());
            }
            self.record(handle, format!("where:{}", predicate))
        }

        fn apply_order_by(
            &self,
            handle: Recorded,
            _: &TypeId,
            order_by: &str,
        ) -> Result<Recorded, String> {
            self.record(handle, format!("order:{}", order_by))
        }

        fn apply_select(
            &self,
            handle: Recorded,
            _: &TypeId,
            select: &str,
        ) -> Result<Recorded, String> {
            self.record(handle, format!("select:{}", select))
        }

        fn apply_skip(&self, handle: Recorded, _: &TypeId, count: u32) -> Result<Recorded, String> {
            self.record(handle, format!("skip:{}", count))
        }

        fn apply_take(&self, handle: Recorded, _: &TypeId, count: u32) -> Result<Recorded, String> {
            self.record(handle, format!("take:{}", count))
        }
    }

    fn entity() -> TypeId {
        TypeId::new("shop", "Customer", AssemblyId::new("shop"))
    }

    #[test]
    fn test_absent_clauses_are_identity() {
        let builder = CountingBuilder::default();
        let applier = ClauseApplier::new(&builder);
        let query = EntityQuery::default();
        let handle = Recorded {
            ops: vec!["seed".to_string()],
        };

        let entity = entity();
        assert_eq!(applier.apply_where(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_order_by(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_select(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_skip(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_take(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_expand(&query, handle.clone(), &entity), Ok(handle.clone()));
        assert_eq!(applier.apply_all(&query, handle.clone(), &entity), Ok(handle));
        assert!(builder.calls.borrow().is_empty());
    }

    #[test]
    fn test_skip_delegates_exactly_once() {
        let builder = CountingBuilder::default();
        let applier = ClauseApplier::new(&builder);
        let query = EntityQuery::builder().skip(5).build();

        let handle = applier.apply_all(&query, Recorded::default(), &entity()).unwrap();

        assert_eq!(*builder.calls.borrow(), vec!["skip:5".to_string()]);
        assert_eq!(handle.ops, vec!["skip:5".to_string()]);
    }

    #[test]
    fn test_apply_all_order() {
        let builder = CountingBuilder::default();
        let applier = ClauseApplier::new(&builder);
        let query = EntityQuery::builder()
            .expand(["orders", "orders/items"])
            .take(10)
            .skip(20)
            .select("id, name")
            .order_by("name")
            .where_predicate("id gt 3")
            .build();

        let handle = applier.apply_all(&query, Recorded::default(), &entity()).unwrap();

        assert_eq!(
            handle.ops,
            vec![
                "where:id gt 3",
                "order:name",
                "select:id, name",
                "skip:20",
                "take:10",
                "include:orders.items",
            ]
        );
    }

    #[test]
    fn test_collaborator_failure_propagates_unchanged() {
        let builder = CountingBuilder::default();
        let applier = ClauseApplier::new(&builder);
        let query = EntityQuery::builder().where_predicate("broken").take(1).build();

        let result = applier.apply_all(&query, Recorded::default(), &entity());

        assert_eq!(result, Err("unparsable predicate".to_string()));
        assert!(builder.calls.borrow().is_empty());
    }

    #[test]
    fn test_expand_includes_most_specific_paths_in_order() {
        let query = EntityQuery::builder()
            .expand(["orders", "orders/items", "profile"])
            .build();

        let handle = apply_expand(&query, Recorded::default(), &entity()).unwrap();

        assert_eq!(handle.ops, vec!["include:orders.items", "include:profile"]);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_expand_logs_pruned_count() {
        let query = EntityQuery::builder().expand(["orders", "orders/items"]).build();
        apply_expand(&query, Recorded::default(), &entity()).unwrap();
        assert!(logs_contain("declared=2 included=1"));
    }

    #[test]
    fn test_expand_include_failure_stops_chain() {
        struct Failing(usize);

        impl QueryHandle for Failing {
            type Error = String;

            fn include(self, path: &str) -> Result<Self, Self::Error> {
                if path == "missing" {
                    Err(format!("no relation {}", path))
                } else {
                    Ok(Failing(self.0 + 1))
                }
            }
        }

        let query = EntityQuery::builder().expand(["a", "missing", "b"]).build();
        let result = apply_expand(&query, Failing(0), &entity());
        assert_eq!(result.err(), Some("no relation missing".to_string()));
    }
}
