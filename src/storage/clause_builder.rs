//! Clause tokens to [`SqlQuery`] transforms
//!
//! Token formats understood here:
//!
//! - where: `field op value [and field op value]...`, where `op` is one of
//!   `eq ne gt ge lt le` and text values may be single-quoted (`''` escapes a
//!   quote)
//! - order-by: `field [asc|desc], ...`
//! - select: `field, ...`
//!
//! Field names must be columns of the entity being queried.

use super::schema::{Column, ColumnType, EntitySchema, SchemaCatalog};
use super::sql_query::{ComparisonOp, OrderTerm, Predicate, SortDirection, SqlQuery, SqlValue};
use crate::domain::TypeId;
use crate::errors::{QueryGateError, Result};
use crate::query::QueryBuilder;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Token::Word(text) | Token::Quoted(text) => text,
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '\'' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                if c != '\'' {
                    text.push(c);
                } else if chars.peek() == Some(&'\'') {
                    chars.next();
                    text.push('\'');
                } else {
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(QueryGateError::validation(
                    "Unterminated string literal in where clause",
                ));
            }
            tokens.push(Token::Quoted(text));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '\'' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn parse_value(column: &Column, token: &Token) -> Result<SqlValue> {
    let text = token.text();
    let invalid = || {
        QueryGateError::validation_field(
            format!("Value '{}' does not match column type {:?}", text, column.column_type),
            column.name.as_str(),
        )
    };

    match column.column_type {
        ColumnType::Text => Ok(SqlValue::Text(text.to_string())),
        ColumnType::Integer => text.parse().map(SqlValue::Integer).map_err(|_| invalid()),
        ColumnType::Float => text.parse().map(SqlValue::Float).map_err(|_| invalid()),
        ColumnType::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(SqlValue::Boolean(true)),
            "false" => Ok(SqlValue::Boolean(false)),
            _ => Err(invalid()),
        },
    }
}

fn lookup_column<'s>(schema: &'s EntitySchema, name: &str) -> Result<&'s Column> {
    schema.find_column(name).ok_or_else(|| {
        QueryGateError::not_found("column", format!("{}.{}", schema.type_id(), name))
    })
}

/// Query-builder collaborator for [`SqlQuery`] handles.
#[derive(Debug, Clone)]
pub struct SqlClauseBuilder {
    catalog: Arc<SchemaCatalog>,
}

impl SqlClauseBuilder {
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self { catalog }
    }

    fn schema_for(&self, handle: &SqlQuery, entity: &TypeId) -> Result<&EntitySchema> {
        if handle.entity() != entity {
            return Err(QueryGateError::validation(format!(
                "Query over {} cannot take clauses for {}",
                handle.entity(),
                entity
            )));
        }
        self.catalog.get(entity)
    }
}

impl QueryBuilder<SqlQuery> for SqlClauseBuilder {
    fn apply_where(&self, handle: SqlQuery, entity: &TypeId, predicate: &str) -> Result<SqlQuery> {
        let schema = self.schema_for(&handle, entity)?;
        let mut tokens = tokenize(predicate)?.into_iter();
        let mut predicates = Vec::new();

        loop {
            let (field, op, value) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(Token::Word(field)), Some(Token::Word(op)), Some(value)) => {
                    (field, op, value)
                }
                _ => {
                    return Err(QueryGateError::validation(format!(
                        "Expected 'field op value' in where clause '{}'",
                        predicate
                    )))
                }
            };

            let column = lookup_column(schema, &field)?;
            let op = ComparisonOp::parse(&op).ok_or_else(|| {
                QueryGateError::validation_field(
                    format!("Unknown operator '{}'", op),
                    field.as_str(),
                )
            })?;
            predicates.push(Predicate {
                column: column.name.clone(),
                op,
                value: parse_value(column, &value)?,
            });

            match tokens.next() {
                None => break,
                Some(Token::Word(word)) if word.eq_ignore_ascii_case("and") => continue,
                Some(other) => {
                    return Err(QueryGateError::validation(format!(
                        "Expected 'and' but found '{}'",
                        other.text()
                    )))
                }
            }
        }

        Ok(predicates.into_iter().fold(handle, SqlQuery::filter))
    }

    fn apply_order_by(
        &self,
        handle: SqlQuery,
        entity: &TypeId,
        order_by: &str,
    ) -> Result<SqlQuery> {
        let schema = self.schema_for(&handle, entity)?;
        let mut terms = Vec::new();

        for part in order_by.split(',') {
            let mut words = part.split_whitespace();
            let field = words.next().ok_or_else(|| {
                QueryGateError::validation(format!("Empty term in order-by '{}'", order_by))
            })?;
            let direction = match words.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(QueryGateError::validation_field(
                        format!("Unknown sort direction '{}'", other),
                        field,
                    ))
                }
            };
            if let Some(extra) = words.next() {
                return Err(QueryGateError::validation(format!(
                    "Unexpected '{}' in order-by term '{}'",
                    extra,
                    part.trim()
                )));
            }

            terms.push(OrderTerm {
                column: lookup_column(schema, field)?.name.clone(),
                direction,
            });
        }

        Ok(handle.order_by(terms))
    }

    fn apply_select(&self, handle: SqlQuery, entity: &TypeId, select: &str) -> Result<SqlQuery> {
        let schema = self.schema_for(&handle, entity)?;
        let columns = select
            .split(',')
            .map(str::trim)
            .map(|field| {
                if field.is_empty() {
                    Err(QueryGateError::validation(format!("Empty field in select '{}'", select)))
                } else {
                    lookup_column(schema, field).map(|c| c.name.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(handle.project(columns))
    }

    fn apply_skip(&self, handle: SqlQuery, _entity: &TypeId, count: u32) -> Result<SqlQuery> {
        Ok(handle.skip(count))
    }

    fn apply_take(&self, handle: SqlQuery, _entity: &TypeId, count: u32) -> Result<SqlQuery> {
        Ok(handle.take(count))
    }
}
