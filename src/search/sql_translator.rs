//! SQL Translator
//!
//! Translates a compiled [`Query`] to a parameterized WHERE clause over a
//! JSON column, and a [`SearchDirective`] to a complete id-only SELECT.
//! Uses MySQL JSON_EXTRACT syntax.
//!
//! # SQL Syntax Generated
//!
//! ```sql
//! JSON_UNQUOTE(JSON_EXTRACT(data, '$.userId')) = ?                 -- Keyword
//! LOWER(JSON_UNQUOTE(JSON_EXTRACT(data, '$.title')))
//!     REGEXP CONCAT('(^|[^[:alnum:]])', ?, '([^[:alnum:]]|$)')      -- Text token (whole word)
//! JSON_CONTAINS(data->'$.tags', ?)                                 -- Keyword list token
//! JSON_EXTRACT(data, '$.age') BETWEEN ? AND ?                      -- Closed range
//! (JSON_EXTRACT(data, '$.age') > ? AND JSON_EXTRACT(data, '$.age') <= ?)
//! ```
//!
//! Dates are stored as `YYYY-MM-DDTHH:MM:SS.sssZ` strings, whose
//! lexicographic order is their chronological order.

use chrono::{DateTime, Utc};

use crate::schema::{Analyzer, SortKind};

use super::comparator::format_timestamp;
use super::query_builder::{Bound, MatchQuery, Query, QueryNode, RangeQuery};
use super::request::SearchDirective;
use super::sort::Ordering;

/// Whole-word match of one bound token, the way the text analyzer splits words
const WORD_PATTERN: &str = "CONCAT('(^|[^[:alnum:]])', ?, '([^[:alnum:]]|$)')";

/// SQL query translator for JSON column queries
pub struct SqlTranslator;

/// SQL query result with parameterized placeholders
#[derive(Debug, Clone)]
pub struct SqlQuery {
    /// The WHERE clause (without "WHERE" keyword)
    pub clause: String,
    /// The parameter values in order
    pub params: Vec<SqlParam>,
}

/// SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Numeric(f64),
    Integer(u64),
}

/// Complete search: filter, order and page
#[derive(Debug, Clone)]
pub struct SqlSearch {
    pub filter: SqlQuery,
    /// ORDER BY list (without "ORDER BY"); `None` keeps the database order
    pub order_by: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SqlSearch {
    /// Render `SELECT <id_column> FROM <table> ...` with its parameters
    pub fn to_select(&self, table: &str, id_column: &str) -> (String, Vec<SqlParam>) {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            id_column, table, self.filter.clause
        );
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut params = self.filter.params.clone();
        params.push(SqlParam::Integer(self.limit as u64));
        params.push(SqlParam::Integer(self.offset as u64));
        (sql, params)
    }
}

impl SqlTranslator {
    /// Translate Query AST to parameterized SQL WHERE clause
    ///
    /// Uses `?` placeholders for parameters (MySQL style)
    pub fn translate(query: &Query, json_column: &str) -> SqlQuery {
        let mut params = Vec::new();
        let clause = Self::translate_node(&query.root, json_column, &mut params);
        SqlQuery { clause, params }
    }

    /// Translate Query AST to SQL WHERE clause with inline values
    ///
    /// Warning: Only use for debugging, not for actual queries (SQL injection risk)
    pub fn translate_inline(query: &Query, json_column: &str) -> String {
        let sql = Self::translate(query, json_column);

        let mut pieces = sql.clause.split('?');
        let mut result = pieces.next().unwrap_or_default().to_string();
        for (piece, param) in pieces.zip(sql.params.iter()) {
            match param {
                SqlParam::Text(s) => result.push_str(&format!("'{}'", s.replace('\'', "''"))),
                SqlParam::Numeric(n) => result.push_str(&n.to_string()),
                SqlParam::Integer(n) => result.push_str(&n.to_string()),
            }
            result.push_str(piece);
        }
        result
    }

    /// Translate an ordering to an ORDER BY list
    pub fn order_by(ordering: &Ordering, json_column: &str) -> Option<String> {
        if ordering.is_empty() {
            return None;
        }
        let keys: Vec<String> = ordering
            .fields
            .iter()
            .map(|field| {
                let json_path = Self::json_path(&field.field);
                let expr = match field.kind {
                    SortKind::Number => format!("JSON_EXTRACT({}, '{}')", json_column, json_path),
                    SortKind::String | SortKind::Date => {
                        format!("JSON_UNQUOTE(JSON_EXTRACT({}, '{}'))", json_column, json_path)
                    }
                };
                let direction = if field.direction.is_descending() { "DESC" } else { "ASC" };
                format!("{} {}", expr, direction)
            })
            .collect();
        Some(keys.join(", "))
    }

    /// Translate a full directive
    pub fn translate_directive(directive: &SearchDirective, json_column: &str) -> SqlSearch {
        SqlSearch {
            filter: Self::translate(&directive.query, json_column),
            order_by: directive
                .ordering
                .as_ref()
                .and_then(|o| Self::order_by(o, json_column)),
            limit: directive.paging.count,
            offset: directive.paging.offset,
        }
    }

    fn translate_node(node: &QueryNode, json_col: &str, params: &mut Vec<SqlParam>) -> String {
        match node {
            QueryNode::MatchAll => "1=1".to_string(),
            QueryNode::Match(m) => Self::translate_match(m, json_col, params),
            QueryNode::NumericRange(range) => {
                let expr = format!("JSON_EXTRACT({}, '{}')", json_col, Self::json_path(&range.field));
                Self::translate_range(range, &expr, params, |v| SqlParam::Numeric(*v))
            }
            QueryNode::DateRange(range) => {
                let expr = format!(
                    "JSON_UNQUOTE(JSON_EXTRACT({}, '{}'))",
                    json_col,
                    Self::json_path(&range.field)
                );
                Self::translate_range(range, &expr, params, |v: &DateTime<Utc>| {
                    SqlParam::Text(format_timestamp(v))
                })
            }
            QueryNode::And(nodes) => {
                let parts: Vec<String> = nodes
                    .iter()
                    .map(|n| Self::translate_node(n, json_col, params))
                    .collect();
                Self::join(parts, " AND ")
            }
            QueryNode::Or(nodes) => {
                let parts: Vec<String> = nodes
                    .iter()
                    .map(|n| Self::translate_node(n, json_col, params))
                    .collect();
                Self::join(parts, " OR ")
            }
        }
    }

    fn translate_match(m: &MatchQuery, json_col: &str, params: &mut Vec<SqlParam>) -> String {
        let json_path = Self::json_path(&m.field);

        match m.analyzer {
            Analyzer::Keyword => {
                let conditions: Vec<String> = Analyzer::Keyword
                    .tokens(&m.value)
                    .into_iter()
                    .map(|token| {
                        params.push(SqlParam::Text(token));
                        format!("JSON_UNQUOTE(JSON_EXTRACT({}, '{}')) = ?", json_col, json_path)
                    })
                    .collect();
                Self::join_or_false(conditions)
            }
            Analyzer::KeywordList => {
                let conditions: Vec<String> = Analyzer::KeywordList
                    .tokens(&m.value)
                    .into_iter()
                    .map(|token| {
                        params.push(SqlParam::Text(serde_json::Value::String(token).to_string()));
                        format!("JSON_CONTAINS({}->'{}', ?)", json_col, json_path)
                    })
                    .collect();
                Self::join_or_false(conditions)
            }
            Analyzer::English => {
                let conditions: Vec<String> = Analyzer::English
                    .tokens(&m.value)
                    .into_iter()
                    .map(|token| {
                        // tokens are alphanumeric, so they are literal inside the pattern
                        params.push(SqlParam::Text(token));
                        format!(
                            "LOWER(JSON_UNQUOTE(JSON_EXTRACT({}, '{}'))) REGEXP {}",
                            json_col, json_path, WORD_PATTERN
                        )
                    })
                    .collect();
                Self::join_or_false(conditions)
            }
        }
    }

    fn translate_range<T>(
        range: &RangeQuery<T>,
        expr: &str,
        params: &mut Vec<SqlParam>,
        to_param: impl Fn(&T) -> SqlParam,
    ) -> String {
        let lower = |b: &Bound<T>| if b.inclusive { ">=" } else { ">" };
        let upper = |b: &Bound<T>| if b.inclusive { "<=" } else { "<" };

        match (&range.min, &range.max) {
            (Some(min), Some(max)) if min.inclusive && max.inclusive => {
                params.push(to_param(&min.value));
                params.push(to_param(&max.value));
                format!("{} BETWEEN ? AND ?", expr)
            }
            (Some(min), Some(max)) => {
                params.push(to_param(&min.value));
                params.push(to_param(&max.value));
                format!("({} {} ? AND {} {} ?)", expr, lower(min), expr, upper(max))
            }
            (Some(min), None) => {
                params.push(to_param(&min.value));
                format!("{} {} ?", expr, lower(min))
            }
            (None, Some(max)) => {
                params.push(to_param(&max.value));
                format!("{} {} ?", expr, upper(max))
            }
            (None, None) => "1=1".to_string(), // Always true - no bounds
        }
    }

    fn join(parts: Vec<String>, separator: &str) -> String {
        if parts.len() == 1 {
            parts[0].clone()
        } else {
            format!("({})", parts.join(separator))
        }
    }

    // Nothing to match analyzes to no tokens, which matches no document
    fn join_or_false(conditions: Vec<String>) -> String {
        if conditions.is_empty() {
            "1=0".to_string()
        } else {
            Self::join(conditions, " OR ")
        }
    }

    fn json_path(field: &str) -> String {
        // Support dot notation for nested fields
        // e.g., "user.name" -> "$.user.name"
        if field.starts_with('$') {
            field.to_string()
        } else {
            format!("$.{}", field)
        }
    }
}
