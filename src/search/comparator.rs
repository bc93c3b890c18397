// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Comparator parsers for base filters.
//!
//! A base filter `"<field>:<expr>"` is handed to the parser that
//! [`FieldType::comparator`](crate::schema::FieldType::comparator) selects:
//!
//! ```text
//! TEXT / KEYWORD / KEYWORD_LIST   expr is the literal match text
//! NUMBER                          ==v  !=v  <=v  >=v  <v  >v   (v: float)
//! DATE                            same operators, v: YYYY-MM-DDTHH:MM:SS.sssZ
//! ```
//!
//! Range semantics:
//!
//! ```text
//! ==v   [v, v]
//! !=v   (-inf, v) | (v, +inf)
//! <=v   (-inf, v]
//! >=v   [v, +inf)
//! <v    (-inf, v)
//! >v    (v, +inf)
//! ```

use chrono::{DateTime, Utc};

use crate::error::CompileError;
use crate::schema::Analyzer;

use super::query_builder::{Bound, MatchQuery, QueryNode, RangeQuery};

/// Parses the comparator expression of a base filter on `field`.
pub type ComparatorParser = fn(field: &str, expr: &str) -> Result<QueryNode, CompileError>;

/// Layout every date literal must follow.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Range operator prefix of a number or date comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperator {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

impl RangeOperator {
    // Two-character prefixes first so "<=" is not read as "<"
    const PREFIXES: [(&'static str, RangeOperator); 6] = [
        ("==", RangeOperator::Eq),
        ("!=", RangeOperator::Ne),
        ("<=", RangeOperator::Le),
        (">=", RangeOperator::Ge),
        ("<", RangeOperator::Lt),
        (">", RangeOperator::Gt),
    ];

    /// Split `expr` into its operator and the literal that follows it.
    pub fn split(expr: &str) -> Result<(RangeOperator, &str), CompileError> {
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, op)| expr.strip_prefix(prefix).map(|rest| (*op, rest)))
            .ok_or_else(|| CompileError::InvalidRangeQuery(expr.to_string()))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            RangeOperator::Eq => "==",
            RangeOperator::Ne => "!=",
            RangeOperator::Le => "<=",
            RangeOperator::Ge => ">=",
            RangeOperator::Lt => "<",
            RangeOperator::Gt => ">",
        }
    }

    /// Expand the operator into range nodes over `field`.
    fn to_node<T: Clone + PartialOrd>(
        self,
        field: &str,
        value: T,
        wrap: fn(RangeQuery<T>) -> QueryNode,
    ) -> QueryNode {
        let range = |min, max| wrap(RangeQuery::new(field, min, max));
        match self {
            RangeOperator::Eq => range(
                Some(Bound::inclusive(value.clone())),
                Some(Bound::inclusive(value)),
            ),
            RangeOperator::Ne => QueryNode::Or(vec![
                range(None, Some(Bound::exclusive(value.clone()))),
                range(Some(Bound::exclusive(value)), None),
            ]),
            RangeOperator::Le => range(None, Some(Bound::inclusive(value))),
            RangeOperator::Ge => range(Some(Bound::inclusive(value)), None),
            RangeOperator::Lt => range(None, Some(Bound::exclusive(value))),
            RangeOperator::Gt => range(Some(Bound::exclusive(value)), None),
        }
    }
}

fn match_node(field: &str, expr: &str, analyzer: Analyzer) -> QueryNode {
    QueryNode::Match(MatchQuery {
        field: field.to_string(),
        value: expr.to_string(),
        analyzer,
    })
}

/// Full-text match; the expression is literal text.
pub fn parse_text(field: &str, expr: &str) -> Result<QueryNode, CompileError> {
    Ok(match_node(field, expr, Analyzer::English))
}

/// Exact keyword match; the expression is literal text.
pub fn parse_keyword(field: &str, expr: &str) -> Result<QueryNode, CompileError> {
    Ok(match_node(field, expr, Analyzer::Keyword))
}

/// Keyword-list match; the expression is literal text.
pub fn parse_keyword_list(field: &str, expr: &str) -> Result<QueryNode, CompileError> {
    Ok(match_node(field, expr, Analyzer::KeywordList))
}

/// Numeric comparison.
pub fn parse_number(field: &str, expr: &str) -> Result<QueryNode, CompileError> {
    let (op, literal) = RangeOperator::split(expr)?;
    let value = parse_float(literal)?;
    Ok(op.to_node(field, value, QueryNode::NumericRange))
}

/// Date comparison.
pub fn parse_date(field: &str, expr: &str) -> Result<QueryNode, CompileError> {
    let (op, literal) = RangeOperator::split(expr)?;
    let value = parse_timestamp(literal)?;
    Ok(op.to_node(field, value, QueryNode::DateRange))
}

/// Parse a base-10 float literal. NaN has no place in an ordered domain.
pub fn parse_float(literal: &str) -> Result<f64, CompileError> {
    let value: f64 = literal.parse().map_err(|e: std::num::ParseFloatError| {
        CompileError::InvalidNumber {
            literal: literal.to_string(),
            reason: e.to_string(),
        }
    })?;
    if value.is_nan() {
        return Err(CompileError::InvalidNumber {
            literal: literal.to_string(),
            reason: "not a number".to_string(),
        });
    }
    Ok(value)
}

/// Parse a millisecond-precision UTC timestamp in [`DATE_FORMAT`].
pub fn parse_timestamp(literal: &str) -> Result<DateTime<Utc>, CompileError> {
    let invalid = || CompileError::InvalidDate {
        literal: literal.to_string(),
    };
    // chrono accepts a leap second (":60"); the literal layout allows 00-59
    if !has_date_layout(literal) || &literal[17..19] >= "60" {
        return Err(invalid());
    }
    DateTime::parse_from_rfc3339(literal)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid())
}

/// Format a timestamp the way date literals are written.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

// YYYY-MM-DDTHH:MM:SS.sssZ, checked byte by byte so RFC 3339 variants
// (offsets, other fraction widths, lowercase t/z) are rejected.
fn has_date_layout(literal: &str) -> bool {
    const LAYOUT: &[u8; 24] = b"dddd-dd-ddTdd:dd:dd.dddZ";
    let bytes = literal.as_bytes();
    bytes.len() == LAYOUT.len()
        && bytes.iter().zip(LAYOUT.iter()).all(|(b, l)| match l {
            b'd' => b.is_ascii_digit(),
            other => b == other,
        })
}
