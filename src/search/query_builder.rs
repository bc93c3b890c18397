// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - compiled, backend-facing query AST
//!
//! This is what filters compile to and what every backend adapter consumes.
//! It can also be built directly when a caller already knows its fields.
//!
//! # Example
//!
//! ```rust
//! use search_compiler::schema::Analyzer;
//! use search_compiler::search::{Bound, Query, QueryBuilder};
//!
//! // Single leaf
//! let query = Query::matching("userId", "Rob", Analyzer::Keyword);
//!
//! // Half-open numeric range: createdTimestamp >= 5
//! let query = Query::numeric_range("createdTimestamp", Some(Bound::inclusive(5.0)), None);
//!
//! // Combinations
//! let query = QueryBuilder::new()
//!     .matching("userId", "Rob", Analyzer::Keyword)
//!     .numeric_range("createdTimestamp", None, Some(Bound::exclusive(1.0)))
//!     .build_and();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::Analyzer;

/// Compiled search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Root query node
    pub root: QueryNode,
}

impl Query {
    /// Create a new query from a root node
    pub fn new(root: QueryNode) -> Self {
        Self { root }
    }

    /// Query matching every document
    pub fn match_all() -> Self {
        Self::new(QueryNode::MatchAll)
    }

    /// Match `value` against `field`, analyzed the way the field is indexed
    pub fn matching(field: impl Into<String>, value: impl Into<String>, analyzer: Analyzer) -> Self {
        Self::new(QueryNode::Match(MatchQuery {
            field: field.into(),
            value: value.into(),
            analyzer,
        }))
    }

    /// Numeric range; `None` leaves that end unbounded
    pub fn numeric_range(
        field: impl Into<String>,
        min: Option<Bound<f64>>,
        max: Option<Bound<f64>>,
    ) -> Self {
        Self::new(QueryNode::NumericRange(RangeQuery::new(field, min, max)))
    }

    /// Date range; `None` leaves that end unbounded
    pub fn date_range(
        field: impl Into<String>,
        min: Option<Bound<DateTime<Utc>>>,
        max: Option<Bound<DateTime<Utc>>>,
    ) -> Self {
        Self::new(QueryNode::DateRange(RangeQuery::new(field, min, max)))
    }

    /// Combine with AND
    pub fn and(self, other: Query) -> Self {
        Self::new(QueryNode::And(vec![self.root, other.root]))
    }

    /// Combine with OR
    pub fn or(self, other: Query) -> Self {
        Self::new(QueryNode::Or(vec![self.root, other.root]))
    }

    /// Whether this is the universal query
    pub fn is_match_all(&self) -> bool {
        matches!(self.root, QueryNode::MatchAll)
    }
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNode {
    /// Every document
    MatchAll,
    /// Analyzed match on one field
    Match(MatchQuery),
    /// Numeric range on one field
    NumericRange(RangeQuery<f64>),
    /// Timestamp range on one field
    DateRange(RangeQuery<DateTime<Utc>>),
    /// All children must match, in order
    And(Vec<QueryNode>),
    /// Any child may match, in order
    Or(Vec<QueryNode>),
}

/// Single-field match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Field name
    pub field: String,
    /// Raw text to match, analyzed with `analyzer` by the backend
    pub value: String,
    /// Analyzer of the field
    pub analyzer: Analyzer,
}

/// One end of a range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound<T> {
    pub value: T,
    pub inclusive: bool,
}

impl<T> Bound<T> {
    pub fn inclusive(value: T) -> Self {
        Self { value, inclusive: true }
    }

    pub fn exclusive(value: T) -> Self {
        Self { value, inclusive: false }
    }
}

/// Range over an ordered domain; a missing bound is open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeQuery<T> {
    pub field: String,
    pub min: Option<Bound<T>>,
    pub max: Option<Bound<T>>,
}

impl<T: PartialOrd> RangeQuery<T> {
    pub fn new(field: impl Into<String>, min: Option<Bound<T>>, max: Option<Bound<T>>) -> Self {
        Self {
            field: field.into(),
            min,
            max,
        }
    }

    /// Whether `value` lies inside the range, honouring inclusivity
    pub fn contains(&self, value: &T) -> bool {
        let above_min = match &self.min {
            None => true,
            Some(b) if b.inclusive => *value >= b.value,
            Some(b) => *value > b.value,
        };
        let below_max = match &self.max {
            None => true,
            Some(b) if b.inclusive => *value <= b.value,
            Some(b) => *value < b.value,
        };
        above_min && below_max
    }
}

/// Builder for conjunctions and disjunctions
#[derive(Default)]
pub struct QueryBuilder {
    nodes: Vec<QueryNode>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add an already built node
    pub fn push(mut self, node: QueryNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a match constraint
    pub fn matching(
        self,
        field: impl Into<String>,
        value: impl Into<String>,
        analyzer: Analyzer,
    ) -> Self {
        self.push(Query::matching(field, value, analyzer).root)
    }

    /// Add a numeric range constraint
    pub fn numeric_range(
        self,
        field: impl Into<String>,
        min: Option<Bound<f64>>,
        max: Option<Bound<f64>>,
    ) -> Self {
        self.push(Query::numeric_range(field, min, max).root)
    }

    /// Add a date range constraint
    pub fn date_range(
        self,
        field: impl Into<String>,
        min: Option<Bound<DateTime<Utc>>>,
        max: Option<Bound<DateTime<Utc>>>,
    ) -> Self {
        self.push(Query::date_range(field, min, max).root)
    }

    /// Number of constraints added so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build query with AND semantics (all constraints must match)
    pub fn build_and(self) -> Query {
        Self::collapse(self.nodes, QueryNode::And)
    }

    /// Build query with OR semantics (any constraint can match)
    pub fn build_or(self) -> Query {
        Self::collapse(self.nodes, QueryNode::Or)
    }

    // Empty matches everything and a single node is returned unwrapped
    fn collapse(mut nodes: Vec<QueryNode>, combine: fn(Vec<QueryNode>) -> QueryNode) -> Query {
        match nodes.len() {
            0 => Query::match_all(),
            1 => Query::new(nodes.remove(0)),
            _ => Query::new(combine(nodes)),
        }
    }
}
