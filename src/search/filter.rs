// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter Compiler
//!
//! Recursive descent over the wire filter tree:
//!
//! ```text
//! Filter ::= { "base": "<field>:<comparator><literal>" }
//!          | { "and": [Filter, ...] }
//!          | { "or":  [Filter, ...] }
//! ```
//!
//! Each base filter's field is resolved against the [`Index`] and its
//! comparator expression handed to the parser for the field's type.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_MAX_FILTER_DEPTH;
use crate::error::CompileError;
use crate::metrics;
use crate::schema::Index;

use super::query_builder::{Query, QueryBuilder, QueryNode};

/// Serializable boolean expression over field comparisons.
///
/// Exactly one of `base`, `and`, `or` is populated per node. An empty `base`
/// string counts as unpopulated; an `and`/`or` key that is present counts as
/// populated even when its list is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Filter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Filter>>,
}

impl Filter {
    /// Single comparison, e.g. `"createdTimestamp:>=5"`
    pub fn base(expr: impl Into<String>) -> Self {
        Self {
            base: Some(expr.into()),
            ..Default::default()
        }
    }

    /// Conjunction of `filters`
    pub fn and(filters: Vec<Filter>) -> Self {
        Self {
            and: Some(filters),
            ..Default::default()
        }
    }

    /// Disjunction of `filters`
    pub fn or(filters: Vec<Filter>) -> Self {
        Self {
            or: Some(filters),
            ..Default::default()
        }
    }
}

/// The populated variant of a [`Filter`] node.
enum FilterNode<'a> {
    Base(&'a str),
    And(&'a [Filter]),
    Or(&'a [Filter]),
}

impl<'a> FilterNode<'a> {
    fn classify(filter: &'a Filter) -> Result<Self, CompileError> {
        let base = filter.base.as_deref().filter(|b| !b.is_empty());
        match (base, filter.and.as_deref(), filter.or.as_deref()) {
            (Some(b), None, None) => Ok(FilterNode::Base(b)),
            (None, Some(ands), None) => Ok(FilterNode::And(ands)),
            (None, None, Some(ors)) => Ok(FilterNode::Or(ors)),
            _ => Err(CompileError::InvalidFilterShape),
        }
    }
}

/// Compiles filters against one index.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'a> {
    index: &'a Index,
    max_depth: usize,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self {
            index,
            max_depth: DEFAULT_MAX_FILTER_DEPTH,
        }
    }

    /// Limit how deeply `and`/`or` nodes may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compile `filter`; `None` matches every document.
    pub fn compile(&self, filter: Option<&Filter>) -> Result<Query, CompileError> {
        let start = Instant::now();
        let result = match filter {
            None => Ok(Query::match_all()),
            Some(filter) => self.compile_node(filter, 1).map(Query::new),
        };
        metrics::record_compile_latency("filter", start.elapsed());
        match &result {
            Ok(_) => metrics::record_compilation("filter", "success"),
            Err(e) => {
                debug!(index = self.index.name(), error = %e, "Filter rejected");
                metrics::record_compilation("filter", e.kind().as_str());
            }
        }
        result
    }

    fn compile_node(&self, filter: &Filter, depth: usize) -> Result<QueryNode, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::FilterTooDeep {
                max: self.max_depth,
            });
        }
        match FilterNode::classify(filter)? {
            FilterNode::Base(expr) => self.compile_base(expr),
            FilterNode::And(children) => {
                if children.is_empty() {
                    return Err(CompileError::EmptyConjunction);
                }
                Ok(self.compile_children(children, depth)?.build_and().root)
            }
            FilterNode::Or(children) => {
                if children.is_empty() {
                    return Err(CompileError::EmptyDisjunction);
                }
                Ok(self.compile_children(children, depth)?.build_or().root)
            }
        }
    }

    fn compile_children(
        &self,
        children: &[Filter],
        depth: usize,
    ) -> Result<QueryBuilder, CompileError> {
        children.iter().try_fold(QueryBuilder::new(), |builder, child| {
            Ok(builder.push(self.compile_node(child, depth + 1)?))
        })
    }

    /// Compile one `"<field>:<comparator><literal>"` expression.
    pub fn compile_base(&self, expr: &str) -> Result<QueryNode, CompileError> {
        let (field, comparator) = expr
            .split_once(':')
            .ok_or_else(|| CompileError::MissingFieldSeparator(expr.to_string()))?;
        let (_, field_type) = self.index.resolve_field(field)?;
        let parse = field_type.comparator()?;
        parse(field, comparator)
    }
}

/// Compile `filter` against `index` with the default depth limit.
pub fn compile_filter(filter: Option<&Filter>, index: &Index) -> Result<Query, CompileError> {
    FilterCompiler::new(index).compile(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Analyzer, Document};
    use crate::search::query_builder::{Bound, MatchQuery, RangeQuery};

    fn index() -> Index {
        let doc = Document::builder("item")
            .keyword("userId")
            .keyword_list("tags")
            .text("description")
            .number("createdTimestamp")
            .number("updatedTimestamp")
            .date("publishedAt")
            .boolean("archived")
            .build()
            .unwrap();
        Index::build("items", vec![doc])
    }

    fn created(min: Option<Bound<f64>>, max: Option<Bound<f64>>) -> QueryNode {
        QueryNode::NumericRange(RangeQuery::new("createdTimestamp", min, max))
    }

    #[test]
    fn test_none_matches_all() {
        let query = compile_filter(None, &index()).unwrap();
        assert_eq!(query, Query::match_all());

        let empty = Index::build("empty", Vec::<Document>::new());
        assert_eq!(compile_filter(None, &empty).unwrap(), Query::match_all());
    }

    #[test]
    fn test_end_to_end_conversion() {
        let filter = Filter::and(vec![
            Filter::base("userId:Rob"),
            Filter::or(vec![
                Filter::base("createdTimestamp:<1"),
                Filter::base("createdTimestamp:>=5"),
            ]),
        ]);

        let query = compile_filter(Some(&filter), &index()).unwrap();
        assert_eq!(
            query.root,
            QueryNode::And(vec![
                QueryNode::Match(MatchQuery {
                    field: "userId".into(),
                    value: "Rob".into(),
                    analyzer: Analyzer::Keyword,
                }),
                QueryNode::Or(vec![
                    created(None, Some(Bound::exclusive(1.0))),
                    created(Some(Bound::inclusive(5.0)), None),
                ]),
            ])
        );
    }

    #[test]
    fn test_singleton_collapsing() {
        let idx = index();
        let base = Filter::base("createdTimestamp:==3");
        let plain = compile_filter(Some(&base), &idx).unwrap();
        let and = compile_filter(Some(&Filter::and(vec![base.clone()])), &idx).unwrap();
        let or = compile_filter(Some(&Filter::or(vec![base])), &idx).unwrap();
        assert_eq!(plain, and);
        assert_eq!(plain, or);
    }

    #[test]
    fn test_child_order_preserved() {
        let filter = Filter::or(vec![
            Filter::base("tags:b"),
            Filter::base("tags:a"),
            Filter::base("tags:c"),
        ]);
        let query = compile_filter(Some(&filter), &index()).unwrap();
        let QueryNode::Or(children) = query.root else {
            panic!("Expected Or node");
        };
        let values: Vec<_> = children
            .iter()
            .map(|c| match c {
                QueryNode::Match(m) => m.value.as_str(),
                _ => panic!("Expected Match node"),
            })
            .collect();
        assert_eq!(values, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_split_on_first_colon() {
        let query = compile_filter(Some(&Filter::base("description:time 12:30")), &index()).unwrap();
        assert_eq!(
            query,
            Query::matching("description", "time 12:30", Analyzer::English)
        );
    }

    #[test]
    fn test_shape_errors() {
        let idx = index();
        let empty = Filter::default();
        assert_eq!(
            compile_filter(Some(&empty), &idx).unwrap_err(),
            CompileError::InvalidFilterShape
        );

        let both = Filter {
            base: Some("userId:Rob".into()),
            and: Some(vec![Filter::base("userId:Bob")]),
            or: None,
        };
        assert_eq!(
            compile_filter(Some(&both), &idx).unwrap_err(),
            CompileError::InvalidFilterShape
        );

        let and_or = Filter {
            base: None,
            and: Some(vec![Filter::base("userId:Bob")]),
            or: Some(vec![]),
        };
        assert_eq!(
            compile_filter(Some(&and_or), &idx).unwrap_err(),
            CompileError::InvalidFilterShape
        );
    }

    #[test]
    fn test_empty_lists() {
        let idx = index();
        assert_eq!(
            compile_filter(Some(&Filter::and(vec![])), &idx).unwrap_err(),
            CompileError::EmptyConjunction
        );
        assert_eq!(
            compile_filter(Some(&Filter::or(vec![])), &idx).unwrap_err(),
            CompileError::EmptyDisjunction
        );
    }

    #[test]
    fn test_nested_error_fails_whole_filter() {
        let filter = Filter::and(vec![
            Filter::base("userId:Rob"),
            Filter::or(vec![Filter::base("createdTimestamp:<1"), Filter::default()]),
        ]);
        assert_eq!(
            compile_filter(Some(&filter), &index()).unwrap_err(),
            CompileError::InvalidFilterShape
        );
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            compile_filter(Some(&Filter::base("userId")), &index()).unwrap_err(),
            CompileError::MissingFieldSeparator("userId".into())
        );
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            compile_filter(Some(&Filter::base("zzz:foo")), &index()).unwrap_err(),
            CompileError::FieldNotFound("zzz".into())
        );
    }

    #[test]
    fn test_bad_comparator() {
        assert_eq!(
            compile_filter(Some(&Filter::base("createdTimestamp:~~3")), &index()).unwrap_err(),
            CompileError::InvalidRangeQuery("~~3".into())
        );
    }

    #[test]
    fn test_boolean_unsupported() {
        assert_eq!(
            compile_filter(Some(&Filter::base("archived:==true")), &index()).unwrap_err(),
            CompileError::UnsupportedFieldType(crate::schema::FieldType::Boolean)
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut filter = Filter::base("userId:Rob");
        for _ in 0..5 {
            filter = Filter::and(vec![filter]);
        }
        let idx = index();
        assert!(FilterCompiler::new(&idx).with_max_depth(6).compile(Some(&filter)).is_ok());
        assert_eq!(
            FilterCompiler::new(&idx)
                .with_max_depth(5)
                .compile(Some(&filter))
                .unwrap_err(),
            CompileError::FilterTooDeep { max: 5 }
        );
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"and":[{"base":"userId:Rob"},{"or":[{"base":"createdTimestamp:<1"},{"base":"createdTimestamp:>=5"}]}]}"#;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(
            filter,
            Filter::and(vec![
                Filter::base("userId:Rob"),
                Filter::or(vec![
                    Filter::base("createdTimestamp:<1"),
                    Filter::base("createdTimestamp:>=5"),
                ]),
            ])
        );
        assert_eq!(serde_json::to_string(&filter).unwrap(), json);
    }

    #[test]
    fn test_empty_base_string_is_unpopulated() {
        let filter: Filter =
            serde_json::from_str(r#"{"base":"","or":[{"base":"userId:Rob"}]}"#).unwrap();
        let query = compile_filter(Some(&filter), &index()).unwrap();
        assert_eq!(query, Query::matching("userId", "Rob", Analyzer::Keyword));
    }
}
