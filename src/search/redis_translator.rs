//! RediSearch Translator
//!
//! Translates a compiled [`Query`] to RediSearch FT.SEARCH syntax and a
//! [`SearchDirective`] to the full FT.SEARCH argument list.
//!
//! # RediSearch Query Syntax
//!
//! ```text
//! *                         - Match everything
//! @field:word               - Text match (single token)
//! @field:(a|b)              - Text match (any token)
//! @field:{value}            - Tag match
//! (@field:x -@field:x)      - Matches nothing (value with no tokens)
//! @field:[min max]          - Numeric range, inclusive
//! @field:[(min (max]        - Numeric range, exclusive
//! @field:[-inf +inf]        - Unbounded ends
//! query1 query2             - AND (implicit)
//! query1 | query2           - OR
//! (query1 query2)           - Grouping
//! ```
//!
//! Date ranges are emitted as epoch milliseconds, matching the NUMERIC
//! schema [`IndexMapping`](super::IndexMapping) declares for DATE fields.

use tracing::warn;

use crate::schema::Analyzer;

use super::query_builder::{Bound, MatchQuery, Query, QueryNode, RangeQuery};
use super::request::SearchDirective;

/// Placeholder term for clauses that must match nothing
const NO_MATCH_TERM: &str = "nomatch";

/// RediSearch query translator
pub struct RediSearchTranslator;

impl RediSearchTranslator {
    /// Translate Query AST to RediSearch FT.SEARCH syntax
    pub fn translate(query: &Query) -> String {
        Self::translate_node(&query.root)
    }

    /// Build FT.SEARCH arguments (without the command name) returning ids only
    ///
    /// RediSearch sorts by a single key, so only the primary key of the
    /// ordering is applied.
    pub fn search_args(
        index_name: &str,
        directive: &SearchDirective,
        redis_prefix: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec![
            format!("{}idx:{}", redis_prefix.unwrap_or(""), index_name),
            Self::translate(&directive.query),
            "NOCONTENT".to_string(),
        ];

        if let Some(ordering) = &directive.ordering {
            if ordering.len() > 1 {
                warn!(
                    index = index_name,
                    dropped = ordering.len() - 1,
                    "RediSearch applies only the primary sort key"
                );
            }
            if let Some(primary) = ordering.primary() {
                args.push("SORTBY".to_string());
                args.push(primary.field.clone());
                args.push(if primary.direction.is_descending() { "DESC" } else { "ASC" }.to_string());
            }
        }

        args.push("LIMIT".to_string());
        args.push(directive.paging.offset.to_string());
        args.push(directive.paging.count.to_string());
        args
    }

    fn translate_node(node: &QueryNode) -> String {
        match node {
            QueryNode::MatchAll => "*".to_string(),
            QueryNode::Match(m) => Self::translate_match(m),
            QueryNode::NumericRange(range) => Self::translate_range(range, Self::format_number),
            QueryNode::DateRange(range) => {
                Self::translate_range(range, |dt| dt.timestamp_millis().to_string())
            }
            QueryNode::And(nodes) => {
                let parts: Vec<String> = nodes.iter().map(Self::translate_node).collect();
                if parts.len() == 1 {
                    parts[0].clone()
                } else {
                    format!("({})", parts.join(" "))
                }
            }
            QueryNode::Or(nodes) => {
                let parts: Vec<String> = nodes.iter().map(Self::translate_node).collect();
                if parts.len() == 1 {
                    parts[0].clone()
                } else {
                    format!("({})", parts.join(" | "))
                }
            }
        }
    }

    fn translate_match(m: &MatchQuery) -> String {
        let field_name = Self::escape_field_name(&m.field);
        let tokens = m.analyzer.tokens(&m.value);
        if tokens.is_empty() {
            return Self::match_none(&field_name, m.analyzer);
        }

        match m.analyzer {
            Analyzer::Keyword | Analyzer::KeywordList => {
                let tags: Vec<String> = tokens.iter().map(|t| Self::escape_value(t)).collect();
                format!("@{}:{{{}}}", field_name, tags.join("|"))
            }
            Analyzer::English if tokens.len() == 1 => format!("@{}:{}", field_name, tokens[0]),
            Analyzer::English => format!("@{}:({})", field_name, tokens.join("|")),
        }
    }

    /// A clause no document satisfies: a term and its own negation.
    ///
    /// Emitted for values that analyze to nothing, which RediSearch cannot
    /// express as an empty tag set or an empty term.
    fn match_none(field_name: &str, analyzer: Analyzer) -> String {
        match analyzer {
            Analyzer::Keyword | Analyzer::KeywordList => {
                format!("(@{f}:{{{t}}} -@{f}:{{{t}}})", f = field_name, t = NO_MATCH_TERM)
            }
            Analyzer::English => format!("(@{f}:{t} -@{f}:{t})", f = field_name, t = NO_MATCH_TERM),
        }
    }

    fn translate_range<T>(range: &RangeQuery<T>, format: impl Fn(&T) -> String) -> String {
        let bound = |b: &Option<Bound<T>>, unbounded: &str| match b {
            None => unbounded.to_string(),
            Some(b) if b.inclusive => format(&b.value),
            Some(b) => format!("({}", format(&b.value)),
        };
        format!(
            "@{}:[{} {}]",
            Self::escape_field_name(&range.field),
            bound(&range.min, "-inf"),
            bound(&range.max, "+inf")
        )
    }

    fn format_number(value: &f64) -> String {
        if !value.is_infinite() {
            value.to_string()
        } else if value.is_sign_positive() {
            "+inf".to_string()
        } else {
            "-inf".to_string()
        }
    }

    fn escape_field_name(field: &str) -> String {
        // Field names with special chars need backtick escaping
        if field.contains(|c: char| !c.is_alphanumeric() && c != '_') {
            format!("`{}`", field)
        } else {
            field.to_string()
        }
    }

    /// Escape all special chars including spaces (for single-term matching).
    fn escape_value(value: &str) -> String {
        let mut escaped = String::new();
        for c in value.chars() {
            match c {
                '@' | ':' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '%' | '-' | '+' | ' '
                | '.' | ',' | '<' | '>' | '!' | '=' | '~' | '$' | '"' | '\'' | '\\' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
