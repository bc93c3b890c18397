use std::cmp::Ordering as CmpOrdering;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use super::traits::{BackendError, SearchBackend};
use crate::metrics::{self, LatencyTimer};
use crate::schema::{Analyzer, Index, SortKind};
use crate::search::{IndexMapping, MatchQuery, QueryNode, SearchDirective, SortField};

const BACKEND: &str = "memory";

/// Reference backend holding JSON records in memory.
///
/// Matching follows the mapping's analyzers: a match query hits when any
/// analyzed query token equals any analyzed token of the field. Array
/// values match when any element does. Records missing a sort key sort
/// last in either direction; ties fall back to id order.
pub struct InMemoryBackend {
    mapping: IndexMapping,
    documents: DashMap<String, Value>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(mapping: IndexMapping) -> Self {
        Self {
            mapping,
            documents: DashMap::new(),
        }
    }

    #[must_use]
    pub fn for_index(index: &Index) -> Self {
        Self::new(IndexMapping::from_index(index))
    }

    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    /// Get current document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Clear all documents
    pub fn clear(&self) {
        self.documents.clear();
        metrics::set_indexed_documents(BACKEND, 0);
    }

    fn check_type(&self, id: &str, document: &Value) -> Result<(), BackendError> {
        // Records without a type field fall back to the default mapping
        let Some(type_value) = document.get(&self.mapping.type_field) else {
            return Ok(());
        };
        let document_type = match type_value {
            Value::String(s) => s.as_str(),
            _ => {
                return Err(BackendError::UnknownDocumentType {
                    id: id.to_string(),
                    document_type: type_value.to_string(),
                })
            }
        };
        if self.mapping.document(document_type).is_none() {
            return Err(BackendError::UnknownDocumentType {
                id: id.to_string(),
                document_type: document_type.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn index(&self, id: &str, document: Value) -> Result<(), BackendError> {
        let _timer = LatencyTimer::new(BACKEND, "index");
        if !document.is_object() {
            return Err(BackendError::InvalidDocument { id: id.to_string() });
        }
        self.check_type(id, &document)?;

        self.documents.insert(id.to_string(), document);
        metrics::set_indexed_documents(BACKEND, self.documents.len());
        trace!(id, "Indexed document");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, BackendError> {
        let _timer = LatencyTimer::new(BACKEND, "delete");
        let removed = self.documents.remove(id).is_some();
        metrics::set_indexed_documents(BACKEND, self.documents.len());
        trace!(id, removed, "Deleted document");
        Ok(removed)
    }

    async fn search(&self, directive: &SearchDirective) -> Result<Vec<String>, BackendError> {
        let _timer = LatencyTimer::new(BACKEND, "search");

        let mut hits: Vec<(String, Value)> = self
            .documents
            .iter()
            .filter(|entry| matches(&directive.query.root, entry.value()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let total = hits.len();

        let sort_fields: &[SortField] = match &directive.ordering {
            Some(ordering) => &ordering.fields,
            None => &[],
        };
        hits.sort_by(|(a_id, a), (b_id, b)| {
            sort_fields
                .iter()
                .map(|field| compare_by(field, a, b))
                .find(|ord| *ord != CmpOrdering::Equal)
                .unwrap_or_else(|| a_id.cmp(b_id))
        });

        let ids: Vec<String> = hits
            .into_iter()
            .skip(directive.paging.offset)
            .take(directive.paging.count)
            .map(|(id, _)| id)
            .collect();

        metrics::record_search(BACKEND, "success");
        metrics::record_search_results(BACKEND, ids.len());
        debug!(total, returned = ids.len(), offset = directive.paging.offset, "Search complete");
        Ok(ids)
    }
}

fn matches(node: &QueryNode, document: &Value) -> bool {
    match node {
        QueryNode::MatchAll => true,
        QueryNode::Match(m) => match_text(m, document),
        QueryNode::NumericRange(range) => scalars(lookup(document, &range.field))
            .iter()
            .filter_map(|v| v.as_f64())
            .any(|n| range.contains(&n)),
        QueryNode::DateRange(range) => scalars(lookup(document, &range.field))
            .iter()
            .filter_map(|v| as_timestamp(v))
            .any(|ts| range.contains(&ts)),
        QueryNode::And(nodes) => nodes.iter().all(|n| matches(n, document)),
        QueryNode::Or(nodes) => nodes.iter().any(|n| matches(n, document)),
    }
}

fn match_text(m: &MatchQuery, document: &Value) -> bool {
    let wanted = m.analyzer.tokens(&m.value);
    if wanted.is_empty() {
        return false;
    }
    scalars(lookup(document, &m.field))
        .iter()
        .filter_map(|v| v.as_str())
        .any(|text| match m.analyzer {
            Analyzer::Keyword => text == m.value,
            Analyzer::English | Analyzer::KeywordList => {
                m.analyzer.tokens(text).iter().any(|t| wanted.contains(t))
            }
        })
}

/// Resolve a dotted path, descending through nested objects
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |value, segment| value.get(segment))
}

/// A value, or each element of an array value
fn scalars(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
        Some(v) => vec![v],
    }
}

/// Dates are stored as RFC 3339 strings or epoch milliseconds
fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

fn sort_value(field: &SortField, document: &Value) -> Option<SortValue> {
    let first = scalars(lookup(document, &field.field)).into_iter().next()?;
    match field.kind {
        SortKind::String => first.as_str().map(|s| SortValue::Text(s.to_string())),
        SortKind::Number => first.as_f64().map(SortValue::Number),
        SortKind::Date => as_timestamp(first).map(SortValue::Date),
    }
}

fn compare_by(field: &SortField, a: &Value, b: &Value) -> CmpOrdering {
    match (sort_value(field, a), sort_value(field, b)) {
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Greater,
        (Some(_), None) => CmpOrdering::Less,
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(CmpOrdering::Equal);
            if field.direction.is_descending() {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}
