// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sort Compiler
//!
//! Turns `{"fields": ["createdTimestamp:<", "userId:>"]}` into an
//! [`Ordering`]: one [`SortField`] per entry, primary key first.
//! `<` sorts ascending, `>` descending.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompileError;
use crate::metrics;
use crate::schema::{Index, SortKind};

/// Serializable sort request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Sort {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a `<` / `>` suffix
    pub fn from_suffix(suffix: &str) -> Result<Self, CompileError> {
        match suffix {
            "<" => Ok(SortDirection::Ascending),
            ">" => Ok(SortDirection::Descending),
            other => Err(CompileError::UnrecognizedSortSuffix(other.to_string())),
        }
    }

    pub fn is_descending(self) -> bool {
        self == SortDirection::Descending
    }
}

/// One compiled sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
    pub kind: SortKind,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: SortDirection, kind: SortKind) -> Self {
        Self {
            field: field.into(),
            direction,
            kind,
        }
    }
}

/// Precedence-ordered sort keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub fields: Vec<SortField>,
}

impl Ordering {
    pub fn primary(&self) -> Option<&SortField> {
        self.fields.first()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Compile `sort` against `index`.
///
/// `None`, or a sort with no fields, yields `Ok(None)`: the backend applies
/// its default order. Repeated fields are kept as given.
pub fn compile_sort(sort: Option<&Sort>, index: &Index) -> Result<Option<Ordering>, CompileError> {
    let Some(sort) = sort.filter(|s| !s.fields.is_empty()) else {
        return Ok(None);
    };

    let start = Instant::now();
    let result = sort
        .fields
        .iter()
        .map(|entry| compile_sort_field(entry, index))
        .collect::<Result<Vec<_>, _>>()
        .map(|fields| Some(Ordering { fields }));
    metrics::record_compile_latency("sort", start.elapsed());

    match &result {
        Ok(_) => metrics::record_compilation("sort", "success"),
        Err(e) => {
            debug!(index = index.name(), error = %e, "Sort rejected");
            metrics::record_compilation("sort", e.kind().as_str());
        }
    }
    result
}

/// Compile one `"<field>:<direction>"` entry.
pub fn compile_sort_field(entry: &str, index: &Index) -> Result<SortField, CompileError> {
    let mut parts = entry.split(':');
    let (field, suffix) = match (parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(suffix), None) => (field, suffix),
        _ => return Err(CompileError::MissingDirectionSeparator(entry.to_string())),
    };

    let (_, field_type) = index.resolve_field(field)?;
    let kind = field_type
        .sort_kind()
        .ok_or_else(|| CompileError::UnsortableFieldType {
            field: field.to_string(),
            field_type,
        })?;
    let direction = SortDirection::from_suffix(suffix)?;

    Ok(SortField::new(field, direction, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Document, FieldType};

    fn index() -> Index {
        let doc = Document::builder("item")
            .keyword("userId")
            .keyword_list("tags")
            .number("createdTimestamp")
            .number("updatedTimestamp")
            .date("publishedAt")
            .boolean("archived")
            .build()
            .unwrap();
        Index::build("items", vec![doc])
    }

    #[test]
    fn test_sort_conversion() {
        let sort = Sort::new(["createdTimestamp:<", "updatedTimestamp:>", "userId:<"]);
        let ordering = compile_sort(Some(&sort), &index()).unwrap().unwrap();
        assert_eq!(
            ordering.fields,
            vec![
                SortField::new("createdTimestamp", SortDirection::Ascending, SortKind::Number),
                SortField::new("updatedTimestamp", SortDirection::Descending, SortKind::Number),
                SortField::new("userId", SortDirection::Ascending, SortKind::String),
            ]
        );
        assert_eq!(ordering.primary().unwrap().field, "createdTimestamp");
    }

    #[test]
    fn test_precedence_follows_input() {
        let doc = Document::builder("item")
            .number("a")
            .keyword("b")
            .build()
            .unwrap();
        let idx = Index::build("items", vec![doc]);
        let ordering = compile_sort(Some(&Sort::new(["a:<", "b:>"])), &idx)
            .unwrap()
            .unwrap();
        assert_eq!(
            ordering.fields,
            vec![
                SortField::new("a", SortDirection::Ascending, SortKind::Number),
                SortField::new("b", SortDirection::Descending, SortKind::String),
            ]
        );
    }

    #[test]
    fn test_no_sort_is_backend_default() {
        assert_eq!(compile_sort(None, &index()).unwrap(), None);
        assert_eq!(compile_sort(Some(&Sort::default()), &index()).unwrap(), None);
    }

    #[test]
    fn test_repeated_fields_kept() {
        let sort = Sort::new(["userId:<", "userId:>"]);
        let ordering = compile_sort(Some(&sort), &index()).unwrap().unwrap();
        assert_eq!(ordering.len(), 2);
        assert_eq!(ordering.fields[1].direction, SortDirection::Descending);
    }

    #[test]
    fn test_date_sort_kind() {
        let field = compile_sort_field("publishedAt:>", &index()).unwrap();
        assert_eq!(field.kind, SortKind::Date);
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(
            compile_sort_field("userId", &index()).unwrap_err(),
            CompileError::MissingDirectionSeparator("userId".into())
        );
        assert_eq!(
            compile_sort_field("a:b:<", &index()).unwrap_err(),
            CompileError::MissingDirectionSeparator("a:b:<".into())
        );
    }

    #[test]
    fn test_unrecognized_suffix() {
        assert_eq!(
            compile_sort_field("userId:asc", &index()).unwrap_err(),
            CompileError::UnrecognizedSortSuffix("asc".into())
        );
        assert_eq!(
            compile_sort_field("userId:", &index()).unwrap_err(),
            CompileError::UnrecognizedSortSuffix("".into())
        );
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            compile_sort_field("zzz:<", &index()).unwrap_err(),
            CompileError::FieldNotFound("zzz".into())
        );
    }

    #[test]
    fn test_field_checked_before_direction() {
        assert_eq!(
            compile_sort_field("zzz:asc", &index()).unwrap_err(),
            CompileError::FieldNotFound("zzz".into())
        );
        assert_eq!(
            compile_sort_field("archived:asc", &index()).unwrap_err(),
            CompileError::UnsortableFieldType {
                field: "archived".into(),
                field_type: FieldType::Boolean,
            }
        );
    }

    #[test]
    fn test_boolean_unsortable() {
        assert_eq!(
            compile_sort_field("archived:<", &index()).unwrap_err(),
            CompileError::UnsortableFieldType {
                field: "archived".into(),
                field_type: FieldType::Boolean,
            }
        );
    }

    #[test]
    fn test_one_bad_entry_fails_all() {
        let sort = Sort::new(["userId:<", "zzz:>"]);
        assert!(compile_sort(Some(&sort), &index()).is_err());
    }

    #[test]
    fn test_wire_format() {
        let sort: Sort = serde_json::from_str(r#"{"fields":["a:<","b:>"]}"#).unwrap();
        assert_eq!(sort, Sort::new(["a:<", "b:>"]));
    }
}
