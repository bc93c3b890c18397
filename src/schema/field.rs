// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field type system.
//!
//! Every [`FieldType`] fixes three things through static `match` tables:
//! the comparator grammar legal in a base filter, the sort-key kind used by
//! an ordering, and the analyzer a backend indexes the field with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::search::comparator::{self, ComparatorParser};

/// Supported kinds of indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Tokenized prose, matched with a full-text match.
    Text,
    /// Single token, matched exactly.
    Keyword,
    /// Like `Keyword`, but the field may hold several tokens.
    KeywordList,
    /// Ordered numeric domain.
    Number,
    /// Ordered timestamp domain.
    Date,
    /// Two-valued domain.
    Boolean,
}

/// How an ordering compares the values of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    String,
    Number,
    Date,
}

/// Analysis applied to a string field, both at index and at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Language-aware tokenization (lower-cased word tokens).
    English,
    /// The whole value is one token.
    Keyword,
    /// Whitespace tokenizer followed by a lowercase filter.
    KeywordList,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Keyword,
        FieldType::KeywordList,
        FieldType::Number,
        FieldType::Date,
        FieldType::Boolean,
    ];

    /// Sort-key kind of this type; `None` for types that cannot be sorted.
    pub fn sort_kind(self) -> Option<SortKind> {
        match self {
            FieldType::Text | FieldType::Keyword | FieldType::KeywordList => Some(SortKind::String),
            FieldType::Number => Some(SortKind::Number),
            FieldType::Date => Some(SortKind::Date),
            FieldType::Boolean => None,
        }
    }

    /// Comparator parser legal for a base filter against this type.
    pub fn comparator(self) -> Result<ComparatorParser, CompileError> {
        match self {
            FieldType::Text => Ok(comparator::parse_text),
            FieldType::Keyword => Ok(comparator::parse_keyword),
            FieldType::KeywordList => Ok(comparator::parse_keyword_list),
            FieldType::Number => Ok(comparator::parse_number),
            FieldType::Date => Ok(comparator::parse_date),
            FieldType::Boolean => Err(CompileError::UnsupportedFieldType(self)),
        }
    }

    /// Analyzer for string-valued types.
    pub fn analyzer(self) -> Option<Analyzer> {
        match self {
            FieldType::Text => Some(Analyzer::English),
            FieldType::Keyword => Some(Analyzer::Keyword),
            FieldType::KeywordList => Some(Analyzer::KeywordList),
            FieldType::Number | FieldType::Date | FieldType::Boolean => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "TEXT"),
            FieldType::Keyword => write!(f, "KEYWORD"),
            FieldType::KeywordList => write!(f, "KEYWORD_LIST"),
            FieldType::Number => write!(f, "NUMBER"),
            FieldType::Date => write!(f, "DATE"),
            FieldType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

impl Analyzer {
    /// Registered analyzer name, as a backend mapping refers to it.
    pub fn name(self) -> &'static str {
        match self {
            Analyzer::English => "en",
            Analyzer::Keyword => "keyword",
            Analyzer::KeywordList => "keywordList",
        }
    }

    /// Split `text` into the tokens this analyzer indexes.
    pub fn tokens(self, text: &str) -> Vec<String> {
        match self {
            Analyzer::English => text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase)
                .collect(),
            Analyzer::Keyword if text.is_empty() => Vec::new(),
            Analyzer::Keyword => vec![text.to_string()],
            Analyzer::KeywordList => text.split_whitespace().map(str::to_lowercase).collect(),
        }
    }
}

/// A named, typed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}
