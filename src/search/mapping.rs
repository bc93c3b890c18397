//! Index Mapping
//!
//! Turns a schema [`Index`] into the field mapping a search backend indexes
//! documents with, and into RediSearch `FT.CREATE` arguments.
//!
//! # Field mappings
//!
//! ```text
//! TEXT          analyzer "en"           not stored, excluded from _all
//! KEYWORD       analyzer "keyword"      not stored, excluded from _all
//! KEYWORD_LIST  analyzer "keywordList"  not stored, excluded from _all
//! NUMBER        numeric                 not stored
//! DATE          datetime                not stored
//! BOOLEAN       boolean                 not stored
//! ```
//!
//! # RediSearch Index Creation
//!
//! ```text
//! FT.CREATE idx:items
//!   ON JSON
//!   PREFIX 1 item:
//!   SCHEMA
//!     $.userId AS userId TAG SEPARATOR "\x1f" CASESENSITIVE SORTABLE
//!     $.tags AS tags TAG SEPARATOR " "
//!     $.createdTimestamp AS createdTimestamp NUMERIC SORTABLE
//! ```

use std::collections::BTreeMap;

use crate::schema::{Analyzer, Document, FieldType, Index};

/// Field whose value names the document mapping a record is indexed with.
pub const TYPE_FIELD: &str = "type";

/// TAG separator for KEYWORD fields. RediSearch splits tags on `,` unless
/// told otherwise, and a keyword value must stay one tag.
pub const KEYWORD_SEPARATOR: &str = "\u{1f}";

/// How one field is indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub field_type: FieldType,
    /// Analyzer for string-valued fields
    pub analyzer: Option<Analyzer>,
    /// Whether the original value is stored in the index
    pub store: bool,
    /// Whether the field feeds the all-fields composite
    pub include_in_all: bool,
    pub include_term_vectors: bool,
}

impl FieldMapping {
    /// Mapping for `field_type`; one fixed row per type
    pub fn for_type(field_type: FieldType) -> Self {
        Self {
            field_type,
            analyzer: field_type.analyzer(),
            store: false,
            include_in_all: false,
            include_term_vectors: false,
        }
    }

    /// RediSearch schema type and options for this field
    fn redis_schema(&self) -> Vec<&'static str> {
        match self.field_type {
            FieldType::Text => vec!["TEXT", "SORTABLE"],
            FieldType::Keyword => {
                vec!["TAG", "SEPARATOR", KEYWORD_SEPARATOR, "CASESENSITIVE", "SORTABLE"]
            }
            FieldType::KeywordList => vec!["TAG", "SEPARATOR", " "],
            // Dates are indexed as epoch milliseconds
            FieldType::Number | FieldType::Date => vec!["NUMERIC", "SORTABLE"],
            FieldType::Boolean => vec!["TAG"],
        }
    }
}

/// Custom analyzer registered with the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAnalyzer {
    pub name: &'static str,
    pub tokenizer: &'static str,
    pub token_filters: Vec<&'static str>,
}

/// Mapping of one document and its sub-documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMapping {
    pub name: String,
    pub fields: BTreeMap<String, FieldMapping>,
    pub sub_documents: BTreeMap<String, DocumentMapping>,
}

impl DocumentMapping {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            name: doc.name().to_string(),
            fields: doc
                .fields()
                .map(|(name, ty)| (name.to_string(), FieldMapping::for_type(ty)))
                .collect(),
            sub_documents: doc
                .sub_documents()
                .map(|sub| (sub.name().to_string(), Self::from_document(sub)))
                .collect(),
        }
    }

    /// Look up a field by dotted path, descending into sub-documents
    pub fn field(&self, path: &str) -> Option<&FieldMapping> {
        match path.split_once('.') {
            Some((head, rest)) => self.sub_documents.get(head)?.field(rest),
            None => self.fields.get(path),
        }
    }

    /// Every field as `(dotted path, mapping)`, sub-documents after direct fields
    pub fn flatten(&self) -> Vec<(String, FieldMapping)> {
        let mut out: Vec<(String, FieldMapping)> = self
            .fields
            .iter()
            .map(|(name, mapping)| (name.clone(), *mapping))
            .collect();
        for (name, sub) in &self.sub_documents {
            out.extend(
                sub.flatten()
                    .into_iter()
                    .map(|(path, mapping)| (format!("{}.{}", name, path), mapping)),
            );
        }
        out
    }
}

/// Backend mapping for a whole index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapping {
    pub name: String,
    /// Record field selecting the document mapping
    pub type_field: String,
    pub default_analyzer: Analyzer,
    pub custom_analyzers: Vec<CustomAnalyzer>,
    /// Document mappings in index declaration order
    pub documents: Vec<DocumentMapping>,
}

impl IndexMapping {
    pub fn from_index(index: &Index) -> Self {
        Self {
            name: index.name().to_string(),
            type_field: TYPE_FIELD.to_string(),
            default_analyzer: Analyzer::English,
            custom_analyzers: vec![CustomAnalyzer {
                name: Analyzer::KeywordList.name(),
                tokenizer: "whitespace",
                token_filters: vec!["to_lower"],
            }],
            documents: index.documents().iter().map(DocumentMapping::from_document).collect(),
        }
    }

    pub fn document(&self, name: &str) -> Option<&DocumentMapping> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// Generate the FT.CREATE command arguments
    pub fn to_ft_create_args(&self, key_prefix: &str) -> Vec<String> {
        self.to_ft_create_args_with_prefix(key_prefix, None)
    }

    /// Generate FT.CREATE args with optional global redis prefix
    ///
    /// The redis_prefix is prepended to both the index name and the key prefix.
    /// A path declared by several documents is emitted once, first document wins.
    pub fn to_ft_create_args_with_prefix(
        &self,
        key_prefix: &str,
        redis_prefix: Option<&str>,
    ) -> Vec<String> {
        let prefix = redis_prefix.unwrap_or("");

        let mut args = vec![
            format!("{}idx:{}", prefix, self.name),
            "ON".to_string(),
            "JSON".to_string(),
            "PREFIX".to_string(),
            "1".to_string(),
            format!("{}{}", prefix, key_prefix),
            "SCHEMA".to_string(),
        ];

        let mut seen: Vec<String> = Vec::new();
        for doc in &self.documents {
            for (path, mapping) in doc.flatten() {
                if seen.contains(&path) {
                    continue;
                }
                args.push(format!("$.{}", path));
                args.push("AS".to_string());
                args.push(path.clone());
                args.extend(mapping.redis_schema().into_iter().map(String::from));
                seen.push(path);
            }
        }

        args
    }
}
