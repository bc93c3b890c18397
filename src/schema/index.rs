// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index schema registry: the ordered documents one search index serves.

use tracing::trace;

use crate::error::CompileError;

use super::document::Document;
use super::field::FieldType;

/// Ordered collection of [`Document`]s sharing one field namespace.
///
/// Built once at startup, then shared read-only (typically behind an `Arc`)
/// by every request that compiles against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    name: String,
    documents: Vec<Document>,
}

impl Index {
    /// Aggregate documents in declaration order.
    ///
    /// Nothing is checked across documents: fields and even document names may
    /// repeat, and every lookup is first-match-wins.
    pub fn build(name: impl Into<String>, documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            name: name.into(),
            documents: documents.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.name() == name)
    }

    /// Find the first document declaring `field` directly and return it with
    /// the field's type. Sub-documents are not searched.
    pub fn resolve_field(&self, field: &str) -> Result<(&Document, FieldType), CompileError> {
        self.documents
            .iter()
            .find_map(|doc| doc.field_type(field).map(|ty| (doc, ty)))
            .map(|(doc, ty)| {
                trace!(field, document = doc.name(), field_type = %ty, "Resolved field");
                (doc, ty)
            })
            .ok_or_else(|| CompileError::FieldNotFound(field.to_string()))
    }
}
