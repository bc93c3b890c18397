// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document schemas: a named set of typed fields plus nested sub-documents.

use std::collections::BTreeMap;

use crate::error::SchemaError;

use super::field::{Field, FieldType};

/// One declaration applied while building a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOption {
    Field(Field),
    SubDocument(Document),
}

/// Immutable schema of one shape of indexable record.
///
/// A name is either a field or a sub-document, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    fields: BTreeMap<String, FieldType>,
    sub_documents: BTreeMap<String, Document>,
}

impl Document {
    /// Build a document by applying `options` in order.
    ///
    /// Fails on the first duplicate or overlapping name instead of
    /// overwriting the earlier declaration.
    pub fn build(
        name: impl Into<String>,
        options: impl IntoIterator<Item = DocumentOption>,
    ) -> Result<Self, SchemaError> {
        let mut doc = Self {
            name: name.into(),
            fields: BTreeMap::new(),
            sub_documents: BTreeMap::new(),
        };
        for option in options {
            doc.apply(option)?;
        }
        Ok(doc)
    }

    /// Start a chained declaration.
    pub fn builder(name: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder {
            name: name.into(),
            options: Vec::new(),
        }
    }

    fn apply(&mut self, option: DocumentOption) -> Result<(), SchemaError> {
        match option {
            DocumentOption::Field(field) => {
                if self.fields.contains_key(&field.name) {
                    return Err(SchemaError::DuplicateField {
                        document: self.name.clone(),
                        field: field.name,
                    });
                }
                if self.sub_documents.contains_key(&field.name) {
                    return Err(SchemaError::FieldOverlapsSubDocument {
                        document: self.name.clone(),
                        field: field.name,
                    });
                }
                self.fields.insert(field.name, field.field_type);
            }
            DocumentOption::SubDocument(sub) => {
                if self.fields.contains_key(&sub.name) {
                    return Err(SchemaError::SubDocumentOverlapsField {
                        document: self.name.clone(),
                        sub_document: sub.name,
                    });
                }
                if self.sub_documents.contains_key(&sub.name) {
                    return Err(SchemaError::DuplicateSubDocument {
                        document: self.name.clone(),
                        sub_document: sub.name,
                    });
                }
                self.sub_documents.insert(sub.name.clone(), sub);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of a direct field of this document.
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    /// Direct fields, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    #[must_use]
    pub fn sub_document(&self, name: &str) -> Option<&Document> {
        self.sub_documents.get(name)
    }

    /// Sub-documents, ordered by name.
    pub fn sub_documents(&self) -> impl Iterator<Item = &Document> {
        self.sub_documents.values()
    }
}

/// Chained form of [`Document::build`].
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    name: String,
    options: Vec<DocumentOption>,
}

impl DocumentBuilder {
    /// Declare a field of any type
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.options
            .push(DocumentOption::Field(Field::new(name, field_type)));
        self
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Text)
    }

    pub fn keyword(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Keyword)
    }

    pub fn keyword_list(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::KeywordList)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Number)
    }

    pub fn date(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Date)
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Boolean)
    }

    /// Nest an already built document under its own name
    pub fn sub_document(mut self, document: Document) -> Self {
        self.options.push(DocumentOption::SubDocument(document));
        self
    }

    pub fn build(self) -> Result<Document, SchemaError> {
        Document::build(self.name, self.options)
    }
}
