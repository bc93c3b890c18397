// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Typed document schemas that filters and sorts are compiled against.
//!
//! # Example
//!
//! ```rust
//! use search_compiler::schema::{Document, FieldType, Index};
//!
//! let item = Document::builder("item")
//!     .keyword("userId")
//!     .keyword_list("tags")
//!     .number("createdTimestamp")
//!     .build()
//!     .unwrap();
//!
//! let index = Index::build("items", vec![item]);
//!
//! let (doc, field_type) = index.resolve_field("tags").unwrap();
//! assert_eq!(doc.name(), "item");
//! assert_eq!(field_type, FieldType::KeywordList);
//! ```
//!
//! # Design
//!
//! - **Fail, don't overwrite**: duplicate or overlapping names within a document are a
//!   [`SchemaError`](crate::SchemaError) at declaration time
//! - **Freeze then publish**: documents have no mutators once built; wrap the
//!   finished [`Index`] in an `Arc` before handing it to request handlers
//! - **First match wins**: field resolution scans documents in declaration order

mod document;
mod field;
mod index;

pub use document::{Document, DocumentBuilder, DocumentOption};
pub use field::{Analyzer, Field, FieldType, SortKind};
pub use index::Index;
