//! # Search Compiler
//!
//! A schema-driven compiler that turns client-supplied filter and sort
//! descriptions into backend search queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Schema Registry                        │
//! │  • Documents of named, typed fields (+ sub-documents)      │
//! │  • Index: ordered documents, frozen then shared            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Filter / Sort Compilers                     │
//! │  • "field:<op><literal>" parsed per field type             │
//! │  • and/or trees → Query AST, sort entries → Ordering       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     (SearchDirective)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Backends                              │
//! │  • InMemoryBackend: reference evaluator                    │
//! │  • RediSearch FT.SEARCH / MySQL JSON_EXTRACT translators   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use search_compiler::backend::{InMemoryBackend, SearchBackend};
//! use search_compiler::schema::{Document, Index};
//! use search_compiler::search::{Filter, SearchRequest, Sort};
//! use search_compiler::CompilerConfig;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let item = Document::builder("item")
//!         .keyword("userId")
//!         .number("createdTimestamp")
//!         .build()
//!         .expect("valid document");
//!     let index = Index::build("items", vec![item]);
//!
//!     let backend = InMemoryBackend::for_index(&index);
//!     backend
//!         .index("1", json!({"type": "item", "userId": "Rob", "createdTimestamp": 5}))
//!         .await
//!         .expect("indexed");
//!
//!     let request = SearchRequest {
//!         filter: Some(Filter::base("userId:Rob")),
//!         sort: Some(Sort::new(["createdTimestamp:>"])),
//!         page: None,
//!     };
//!     let ids = backend
//!         .search_request(&request, &index, &CompilerConfig::default())
//!         .await
//!         .expect("search");
//!     assert_eq!(ids, vec!["1".to_string()]);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: Field types, documents and indexes
//! - [`search`]: Filter/sort compilers, query AST, backend translators
//! - [`backend`]: The [`SearchBackend`] trait and the in-memory backend
//! - [`config`]: Compiler configuration
//! - [`error`]: Schema and compile errors
//! - [`metrics`]: Compilation and search metrics

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod search;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use backend::{BackendError, InMemoryBackend, SearchBackend};
pub use config::CompilerConfig;
pub use error::{CompileError, ErrorKind, SchemaError};
pub use metrics::LatencyTimer;
pub use schema::{Document, FieldType, Index, SortKind};
pub use search::{
    compile_filter, compile_sort, Filter, Ordering, Query, QueryNode, SearchDirective,
    SearchRequest, Sort,
};
