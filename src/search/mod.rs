// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Compilation
//!
//! Compiles wire-format filters and sorts against a schema [`Index`](crate::schema::Index)
//! into a backend-neutral query AST, and renders that AST for concrete backends.
//!
//! # Architecture
//!
//! ```text
//! SearchRequest { filter, sort, page }
//!     ↓  FilterCompiler / compile_sort / Paging::resolve
//! SearchDirective { Query (AST), Ordering, Paging }
//!     ↓
//!     ├─→ InMemoryBackend → evaluated in process
//!     ├─→ RediSearchTranslator → FT.SEARCH syntax
//!     └─→ SqlTranslator → MySQL JSON_EXTRACT queries
//! ```
//!
//! # Filter Language
//!
//! ```text
//! {"base": "userId:Rob"}                        - Keyword equals
//! {"base": "description:fast database"}         - Text, any token
//! {"base": "createdTimestamp:>=1700000000"}     - Numeric range (==, !=, <=, >=, <, >)
//! {"base": "publishedAt:<2024-01-01T00:00:00.000Z"}  - Date range
//! {"and": [...]} / {"or": [...]}                - Boolean composition
//! ```
//!
//! # Example
//!
//! ```rust
//! use search_compiler::schema::{Document, Index};
//! use search_compiler::search::{compile_filter, Filter};
//!
//! let item = Document::builder("item")
//!     .keyword("userId")
//!     .number("createdTimestamp")
//!     .build()
//!     .unwrap();
//! let index = Index::build("items", vec![item]);
//!
//! let filter = Filter::and(vec![
//!     Filter::base("userId:Rob"),
//!     Filter::base("createdTimestamp:>=100"),
//! ]);
//! let query = compile_filter(Some(&filter), &index).unwrap();
//! assert!(!query.is_match_all());
//! ```

pub mod comparator;
mod filter;
mod mapping;
mod query_builder;
mod redis_translator;
mod request;
mod sort;
mod sql_translator;

pub use comparator::{ComparatorParser, RangeOperator, DATE_FORMAT};
pub use filter::{compile_filter, Filter, FilterCompiler};
pub use mapping::{
    CustomAnalyzer, DocumentMapping, FieldMapping, IndexMapping, KEYWORD_SEPARATOR, TYPE_FIELD,
};
pub use query_builder::{Bound, MatchQuery, Query, QueryBuilder, QueryNode, RangeQuery};
pub use redis_translator::RediSearchTranslator;
pub use request::{Page, Paging, SearchDirective, SearchRequest};
pub use sort::{compile_sort, compile_sort_field, Ordering, Sort, SortDirection, SortField};
pub use sql_translator::{SqlParam, SqlQuery, SqlSearch, SqlTranslator};
