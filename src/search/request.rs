// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search requests and the directive they compile to.
//!
//! ```text
//! Request ::= { "filter": Filter?, "sort": Sort?, "page": { "count": int?, "offset": int? }? }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::schema::Index;

use super::filter::{Filter, FilterCompiler};
use super::query_builder::Query;
use super::sort::{compile_sort, Ordering, Sort};

/// Requested page; absent or zero values fall back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Wire-format search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub sort: Option<Sort>,
    #[serde(default)]
    pub page: Option<Page>,
}

/// Resolved paging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub offset: usize,
    pub count: usize,
}

impl Paging {
    /// Resolve a requested page against the configured defaults
    pub fn resolve(page: Option<&Page>, config: &CompilerConfig) -> Self {
        let offset = page.and_then(|p| p.offset).unwrap_or(0);
        let count = match page.and_then(|p| p.count) {
            None | Some(0) => config.default_page_size,
            Some(n) => n.min(config.max_page_size),
        };
        Self { offset, count }
    }
}

/// Everything a backend needs to run one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDirective {
    pub query: Query,
    /// `None` leaves ordering to the backend
    pub ordering: Option<Ordering>,
    pub paging: Paging,
}

impl SearchRequest {
    /// Compile filter, sort and page into a [`SearchDirective`].
    ///
    /// Fails before anything is handed to a backend if any part is invalid.
    pub fn compile(
        &self,
        index: &Index,
        config: &CompilerConfig,
    ) -> Result<SearchDirective, CompileError> {
        let query = FilterCompiler::new(index)
            .with_max_depth(config.max_filter_depth)
            .compile(self.filter.as_ref())?;
        let ordering = compile_sort(self.sort.as_ref(), index)?;
        let paging = Paging::resolve(self.page.as_ref(), config);

        debug!(
            index = index.name(),
            match_all = query.is_match_all(),
            sort_keys = ordering.as_ref().map_or(0, Ordering::len),
            offset = paging.offset,
            count = paging.count,
            "Compiled search request"
        );

        Ok(SearchDirective {
            query,
            ordering,
            paging,
        })
    }
}
