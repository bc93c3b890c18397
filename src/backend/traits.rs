use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::schema::Index;
use crate::search::{SearchDirective, SearchRequest};

#[derive(Error, Debug, PartialEq)]
pub enum BackendError {
    #[error("Search backend error: {0}")]
    Backend(String),
    #[error("Document '{id}' is not a JSON object")]
    InvalidDocument { id: String },
    #[error("Document '{id}' has unmapped type '{document_type}'")]
    UnknownDocumentType { id: String, document_type: String },
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// A store that indexes JSON records and answers compiled searches with ids.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short backend label used in logs and metric labels
    fn name(&self) -> &'static str;

    /// Index (or re-index) the record stored under `id`.
    async fn index(&self, id: &str, document: Value) -> Result<(), BackendError>;

    /// Remove `id` from the index. Returns whether it was present.
    async fn delete(&self, id: &str) -> Result<bool, BackendError>;

    /// Ids of the matching records, ordered and paged as directed.
    async fn search(&self, directive: &SearchDirective) -> Result<Vec<String>, BackendError>;

    /// Compile `request` against `index` and run it.
    /// Nothing reaches the backend when compilation fails.
    async fn search_request(
        &self,
        request: &SearchRequest,
        index: &Index,
        config: &CompilerConfig,
    ) -> Result<Vec<String>, BackendError> {
        let directive = request.compile(index, config)?;
        self.search(&directive).await
    }
}
