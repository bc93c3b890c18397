//! Configuration for request compilation and the bundled backend adapters.
//!
//! # Example
//!
//! ```
//! use search_compiler::CompilerConfig;
//!
//! // Minimal config (uses defaults)
//! let config = CompilerConfig::default();
//! assert_eq!(config.default_page_size, 10);
//!
//! // From JSON, overriding a few fields
//! let config: CompilerConfig = serde_json::from_str(r#"{
//!     "max_page_size": 200,
//!     "redis_prefix": "sync:"
//! }"#).unwrap();
//! assert_eq!(config.max_page_size, 200);
//! assert_eq!(config.max_filter_depth, 32);
//! ```

use serde::Deserialize;

/// Default nesting limit for `and`/`or` filter nodes.
pub const DEFAULT_MAX_FILTER_DEPTH: usize = 32;

/// Configuration for the search compiler.
///
/// All fields have defaults, so an empty config document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerConfig {
    /// Page size used when a request omits `page.count` or sends 0
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound on `page.count`; larger requests are clamped
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Maximum nesting of `and`/`or` filter nodes
    #[serde(default = "default_max_filter_depth")]
    pub max_filter_depth: usize,

    /// JSON column queried by the SQL adapter
    #[serde(default = "default_json_column")]
    pub json_column: String,

    /// Global key prefix for the RediSearch adapter (index names and key prefixes)
    #[serde(default)]
    pub redis_prefix: Option<String>,
}

fn default_page_size() -> usize { 10 }
fn default_max_page_size() -> usize { 1000 }
fn default_max_filter_depth() -> usize { DEFAULT_MAX_FILTER_DEPTH }
fn default_json_column() -> String { "data".to_string() }

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_filter_depth: default_max_filter_depth(),
            json_column: default_json_column(),
            redis_prefix: None,
        }
    }
}
