//! Search backends: where compiled directives are executed.
//!
//! - [`traits::SearchBackend`]: index/delete records by id and run searches
//! - [`memory::InMemoryBackend`]: reference backend evaluating queries in process
//!
//! RediSearch and SQL stores are reached through the translators in
//! [`crate::search`], which render a directive into their native syntax.

pub mod memory;
pub mod traits;

pub use memory::InMemoryBackend;
pub use traits::{BackendError, SearchBackend};
