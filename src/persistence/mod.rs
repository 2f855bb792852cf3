//! Persistence layer
//!
//! - String key/value backends behind [`KeyValueStore`]
//! - [`Storage`] gateway: best score, settings, stats, daily seed, export/import
//! - Failures are typed here and swallowed (logged) at the gateway boundary

pub mod storage;
pub mod store;

pub use storage::{DailySeed, ExportBlob, Storage, keys};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{KeyValueStore, MemoryStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("malformed value under `{key}`: {source}")]
    Parse {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed number under `{key}`: {value:?}")]
    Number { key: &'static str, value: String },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
