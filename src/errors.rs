//! Typed error hierarchy for the roadmap server.
//!
//! Two enums cover the two seams below the command layer:
//! - `StoreError`: reading, parsing and writing the roadmap document
//! - `RoadmapError`: everything a request handler can hit, store and tree
//!   mutations included

use std::path::PathBuf;

use roadmap_core::TreeError;
use thiserror::Error;

/// Errors from the JSON document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read roadmap file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write roadmap file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Roadmap file at {path} is not a valid document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize roadmap: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by roadmap operations run through the store handle.
#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Roadmap store lock poisoned")]
    LockPoisoned,

    #[error("Roadmap task failed: {0}")]
    TaskFailed(String),
}
