//! Error types for treedigest.
//!
//! Per-file read errors are not here: they stay inside [`FileDigest`](crate::FileDigest)
//! and only ever cause the file to be left out of the map.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::DigestMap;

#[derive(Error, Debug)]
pub enum DigestError {
    /// Walking the tree failed (missing root, unreadable directory, ...). Fatal to the batch.
    #[error("traversal failed{}: {msg}", path_suffix(.path))]
    Traversal { path: Option<PathBuf>, msg: String },

    /// The run was cancelled. Carries whatever the collector had accumulated.
    #[error("digest run cancelled after {} files", .0.len())]
    Cancelled(DigestMap),

    /// Worker bound must be at least 1.
    #[error("invalid worker bound {0}: must be >= 1")]
    InvalidBound(usize),

    /// A pipeline thread panicked.
    #[error("{stage} thread panicked")]
    WorkerPanicked { stage: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl DigestError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DigestError::Cancelled(_))
    }

    pub fn is_traversal(&self) -> bool {
        matches!(self, DigestError::Traversal { .. })
    }
}
