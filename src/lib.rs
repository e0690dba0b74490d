//! Treedigest: bounded-concurrency directory digester.
//!
//! Walk → path channel → `bound` digest workers → result channel → collector → `path → digest` map.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::DigestError;
pub use pipeline::CancelToken;
pub use types::*;

use log::debug;
use std::path::Path;

use crate::engine::hashing::DigestBackend;
use crate::utils::config::WorkerBoundLimits;

/// Result alias used by the public treedigest API
pub type Result<T> = std::result::Result<T, DigestError>;

/// Digest every regular file under `root` with `bound` concurrent workers.
///
/// Unreadable files are left out of the map; a traversal error (including a missing root)
/// fails the whole call.
pub fn compute_tree_digests(root: &Path, bound: usize) -> Result<DigestMap> {
    let opts = DigestOpts {
        bound: Some(bound),
        ..Default::default()
    };
    digest_tree(root, &opts, &CancelToken::new()).map(|report| report.digests)
}

/// Digest `root` with `opts`, stopping early if `cancel` fires (→ [`DigestError::Cancelled`]
/// carrying the partial map).
pub fn digest_tree(root: &Path, opts: &DigestOpts, cancel: &CancelToken) -> Result<DigestReport> {
    digest_tree_with(
        root,
        opts,
        cancel,
        &DigestBackend::default(),
        None::<fn(&FileDigest)>,
    )
}

/// Full entry point: custom reader/digest backend and an optional per-result callback.
///
/// - **`on_result: None`** → just the report.
/// - **`on_result: Some(f)`** → `f` runs on the collecting thread for every file result as it
///   arrives (read failures included). Keep it fast; it is on the collector's critical path.
pub fn digest_tree_with<F>(
    root: &Path,
    opts: &DigestOpts,
    cancel: &CancelToken,
    backend: &DigestBackend,
    on_result: Option<F>,
) -> Result<DigestReport>
where
    F: FnMut(&FileDigest),
{
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    if let Some(0) = opts.bound {
        return Err(DigestError::InvalidBound(0));
    }
    match opts.strategy {
        Strategy::Serial => {
            pipeline::digest_tree_serial(root, opts, cancel, backend, on_result)
        }
        Strategy::Bounded => {
            let bound = utils::resolve_bound(opts.bound, WorkerBoundLimits::current())?;
            pipeline::digest_tree_bounded(root, opts, bound, cancel, backend, on_result)
        }
    }
}

/// Worker bound [`digest_tree`] would use when `DigestOpts::bound` is None.
pub fn default_bound() -> usize {
    utils::resolve_bound(None, WorkerBoundLimits::current()).unwrap_or(1)
}
