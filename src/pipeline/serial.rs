//! Single-threaded variant: walk and digest on the caller's thread.
//! Same filters and the same omit-on-read-error policy as the pooled pipeline.

use log::debug;
use std::path::Path;

use crate::engine::hashing::DigestBackend;
use crate::error::DigestError;
use crate::types::{DigestOpts, DigestReport, FileDigest};

use super::cancel::CancelToken;
use super::collect::Collected;
use super::context::PipelineContext;
use super::error_handler::log_skipped_paths;
use super::walk::{Visit, visit, walk_iter};

pub fn digest_tree_serial<F>(
    root: &Path,
    opts: &DigestOpts,
    cancel: &CancelToken,
    backend: &DigestBackend,
    mut on_result: Option<F>,
) -> Result<DigestReport, DigestError>
where
    F: FnMut(&FileDigest),
{
    let ctx = PipelineContext {
        root: root.to_path_buf(),
        exclude: opts.exclude.clone(),
        follow_links: opts.follow_links,
        skip_walk_errors: opts.skip_walk_errors,
        cancel: cancel.clone(),
    };
    let mut collected = Collected::default();
    let mut walk_errors = Vec::new();
    let mut path_count = 0_usize;

    for outcome in walk_iter(&ctx, opts.walk_mode) {
        if cancel.is_cancelled() {
            return Err(DigestError::Cancelled(collected.digests));
        }
        match visit(&ctx, outcome) {
            Visit::File(path) => {
                path_count += 1;
                let digest = backend.digest_file(&path);
                let result = FileDigest { path, digest };
                if let Some(f) = on_result.as_mut() {
                    f(&result);
                }
                collected.push(result, root, opts.relative_paths);
            }
            Visit::Skip => {}
            Visit::Tolerated(path, msg) => walk_errors.push((path, msg)),
            Visit::Fatal(err) => return Err(err),
        }
    }
    if cancel.is_cancelled() {
        return Err(DigestError::Cancelled(collected.digests));
    }
    debug!(
        "serial: {} paths, {} digests",
        path_count,
        collected.digests.len()
    );
    log_skipped_paths(&collected.skipped, &walk_errors);
    Ok(DigestReport {
        digests: collected.digests,
        skipped: collected.skipped,
        walk_errors,
        path_count,
        bound: 1,
    })
}
