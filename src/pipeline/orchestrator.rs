use log::debug;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::engine::hashing::DigestBackend;
use crate::error::DigestError;
use crate::types::{DigestOpts, DigestReport, FileDigest};

use super::cancel::CancelToken;
use super::collect::collect_digests;
use super::context::{
    PipelineChannels, PipelineContext, PipelineHandles, PipelineTuning, create_pipeline_channels,
};
use super::digest::spawn_digest_pool;
use super::error_handler::{check_pipeline_outcome, log_skipped_paths};
use super::walk::{WalkOutcome, WalkSummary, spawn_path_source, spawn_walk_thread};
use crossbeam_channel::Sender;

/// Start the path source and, unless it has already reported a traversal error, the digest pool.
///
/// `spawn_source` receives the path sender, the one-shot error sender and the walk context, and
/// returns the walk thread handle. The error check between the two stages is non-blocking: an error
/// that arrives later is picked up by [`finish_pipeline`] instead.
pub fn run_pipeline<S>(
    root: &Path,
    opts: &DigestOpts,
    tuning: &PipelineTuning,
    cancel: &CancelToken,
    backend: &DigestBackend,
    spawn_source: S,
) -> Result<PipelineHandles, DigestError>
where
    S: FnOnce(Sender<PathBuf>, Sender<DigestError>, PipelineContext) -> JoinHandle<WalkSummary>,
{
    let PipelineChannels {
        path_tx,
        path_rx,
        result_tx,
        result_rx,
        err_tx,
        err_rx,
        ctx,
    } = create_pipeline_channels(root, opts, cancel, tuning.channel_cap);

    let walk_handle = spawn_source(path_tx, err_tx, ctx);

    if let Ok(err) = err_rx.try_recv() {
        debug!("main: traversal error before pool start: {}", err);
        let _ = walk_handle.join();
        return Err(err);
    }

    let pool_handle = spawn_digest_pool(path_rx, result_tx, tuning.bound, cancel, backend);

    Ok(PipelineHandles {
        result_rx,
        err_rx,
        walk_handle,
        pool_handle,
    })
}

/// Drain the results, join the walk and the pool, then turn what happened into the run's outcome.
pub fn finish_pipeline<F>(
    handles: PipelineHandles,
    root: &Path,
    opts: &DigestOpts,
    tuning: &PipelineTuning,
    cancel: &CancelToken,
    on_result: Option<F>,
) -> Result<DigestReport, DigestError>
where
    F: FnMut(&FileDigest),
{
    let PipelineHandles {
        result_rx,
        err_rx,
        walk_handle,
        pool_handle,
    } = handles;

    let collected = collect_digests(&result_rx, root, opts.relative_paths, on_result);
    // The pool closer only returns after the result stream closed, which we just observed.
    let pool = pool_handle.join();
    let walk = walk_handle.join();

    check_pipeline_outcome(&err_rx, &walk, &pool)?;
    if cancel.is_cancelled() {
        return Err(DigestError::Cancelled(collected.digests));
    }

    let summary = walk.unwrap_or_default();
    log_skipped_paths(&collected.skipped, &summary.walk_errors);
    Ok(DigestReport {
        digests: collected.digests,
        skipped: collected.skipped,
        walk_errors: summary.walk_errors,
        path_count: summary.count,
        bound: tuning.bound,
    })
}

/// Main orchestrator: walk thread → path channel → `bound` digest workers → result channel → map.
///
/// Stages watch a child of the caller's token, so a traversal error can stop this run's
/// workers without cancelling the caller's token.
pub fn digest_tree_bounded<F>(
    root: &Path,
    opts: &DigestOpts,
    bound: usize,
    cancel: &CancelToken,
    backend: &DigestBackend,
    on_result: Option<F>,
) -> Result<DigestReport, DigestError>
where
    F: FnMut(&FileDigest),
{
    let walk_mode = opts.walk_mode;
    drive(root, opts, bound, cancel, backend, on_result, move |tx, err_tx, ctx| {
        spawn_walk_thread(tx, err_tx, ctx, walk_mode)
    })
}

/// Same pipeline, fed by a caller-supplied walk instead of the filesystem walker.
pub fn digest_tree_from_walk<I, F>(
    root: &Path,
    walk: I,
    opts: &DigestOpts,
    bound: usize,
    cancel: &CancelToken,
    backend: &DigestBackend,
    on_result: Option<F>,
) -> Result<DigestReport, DigestError>
where
    I: Iterator<Item = WalkOutcome> + Send + 'static,
    F: FnMut(&FileDigest),
{
    drive(root, opts, bound, cancel, backend, on_result, move |tx, err_tx, ctx| {
        spawn_path_source(tx, err_tx, ctx, walk)
    })
}

fn drive<S, F>(
    root: &Path,
    opts: &DigestOpts,
    bound: usize,
    cancel: &CancelToken,
    backend: &DigestBackend,
    on_result: Option<F>,
    spawn_source: S,
) -> Result<DigestReport, DigestError>
where
    S: FnOnce(Sender<PathBuf>, Sender<DigestError>, PipelineContext) -> JoinHandle<WalkSummary>,
    F: FnMut(&FileDigest),
{
    if bound == 0 {
        return Err(DigestError::InvalidBound(bound));
    }
    let tuning = PipelineTuning::new(bound, opts);
    let run_cancel = cancel.child();
    debug!(
        "main: digesting {} with {} workers ({:?} walk, channel cap {})",
        root.display(),
        tuning.bound,
        tuning.walk_mode,
        tuning.channel_cap
    );
    let handles = run_pipeline(root, opts, &tuning, &run_cancel, backend, spawn_source)?;
    finish_pipeline(handles, root, opts, &tuning, &run_cancel, on_result)
}
