//! Path source: walks the tree on its own thread and hands regular-file paths to the digest pool.

use crossbeam_channel::{Sender, select};
use log::{debug, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::engine::tools::{is_under_excluded_dir, should_include_in_walk};
use crate::error::DigestError;
use crate::types::WalkMode;

use super::cancel::CancelToken;
use super::context::PipelineContext;

/// One item from a directory walk: an entry with its regular-file flag, or a traversal error.
pub enum WalkOutcome {
    Entry { path: PathBuf, is_file: bool },
    Err { msg: String, path: Option<PathBuf> },
}

/// What the walk thread did. Returned through its join handle.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Paths handed to the digest stage.
    pub count: usize,
    /// Traversal errors tolerated under `skip_walk_errors`.
    pub walk_errors: Vec<(Option<PathBuf>, String)>,
    /// Stopped early because the cancel signal fired.
    pub cancelled: bool,
    /// Stopped on a fatal traversal error (also sent on the error channel).
    pub failed: bool,
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Entry {
            is_file: entry.file_type().is_file(),
            path: entry.into_path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Convert a jwalk result into [`WalkOutcome`].
pub fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Entry {
            is_file: entry.file_type.is_file(),
            path: entry.path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn walkdir_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        walkdir::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

fn jwalk_iter(ctx: &PipelineContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use jwalk::Parallelism;
    use std::time::Duration;
    Box::new(
        jwalk::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .skip_hidden(false)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_secs(60),
            })
            .into_iter()
            .map(to_outcome_jwalk),
    )
}

/// Build the walker iterator for `mode`. Used by the serial strategy on the caller's thread too.
pub fn walk_iter(ctx: &PipelineContext, mode: WalkMode) -> Box<dyn Iterator<Item = WalkOutcome>> {
    match mode {
        WalkMode::Serial => walkdir_iter(ctx),
        WalkMode::Parallel => jwalk_iter(ctx),
    }
}

/// Spawn the path source over the real filesystem.
pub fn spawn_walk_thread(
    path_tx: Sender<PathBuf>,
    err_tx: Sender<DigestError>,
    ctx: PipelineContext,
    walk_mode: WalkMode,
) -> JoinHandle<WalkSummary> {
    thread::spawn(move || {
        let iter = walk_iter(&ctx, walk_mode);
        run_walk_loop(path_tx, err_tx, ctx, iter)
    })
}

/// Spawn the path source over any walk iterator (synthetic walks, alternate walkers).
pub fn spawn_path_source<I>(
    path_tx: Sender<PathBuf>,
    err_tx: Sender<DigestError>,
    ctx: PipelineContext,
    iter: I,
) -> JoinHandle<WalkSummary>
where
    I: Iterator<Item = WalkOutcome> + Send + 'static,
{
    thread::spawn(move || run_walk_loop(path_tx, err_tx, ctx, iter))
}

/// Outcome of visiting one walk item.
pub(crate) enum Visit {
    /// Regular, included file.
    File(PathBuf),
    /// Directory, symlink, excluded path: nothing to do.
    Skip,
    /// Traversal error tolerated under `skip_walk_errors`.
    Tolerated(Option<PathBuf>, String),
    /// Fatal traversal error: abort the walk.
    Fatal(DigestError),
}

/// Classify one walk item against the context's filters and error policy.
/// An error on the root itself is always fatal. A root directory is skipped; a root file is kept.
pub(crate) fn visit(ctx: &PipelineContext, outcome: WalkOutcome) -> Visit {
    match outcome {
        WalkOutcome::Entry { path, is_file } => {
            // a root that is a regular file is digested as-is; excludes apply below the root
            let included = path == ctx.root
                || (should_include_in_walk(&path, &ctx.root, &ctx.exclude)
                    && !is_under_excluded_dir(&path, &ctx.root, &ctx.exclude));
            if is_file && included {
                Visit::File(path)
            } else {
                Visit::Skip
            }
        }
        WalkOutcome::Err { msg, path } => {
            let at_root = path.as_deref() == Some(ctx.root.as_path());
            if ctx.skip_walk_errors && !at_root {
                warn!(
                    "skipping unreadable path {}: {}",
                    path.as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<no-path>".to_string()),
                    msg
                );
                Visit::Tolerated(path, msg)
            } else {
                Visit::Fatal(DigestError::Traversal { path, msg })
            }
        }
    }
}

enum Handoff {
    Sent,
    Closed,
    Cancelled,
}

/// Send `path` unless the cancel signal fires first. Either may win when both are ready.
fn hand_off(path_tx: &Sender<PathBuf>, cancel: &CancelToken, path: PathBuf) -> Handoff {
    select! {
        send(path_tx, path) -> res => match res {
            Ok(()) => Handoff::Sent,
            Err(_) => Handoff::Closed,
        },
        recv(cancel.done()) -> _ => Handoff::Cancelled,
    }
}

/// Run the walk loop: send each regular, included file on `path_tx` unless cancelled first.
///
/// A fatal traversal error goes on `err_tx` and activates the cancel signal so the rest of the
/// batch stops too. `path_tx` is dropped exactly once, after the loop, which closes the path stream.
pub fn run_walk_loop<I>(
    path_tx: Sender<PathBuf>,
    err_tx: Sender<DigestError>,
    ctx: PipelineContext,
    iter: I,
) -> WalkSummary
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut summary = WalkSummary::default();
    for outcome in iter {
        if ctx.cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        match visit(&ctx, outcome) {
            Visit::File(path) => match hand_off(&path_tx, &ctx.cancel, path) {
                Handoff::Sent => summary.count += 1,
                // every worker is gone; nobody left to feed
                Handoff::Closed => break,
                Handoff::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
            },
            Visit::Skip => {}
            Visit::Tolerated(path, msg) => summary.walk_errors.push((path, msg)),
            Visit::Fatal(err) => {
                debug!("walk: fatal traversal error: {}", err);
                let _ = err_tx.try_send(err);
                summary.failed = true;
                ctx.cancel.cancel();
                break;
            }
        }
    }
    drop(path_tx);
    debug!(
        "walk: finished, {} paths sent (cancelled: {}, failed: {})",
        summary.count, summary.cancelled, summary.failed
    );
    summary
}
