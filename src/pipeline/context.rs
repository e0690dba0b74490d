//! Pipeline context and channels: shared data passed into the walk thread and the digest pool.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::error::DigestError;
use crate::types::{DigestOpts, FileDigest, WalkMode};
use crate::utils::config::StreamingChannelCap;

use super::cancel::CancelToken;
use super::digest::PoolReport;
use super::walk::WalkSummary;

/// Settings resolved once per run: worker count, walk mode, channel cap.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub bound: usize,
    pub walk_mode: WalkMode,
    /// Capacity for path and result channels.
    pub channel_cap: usize,
}

/// Context moved into the walk thread: what to walk, what to skip, how to react to errors.
pub struct PipelineContext {
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub follow_links: bool,
    pub skip_walk_errors: bool,
    pub cancel: CancelToken,
}

/// Channels for one run. Walk gets `path_tx` and `err_tx`; workers get `path_rx` and `result_tx`;
/// the orchestrator keeps `err_rx` and `result_rx`.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub result_tx: Sender<FileDigest>,
    pub result_rx: Receiver<FileDigest>,
    /// One-shot: the walk sends at most one fatal traversal error.
    pub err_tx: Sender<DigestError>,
    pub err_rx: Receiver<DigestError>,
    pub ctx: PipelineContext,
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): drain `result_rx`, then join.
pub struct PipelineHandles {
    pub result_rx: Receiver<FileDigest>,
    pub err_rx: Receiver<DigestError>,
    pub walk_handle: JoinHandle<WalkSummary>,
    /// Joins all workers before returning; the result channel is closed once it returns.
    pub pool_handle: JoinHandle<PoolReport>,
}

pub fn create_pipeline_channels(
    root: &Path,
    opts: &DigestOpts,
    cancel: &CancelToken,
    channel_cap: usize,
) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(channel_cap);
    let (result_tx, result_rx) = bounded::<FileDigest>(channel_cap);
    let (err_tx, err_rx) = bounded::<DigestError>(1);

    let ctx = PipelineContext {
        root: root.to_path_buf(),
        exclude: opts.exclude.clone(),
        follow_links: opts.follow_links,
        skip_walk_errors: opts.skip_walk_errors,
        cancel: cancel.clone(),
    };

    PipelineChannels {
        path_tx,
        path_rx,
        result_tx,
        result_rx,
        err_tx,
        err_rx,
        ctx,
    }
}

impl PipelineTuning {
    pub fn new(bound: usize, opts: &DigestOpts) -> Self {
        Self {
            bound,
            walk_mode: opts.walk_mode,
            channel_cap: StreamingChannelCap::resolve(opts.channel_cap),
        }
    }
}
