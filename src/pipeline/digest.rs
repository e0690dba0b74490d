use crossbeam_channel::{Receiver, Sender, select};
use log::debug;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::engine::hashing::DigestBackend;
use crate::types::FileDigest;

use super::cancel::CancelToken;

/// Returned by the pool's closer thread once every worker has been joined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub workers: usize,
    /// Workers whose thread panicked instead of returning.
    pub panicked: usize,
}

/// Single digest worker: pull paths until the source is exhausted or the run is cancelled.
/// A read error is packed into the result; it never stops the worker.
fn digest_worker_loop(
    path_rx: Receiver<PathBuf>,
    result_tx: Sender<FileDigest>,
    cancel: CancelToken,
    backend: DigestBackend,
) {
    while let Some(path) = next_path(&path_rx, &cancel) {
        if cancel.is_cancelled() {
            return;
        }
        let digest = backend.digest_file(&path);
        if let Err(e) = &digest {
            debug!("read failed for {}: {}", path.display(), e);
        }
        if !publish(&result_tx, &cancel, FileDigest { path, digest }) {
            return;
        }
    }
}

/// Next path, or None once the source is exhausted or the run is cancelled.
fn next_path(path_rx: &Receiver<PathBuf>, cancel: &CancelToken) -> Option<PathBuf> {
    select! {
        recv(path_rx) -> msg => msg.ok(),
        recv(cancel.done()) -> _ => None,
    }
}

/// Publish or give up on cancel; whichever is ready first wins. False means stop.
fn publish(result_tx: &Sender<FileDigest>, cancel: &CancelToken, result: FileDigest) -> bool {
    select! {
        send(result_tx, result) -> res => res.is_ok(),
        recv(cancel.done()) -> _ => false,
    }
}

/// Spawn `bound` digest workers over `path_rx` plus a closer thread.
///
/// The closer owns the last `result_tx`: it joins all `bound` workers and only then drops it,
/// so the result stream closes exactly when every worker has finished.
pub fn spawn_digest_pool(
    path_rx: Receiver<PathBuf>,
    result_tx: Sender<FileDigest>,
    bound: usize,
    cancel: &CancelToken,
    backend: &DigestBackend,
) -> JoinHandle<PoolReport> {
    let workers: Vec<JoinHandle<()>> = (0..bound)
        .map(|_| {
            let path_rx = path_rx.clone();
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let backend = backend.clone();
            thread::spawn(move || digest_worker_loop(path_rx, result_tx, cancel, backend))
        })
        .collect();
    drop(path_rx);

    thread::spawn(move || {
        let mut report = PoolReport {
            workers: workers.len(),
            panicked: 0,
        };
        for h in workers {
            if h.join().is_err() {
                report.panicked += 1;
            }
        }
        drop(result_tx);
        debug!(
            "pool: {} workers joined ({} panicked), result stream closed",
            report.workers, report.panicked
        );
        report
    })
}
