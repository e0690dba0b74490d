use crossbeam_channel::Receiver;
use log::{debug, warn};
use std::path::PathBuf;
use std::thread;

use crate::error::DigestError;

use super::digest::PoolReport;
use super::walk::WalkSummary;

/// Decide the run's outcome once the result stream is drained and every thread joined.
///
/// Traversal error wins over a panicked thread; cancellation is checked by the caller after this.
/// The error channel is only read here after the walk thread has been joined, so a late
/// traversal error is not lost.
pub fn check_pipeline_outcome(
    err_rx: &Receiver<DigestError>,
    walk: &thread::Result<WalkSummary>,
    pool: &thread::Result<PoolReport>,
) -> Result<(), DigestError> {
    if let Ok(err) = err_rx.try_recv() {
        return Err(err);
    }
    if walk.is_err() {
        return Err(DigestError::WorkerPanicked { stage: "walk" });
    }
    match pool {
        Err(_) => return Err(DigestError::WorkerPanicked { stage: "pool closer" }),
        Ok(report) if report.panicked > 0 => {
            return Err(DigestError::WorkerPanicked {
                stage: "digest worker",
            });
        }
        Ok(_) => {}
    }
    Ok(())
}

/// Log files left out of the map and tolerated traversal errors.
pub fn log_skipped_paths(skipped: &[(PathBuf, String)], walk_errors: &[(Option<PathBuf>, String)]) {
    if !skipped.is_empty() {
        warn!("Skipped {} unreadable files", skipped.len());
        for (p, msg) in skipped {
            debug!("  skipped: {} ({})", p.display(), msg);
        }
    }
    if !walk_errors.is_empty() {
        warn!(
            "Skipped {} paths due to traversal errors",
            walk_errors.len()
        );
    }
}
