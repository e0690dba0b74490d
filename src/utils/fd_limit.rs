//! File descriptor limit detection for capping the worker bound (Unix).

use crate::error::DigestError;
use crate::utils::config::WorkerBoundLimits;

/// Estimated number of file descriptors held per digest worker (open file, mmap, walker dir handles).
pub const FDS_PER_WORKER: usize = 4;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Max workers so we stay under ~80% of the FD limit. `None` if no limit is available.
pub fn max_workers_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_WORKER {
        return Some(1);
    }
    Some(usable / FDS_PER_WORKER)
}

/// Effective worker bound. An explicit request is honored as-is (0 is rejected);
/// otherwise available threads, capped by `limits.default_max` and the FD budget.
pub fn resolve_bound(
    requested: Option<usize>,
    limits: WorkerBoundLimits,
) -> Result<usize, DigestError> {
    match requested {
        Some(0) => Err(DigestError::InvalidBound(0)),
        Some(n) => Ok(n),
        None => {
            let mut bound = limits.all_threads.clamp(1, limits.default_max.max(1));
            if let Some(fd_cap) = max_workers_by_fd_limit() {
                bound = bound.min(fd_cap);
            }
            Ok(bound.max(1))
        }
    }
}
