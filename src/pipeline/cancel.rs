//! One-shot, level-triggered cancellation shared by every stage.
//!
//! Two views of the same signal: an atomic flag for cheap polling between steps, and a
//! channel that disconnects on cancel so a blocked `select!` (send/recv vs. cancel) wakes up.
//! Locks are only taken when cancelling or creating a child, never on the polling path.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

struct CancelInner {
    flag: AtomicBool,
    closer: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
    children: Mutex<Vec<Weak<CancelInner>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl CancelInner {
    fn new() -> Self {
        // Nothing is ever sent; the channel only matters for its disconnect.
        let (tx, rx) = bounded::<()>(0);
        Self {
            flag: AtomicBool::new(false),
            closer: Mutex::new(Some(tx)),
            done: rx,
            children: Mutex::new(Vec::new()),
        }
    }

    fn cancel(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }
        lock(&self.closer).take();
        let children = std::mem::take(&mut *lock(&self.children));
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// Cloneable cancellation handle. Clones observe and trigger the same signal.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner::new()),
        }
    }

    /// Activate the signal (and every child's). Idempotent; safe from any thread,
    /// including a signal handler thread.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once cancelled. Use as a `select!` arm.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done
    }

    /// New token cancelled together with `self`, which can also be cancelled on its own
    /// without touching `self`. Already cancelled if `self` is.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        {
            let mut children = lock(&self.inner.children);
            // finished runs drop their child; keep a long-lived parent from accumulating them
            children.retain(|w| w.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        // A cancel that drained the list before our push has already set the flag.
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{RecvTimeoutError, select};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_starts_inactive() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(
            token.done().recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );
    }

    #[test]
    fn test_double_cancel_is_harmless() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.done().recv().is_err());
    }

    #[test]
    fn test_clones_share_signal() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_wakes_blocked_select() {
        let token = CancelToken::new();
        let (_tx, rx) = bounded::<u32>(0);
        let waiter = {
            let token = token.clone();
            thread::spawn(move || {
                select! {
                    recv(rx) -> _ => false,
                    recv(token.done()) -> _ => true,
                }
            })
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_concurrent_cancel() {
        let token = CancelToken::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = token.clone();
                thread::spawn(move || t.cancel())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = CancelToken::new();
        let child = parent.child();
        let grandchild = child.child();
        parent.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(grandchild.done().recv().is_err());
    }

    #[test]
    fn test_child_does_not_cancel_parent() {
        let parent = CancelToken::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_dropped_children_are_pruned() {
        let parent = CancelToken::new();
        for _ in 0..10_000 {
            let _child = parent.child();
        }
        let kept = parent.child();
        assert!(lock(&parent.inner.children).len() <= 2);
        parent.cancel();
        assert!(kept.is_cancelled());
    }

    #[test]
    fn test_child_of_cancelled_parent() {
        let parent = CancelToken::new();
        parent.cancel();
        assert!(parent.child().is_cancelled());
    }
}
