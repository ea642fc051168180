//! Cooperative cancellation for long-running estimations.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{SupportError, SupportResult};

/// A stop request polled between units of work.
///
/// Implemented for [`CancelToken`], [`NeverCancel`] and any `Fn() -> bool`
/// closure, so a UI can pass its own "stop requested" check directly.
/// Deadlines are expressed by the caller in the closure.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use support_points::Cancellation;
///
/// let deadline = Instant::now() + Duration::from_secs(60);
/// let stop = move || Instant::now() > deadline;
/// assert!(!stop.is_cancelled());
/// ```
pub trait Cancellation {
    /// True once the work should stop.
    fn is_cancelled(&self) -> bool;

    /// `Err(Cancelled)` once the work should stop.
    ///
    /// # Errors
    ///
    /// Returns [`SupportError::Cancelled`] carrying `processed` when the
    /// request has fired.
    fn check(&self, processed: usize) -> SupportResult<()> {
        if self.is_cancelled() {
            Err(SupportError::Cancelled { processed })
        } else {
            Ok(())
        }
    }
}

impl<F> Cancellation for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A request that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A shareable cancellation flag.
///
/// Clones share the flag: cancelling any clone cancels all of them.
///
/// # Example
///
/// ```
/// use support_points::{CancelToken, Cancellation};
///
/// let token = CancelToken::new();
/// let worker_view = token.clone();
/// assert!(!worker_view.is_cancelled());
///
/// token.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
