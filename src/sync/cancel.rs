//! Cancellation for blocking calls.
//!
//! A [`Cancellation`] is handed to every blocking call. It fires either when
//! [`cancel`] is called on any of its clones, when its deadline passes, or when the
//! cancellation it was derived from (see [`child`]) fires.
//!
//! [`Cancellation`]: struct.Cancellation.html
//! [`cancel`]: struct.Cancellation.html#method.cancel
//! [`child`]: struct.Cancellation.html#method.child
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{at, never, Select};
use parking_lot::Mutex;

use crate::errors::{CancelledError, Result};
use super::signal::{Listener, Signal};

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Signal>>,
    listener: Listener,
    // Already the earliest of our own and the parent's deadline
    deadline: Option<Instant>,
    parent: Option<Cancellation>,
}

// -----------------------------------------------------------------------------
//              - Cancellation -
// -----------------------------------------------------------------------------
/// Cooperative cancellation of blocking calls.
///
/// Cloning a `Cancellation` shares it: cancelling any clone cancels all of them.
///
/// ```
/// use std::time::Duration;
/// use cancelq::{Cancellation, CancelledError};
///
/// let cancellation = Cancellation::with_timeout(Duration::from_secs(60));
/// assert!(cancellation.check().is_ok());
///
/// cancellation.clone().cancel();
/// assert_eq!(cancellation.check(), Err(CancelledError::Cancelled));
/// ```
#[derive(Clone)]
pub struct Cancellation {
    inner: Arc<Inner>,
}

impl Cancellation {
    fn with_parts(deadline: Option<Instant>, parent: Option<Cancellation>) -> Self {
        let signal = Signal::new();
        let listener = signal.listener();
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(signal)),
                listener,
                deadline,
                parent,
            }),
        }
    }

    /// A cancellation that only fires when [`cancel`] is called.
    ///
    /// [`cancel`]: struct.Cancellation.html#method.cancel
    pub fn new() -> Self {
        Self::with_parts(None, None)
    }

    /// A cancellation that fires once `timeout` has elapsed from now.
    /// A timeout too large to be represented never fires.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_parts(Instant::now().checked_add(timeout), None)
    }

    /// A cancellation that fires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::with_parts(Some(deadline), None)
    }

    /// Derive a cancellation that fires when either it or `self` fires.
    /// Cancelling the child leaves the parent untouched.
    pub fn child(&self) -> Self {
        Self::with_parts(self.inner.deadline, Some(self.clone()))
    }

    /// Derive a child that also fires after `timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.inner.deadline, Instant::now().checked_add(timeout)) {
            (Some(ours), Some(theirs)) => Some(ours.min(theirs)),
            (ours, theirs) => ours.or(theirs),
        };
        Self::with_parts(deadline, Some(self.clone()))
    }

    /// Cancel. Every blocked call using this cancellation (or a child of it)
    /// returns `CancelledError::Cancelled`. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        if let Some(signal) = self.inner.trigger.lock().take() {
            self.inner.cancelled.store(true, Ordering::Release);
            debug!("cancellation fired");
            signal.fire();
        }
    }

    /// Non-blocking check
    pub fn is_cancelled(&self) -> bool {
        self.error().is_some()
    }

    /// The reason this cancellation fired, if it has.
    /// An explicit cancel takes precedence over an elapsed deadline.
    pub fn error(&self) -> Option<CancelledError> {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return Some(CancelledError::Cancelled);
        }

        if let Some(err) = self.inner.parent.as_ref().and_then(|p| p.error()) {
            return Some(err);
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelledError::DeadlineExceeded),
            _ => None,
        }
    }

    /// `Err` if the cancellation has fired
    pub fn check(&self) -> Result<()> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The effective deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Block until `listener` fires or this cancellation does, whichever comes first.
    pub(crate) fn race(&self, listener: &Listener) -> Result<()> {
        let chain = self.chain();
        let deadline = self.inner.deadline.map(at).unwrap_or_else(never);

        let mut sel = Select::new();
        let notified = sel.recv(listener.receiver());
        let expired = sel.recv(&deadline);
        for c in &chain {
            sel.recv(c.inner.listener.receiver());
        }

        // Every selected operation has to be completed with the receiver it was
        // registered with.
        let op = sel.select();
        match op.index() {
            i if i == notified => {
                let _ = op.recv(listener.receiver());
                Ok(())
            }
            i if i == expired => {
                let _ = op.recv(&deadline);
                trace!("wait hit deadline");
                Err(CancelledError::DeadlineExceeded)
            }
            i => {
                let _ = op.recv(chain[i - 2].inner.listener.receiver());
                Err(self.error().unwrap_or(CancelledError::Cancelled))
            }
        }
    }

    // This cancellation followed by its ancestors
    fn chain(&self) -> Vec<&Cancellation> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.inner.parent.as_ref() {
            chain.push(parent);
            current = parent;
        }
        chain
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cancellation")
            .field("error", &self.error())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}
