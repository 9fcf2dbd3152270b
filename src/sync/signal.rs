//! One-shot signal.
//!
//! A [`Signal`] fires exactly once, by being dropped, and every [`Listener`] created from
//! it observes the fire. Firing never blocks, no matter how many listeners there are
//! (or aren't).
//!
//! The signal is backed by a zero capacity crossbeam channel where nothing is ever sent:
//! dropping the only `Sender` disconnects the channel and every `Receiver` clone wakes up
//! with a `RecvError`.
//!
//! [`Signal`]: struct.Signal.html
//! [`Listener`]: struct.Listener.html
use std::fmt::{self, Debug};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

// -----------------------------------------------------------------------------
//              - Signal -
// -----------------------------------------------------------------------------
/// The firing half of a one-shot notification.
///
/// ```
/// use cancelq::Signal;
///
/// let signal = Signal::new();
/// let listener = signal.listener();
/// assert!(!listener.is_fired());
///
/// signal.fire();
/// assert!(listener.is_fired());
/// listener.wait();
/// ```
pub struct Signal {
    // Never sent on; dropping it is the fire.
    trigger: Sender<()>,
    listener: Listener,
}

impl Signal {
    /// Create an unfired signal
    pub fn new() -> Self {
        let (trigger, receiver) = bounded(0);
        Self {
            trigger,
            listener: Listener { receiver },
        }
    }

    /// Create a listener for this signal.
    /// Listeners created before or after the fire both observe it.
    pub fn listener(&self) -> Listener {
        self.listener.clone()
    }

    /// Fire the signal, waking every listener.
    pub fn fire(self) {
        drop(self.trigger);
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signal")
            .field("fired", &false)
            .finish()
    }
}


// -----------------------------------------------------------------------------
//              - Listener -
// -----------------------------------------------------------------------------
/// Observes a single [`Signal`].
///
/// [`Signal`]: struct.Signal.html
#[derive(Clone)]
pub struct Listener {
    receiver: Receiver<()>,
}

impl Listener {
    /// Non-blocking check
    pub fn is_fired(&self) -> bool {
        match self.receiver.try_recv() {
            Err(TryRecvError::Empty) => false,
            _ => true,
        }
    }

    /// Block until the signal fires
    pub fn wait(&self) {
        let _ = self.receiver.recv();
    }

    /// Block until the signal fires or the timeout elapses.
    /// Returns `true` if the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            _ => true,
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Listener")
            .field("fired", &self.is_fired())
            .finish()
    }
}
