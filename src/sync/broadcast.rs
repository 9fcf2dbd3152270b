//! Broadcast-only condition variable
use std::fmt::{self, Debug};
use std::mem;

use parking_lot::{Mutex, MutexGuard};

use crate::errors::Result;
use super::cancel::Cancellation;
use super::signal::{Listener, Signal};

// -----------------------------------------------------------------------------
//              - Broadcast condition -
//              wake every waiter, waits can be cancelled
// -----------------------------------------------------------------------------
/// A condition variable that can only wake all waiters at once, but whose waits
/// can be raced against a [`Cancellation`].
///
/// The condition does not own a lock. Every call borrows the guard of the lock
/// protecting the state the condition is about, which makes it impossible to wait
/// or broadcast without holding a lock.
///
/// Each broadcast fires the current generation (a one-shot [`Signal`]) and installs
/// a fresh one. A waiter captures the generation while still holding the lock, so a
/// broadcast that happens between releasing the lock and actually blocking is never
/// lost.
///
/// A woken waiter only knows that *something* changed and has to recheck its
/// predicate:
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use parking_lot::Mutex;
/// use cancelq::{BroadcastCondition, Cancellation};
///
/// let pair = Arc::new((Mutex::new(false), BroadcastCondition::new()));
/// let pair2 = pair.clone();
///
/// thread::spawn(move || {
///     let (lock, cond) = &*pair2;
///     let mut ready = lock.lock();
///     *ready = true;
///     cond.broadcast(&ready);
/// });
///
/// let (lock, cond) = &*pair;
/// let mut ready = lock.lock();
/// while !*ready {
///     cond.wait_cancellable(&mut ready, &Cancellation::new()).unwrap();
/// }
/// ```
///
/// [`Cancellation`]: ../cancel/struct.Cancellation.html
/// [`Signal`]: ../signal/struct.Signal.html
pub struct BroadcastCondition {
    // Swapped only while the caller's lock is held
    generation: Mutex<Signal>,
}

impl BroadcastCondition {
    /// Create a condition with an unfired generation
    pub fn new() -> Self {
        Self {
            generation: Mutex::new(Signal::new()),
        }
    }

    /// Listen to the current generation.
    ///
    /// The listener fires on the next broadcast. Taking it under the lock and
    /// blocking on it after the lock is released is exactly what [`wait`] does.
    ///
    /// [`wait`]: struct.BroadcastCondition.html#method.wait
    pub fn listen<T>(&self, _guard: &MutexGuard<'_, T>) -> Listener {
        self.generation.lock().listener()
    }

    /// Wake every thread currently waiting on this condition.
    ///
    /// Never blocks, whether or not anyone is waiting.
    pub fn broadcast<T>(&self, _guard: &MutexGuard<'_, T>) {
        let previous = mem::replace(&mut *self.generation.lock(), Signal::new());
        trace!("broadcast: firing generation");
        previous.fire();
    }

    /// Release the lock, block until the next broadcast, then reacquire the lock.
    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
        let listener = self.listen(guard);
        MutexGuard::unlocked(guard, || listener.wait());
    }

    /// Release the lock and block until the next broadcast or until `cancellation`
    /// fires. The lock is held again when this returns, in either case.
    ///
    /// If `cancellation` has already fired the lock is never released and the
    /// error is returned straight away.
    pub fn wait_cancellable<T>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        cancellation: &Cancellation,
    ) -> Result<()> {
        cancellation.check()?;
        let listener = self.listen(guard);
        let res = MutexGuard::unlocked(guard, || cancellation.race(&listener));
        if let Err(ref e) = res {
            debug!("wait abandoned: {}", e);
        }
        res
    }
}

impl Default for BroadcastCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for BroadcastCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BroadcastCondition").finish()
    }
}
