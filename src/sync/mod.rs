//! Synchronization primitives, from the one-shot [`Signal`] up to the [`BoundedQueue`].
//!
//! [`Signal`]: signal/struct.Signal.html
//! [`BoundedQueue`]: queue/struct.BoundedQueue.html
pub mod signal;
pub mod cancel;
pub mod broadcast;
pub mod queue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Queue capacity
pub enum Capacity {
    /// No items are held: every enqueue waits for a dequeue to be
    /// in progress and hands the item straight over.
    Rendezvous,
    /// At most this many items are held
    Bounded(usize),
}

impl Capacity {
    /// Number of items that can be held.
    pub fn get(&self) -> usize {
        match *self {
            Capacity::Rendezvous => 0,
            Capacity::Bounded(cap) => cap,
        }
    }

    /// `Bounded(0)` is a rendezvous as well.
    pub fn is_rendezvous(&self) -> bool {
        self.get() == 0
    }
}

impl From<usize> for Capacity {
    fn from(cap: usize) -> Self {
        match cap {
            0 => Capacity::Rendezvous,
            cap => Capacity::Bounded(cap),
        }
    }
}
