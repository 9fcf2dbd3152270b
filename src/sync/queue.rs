//! Bounded blocking queue
use std::collections::VecDeque;
use std::fmt::{self, Debug};

use parking_lot::Mutex;

use crate::errors::Result;
use super::broadcast::BroadcastCondition;
use super::cancel::Cancellation;
use super::Capacity;

struct State<T> {
    items: VecDeque<T>,
    // Consumers currently inside `dequeue`
    takers: usize,
}

// -----------------------------------------------------------------------------
// 		- Bounded queue -
// -----------------------------------------------------------------------------
/// A FIFO queue holding at most `capacity` items.
///
/// `enqueue` blocks while the queue is full and `dequeue` blocks while it's empty.
/// Both can be aborted through a [`Cancellation`], in which case the queue is left
/// exactly as it was.
///
/// A capacity of zero turns the queue into a rendezvous: an `enqueue` waits until a
/// `dequeue` is in progress and hands the item straight to it.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
/// use cancelq::{BoundedQueue, Cancellation, CancelledError};
///
/// let queue = Arc::new(BoundedQueue::new(1));
/// queue.enqueue(1, &Cancellation::new()).unwrap();
///
/// // Full: give up after 10ms
/// let res = queue.enqueue(2, &Cancellation::with_timeout(Duration::from_millis(10)));
/// assert_eq!(res, Err(CancelledError::DeadlineExceeded));
/// assert_eq!(queue.len(), 1);
///
/// let q = queue.clone();
/// let producer = thread::spawn(move || q.enqueue(2, &Cancellation::new()));
/// assert_eq!(queue.dequeue(&Cancellation::new()), Ok(1));
/// producer.join().unwrap().unwrap();
/// assert_eq!(queue.dequeue(&Cancellation::new()), Ok(2));
/// ```
///
/// [`Cancellation`]: ../cancel/struct.Cancellation.html
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_full: BroadcastCondition,
    not_empty: BroadcastCondition,
    capacity: Capacity,
}

impl<T> From<Capacity> for BoundedQueue<T> {
    fn from(capacity: Capacity) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.get().min(1024)),
                takers: 0,
            }),
            not_full: BroadcastCondition::new(),
            not_empty: BroadcastCondition::new(),
            capacity,
        }
    }
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    /// Zero creates a rendezvous queue.
    pub fn new(capacity: usize) -> Self {
        Self::from(Capacity::from(capacity))
    }

    /// Create a queue that holds no items: every enqueue is handed
    /// directly to a dequeue.
    pub fn rendezvous() -> Self {
        Self::from(Capacity::Rendezvous)
    }

    /// The configured capacity
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Push `item` to the back of the queue, waiting for room if the queue is full.
    ///
    /// On `Err` the item is dropped and the queue is unchanged.
    pub fn enqueue(&self, item: T, cancellation: &Cancellation) -> Result<()> {
        cancellation.check()?;

        let mut state = self.state.lock();
        while !self.has_room(&state) {
            self.not_full.wait_cancellable(&mut state, cancellation)?;
        }

        state.items.push_back(item);
        self.not_empty.broadcast(&state);
        Ok(())
    }

    /// Pop the item at the front of the queue, waiting for one if the queue is empty.
    pub fn dequeue(&self, cancellation: &Cancellation) -> Result<T> {
        cancellation.check()?;

        let mut state = self.state.lock();
        state.takers += 1;
        if self.capacity.is_rendezvous() {
            // Producers of a rendezvous wait for a taker to show up
            self.not_full.broadcast(&state);
        }

        let res = loop {
            if let Some(item) = state.items.pop_front() {
                break Ok(item);
            }

            if let Err(e) = self.not_empty.wait_cancellable(&mut state, cancellation) {
                // A rendezvous hand-off is only made while there are more takers than
                // items. If that no longer holds with us gone, one of the items is ours:
                // its producer has already returned.
                if self.capacity.is_rendezvous() && state.items.len() >= state.takers {
                    if let Some(item) = state.items.pop_front() {
                        break Ok(item);
                    }
                }
                break Err(e);
            }
        };

        state.takers -= 1;
        if res.is_ok() {
            self.not_full.broadcast(&state);
        }
        res
    }

    /// Number of items held.
    ///
    /// Snapshot only: it may be stale by the time it's returned.
    /// Items in transit through a rendezvous queue are already claimed and not counted.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.items.len().min(self.capacity.get())
    }

    /// Snapshot: true if no items are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot: true if an `enqueue` would have to wait.
    pub fn is_full(&self) -> bool {
        let state = self.state.lock();
        !self.has_room(&state)
    }

    fn has_room(&self, state: &State<T>) -> bool {
        match self.capacity.get() {
            0 => state.items.len() < state.takers,
            cap => state.items.len() < cap,
        }
    }
}

impl<T> Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
