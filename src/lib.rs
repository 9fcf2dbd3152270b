#![deny(missing_docs)]
//! # Cancellable bounded blocking queue
//!
//! A capacity bounded FIFO queue for OS threads where both `enqueue` and `dequeue`
//! block under a single lock and every blocking call can be aborted through a
//! [`Cancellation`] (explicit cancel, timeout or deadline).
//!
//! The waiting is done by a [`BroadcastCondition`]: a condition variable that only
//! knows how to wake everyone, but whose waits can be raced against a cancellation.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//! use cancelq::{BoundedQueue, Cancellation};
//!
//! let queue = Arc::new(BoundedQueue::new(2));
//! let consumer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || queue.dequeue(&Cancellation::new()))
//! };
//!
//! queue.enqueue("hello", &Cancellation::with_timeout(Duration::from_secs(1))).unwrap();
//! assert_eq!(consumer.join().unwrap(), Ok("hello"));
//! ```
//!
//! [`Cancellation`]: sync/cancel/struct.Cancellation.html
//! [`BroadcastCondition`]: sync/broadcast/struct.BroadcastCondition.html
#[macro_use] extern crate log;

pub mod errors;
pub mod sync;

// Pub uses
pub use errors::{CancelledError, Result};
pub use sync::broadcast::BroadcastCondition;
pub use sync::cancel::Cancellation;
pub use sync::queue::BoundedQueue;
pub use sync::signal::{Listener, Signal};
pub use sync::Capacity;
