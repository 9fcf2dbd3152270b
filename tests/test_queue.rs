use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cancelq::{BoundedQueue, Cancellation, CancelledError};

fn forever() -> Cancellation {
    Cancellation::new()
}

#[test]
fn test_full_queue_unblocks_on_dequeue() {
    // -----------------------------------------------------------------------------
    // 		- Capacity 2: the third enqueue waits for a dequeue -
    // -----------------------------------------------------------------------------
    let queue = Arc::new(BoundedQueue::new(2));
    queue.enqueue(1, &forever()).unwrap();
    queue.enqueue(2, &forever()).unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.is_full());

    let q = queue.clone();
    let producer = thread::spawn(move || q.enqueue(3, &forever()));

    // Give the producer time to block
    thread::sleep(Duration::from_millis(30));
    assert!(!producer.is_finished());
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.dequeue(&forever()), Ok(1));
    assert_eq!(producer.join().unwrap(), Ok(()));

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue(&forever()), Ok(2));
    assert_eq!(queue.dequeue(&forever()), Ok(3));
    assert!(queue.is_empty());
}

#[test]
fn test_no_lost_wakeup() {
    let queue = Arc::new(BoundedQueue::new(1));

    let q = queue.clone();
    let consumer = thread::spawn(move || q.dequeue(&forever()));

    thread::sleep(Duration::from_millis(10));
    queue.enqueue("value", &forever()).unwrap();

    assert_eq!(consumer.join().unwrap(), Ok("value"));
}

#[test]
fn test_dequeue_cancelled_mid_wait() {
    let queue = Arc::new(BoundedQueue::<u32>::new(3));
    let cancellation = Cancellation::new();

    let q = queue.clone();
    let c = cancellation.clone();
    let consumer = thread::spawn(move || q.dequeue(&c));

    thread::sleep(Duration::from_millis(20));
    cancellation.cancel();

    assert_eq!(consumer.join().unwrap(), Err(CancelledError::Cancelled));
    assert_eq!(queue.len(), 0);

    // The queue is still usable and nothing was left behind
    queue.enqueue(7, &forever()).unwrap();
    assert_eq!(queue.dequeue(&forever()), Ok(7));
}

#[test]
fn test_enqueue_timeout_leaves_queue_unchanged() {
    let queue = BoundedQueue::new(1);
    queue.enqueue('a', &forever()).unwrap();

    let res = queue.enqueue('b', &Cancellation::with_timeout(Duration::from_millis(20)));
    assert_eq!(res, Err(CancelledError::DeadlineExceeded));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.dequeue(&forever()), Ok('a'));
    assert!(queue.is_empty());
}

#[test]
fn test_rendezvous() {
    // -----------------------------------------------------------------------------
    // 		- Capacity 0: dequeue waits for an enqueue and vice versa -
    // -----------------------------------------------------------------------------
    let queue = Arc::new(BoundedQueue::new(0));

    let q = queue.clone();
    let consumer = thread::spawn(move || q.dequeue(&forever()));

    thread::sleep(Duration::from_millis(20));
    assert_eq!(queue.enqueue(42, &forever()), Ok(()));
    assert_eq!(consumer.join().unwrap(), Ok(42));
    assert_eq!(queue.len(), 0);

    // And the other way around
    let q = queue.clone();
    let producer = thread::spawn(move || q.enqueue(43, &forever()));
    thread::sleep(Duration::from_millis(20));
    assert!(!producer.is_finished());
    assert_eq!(queue.dequeue(&forever()), Ok(43));
    assert_eq!(producer.join().unwrap(), Ok(()));
}

#[test]
fn test_rendezvous_enqueue_without_taker_times_out() {
    let queue = BoundedQueue::new(0);
    let res = queue.enqueue(1, &Cancellation::with_timeout(Duration::from_millis(20)));
    assert_eq!(res, Err(CancelledError::DeadlineExceeded));
    assert!(queue.is_empty());
}

#[test]
fn test_conservation_under_stress() {
    // -----------------------------------------------------------------------------
    // 		- P producers, D consumers, every item seen exactly once -
    // -----------------------------------------------------------------------------
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const ITEMS: usize = 500;
    const TOTAL: usize = PRODUCERS * ITEMS;

    for &capacity in &[0, 1, 3, 16] {
        let queue = BoundedQueue::new(capacity);
        let collected = AtomicUsize::new(0);

        let received = crossbeam::scope(|s| {
            for p in 0..PRODUCERS {
                let queue = &queue;
                s.spawn(move |_| {
                    for i in 0..ITEMS {
                        queue.enqueue(p * ITEMS + i, &forever()).unwrap();
                    }
                });
            }

            let consumers = (0..CONSUMERS)
                .map(|_| {
                    let queue = &queue;
                    let collected = &collected;
                    s.spawn(move |_| {
                        let mut seen = Vec::new();
                        loop {
                            if collected.load(Ordering::SeqCst) >= TOTAL {
                                break seen;
                            }
                            // Poll with a short timeout so idle consumers notice
                            // when everything has been collected.
                            let c = Cancellation::with_timeout(Duration::from_millis(5));
                            if let Ok(item) = queue.dequeue(&c) {
                                collected.fetch_add(1, Ordering::SeqCst);
                                seen.push(item);
                            }
                        }
                    })
                })
                .collect::<Vec<_>>();

            consumers
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        })
        .unwrap();

        let mut counts = HashMap::new();
        for item in received {
            *counts.entry(item).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), TOTAL, "capacity {}", capacity);
        assert!(counts.values().all(|&n| n == 1), "capacity {}", capacity);
        assert!(queue.is_empty());
    }
}

#[test]
fn test_len_never_exceeds_capacity() {
    let queue = Arc::new(BoundedQueue::new(2));
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let watcher = {
        let queue = queue.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                assert!(queue.len() <= 2);
            }
        })
    };

    let producers = (0..3)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    queue.enqueue(i, &forever()).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();

    for _ in 0..600 {
        queue.dequeue(&forever()).unwrap();
    }

    for p in producers {
        p.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    watcher.join().unwrap();
    assert!(queue.is_empty());
}
