use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cancelq::{BoundedQueue, Cancellation, CancelledError};

// -----------------------------------------------------------------------------
// 		- Producers and consumers -
// 		Two producers fill a small queue, three consumers drain it
// 		until the shared cancellation times out.
// -----------------------------------------------------------------------------
fn main() {
    let queue = Arc::new(BoundedQueue::new(4));
    let shutdown = Cancellation::with_timeout(Duration::from_millis(500));

    let producers = (0..2)
        .map(|id| {
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                for n in 0.. {
                    if let Err(e) = queue.enqueue((id, n), &shutdown) {
                        eprintln!("producer {} stopped: {}", id, e);
                        break;
                    }
                    thread::sleep(Duration::from_millis(20));
                }
            })
        })
        .collect::<Vec<_>>();

    let consumers = (0..3)
        .map(|id| {
            let queue = queue.clone();
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                let mut count = 0;
                loop {
                    match queue.dequeue(&shutdown) {
                        Ok((from, n)) => {
                            println!("consumer {} <- producer {}: {}", id, from, n);
                            count += 1;
                        }
                        Err(CancelledError::DeadlineExceeded) => break count,
                        Err(e) => panic!("unexpected: {}", e),
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    for p in producers {
        let _ = p.join();
    }
    let total: usize = consumers.into_iter().filter_map(|c| c.join().ok()).sum();
    println!("consumed {} items, {} left in the queue", total, queue.len());
}
