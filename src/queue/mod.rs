//! Bounded single-producer/single-consumer event queue with drop-oldest
//! overflow.
//!
//! Unlike the rest of this crate's locking (which leans on `parking_lot`
//! for plain mutual exclusion), this queue needs a timed wait and uses
//! `std::sync::{Mutex, Condvar}` directly for `wait_timeout`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use log::warn;

/// Result of a timed `pop`.
#[derive(Debug, PartialEq, Eq)]
pub enum PopOutcome<T> {
    Item(T),
    Stopped,
    TimedOut,
}

struct Inner<T> {
    items: VecDeque<T>,
    stopped: bool,
}

/// FIFO queue of bounded capacity. `push` never blocks: on overflow the
/// front (oldest) element is discarded to make room for the new one.
pub struct EventQueue<T> {
    capacity: usize,
    state: Mutex<Inner<T>>,
    not_empty: Condvar,
    overflow_count: AtomicU64,
    name: &'static str,
    warned_this_burst: std::sync::atomic::AtomicBool,
}

impl<T> EventQueue<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                stopped: false,
            }),
            not_empty: Condvar::new(),
            overflow_count: AtomicU64::new(0),
            name,
            warned_this_burst: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Push an item; drops the oldest item if the queue is already at
    /// capacity. Never blocks.
    pub fn push(&self, item: T) {
        let mut inner = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if inner.items.len() >= self.capacity {
            inner.items.pop_front();
            self.overflow_count.fetch_add(1, Ordering::Relaxed);
            // Rate-limited: one warning per overflow burst, not one per drop.
            if !self.warned_this_burst.swap(true, Ordering::Relaxed) {
                warn!("[{}] queue at capacity {}, dropping oldest", self.name, self.capacity);
            }
        } else {
            self.warned_this_burst.store(false, Ordering::Relaxed);
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available, the queue is closed, or
    /// `timeout` elapses.
    pub fn pop(&self, timeout: Duration) -> PopOutcome<T> {
        let mut inner = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(item) = inner.items.pop_front() {
                return PopOutcome::Item(item);
            }
            if inner.stopped {
                return PopOutcome::Stopped;
            }
            let (next, timeout_result) = self
                .not_empty
                .wait_timeout(inner, timeout)
                .unwrap_or_else(|e| e.into_inner());
            inner = next;
            if timeout_result.timed_out() && inner.items.is_empty() && !inner.stopped {
                return PopOutcome::TimedOut;
            }
        }
    }

    /// Marks the queue as stopped and wakes every waiter.
    pub fn close(&self) {
        let mut inner = self.state.lock().unwrap_or_else(|e| e.into_inner());
        inner.stopped = true;
        drop(inner);
        self.not_empty.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overflow_count(&self) -> u64 {
        self.overflow_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_with_drop_oldest() {
        let q: EventQueue<char> = EventQueue::new("test", 2);
        q.push('a');
        q.push('b');
        q.push('c');
        assert_eq!(q.overflow_count(), 1);
        assert_eq!(q.pop(Duration::from_millis(10)), PopOutcome::Item('b'));
        assert_eq!(q.pop(Duration::from_millis(10)), PopOutcome::Item('c'));
    }

    #[test]
    fn pop_times_out_when_empty() {
        let q: EventQueue<i32> = EventQueue::new("test", 4);
        assert_eq!(q.pop(Duration::from_millis(10)), PopOutcome::TimedOut);
    }

    #[test]
    fn close_wakes_blocked_pop() {
        use std::sync::Arc;
        use std::thread;

        let q: Arc<EventQueue<i32>> = Arc::new(EventQueue::new("test", 4));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.pop(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(20));
        q.close();
        assert_eq!(handle.join().unwrap(), PopOutcome::Stopped);
    }

    #[test]
    fn push_after_close_still_recorded_but_pop_drains_first() {
        let q: EventQueue<i32> = EventQueue::new("test", 4);
        q.push(1);
        q.close();
        assert_eq!(q.pop(Duration::from_millis(10)), PopOutcome::Item(1));
        assert_eq!(q.pop(Duration::from_millis(10)), PopOutcome::Stopped);
    }
}
