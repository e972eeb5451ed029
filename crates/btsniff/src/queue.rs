//! Thread-safe hand-off of decoded events between capture and consumer
//!
//! A FIFO guarded by a mutex and condition variables. The default queue is
//! unbounded: `push` never blocks and `pop` waits until an element arrives
//! or the queue is closed. Closing is the shutdown signal that wakes a
//! blocked consumer, so capture termination is always observable.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// What `push` does when a bounded queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block the producer until the consumer drains an element
    Block,
    /// Evict the oldest queued element to make room
    DropOldest,
    /// Discard the incoming element
    DropNewest,
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO queue connecting one producer to one blocking consumer.
///
/// Elements come out in exactly the order they were pushed. One producer
/// and one consumer are assumed, but nothing here breaks under more of
/// either.
#[derive(Debug)]
pub struct EventQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Option<usize>,
    policy: OverflowPolicy,
}

impl<T> EventQueue<T> {
    /// Queue with no capacity limit; `push` never blocks.
    ///
    /// Unbounded growth is a backpressure risk if the consumer stalls;
    /// use [`EventQueue::bounded`] where resource limits matter.
    pub fn unbounded() -> Self {
        Self::with_limits(None, OverflowPolicy::Block)
    }

    /// Queue that holds at most `capacity` elements, applying `policy`
    /// once it is full. Capacity is clamped to at least one element.
    pub fn bounded(capacity: usize, policy: OverflowPolicy) -> Self {
        Self::with_limits(Some(capacity.max(1)), policy)
    }

    fn with_limits(capacity: Option<usize>, policy: OverflowPolicy) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            policy,
        }
    }

    /// Enqueue one element.
    ///
    /// Returns `true` if the element was enqueued, `false` if it was
    /// dropped (queue closed, or a full queue under
    /// [`OverflowPolicy::DropNewest`]). Only a full queue under
    /// [`OverflowPolicy::Block`] can block the caller.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return false;
        }

        if let Some(capacity) = self.capacity {
            while state.items.len() >= capacity {
                match self.policy {
                    OverflowPolicy::Block => {
                        state = self.not_full.wait(state).unwrap();
                        if state.closed {
                            return false;
                        }
                    }
                    OverflowPolicy::DropOldest => {
                        state.items.pop_front();
                    }
                    OverflowPolicy::DropNewest => return false,
                }
            }
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        true
    }

    /// Dequeue the front element, blocking until one is available.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Dequeue the front element without blocking
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Mark the queue closed and wake every waiting thread.
    ///
    /// Queued elements remain poppable; `pop` returns `None` once they
    /// are drained.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
