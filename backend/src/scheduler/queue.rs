//! Pending-event priority queue
//!
//! Uses a `BinaryHeap` with reversed `Ord` on [`Scheduled`] to act as a
//! min-heap keyed by `(time, sequence)`. Sequence numbers are strictly
//! increasing per scheduler, so events sharing a timestamp pop in the order
//! they were scheduled.

use crate::core::time::SimTime;
use crate::models::event::Event;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An event together with its ordering key
#[derive(Debug)]
pub struct Scheduled<R> {
    pub time: SimTime,
    pub sequence: u64,
    pub event: Event<R>,
}

impl<R> Scheduled<R> {
    fn key(&self) -> (SimTime, u64) {
        (self.time, self.sequence)
    }
}

impl<R> PartialEq for Scheduled<R> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<R> Eq for Scheduled<R> {}

impl<R> PartialOrd for Scheduled<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Smallest `(time, sequence)` first; reversed because `BinaryHeap` is a max-heap
impl<R> Ord for Scheduled<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Min-priority queue of not-yet-executed events
#[derive(Debug)]
pub struct EventQueue<R> {
    heap: BinaryHeap<Scheduled<R>>,
}

impl<R> EventQueue<R> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, time: SimTime, sequence: u64, event: Event<R>) {
        self.heap.push(Scheduled {
            time,
            sequence,
            event,
        });
    }

    /// Remove and return the earliest entry
    pub fn pop_min(&mut self) -> Option<Scheduled<R>> {
        self.heap.pop()
    }

    /// Earliest entry without removing it
    pub fn peek_min(&self) -> Option<&Scheduled<R>> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Drop every entry whose event is deactivated
    ///
    /// Removed events are marked as no longer queued. Returns the number removed.
    pub fn remove_inactive(&mut self) -> usize {
        let before = self.heap.len();
        self.heap.retain(|scheduled| {
            let keep = scheduled.event.is_active();
            if !keep {
                scheduled.event.set_queued(false);
            }
            keep
        });
        before - self.heap.len()
    }

    /// Drain all entries in pop order
    #[cfg(test)]
    fn drain_ordered(&mut self) -> Vec<Scheduled<R>> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(scheduled) = self.heap.pop() {
            out.push(scheduled);
        }
        out
    }
}

impl<R> Default for EventQueue<R> {
    fn default() -> Self {
        Self::new()
    }
}
