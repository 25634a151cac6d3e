use std::{cmp::Ordering, collections::BinaryHeap};

/*
Scheduler
=========

Timed callbacks on the engine clock, for things that have to happen later
but are not sample-accurate automation: the next step of a healing sequence,
for instance.

The manager pops everything due before the end of the block it is about to
render, so an event fires at most one render quantum early and can still
place its sound at the exact time it carries. Events due at the same time
fire in the order they were scheduled. A handler may schedule more events,
including ones already due; popping in a loop picks them up in the same tick.
*/

struct Entry<E> {
    at: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // reversed: BinaryHeap is a max-heap and we want the earliest first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct Scheduler<E> {
    queue: BinaryHeap<Entry<E>>,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: f64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { at, seq, event });
    }

    /// Pop the earliest event due before `until`, with its time.
    pub fn pop_due(&mut self, until: f64) -> Option<(f64, E)> {
        if self.queue.peek()?.at >= until {
            return None;
        }
        self.queue.pop().map(|entry| (entry.at, entry.event))
    }

    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|entry| entry.at)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
