use std::hash::BuildHasherDefault;

use dashmap::DashMap;
use rustc_hash::FxHasher;

/// Messages sent during the running superstep, keyed by target slot.
///
/// Workers of the same superstep write concurrently through [`MessageStore::send`]
/// and [`MessageStore::broadcast`]. Nothing written here is readable by a vertex
/// until the barrier calls [`MessageStore::deliver`], which moves the messages into
/// the per-slot inboxes of the next superstep.
#[derive(Debug)]
pub struct MessageStore<M> {
    in_flight: DashMap<usize, Vec<M>, BuildHasherDefault<FxHasher>>,
}

impl<M> Default for MessageStore<M> {
    fn default() -> Self {
        Self {
            in_flight: DashMap::with_hasher(BuildHasherDefault::default()),
        }
    }
}

impl<M: Copy> MessageStore<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `message` for the vertex at `slot`.
    pub fn send(&self, slot: usize, message: M) {
        self.in_flight.entry(slot).or_default().push(message);
    }

    /// Queues one copy of `message` per target slot and returns the number of
    /// queued messages.
    pub fn broadcast(&self, targets: &[usize], message: M) -> u64 {
        for &slot in targets {
            self.send(slot, message);
        }
        targets.len() as u64
    }

    /// Number of messages waiting for the barrier.
    pub fn pending(&self) -> u64 {
        self.in_flight
            .iter()
            .map(|entry| entry.value().len() as u64)
            .sum()
    }

    /// Moves every in-flight message into `inboxes` and returns how many were
    /// delivered. The store is empty afterwards.
    ///
    /// # Panics
    /// If a message targets a slot outside `inboxes`.
    pub fn deliver(&mut self, inboxes: &mut [Vec<M>]) -> u64 {
        let in_flight = std::mem::take(&mut self.in_flight);
        let mut delivered = 0u64;
        for (slot, mut messages) in in_flight {
            delivered += messages.len() as u64;
            inboxes[slot].append(&mut messages);
        }
        delivered
    }
}
