//! Bounded FIFO of pre-decided item kinds.

use std::collections::VecDeque;

use lost_and_found_core::ItemKindId;

/// Slot of the lookahead queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    kind: ItemKindId,
    searched: bool,
}

impl QueueEntry {
    fn fresh(kind: ItemKindId) -> Self {
        Self {
            kind,
            searched: false,
        }
    }

    /// Kind the slot will spawn.
    #[must_use]
    pub const fn kind(&self) -> ItemKindId {
        self.kind
    }

    /// Whether the slot was already offered as a destination's want.
    #[must_use]
    pub const fn searched(&self) -> bool {
        self.searched
    }
}

/// Lookahead queue of upcoming spawns with a fixed target length.
///
/// The queue never holds more than `capacity` entries. It is refilled on
/// demand by the allocator and drained from the front by spawn requests.
#[derive(Clone, Debug)]
pub struct LookaheadQueue {
    entries: VecDeque<QueueEntry>,
    capacity: usize,
}

impl LookaheadQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Target length of the queue.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at the provided position, front first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    /// Iterates over the entries, front first.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Reports whether any entry will spawn the kind.
    #[must_use]
    pub fn contains(&self, kind: ItemKindId) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    pub(crate) fn missing(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len())
    }

    pub(crate) fn push(&mut self, kind: ItemKindId) {
        debug_assert!(self.entries.len() < self.capacity, "queue overfilled");
        self.entries.push_back(QueueEntry::fresh(kind));
    }

    pub(crate) fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub(crate) fn mark_searched(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.searched = true;
        }
    }

    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_fifo_order() {
        let mut queue = LookaheadQueue::new(3);
        queue.push(ItemKindId::new(4));
        queue.push(ItemKindId::new(7));

        assert_eq!(queue.missing(), 1);
        assert_eq!(queue.pop_front().map(|entry| entry.kind()), Some(ItemKindId::new(4)));
        assert_eq!(queue.pop_front().map(|entry| entry.kind()), Some(ItemKindId::new(7)));
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn marks_single_slot_searched() {
        let mut queue = LookaheadQueue::new(2);
        queue.push(ItemKindId::new(1));
        queue.push(ItemKindId::new(1));

        queue.mark_searched(1);

        let flags: Vec<bool> = queue.iter().map(QueueEntry::searched).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn shrinking_capacity_drops_the_tail() {
        let mut queue = LookaheadQueue::new(4);
        for kind in 0..4 {
            queue.push(ItemKindId::new(kind));
        }

        queue.set_capacity(2);

        assert_eq!(queue.len(), 2);
        assert!(queue.contains(ItemKindId::new(1)));
        assert!(!queue.contains(ItemKindId::new(2)));
        assert_eq!(queue.missing(), 0);
    }
}
