//! Multiset of item kinds currently present in the world.

use std::collections::BTreeMap;

use lost_and_found_core::ItemKindId;

/// Counts spawned items per kind until they are collected or shredded.
#[derive(Clone, Debug, Default)]
pub(crate) struct OnScreenItems {
    counts: BTreeMap<ItemKindId, u32>,
}

impl OnScreenItems {
    pub(crate) fn add(&mut self, kind: ItemKindId) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    /// Removes one instance of the kind. Returns false if none was tracked.
    pub(crate) fn remove(&mut self, kind: ItemKindId) -> bool {
        let Some(count) = self.counts.get_mut(&kind) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            let _ = self.counts.remove(&kind);
        }
        true
    }

    pub(crate) fn count(&self, kind: ItemKindId) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn contains(&self, kind: ItemKindId) -> bool {
        self.counts.contains_key(&kind)
    }

    /// Kinds with their multiplicity, in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ItemKindId, u32)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }

    pub(crate) fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}
