//! Registry of live destinations and the kind each one currently wants.

use lost_and_found_core::{DestinationId, ItemKindId};

/// Destination and its current want.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestinationSlot {
    id: DestinationId,
    want: Option<ItemKindId>,
}

impl DestinationSlot {
    /// Identifier of the destination.
    #[must_use]
    pub const fn id(&self) -> DestinationId {
        self.id
    }

    /// Kind the destination asks for, if one was assigned.
    #[must_use]
    pub const fn want(&self) -> Option<ItemKindId> {
        self.want
    }
}

/// Ordered set of destinations. There are only a handful, so lookups scan.
#[derive(Clone, Debug, Default)]
pub struct DestinationRegistry {
    slots: Vec<DestinationSlot>,
}

impl DestinationRegistry {
    /// Adds a destination without a want. Returns false if it was already known.
    pub(crate) fn register(&mut self, id: DestinationId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots.push(DestinationSlot { id, want: None });
        true
    }

    pub(crate) fn assign(&mut self, id: DestinationId, kind: ItemKindId) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
            slot.want = Some(kind);
        }
    }

    pub(crate) fn clear_wants(&mut self) {
        for slot in &mut self.slots {
            slot.want = None;
        }
    }

    /// Kind the destination currently wants.
    #[must_use]
    pub fn want_of(&self, id: DestinationId) -> Option<ItemKindId> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .and_then(DestinationSlot::want)
    }

    /// First destination, in registration order, that wants the kind.
    #[must_use]
    pub fn destination_wanting(&self, kind: ItemKindId) -> Option<DestinationId> {
        self.slots
            .iter()
            .find(|slot| slot.want == Some(kind))
            .map(DestinationSlot::id)
    }

    /// Reports whether the destination was registered.
    #[must_use]
    pub fn contains(&self, id: DestinationId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Reports whether any destination wants the kind.
    #[must_use]
    pub fn is_wanted(&self, kind: ItemKindId) -> bool {
        self.destination_wanting(kind).is_some()
    }

    /// Iterates over the destinations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DestinationSlot> {
        self.slots.iter()
    }

    /// Number of registered destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether no destination is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
