//! Tick-memoized view of the items overlapping the hazard.

use lost_and_found_core::{HazardContact, HazardProbe, ItemId, ItemKindId, Tick};

/// Caches the hazard contacts so the spatial query runs at most once per tick.
#[derive(Clone, Debug, Default)]
pub struct DangerZoneTracker {
    last_tick: Option<Tick>,
    contacts: Vec<HazardContact>,
}

impl DangerZoneTracker {
    /// Returns the contacts for the probe's tick, querying only when the tick
    /// differs from the cached one.
    pub fn refresh(&mut self, probe: &impl HazardProbe) -> &[HazardContact] {
        let tick = probe.tick();
        if self.last_tick != Some(tick) {
            self.contacts.clear();
            probe.items_in_hazard(&mut self.contacts);
            self.last_tick = Some(tick);
        }
        &self.contacts
    }

    /// Reports whether an item of the kind was in the hazard at the last refresh.
    #[must_use]
    pub fn contains_kind(&self, kind: ItemKindId) -> bool {
        self.contacts.iter().any(|contact| contact.kind == kind)
    }

    /// Reports whether the item was in the hazard at the last refresh.
    #[must_use]
    pub fn contains_item(&self, item: ItemId) -> bool {
        self.contacts.iter().any(|contact| contact.item == item)
    }

    /// Forgets the cached snapshot.
    pub fn invalidate(&mut self) {
        self.last_tick = None;
        self.contacts.clear();
    }
}
