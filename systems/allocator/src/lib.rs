#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Item allocator deciding which kinds spawn next and which kinds each
//! destination asks for.
//!
//! The allocator owns a bounded lookahead queue of upcoming spawns, counts the
//! items currently in the world, and assigns wants to destinations through a
//! tiered selection policy that prefers items the player can still reach. It
//! reacts to world events and answers with commands and follow-up events.

mod danger_zone;
mod destinations;
mod on_screen;
mod queue;

use std::sync::Arc;

use log::{debug, warn};
use lost_and_found_core::{
    Catalog, Command, DestinationId, Difficulty, DifficultyError, Event, HazardProbe, ItemId,
    ItemKindId, ItemSource, SessionState,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use danger_zone::DangerZoneTracker;
pub use destinations::{DestinationRegistry, DestinationSlot};
pub use queue::{LookaheadQueue, QueueEntry};

use on_screen::OnScreenItems;

/// Configuration parameters required to construct the allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    seed: u64,
}

impl Config {
    /// Creates a configuration that seeds the allocator's random draws.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed used for the random draws.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Errors raised while constructing or reconfiguring the allocator.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AllocatorError {
    /// The supplied difficulty parameters were out of range.
    #[error("invalid difficulty: {0}")]
    Difficulty(#[from] DifficultyError),
}

/// Tier of the want selection that produced a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WantTier {
    OnScreen,
    Queue,
    Catalog,
    Unconstrained,
}

/// Stateful allocator of spawned items and destination wants.
#[derive(Debug)]
pub struct ItemAllocator {
    catalog: Arc<Catalog>,
    difficulty: Difficulty,
    queue: LookaheadQueue,
    on_screen: OnScreenItems,
    destinations: DestinationRegistry,
    danger_zone: DangerZoneTracker,
    rng: ChaCha8Rng,
    candidates: Vec<ItemKindId>,
}

impl ItemAllocator {
    /// Creates an allocator drawing from the catalog under the difficulty.
    pub fn new(
        catalog: Arc<Catalog>,
        difficulty: Difficulty,
        config: Config,
    ) -> Result<Self, AllocatorError> {
        difficulty.validate()?;
        Ok(Self {
            catalog,
            difficulty,
            queue: LookaheadQueue::new(difficulty.lookahead_queue_size()),
            on_screen: OnScreenItems::default(),
            destinations: DestinationRegistry::default(),
            danger_zone: DangerZoneTracker::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            candidates: Vec::new(),
        })
    }

    /// Catalog the allocator draws from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Difficulty currently in effect.
    #[must_use]
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    /// Upcoming spawns.
    #[must_use]
    pub fn queue(&self) -> &LookaheadQueue {
        &self.queue
    }

    /// Registered destinations and their wants.
    #[must_use]
    pub fn destinations(&self) -> &DestinationRegistry {
        &self.destinations
    }

    /// Danger zone snapshot from the most recent refresh.
    #[must_use]
    pub fn danger_zone(&self) -> &DangerZoneTracker {
        &self.danger_zone
    }

    /// Number of items of the kind that were spawned and not yet removed.
    #[must_use]
    pub fn on_screen_count(&self, kind: ItemKindId) -> u32 {
        self.on_screen.count(kind)
    }

    /// Number of items that were spawned and not yet removed.
    #[must_use]
    pub fn on_screen_total(&self) -> u32 {
        self.on_screen.total()
    }

    /// Replaces the difficulty parameters.
    ///
    /// A smaller lookahead size truncates the queue from the back.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), AllocatorError> {
        difficulty.validate()?;
        self.difficulty = difficulty;
        self.queue.set_capacity(difficulty.lookahead_queue_size());
        Ok(())
    }

    /// Tops the lookahead queue up to its capacity.
    pub fn refill_queue(&mut self) {
        let missing = self.queue.missing();
        if missing == 0 {
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let unique = self.difficulty.unique_items();
        let trash_probability = self.difficulty.trash_probability();

        let on_screen = &self.on_screen;
        let queue = &self.queue;
        self.candidates.clear();
        self.candidates.extend(
            catalog
                .searchable()
                .iter()
                .copied()
                .filter(|kind| !unique || !(on_screen.contains(*kind) || queue.contains(*kind))),
        );

        for _ in 0..missing {
            let wants_trash = self.rng.gen::<f32>() < trash_probability;
            if !wants_trash && !unique && self.candidates.is_empty() {
                // Every searchable kind was placed in this pass.
                self.candidates.extend_from_slice(catalog.searchable());
            }
            let kind = if wants_trash || self.candidates.is_empty() {
                choose(&mut self.rng, catalog.trash())
            } else {
                let index = self.rng.gen_range(0..self.candidates.len());
                self.candidates.swap_remove(index)
            };
            self.queue.push(kind);
        }

        debug!("refilled lookahead queue with {missing} entries");
    }

    /// Pops the next kind to spawn and counts it as on screen.
    pub fn next_spawn_item(&mut self) -> ItemKindId {
        self.refill_queue();
        let kind = match self.queue.pop_front() {
            Some(entry) => entry.kind(),
            None => choose(&mut self.rng, self.catalog.trash()),
        };
        self.on_screen.add(kind);
        kind
    }

    /// Selects the kind a destination should ask for next.
    ///
    /// The selection prefers searchable items already on screen, then queued
    /// items that were not offered yet, then any searchable kind. Items in the
    /// danger zone and kinds already wanted are avoided until the final
    /// fallback, which always succeeds.
    pub fn next_wanted_item(&mut self, probe: &impl HazardProbe) -> ItemKindId {
        self.refill_queue();
        let _ = self.danger_zone.refresh(probe);

        let (kind, tier) = if let Some(kind) = self.pick_on_screen() {
            (kind, WantTier::OnScreen)
        } else if let Some(kind) = self.pick_from_queue() {
            (kind, WantTier::Queue)
        } else if let Some(kind) = self.pick_from_catalog() {
            (kind, WantTier::Catalog)
        } else {
            let kind = choose(&mut self.rng, self.catalog.searchable());
            warn!("every want candidate was excluded, falling back to {kind:?}");
            (kind, WantTier::Unconstrained)
        };

        debug!("selected wanted item {kind:?} via {tier:?}");
        kind
    }

    fn pick_on_screen(&mut self) -> Option<ItemKindId> {
        if self.rng.gen::<f32>() >= self.difficulty.screen_probability() {
            return None;
        }

        self.candidates.clear();
        for (kind, count) in self.on_screen.iter() {
            let eligible = self.catalog.is_searchable(kind)
                && !self.danger_zone.contains_kind(kind)
                && !self.destinations.is_wanted(kind);
            if eligible {
                self.candidates
                    .extend(std::iter::repeat(kind).take(count as usize));
            }
        }

        if self.candidates.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.candidates.len());
        Some(self.candidates[index])
    }

    fn pick_from_queue(&mut self) -> Option<ItemKindId> {
        let len = self.queue.len();
        if len == 0 {
            return None;
        }

        for _ in 0..self.queue.capacity() {
            let index = self.rng.gen_range(0..len);
            let Some(entry) = self.queue.get(index).copied() else {
                continue;
            };
            let kind = entry.kind();
            if entry.searched()
                || self.catalog.is_trash(kind)
                || self.danger_zone.contains_kind(kind)
                || (self.difficulty.unique_searched_items() && self.destinations.is_wanted(kind))
            {
                continue;
            }
            self.queue.mark_searched(index);
            return Some(kind);
        }
        None
    }

    fn pick_from_catalog(&mut self) -> Option<ItemKindId> {
        let catalog = Arc::clone(&self.catalog);
        let searchable = catalog.searchable();
        for _ in 0..searchable.len() {
            let kind = choose(&mut self.rng, searchable);
            if self.danger_zone.contains_kind(kind) {
                continue;
            }
            if self.difficulty.unique_items() && self.destinations.is_wanted(kind) {
                continue;
            }
            return Some(kind);
        }
        None
    }

    /// Registers a destination and assigns its first want.
    ///
    /// Registering a known destination again has no effect.
    pub fn register_destination(
        &mut self,
        destination: DestinationId,
        probe: &impl HazardProbe,
        out_events: &mut Vec<Event>,
    ) {
        if self.destinations.register(destination) {
            self.assign_want(destination, probe, out_events);
        }
    }

    /// Re-rolls the want of a registered destination.
    ///
    /// The previous want stays registered while the new one is selected, so
    /// the destination does not immediately ask for the same kind again.
    pub fn assign_want(
        &mut self,
        destination: DestinationId,
        probe: &impl HazardProbe,
        out_events: &mut Vec<Event>,
    ) {
        if !self.destinations.contains(destination) {
            debug!("ignoring want request for unknown destination {destination:?}");
            return;
        }

        let kind = self.next_wanted_item(probe);
        self.destinations.assign(destination, kind);
        out_events.push(Event::WantAssigned { destination, kind });
    }

    /// Records that an item of the kind was delivered.
    pub fn notify_collected(&mut self, kind: ItemKindId, out_events: &mut Vec<Event>) {
        if !self.on_screen.remove(kind) {
            debug!("collected {kind:?} was not tracked as on screen");
        }
        out_events.push(Event::ItemFound { kind });
    }

    /// Records that an item of the kind was destroyed by the shredder.
    ///
    /// When a destination wanted the kind, the loss is reported and that
    /// destination picks a new want.
    pub fn notify_shredded(
        &mut self,
        kind: ItemKindId,
        probe: &impl HazardProbe,
        out_events: &mut Vec<Event>,
    ) {
        if !self.on_screen.remove(kind) {
            debug!("shredded {kind:?} was not tracked as on screen");
        }

        if let Some(destination) = self.destinations.destination_wanting(kind) {
            out_events.push(Event::SearchedItemShredded { kind });
            self.assign_want(destination, probe, out_events);
        }
    }

    /// Reports whether the item currently overlaps the danger zone.
    pub fn is_in_danger_zone(&mut self, item: ItemId, probe: &impl HazardProbe) -> bool {
        let _ = self.danger_zone.refresh(probe);
        self.danger_zone.contains_item(item)
    }

    /// Reports whether the item is wanted somewhere and about to be lost.
    pub fn is_endangered_want(
        &mut self,
        item: ItemId,
        kind: ItemKindId,
        probe: &impl HazardProbe,
    ) -> bool {
        self.destinations.is_wanted(kind) && self.is_in_danger_zone(item, probe)
    }

    /// Forgets the queue, the on-screen items, and the wants, then assigns
    /// fresh wants to every registered destination.
    pub fn reset(&mut self, probe: &impl HazardProbe, out_events: &mut Vec<Event>) {
        self.queue.clear();
        self.on_screen.clear();
        self.danger_zone.invalidate();
        self.destinations.clear_wants();

        let registered: Vec<DestinationId> = self.destinations.iter().map(DestinationSlot::id).collect();
        for destination in registered {
            self.assign_want(destination, probe, out_events);
        }
    }

    /// Consumes world and session events, emitting follow-up events and the
    /// commands that collect delivered items.
    pub fn handle(
        &mut self,
        events: &[Event],
        probe: &impl HazardProbe,
        out_events: &mut Vec<Event>,
        out_commands: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::ItemDropped {
                    item,
                    kind,
                    destination: Some(destination),
                } => {
                    if self.destinations.want_of(*destination) == Some(*kind) {
                        out_commands.push(Command::CollectItem {
                            item: *item,
                            destination: *destination,
                        });
                    }
                }
                Event::ItemCollected {
                    kind, destination, ..
                } => {
                    self.notify_collected(*kind, out_events);
                    self.assign_want(*destination, probe, out_events);
                }
                Event::ItemShredded { kind, .. } => {
                    self.notify_shredded(*kind, probe, out_events);
                }
                Event::SessionStateChanged {
                    from: SessionState::EndScreen,
                    to: SessionState::StartScreen,
                } => {
                    self.reset(probe, out_events);
                }
                _ => {}
            }
        }
    }
}

impl ItemSource for ItemAllocator {
    fn next_spawn_item(&mut self) -> ItemKindId {
        ItemAllocator::next_spawn_item(self)
    }
}

fn choose(rng: &mut ChaCha8Rng, pool: &[ItemKindId]) -> ItemKindId {
    debug_assert!(!pool.is_empty(), "catalog pools are never empty");
    pool[rng.gen_range(0..pool.len())]
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use lost_and_found_core::{HazardContact, ItemDefinition, Tick};

    use super::*;

    struct StaticProbe {
        tick: Tick,
        contacts: Vec<HazardContact>,
        queries: Cell<u32>,
    }

    impl StaticProbe {
        fn calm() -> Self {
            Self::with_contacts(Vec::new())
        }

        fn with_contacts(contacts: Vec<HazardContact>) -> Self {
            Self {
                tick: Tick::new(1),
                contacts,
                queries: Cell::new(0),
            }
        }
    }

    impl HazardProbe for StaticProbe {
        fn tick(&self) -> Tick {
            self.tick
        }

        fn items_in_hazard(&self, out: &mut Vec<HazardContact>) {
            self.queries.set(self.queries.get() + 1);
            out.extend(self.contacts.iter().copied());
        }
    }

    fn catalog(searchable: &[&str], trash: &[&str]) -> Arc<Catalog> {
        let searchable = searchable
            .iter()
            .map(|name| ItemDefinition::named(*name).with_score_increase(10))
            .collect();
        let trash = trash.iter().map(|name| ItemDefinition::named(*name)).collect();
        Arc::new(Catalog::new(searchable, trash).expect("valid catalog"))
    }

    fn kind(catalog: &Catalog, name: &str) -> ItemKindId {
        catalog.find_by_name(name).expect("known kind").id()
    }

    fn allocator(catalog: &Arc<Catalog>, difficulty: Difficulty) -> ItemAllocator {
        ItemAllocator::new(Arc::clone(catalog), difficulty, Config::new(7)).expect("valid difficulty")
    }

    fn queued(allocator: &ItemAllocator) -> Vec<ItemKindId> {
        allocator.queue().iter().map(QueueEntry::kind).collect()
    }

    #[test]
    fn rejects_invalid_difficulty() {
        let catalog = catalog(&["Sock"], &["Can"]);
        let difficulty = Difficulty::default().with_trash_probability(1.5);

        let result = ItemAllocator::new(catalog, difficulty, Config::new(0));

        assert!(matches!(result, Err(AllocatorError::Difficulty(_))));
    }

    #[test]
    fn refill_repeats_single_kind_without_uniqueness() {
        let catalog = catalog(&["Sock"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let difficulty = Difficulty::default()
            .with_trash_probability(0.0)
            .with_unique_items(false)
            .with_lookahead_queue_size(4);
        let mut allocator = allocator(&catalog, difficulty);

        allocator.refill_queue();

        assert_eq!(queued(&allocator), vec![sock; 4]);
    }

    #[test]
    fn refill_places_distinct_kinds_before_repeating() {
        let catalog = catalog(&["Sock", "Key", "Hat", "Scarf"], &["Can"]);
        let difficulty = Difficulty::default()
            .with_trash_probability(0.0)
            .with_unique_items(false)
            .with_lookahead_queue_size(4);
        let mut allocator = allocator(&catalog, difficulty);
        allocator.on_screen.add(kind(&catalog, "Sock"));

        allocator.refill_queue();

        let mut kinds = queued(&allocator);
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn refill_falls_back_to_trash_once_unique_pool_is_spent() {
        let catalog = catalog(&["Sock"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let can = kind(&catalog, "Can");
        let difficulty = Difficulty::default()
            .with_trash_probability(0.0)
            .with_unique_items(true)
            .with_lookahead_queue_size(4);
        let mut allocator = allocator(&catalog, difficulty);

        allocator.refill_queue();

        assert_eq!(queued(&allocator), vec![sock, can, can, can]);
        assert!(allocator.queue().iter().all(|entry| !entry.searched()));
    }

    #[test]
    fn refill_skips_kinds_already_on_screen() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let difficulty = Difficulty::default()
            .with_trash_probability(0.0)
            .with_lookahead_queue_size(2);
        let mut allocator = allocator(&catalog, difficulty);
        allocator.on_screen.add(sock);

        allocator.refill_queue();

        let kinds = queued(&allocator);
        assert_eq!(kinds.len(), 2);
        assert!(!kinds.contains(&sock));
        assert_ne!(kinds[0], kinds[1]);
    }

    #[test]
    fn spawning_pops_front_and_counts_on_screen() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let mut allocator = allocator(&catalog, Difficulty::default());
        allocator.refill_queue();
        let front = allocator.queue().get(0).map(QueueEntry::kind);

        let spawned = allocator.next_spawn_item();

        assert_eq!(Some(spawned), front);
        assert_eq!(allocator.on_screen_count(spawned), 1);
        assert_eq!(allocator.queue().len(), allocator.queue().capacity() - 1);
    }

    #[test]
    fn wants_the_only_safe_item_on_screen() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let difficulty = Difficulty::default().with_screen_probability(1.0);
        let mut allocator = allocator(&catalog, difficulty);
        allocator.on_screen.add(sock);
        let _ = allocator.destinations.register(DestinationId::new(0));

        let wanted = allocator.next_wanted_item(&StaticProbe::calm());

        assert_eq!(wanted, sock);
    }

    #[test]
    fn falls_through_to_unsearched_queue_slot_when_screen_is_in_danger() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let key = kind(&catalog, "Key");
        let difficulty = Difficulty::default()
            .with_screen_probability(1.0)
            .with_lookahead_queue_size(1);
        let mut allocator = allocator(&catalog, difficulty);
        allocator.on_screen.add(sock);
        allocator.queue.push(key);
        let probe = StaticProbe::with_contacts(vec![HazardContact {
            item: ItemId::new(0),
            kind: sock,
        }]);

        let wanted = allocator.next_wanted_item(&probe);

        assert_eq!(wanted, key);
        assert!(allocator.queue().get(0).is_some_and(QueueEntry::searched));
    }

    #[test]
    fn falls_back_to_catalog_when_queue_holds_only_trash() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let difficulty = Difficulty::default()
            .with_screen_probability(0.0)
            .with_trash_probability(1.0);
        let mut allocator = allocator(&catalog, difficulty);

        let wanted = allocator.next_wanted_item(&StaticProbe::calm());

        assert!(catalog.is_searchable(wanted));
        assert!(allocator.queue().iter().all(|entry| catalog.is_trash(entry.kind())));
    }

    #[test]
    fn catalog_fallback_skips_endangered_and_wanted_kinds() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let key = kind(&catalog, "Key");
        let hat = kind(&catalog, "Hat");
        let probe = StaticProbe::with_contacts(vec![HazardContact {
            item: ItemId::new(3),
            kind: key,
        }]);

        let mut picked = 0;
        for seed in 0..16 {
            let mut allocator =
                ItemAllocator::new(Arc::clone(&catalog), Difficulty::default(), Config::new(seed))
                    .expect("valid difficulty");
            let destination = DestinationId::new(0);
            let _ = allocator.destinations.register(destination);
            allocator.destinations.assign(destination, sock);
            let _ = allocator.danger_zone.refresh(&probe);

            if let Some(kind) = allocator.pick_from_catalog() {
                assert_eq!(kind, hat, "seed {seed}");
                picked += 1;
            }
        }
        assert!(picked > 0);
    }

    #[test]
    fn unconstrained_fallback_when_every_searchable_kind_is_endangered() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let probe = StaticProbe::with_contacts(
            catalog
                .searchable()
                .iter()
                .enumerate()
                .map(|(index, kind)| HazardContact {
                    item: ItemId::new(index as u32),
                    kind: *kind,
                })
                .collect(),
        );
        let mut allocator = allocator(&catalog, Difficulty::default());
        for kind in catalog.searchable() {
            allocator.on_screen.add(*kind);
        }
        let _ = allocator.danger_zone.refresh(&probe);
        assert_eq!(allocator.pick_from_catalog(), None);

        for _ in 0..8 {
            let wanted = allocator.next_wanted_item(&probe);
            assert!(catalog.is_searchable(wanted));
        }
    }

    #[test]
    fn shredding_a_wanted_kind_reports_once_and_rerolls() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let key = kind(&catalog, "Key");
        let destination = DestinationId::new(0);
        let difficulty = Difficulty::default().with_screen_probability(1.0);
        let mut allocator = allocator(&catalog, difficulty);
        let _ = allocator.destinations.register(destination);
        allocator.destinations.assign(destination, sock);
        allocator.on_screen.add(sock);
        allocator.on_screen.add(key);

        let mut events = Vec::new();
        allocator.notify_shredded(sock, &StaticProbe::calm(), &mut events);

        assert_eq!(
            events,
            vec![
                Event::SearchedItemShredded { kind: sock },
                Event::WantAssigned {
                    destination,
                    kind: key
                },
            ]
        );
        assert_eq!(allocator.destinations().want_of(destination), Some(key));
        assert_eq!(allocator.on_screen_count(sock), 0);
    }

    #[test]
    fn shredding_an_unwanted_kind_only_updates_on_screen() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let can = kind(&catalog, "Can");
        let mut allocator = allocator(&catalog, Difficulty::default());
        allocator.on_screen.add(can);

        let mut events = Vec::new();
        allocator.notify_shredded(can, &StaticProbe::calm(), &mut events);

        assert!(events.is_empty());
        assert_eq!(allocator.on_screen_total(), 0);
    }

    #[test]
    fn collecting_untracked_kind_keeps_count_at_zero() {
        let catalog = catalog(&["Sock"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let mut allocator = allocator(&catalog, Difficulty::default());

        let mut events = Vec::new();
        allocator.notify_collected(sock, &mut events);

        assert_eq!(allocator.on_screen_count(sock), 0);
        assert_eq!(events, vec![Event::ItemFound { kind: sock }]);
    }

    #[test]
    fn danger_zone_is_queried_once_per_tick() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let mut allocator = allocator(&catalog, Difficulty::default());
        let probe = StaticProbe::calm();

        let _ = allocator.next_wanted_item(&probe);
        let _ = allocator.next_wanted_item(&probe);
        let _ = allocator.is_in_danger_zone(ItemId::new(3), &probe);

        assert_eq!(probe.queries.get(), 1);
    }

    #[test]
    fn endangered_want_requires_both_conditions() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let key = kind(&catalog, "Key");
        let destination = DestinationId::new(0);
        let mut allocator = allocator(&catalog, Difficulty::default());
        let _ = allocator.destinations.register(destination);
        allocator.destinations.assign(destination, sock);
        let probe = StaticProbe::with_contacts(vec![
            HazardContact {
                item: ItemId::new(1),
                kind: sock,
            },
            HazardContact {
                item: ItemId::new(2),
                kind: key,
            },
        ]);

        assert!(allocator.is_endangered_want(ItemId::new(1), sock, &probe));
        assert!(!allocator.is_endangered_want(ItemId::new(2), key, &probe));
        assert!(!allocator.is_endangered_want(ItemId::new(5), sock, &probe));
    }

    #[test]
    fn drop_on_wanting_destination_requests_collection() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let wanting = DestinationId::new(0);
        let other = DestinationId::new(1);
        let mut allocator = allocator(&catalog, Difficulty::default());
        for destination in [wanting, other] {
            let _ = allocator.destinations.register(destination);
        }
        allocator.destinations.assign(wanting, sock);

        let events = [
            Event::ItemDropped {
                item: ItemId::new(4),
                kind: sock,
                destination: Some(other),
            },
            Event::ItemDropped {
                item: ItemId::new(4),
                kind: sock,
                destination: Some(wanting),
            },
        ];
        let mut out_events = Vec::new();
        let mut out_commands = Vec::new();
        allocator.handle(&events, &StaticProbe::calm(), &mut out_events, &mut out_commands);

        assert_eq!(
            out_commands,
            vec![Command::CollectItem {
                item: ItemId::new(4),
                destination: wanting
            }]
        );
        assert!(out_events.is_empty());
    }

    #[test]
    fn collection_scores_and_rerolls_destination() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let sock = kind(&catalog, "Sock");
        let destination = DestinationId::new(0);
        let mut allocator = allocator(&catalog, Difficulty::default());
        let _ = allocator.destinations.register(destination);
        allocator.destinations.assign(destination, sock);
        allocator.on_screen.add(sock);

        let events = [Event::ItemCollected {
            item: ItemId::new(0),
            kind: sock,
            destination,
        }];
        let mut out_events = Vec::new();
        let mut out_commands = Vec::new();
        allocator.handle(&events, &StaticProbe::calm(), &mut out_events, &mut out_commands);

        assert_eq!(out_events.len(), 2);
        assert_eq!(out_events[0], Event::ItemFound { kind: sock });
        assert!(matches!(
            out_events[1],
            Event::WantAssigned { destination: d, .. } if d == destination
        ));
        assert_eq!(allocator.on_screen_count(sock), 0);
        assert!(out_commands.is_empty());
    }

    #[test]
    fn registering_twice_assigns_once() {
        let catalog = catalog(&["Sock", "Key"], &["Can"]);
        let mut allocator = allocator(&catalog, Difficulty::default());
        let probe = StaticProbe::calm();

        let mut events = Vec::new();
        allocator.register_destination(DestinationId::new(2), &probe, &mut events);
        allocator.register_destination(DestinationId::new(2), &probe, &mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(allocator.destinations().len(), 1);
        assert!(allocator.destinations().want_of(DestinationId::new(2)).is_some());
    }

    #[test]
    fn restart_clears_state_and_reassigns_wants() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let mut allocator = allocator(&catalog, Difficulty::default());
        let probe = StaticProbe::calm();
        let mut events = Vec::new();
        allocator.register_destination(DestinationId::new(0), &probe, &mut events);
        allocator.register_destination(DestinationId::new(1), &probe, &mut events);
        let _ = allocator.next_spawn_item();
        let _ = allocator.next_spawn_item();
        events.clear();

        let restart = [Event::SessionStateChanged {
            from: SessionState::EndScreen,
            to: SessionState::StartScreen,
        }];
        let mut commands = Vec::new();
        allocator.handle(&restart, &probe, &mut events, &mut commands);

        assert_eq!(allocator.on_screen_total(), 0);
        let assigned: Vec<DestinationId> = events
            .iter()
            .filter_map(|event| match event {
                Event::WantAssigned { destination, .. } => Some(*destination),
                _ => None,
            })
            .collect();
        assert_eq!(assigned, vec![DestinationId::new(0), DestinationId::new(1)]);
        assert!(allocator.destinations().iter().all(|slot| slot.want().is_some()));
    }

    #[test]
    fn shrinking_lookahead_truncates_queue() {
        let catalog = catalog(&["Sock", "Key", "Hat"], &["Can"]);
        let difficulty = Difficulty::default().with_lookahead_queue_size(6);
        let mut allocator = allocator(&catalog, difficulty);
        allocator.refill_queue();
        let front: Vec<ItemKindId> = queued(&allocator).into_iter().take(2).collect();

        allocator
            .set_difficulty(difficulty.with_lookahead_queue_size(2))
            .expect("valid difficulty");

        assert_eq!(queued(&allocator), front);
    }
}
