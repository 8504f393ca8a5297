#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lost & Found.
//!
//! The world owns every spawned item, the conveyor belt that carries them, the
//! player body, and the geometry of the danger zone, shredder and destination
//! receptacles. It never decides which item comes next or what a destination
//! wants; those decisions arrive as commands from the pure systems.

mod layout;

use glam::Vec2;
use lost_and_found_core::{
    Command, DestinationId, Event, HazardContact, HazardProbe, ItemId, ItemKindId, PlayerInput,
    Tick,
};

pub use layout::{BeltLayout, Layout, PlayerLayout};

/// Represents the authoritative Lost & Found world state.
#[derive(Debug)]
pub struct World {
    layout: Layout,
    items: Vec<Item>,
    player: PlayerBody,
    next_item_id: u32,
    tick: Tick,
    belt_speed: f32,
    player_speed_scaling: f32,
}

impl World {
    /// Creates a world using the provided layout and unit speeds.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        let player = PlayerBody::at(layout.player.start);
        Self {
            layout,
            items: Vec::new(),
            player,
            next_item_id: 0,
            tick: Tick::default(),
            belt_speed: 1.0,
            player_speed_scaling: 1.0,
        }
    }

    fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId::new(self.next_item_id);
        self.next_item_id = self.next_item_id.wrapping_add(1);
        id
    }

    fn item_index(&self, item: ItemId) -> Option<usize> {
        self.items.iter().position(|candidate| candidate.id == item)
    }

    fn advance_player(&mut self, seconds: f32) {
        let settings = self.layout.player;
        let axes = self.player.axes.clamp_length_max(1.0);
        let target = axes * settings.movement_speed * self.player_speed_scaling * seconds;
        let delta = target.lerp(self.player.previous_delta, settings.acceleration);
        self.player.position += delta;
        self.player.previous_delta = delta;

        if let Some((held, offset)) = self.player.held {
            let anchor = self.player.position + offset;
            if let Some(item) = self.items.iter_mut().find(|item| item.id == held) {
                item.position = anchor;
            }
        }
    }

    fn advance_belt(&mut self, seconds: f32) {
        let belt = self.layout.belt;
        let step = self.belt_speed * seconds;
        for item in self.items.iter_mut().filter(|item| !item.held) {
            if belt.carries(item.position) {
                item.position.x += step;
            }
        }
    }

    fn shred_arrivals(&mut self, out_events: &mut Vec<Event>) {
        let shredder_x = self.layout.shredder_x;
        self.items.retain(|item| {
            if item.held || item.position.x < shredder_x {
                return true;
            }
            out_events.push(Event::ItemShredded {
                item: item.id,
                kind: item.kind,
            });
            false
        });
    }

    fn pick_up(&mut self, out_events: &mut Vec<Event>) {
        if self.player.held.is_some() {
            return;
        }

        let origin = self.player.position;
        let reach = self.layout.player.pickup_radius;
        let nearest = self
            .items
            .iter_mut()
            .filter(|item| !item.held && item.position.distance(origin) <= reach)
            .min_by(|left, right| {
                let left_distance = left.position.distance_squared(origin);
                let right_distance = right.position.distance_squared(origin);
                left_distance
                    .total_cmp(&right_distance)
                    .then(left.id.cmp(&right.id))
            });

        if let Some(item) = nearest {
            item.held = true;
            self.player.held = Some((item.id, item.position - origin));
            out_events.push(Event::ItemPickedUp {
                item: item.id,
                kind: item.kind,
            });
        }
    }

    fn drop_held(&mut self, out_events: &mut Vec<Event>) {
        let Some((held, _)) = self.player.held.take() else {
            return;
        };
        let Some(item) = self.items.iter_mut().find(|item| item.id == held) else {
            return;
        };

        item.held = false;
        let destination = receptacle_at(&self.layout, item.position);
        out_events.push(Event::ItemDropped {
            item: item.id,
            kind: item.kind,
            destination,
        });
    }

    fn in_danger_zone(&self, item: &Item) -> bool {
        !item.held
            && self.layout.belt.carries(item.position)
            && item.position.x >= self.layout.danger_zone_start_x
            && item.position.x < self.layout.shredder_x
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl HazardProbe for World {
    fn tick(&self) -> Tick {
        self.tick
    }

    fn items_in_hazard(&self, out: &mut Vec<HazardContact>) {
        out.extend(
            self.items
                .iter()
                .filter(|item| self.in_danger_zone(item))
                .map(|item| HazardContact {
                    item: item.id,
                    kind: item.kind,
                }),
        );
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick = world.tick.next();
            out_events.push(Event::TimeAdvanced {
                tick: world.tick,
                dt,
            });

            let seconds = dt.as_secs_f32();
            world.advance_player(seconds);
            world.advance_belt(seconds);
            world.shred_arrivals(out_events);
        }
        Command::SpawnItem { kind } => {
            let id = world.allocate_item_id();
            world.items.push(Item {
                id,
                kind,
                position: world.layout.spawner,
                held: false,
            });
            out_events.push(Event::ItemSpawned { item: id, kind });
        }
        Command::SteerPlayer { input } => {
            world.player.steer(input);
            if input.pickup_pressed {
                world.pick_up(out_events);
            }
            if input.pickup_released {
                world.drop_held(out_events);
            }
        }
        Command::CollectItem { item, destination } => {
            let Some(index) = world.item_index(item) else {
                return;
            };
            if world.items[index].held {
                return;
            }
            let removed = world.items.remove(index);
            out_events.push(Event::ItemCollected {
                item: removed.id,
                kind: removed.kind,
                destination,
            });
        }
        Command::ConfigureSpeeds {
            belt_speed,
            player_speed_scaling,
        } => {
            world.belt_speed = belt_speed;
            world.player_speed_scaling = player_speed_scaling;
        }
        Command::ResetWorld => {
            world.items.clear();
            world.player = PlayerBody::at(world.layout.player.start);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use lost_and_found_core::{DestinationId, HazardContact, HazardProbe, ItemId, ItemKindId, Tick};

    use super::{Layout, World};

    /// Index of the last completed tick.
    #[must_use]
    pub fn tick(world: &World) -> Tick {
        world.tick
    }

    /// Provides read-only access to the world's geometry.
    #[must_use]
    pub fn layout(world: &World) -> &Layout {
        &world.layout
    }

    /// Captures a read-only view of every spawned item, ordered by identifier.
    #[must_use]
    pub fn item_view(world: &World) -> ItemView {
        let belt = world.layout.belt;
        let mut snapshots: Vec<ItemSnapshot> = world
            .items
            .iter()
            .map(|item| ItemSnapshot {
                id: item.id,
                kind: item.kind,
                position: item.position,
                held: item.held,
                on_belt: !item.held && belt.carries(item.position),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        ItemView { snapshots }
    }

    /// Looks up a single item.
    #[must_use]
    pub fn item(world: &World, item: ItemId) -> Option<ItemSnapshot> {
        item_view(world).iter().find(|snapshot| snapshot.id == item).copied()
    }

    /// Captures the player body's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            held: world.player.held.map(|(item, _)| item),
        }
    }

    /// Enumerates the destination receptacles in identifier order.
    #[must_use]
    pub fn destinations(world: &World) -> Vec<DestinationSnapshot> {
        world
            .layout
            .destinations
            .iter()
            .enumerate()
            .map(|(index, position)| DestinationSnapshot {
                id: DestinationId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                position: *position,
            })
            .collect()
    }

    /// Items currently overlapping the danger zone.
    #[must_use]
    pub fn danger_zone(world: &World) -> Vec<HazardContact> {
        let mut contacts = Vec::new();
        world.items_in_hazard(&mut contacts);
        contacts
    }

    /// Read-only snapshot describing all spawned items.
    #[derive(Clone, Debug, Default)]
    pub struct ItemView {
        snapshots: Vec<ItemSnapshot>,
    }

    impl ItemView {
        /// Iterator over the captured item snapshots in identifier order.
        pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
            self.snapshots.iter()
        }

        /// Number of items in the world.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the world holds no items.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<ItemSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single item.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ItemSnapshot {
        /// Identifier assigned by the world.
        pub id: ItemId,
        /// Kind of the item.
        pub kind: ItemKindId,
        /// Current position.
        pub position: Vec2,
        /// Whether the player is carrying the item.
        pub held: bool,
        /// Whether the belt is carrying the item.
        pub on_belt: bool,
    }

    /// Immutable representation of the player body.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Current position.
        pub position: Vec2,
        /// Item being carried, if any.
        pub held: Option<ItemId>,
    }

    /// Immutable representation of a destination receptacle.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct DestinationSnapshot {
        /// Identifier of the destination.
        pub id: DestinationId,
        /// Centre of the receptacle.
        pub position: Vec2,
    }
}

#[derive(Clone, Debug)]
struct Item {
    id: ItemId,
    kind: ItemKindId,
    position: Vec2,
    held: bool,
}

#[derive(Clone, Debug)]
struct PlayerBody {
    position: Vec2,
    previous_delta: Vec2,
    axes: Vec2,
    held: Option<(ItemId, Vec2)>,
}

impl PlayerBody {
    fn at(position: Vec2) -> Self {
        Self {
            position,
            previous_delta: Vec2::ZERO,
            axes: Vec2::ZERO,
            held: None,
        }
    }

    fn steer(&mut self, input: PlayerInput) {
        self.axes = Vec2::new(input.horizontal, input.vertical);
    }
}

fn receptacle_at(layout: &Layout, point: Vec2) -> Option<DestinationId> {
    layout
        .destinations
        .iter()
        .position(|centre| centre.distance(point) <= layout.destination_radius)
        .map(|index| DestinationId::new(u32::try_from(index).unwrap_or(u32::MAX)))
}
