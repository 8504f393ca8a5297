#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lost & Found engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond with new command batches or follow-up events.

mod catalog;
mod difficulty;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use catalog::{Catalog, CatalogError, ItemDefinition, ItemKind, ItemPool};
pub use difficulty::{Difficulty, DifficultyEdit, DifficultyError, DifficultyField, EditReport};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the fixed-rate simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Drops a new item of the provided kind onto the conveyor belt.
    SpawnItem {
        /// Kind of item that the spawner drew from the lookahead queue.
        kind: ItemKindId,
    },
    /// Forwards the per-tick player input to the player body.
    SteerPlayer {
        /// Input sampled from the active input source.
        input: PlayerInput,
    },
    /// Removes an item that a destination accepted.
    CollectItem {
        /// Identifier of the item being collected.
        item: ItemId,
        /// Destination that accepted the item.
        destination: DestinationId,
    },
    /// Updates the speeds derived from the current difficulty.
    ConfigureSpeeds {
        /// Speed of the conveyor belt in world units per second.
        belt_speed: f32,
        /// Multiplier applied to the player's movement speed.
        player_speed_scaling: f32,
    },
    /// Clears every spawned item and returns the player to the start position.
    ResetWorld,
}

/// Events broadcast by the world and by systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the fixed-rate simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: Tick,
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an item landed on the belt.
    ItemSpawned {
        /// Identifier assigned to the new item.
        item: ItemId,
        /// Kind of the new item.
        kind: ItemKindId,
    },
    /// Reports that the player grabbed an item.
    ItemPickedUp {
        /// Identifier of the item now held by the player.
        item: ItemId,
        /// Kind of the held item.
        kind: ItemKindId,
    },
    /// Reports that the player released the held item.
    ItemDropped {
        /// Identifier of the released item.
        item: ItemId,
        /// Kind of the released item.
        kind: ItemKindId,
        /// Destination whose receptacle contains the drop point, if any.
        destination: Option<DestinationId>,
    },
    /// Confirms that a destination accepted an item and the item left the world.
    ItemCollected {
        /// Identifier of the collected item.
        item: ItemId,
        /// Kind of the collected item.
        kind: ItemKindId,
        /// Destination that accepted the item.
        destination: DestinationId,
    },
    /// Reports that an item reached the shredder and was destroyed.
    ItemShredded {
        /// Identifier of the destroyed item.
        item: ItemId,
        /// Kind of the destroyed item.
        kind: ItemKindId,
    },
    /// Score event emitted by the allocator after a successful delivery.
    ItemFound {
        /// Kind of the delivered item.
        kind: ItemKindId,
    },
    /// Health event emitted when an item some destination wanted was shredded.
    SearchedItemShredded {
        /// Kind of the shredded item.
        kind: ItemKindId,
    },
    /// Announces that a destination now wants a different item kind.
    WantAssigned {
        /// Destination whose want changed.
        destination: DestinationId,
        /// Kind the destination now asks for.
        kind: ItemKindId,
    },
    /// Announces a transition of the session state machine.
    SessionStateChanged {
        /// State before the transition.
        from: SessionState,
        /// State after the transition.
        to: SessionState,
    },
    /// Reports the score after it changed.
    ScoreChanged {
        /// Current score.
        score: u32,
    },
    /// Reports the health after it changed.
    HealthChanged {
        /// Current health, never below zero.
        health: u32,
    },
}

/// States of the session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Attract mode shown before the player presses a key.
    StartScreen,
    /// Active play controlled by the player.
    Game,
    /// Simulation halted until the pause button is pressed again.
    Paused,
    /// Game over screen shown after health ran out.
    EndScreen,
}

/// Per-tick control contract shared by human and scripted input sources.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Horizontal movement axis in `-1.0..=1.0`.
    pub horizontal: f32,
    /// Vertical movement axis in `-1.0..=1.0`.
    pub vertical: f32,
    /// Set on the tick the pickup button went down.
    pub pickup_pressed: bool,
    /// Set on the tick the pickup button went up.
    pub pickup_released: bool,
}

impl PlayerInput {
    /// Input that neither moves nor interacts.
    pub const IDLE: Self = Self {
        horizontal: 0.0,
        vertical: 0.0,
        pickup_pressed: false,
        pickup_released: false,
    };
}

/// Index of a fixed-rate simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(u64);

impl Tick {
    /// Creates a tick from its numeric index.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric index of the tick.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the tick that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Identifier of an item kind within a [`Catalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKindId(u32);

impl ItemKindId {
    /// Creates a new item kind identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawned item by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a destination receptacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(u32);

impl DestinationId {
    /// Creates a new destination identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Spawned item found overlapping the danger zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HazardContact {
    /// Identifier of the endangered item.
    pub item: ItemId,
    /// Kind of the endangered item.
    pub kind: ItemKindId,
}

/// Spatial query against the world's danger zone.
///
/// Implementors answer which spawned items currently overlap the hazard.
/// Consumers may cache answers per [`Tick`], so the result must only change
/// when the tick advances.
pub trait HazardProbe {
    /// Tick the probe's answers are valid for.
    fn tick(&self) -> Tick;

    /// Appends every item currently overlapping the hazard to `out`.
    fn items_in_hazard(&self, out: &mut Vec<HazardContact>);
}

/// Source of the next item kind to drop onto the belt.
pub trait ItemSource {
    /// Consumes and returns the next item kind to spawn.
    fn next_spawn_item(&mut self) -> ItemKindId;
}
