#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player input sources.
//!
//! A session is driven either by a human, whose button edges are latched by an
//! adapter, or by the scripted autopilot that plays the attract screen. Both
//! produce one [`PlayerInput`] per tick.

mod autopilot;

use glam::Vec2;
use lost_and_found_core::{DestinationId, ItemKindId, PlayerInput, SessionState};
use lost_and_found_world::{
    query::{self, ItemView, PlayerSnapshot},
    Layout, World,
};

pub use autopilot::Autopilot;

/// Which kind of source controls the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Input comes from a person through an adapter.
    Human,
    /// Input is computed from the world state.
    Scripted,
}

/// Selects who controls the player in the provided session state.
#[must_use]
pub const fn control_for(state: SessionState) -> Control {
    match state {
        SessionState::StartScreen => Control::Scripted,
        SessionState::Game | SessionState::Paused | SessionState::EndScreen => Control::Human,
    }
}

/// Destination receptacle along with the kind it currently asks for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WantedDestination {
    /// Identifier of the destination.
    pub id: DestinationId,
    /// Centre of the receptacle.
    pub position: Vec2,
    /// Kind the destination wants, if one was assigned.
    pub want: Option<ItemKindId>,
}

/// Pairs every destination in the world with its current want.
#[must_use]
pub fn wanted_destinations(
    world: &World,
    want_of: impl Fn(DestinationId) -> Option<ItemKindId>,
) -> Vec<WantedDestination> {
    query::destinations(world)
        .into_iter()
        .map(|destination| WantedDestination {
            id: destination.id,
            position: destination.position,
            want: want_of(destination.id),
        })
        .collect()
}

/// Read-only view an input source samples from.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView<'a> {
    /// Geometry of the floor.
    pub layout: &'a Layout,
    /// State of the player body.
    pub player: PlayerSnapshot,
    /// Every spawned item.
    pub items: &'a ItemView,
    /// Destinations and their wants.
    pub destinations: &'a [WantedDestination],
}

/// Latches human input between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HumanInput {
    axes: Vec2,
    pressed: bool,
    released: bool,
}

impl HumanInput {
    /// Stores the current movement axes, each clamped to `-1.0..=1.0`.
    pub fn set_axes(&mut self, horizontal: f32, vertical: f32) {
        self.axes = Vec2::new(horizontal, vertical).clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Records that the pickup button went down.
    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Records that the pickup button went up.
    pub fn release(&mut self) {
        self.released = true;
    }

    /// Returns the latched input and clears the button edges.
    pub fn take(&mut self) -> PlayerInput {
        let input = PlayerInput {
            horizontal: self.axes.x,
            vertical: self.axes.y,
            pickup_pressed: self.pressed,
            pickup_released: self.released,
        };
        self.pressed = false;
        self.released = false;
        input
    }
}

/// Source of per-tick player input.
#[derive(Clone, Debug)]
pub enum InputSource {
    /// Input latched from a person.
    Human(HumanInput),
    /// Input computed by the autopilot.
    Scripted(Autopilot),
}

impl InputSource {
    /// Creates a fresh source of the requested kind.
    #[must_use]
    pub fn new(control: Control) -> Self {
        match control {
            Control::Human => Self::Human(HumanInput::default()),
            Control::Scripted => Self::Scripted(Autopilot::default()),
        }
    }

    /// Kind of control the source provides.
    #[must_use]
    pub const fn control(&self) -> Control {
        match self {
            Self::Human(_) => Control::Human,
            Self::Scripted(_) => Control::Scripted,
        }
    }

    /// Produces the input for the current tick.
    pub fn poll(&mut self, view: &PlayerView<'_>) -> PlayerInput {
        match self {
            Self::Human(human) => human.take(),
            Self::Scripted(autopilot) => autopilot.steer(view),
        }
    }
}
