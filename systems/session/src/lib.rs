#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session bookkeeping: score, health and the screen state machine.
//!
//! The session reacts to the allocator's score and health events and to
//! adapter input. Every transition is broadcast as
//! [`Event::SessionStateChanged`] so the allocator and the spawner can reset
//! themselves at the restart boundary.

use std::sync::Arc;

use log::{debug, info};
use lost_and_found_core::{Catalog, Command, Event, ItemKindId, SessionState};

const DEFAULT_INITIAL_HEALTH: u32 = 3;

/// Configuration parameters required to construct the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    initial_health: u32,
}

impl Config {
    /// Creates a configuration starting every game with the provided health.
    #[must_use]
    pub const fn new(initial_health: u32) -> Self {
        Self { initial_health }
    }

    /// Health a new game starts with.
    #[must_use]
    pub const fn initial_health(&self) -> u32 {
        self.initial_health
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_HEALTH)
    }
}

/// Discrete input the session reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionInput {
    /// Any key went down this frame.
    AnyKey,
    /// The pause button went down this frame.
    Pause,
}

/// Score, health and lifecycle state of a play session.
#[derive(Debug)]
pub struct GameSession {
    catalog: Arc<Catalog>,
    initial_health: u32,
    state: SessionState,
    score: u32,
    health: u32,
}

impl GameSession {
    /// Creates a session on the start screen.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: Config) -> Self {
        Self {
            catalog,
            initial_health: config.initial_health,
            state: SessionState::StartScreen,
            score: 0,
            health: config.initial_health,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Current health, never below zero.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Reports whether world ticks should run in the current state.
    #[must_use]
    pub const fn is_simulating(&self) -> bool {
        matches!(self.state, SessionState::StartScreen | SessionState::Game)
    }

    /// Applies adapter input, then score and health events.
    pub fn handle(
        &mut self,
        events: &[Event],
        inputs: &[SessionInput],
        out_events: &mut Vec<Event>,
        out_commands: &mut Vec<Command>,
    ) {
        for input in inputs {
            self.apply_input(*input, out_events, out_commands);
        }

        for event in events {
            match event {
                Event::ItemFound { kind } => self.item_found(*kind, out_events),
                Event::SearchedItemShredded { kind } => self.searched_item_shredded(*kind, out_events),
                _ => {}
            }
        }
    }

    fn apply_input(
        &mut self,
        input: SessionInput,
        out_events: &mut Vec<Event>,
        out_commands: &mut Vec<Command>,
    ) {
        match (self.state, input) {
            (SessionState::StartScreen, SessionInput::AnyKey) => {
                self.reset_counters(out_events);
                self.transition(SessionState::Game, out_events);
            }
            (SessionState::Game, SessionInput::Pause) => {
                self.transition(SessionState::Paused, out_events);
            }
            (SessionState::Paused, SessionInput::Pause) => {
                self.transition(SessionState::Game, out_events);
            }
            (SessionState::EndScreen, SessionInput::AnyKey) => {
                self.reset_counters(out_events);
                out_commands.push(Command::ResetWorld);
                self.transition(SessionState::StartScreen, out_events);
            }
            _ => {}
        }
    }

    fn item_found(&mut self, kind: ItemKindId, out_events: &mut Vec<Event>) {
        let increase = self.catalog.kind(kind).map_or(0, |item| item.score_increase());
        if increase == 0 {
            debug!("found {kind:?} carries no score");
            return;
        }
        self.score = self.score.saturating_add(increase);
        out_events.push(Event::ScoreChanged { score: self.score });
    }

    fn searched_item_shredded(&mut self, kind: ItemKindId, out_events: &mut Vec<Event>) {
        let decrease = self.catalog.kind(kind).map_or(0, |item| item.health_decrease());
        if decrease > 0 && self.health > 0 {
            self.health = self.health.saturating_sub(decrease);
            out_events.push(Event::HealthChanged {
                health: self.health,
            });
        }

        if self.health > 0 {
            return;
        }
        match self.state {
            SessionState::Paused => {
                self.transition(SessionState::Game, out_events);
                self.transition(SessionState::EndScreen, out_events);
            }
            SessionState::Game => self.transition(SessionState::EndScreen, out_events),
            SessionState::StartScreen | SessionState::EndScreen => {}
        }
    }

    fn reset_counters(&mut self, out_events: &mut Vec<Event>) {
        self.score = 0;
        self.health = self.initial_health;
        out_events.push(Event::ScoreChanged { score: self.score });
        out_events.push(Event::HealthChanged {
            health: self.health,
        });
    }

    fn transition(&mut self, to: SessionState, out_events: &mut Vec<Event>) {
        let from = self.state;
        self.state = to;
        info!("session {from:?} -> {to:?} (score {}, health {})", self.score, self.health);
        out_events.push(Event::SessionStateChanged { from, to });
    }
}
