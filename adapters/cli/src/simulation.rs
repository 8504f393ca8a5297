//! Headless wiring of the world and the systems.

use std::{collections::BTreeSet, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use log::{debug, info};
use lost_and_found_core::{
    Catalog, Command, Difficulty, DifficultyEdit, EditReport, Event, ItemId, SessionState,
};
use lost_and_found_system_allocator::{self as allocator, ItemAllocator};
use lost_and_found_system_player::{
    control_for, wanted_destinations, Control, InputSource, PlayerView,
};
use lost_and_found_system_session::{self as session, GameSession, SessionInput};
use lost_and_found_system_spawning::{self as spawning, Spawning};
use lost_and_found_world::{self as world, query, Layout, World};

/// Mixed into the seed so the spawner does not mirror the allocator's draws.
const SPAWNING_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Parameters of a headless simulation.
#[derive(Clone, Debug)]
pub(crate) struct SimulationConfig {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) difficulty: Difficulty,
    pub(crate) layout: Layout,
    pub(crate) initial_health: u32,
    pub(crate) seed: u64,
    pub(crate) autopilot: bool,
}

/// Counters gathered while the simulation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) ticks: u64,
    pub(crate) spawned: u32,
    pub(crate) delivered: u32,
    pub(crate) shredded: u32,
    pub(crate) lost_wants: u32,
    pub(crate) danger_alerts: u32,
}

/// Final state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) state: SessionState,
    pub(crate) score: u32,
    pub(crate) health: u32,
    pub(crate) tally: Tally,
}

/// World plus every system, stepped one fixed tick at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    allocator: ItemAllocator,
    spawning: Spawning,
    session: GameSession,
    input: InputSource,
    difficulty: Difficulty,
    autopilot: bool,
    endangered: BTreeSet<ItemId>,
    tally: Tally,
}

impl Simulation {
    /// Builds the systems and registers every destination with the allocator.
    pub(crate) fn new(config: SimulationConfig) -> Result<Self> {
        let allocator = ItemAllocator::new(
            Arc::clone(&config.catalog),
            config.difficulty,
            allocator::Config::new(config.seed),
        )
        .context("failed to create item allocator")?;

        let mut simulation = Self {
            world: World::new(config.layout),
            allocator,
            spawning: Spawning::new(spawning::Config::new(config.seed ^ SPAWNING_SEED_SALT)),
            session: GameSession::new(config.catalog, session::Config::new(config.initial_health)),
            input: InputSource::new(Control::Scripted),
            difficulty: config.difficulty,
            autopilot: config.autopilot,
            endangered: BTreeSet::new(),
            tally: Tally::default(),
        };

        let mut events = Vec::new();
        for destination in query::destinations(&simulation.world) {
            simulation
                .allocator
                .register_destination(destination.id, &simulation.world, &mut events);
        }
        simulation.dispatch(vec![speeds(&config.difficulty)], events);
        simulation.update_control();
        Ok(simulation)
    }

    /// Current session state.
    pub(crate) fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Edits the difficulty of the running session.
    ///
    /// Rejected fields keep their previous value. The accepted parameters
    /// reach the allocator, the spawner and the world together.
    pub(crate) fn apply_edit(&mut self, edit: &DifficultyEdit) -> Result<EditReport> {
        let mut difficulty = self.difficulty;
        let report = difficulty.apply_edit(edit);
        if !report.applied().is_empty() {
            self.set_difficulty(difficulty)?;
        }
        Ok(report)
    }

    /// Replaces the difficulty of every system.
    pub(crate) fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        self.allocator
            .set_difficulty(difficulty)
            .context("difficulty rejected by the item allocator")?;
        self.difficulty = difficulty;
        self.dispatch(vec![speeds(&difficulty)], Vec::new());
        Ok(())
    }

    /// Feeds adapter input to the session, then advances the world by `dt`
    /// when the session is simulating.
    pub(crate) fn step(&mut self, inputs: &[SessionInput], dt: Duration) {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        self.session.handle(&[], inputs, &mut events, &mut commands);
        self.dispatch(commands, events);
        self.update_control();

        if !self.session.is_simulating() {
            return;
        }

        let items = query::item_view(&self.world);
        let destinations =
            wanted_destinations(&self.world, |id| self.allocator.destinations().want_of(id));
        let input = self.input.poll(&PlayerView {
            layout: query::layout(&self.world),
            player: query::player(&self.world),
            items: &items,
            destinations: &destinations,
        });

        self.tally.ticks += 1;
        self.dispatch(
            vec![Command::SteerPlayer { input }, Command::Tick { dt }],
            Vec::new(),
        );
        self.track_endangered_wants();
        self.update_control();
    }

    /// Summarises the run so far.
    pub(crate) fn summary(&self) -> RunSummary {
        RunSummary {
            state: self.session.state(),
            score: self.session.score(),
            health: self.session.health(),
            tally: self.tally,
        }
    }

    fn dispatch(&mut self, mut commands: Vec<Command>, mut events: Vec<Event>) {
        loop {
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.is_empty() {
                break;
            }

            let mut follow_up = Vec::new();
            self.allocator
                .handle(&events, &self.world, &mut follow_up, &mut commands);
            self.spawning.handle(
                &events,
                self.session.state(),
                &self.difficulty,
                &mut self.allocator,
                &mut commands,
            );
            self.session
                .handle(&events, &[], &mut follow_up, &mut commands);
            for event in &events {
                self.observe(event);
            }
            events = follow_up;
        }
    }

    fn track_endangered_wants(&mut self) {
        let items = query::item_view(&self.world);
        let mut endangered = BTreeSet::new();
        for item in items.iter() {
            if self
                .allocator
                .is_endangered_want(item.id, item.kind, &self.world)
            {
                if !self.endangered.contains(&item.id) {
                    self.tally.danger_alerts += 1;
                    info!("wanted {:?} is heading into the shredder", item.kind);
                }
                let _ = endangered.insert(item.id);
            }
        }
        self.endangered = endangered;
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::ItemSpawned { .. } => self.tally.spawned += 1,
            Event::ItemCollected { .. } => self.tally.delivered += 1,
            Event::ItemShredded { .. } => self.tally.shredded += 1,
            Event::SearchedItemShredded { kind } => {
                self.tally.lost_wants += 1;
                debug!("wanted {kind:?} reached the shredder");
            }
            Event::SessionStateChanged {
                from: SessionState::EndScreen,
                to: SessionState::StartScreen,
            } => {
                self.spawning.reset();
            }
            Event::ScoreChanged { score } => debug!("score {score}"),
            Event::HealthChanged { health } => debug!("health {health}"),
            _ => {}
        }
    }

    fn update_control(&mut self) {
        let control = if self.autopilot {
            Control::Scripted
        } else {
            control_for(self.session.state())
        };
        if self.input.control() != control {
            info!("player control switched to {control:?}");
            self.input = InputSource::new(control);
        }
    }
}

fn speeds(difficulty: &Difficulty) -> Command {
    Command::ConfigureSpeeds {
        belt_speed: difficulty.scaled_belt_speed(),
        player_speed_scaling: difficulty.player_speed_scaling(),
    }
}
