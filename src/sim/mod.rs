//! Headless driver: one monster hunting one wandering player

mod character;
mod stats;

pub use character::Character;
pub use stats::TickStats;

use std::fmt;

use crate::config::{ConfigError, WorldConfig};
use crate::decision::{Action, DecisionEngine, DecisionError};
use crate::graph::GraphError;
use crate::steering::Kinematic;
use crate::world::World;

/// Run parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Frames to advance in [`Simulation::run`]
    pub ticks: u64,
    /// Seconds per frame
    pub dt: f32,
    /// Seed for the player's destination picks
    pub player_seed: u64,
    /// Log a stats line every this many frames (0 to disable)
    pub report_every: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks: 3600,
            dt: 1.0 / 60.0,
            player_seed: 99,
            report_every: 600,
        }
    }
}

impl SimConfig {
    /// Set the number of frames
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Set the frame length in seconds
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Set the player's seed
    pub fn with_player_seed(mut self, seed: u64) -> Self {
        self.player_seed = seed;
        self
    }

    /// Set the stats reporting interval
    pub fn with_report_every(mut self, ticks: u64) -> Self {
        self.report_every = ticks;
        self
    }
}

/// Errors that stop a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Configuration could not be used
    Config(ConfigError),
    /// The monster's decision tick failed
    Decision(DecisionError),
    /// The player's route planning failed
    Graph(GraphError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Config error: {e}"),
            Self::Decision(e) => write!(f, "Decision error: {e}"),
            Self::Graph(e) => write!(f, "Graph error: {e}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<DecisionError> for SimError {
    fn from(e: DecisionError) -> Self {
        Self::Decision(e)
    }
}

impl From<GraphError> for SimError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

/// A monster and a player sharing one world
pub struct Simulation {
    world: World,
    config: WorldConfig,
    sim: SimConfig,
    monster: Kinematic,
    engine: DecisionEngine,
    player: Character,
    stats: TickStats,
}

impl Simulation {
    /// Generate a world from `config` and place both agents in it
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the config fails validation
    pub fn new(config: &WorldConfig, sim: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let world = World::generate(config);
        Self::with_world(world, config, sim)
    }

    /// Place both agents in an existing world
    ///
    /// The monster starts on the first navigable cell in row-major order and
    /// the player on the last.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the world has no navigable cell
    pub fn with_world(world: World, config: &WorldConfig, sim: SimConfig) -> Result<Self, SimError> {
        let grid = world.grid();
        let mut members = grid.locations().filter(|&location| grid.is_member(location));
        let Some(first) = members.next() else {
            return Err(ConfigError::Invalid("world has no navigable cell".into()).into());
        };
        let last = members.last().unwrap_or(first);

        let monster = Kinematic::at(world.frame().center_of(first));
        let player = Character::new(world.frame().center_of(last), sim.player_seed);
        log::info!("Monster starts at {first}, player at {last}");

        Ok(Self {
            engine: DecisionEngine::new(config),
            config: config.clone(),
            world,
            sim,
            monster,
            player,
            stats: TickStats::default(),
        })
    }

    /// Advance one frame
    ///
    /// # Errors
    ///
    /// Returns the first decision or planning failure
    pub fn step(&mut self, dt: f32) -> Result<Action, SimError> {
        let plans = self.engine.plans();
        self.player.update(&self.world, &self.config, dt)?;
        let action = self
            .engine
            .tick(&mut self.monster, self.player.kinematic(), &self.world, dt)?;

        if self.engine.plans() > plans {
            let explored = self.engine.path().map_or(0, |path| path.explored());
            self.stats.record_plan(explored);
        }
        self.stats.record_tick(action);
        log::trace!(
            "Tick {}: {action}, monster at {}",
            self.stats.total_ticks(),
            self.monster.position
        );
        Ok(action)
    }

    /// Advance the configured number of frames
    ///
    /// # Errors
    ///
    /// Returns the first decision or planning failure
    pub fn run(&mut self) -> Result<&TickStats, SimError> {
        for _ in 0..self.sim.ticks {
            self.step(self.sim.dt)?;
            let ticks = self.stats.total_ticks();
            if self.sim.report_every > 0 && ticks % self.sim.report_every == 0 {
                log::info!("{}", self.stats.format_stats());
            }
        }
        Ok(&self.stats)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn monster(&self) -> &Kinematic {
        &self.monster
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}
