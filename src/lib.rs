//! Monster AI for tile worlds
//!
//! This crate provides:
//! - Tile grids with cost classes and a maze carver
//! - A navigation graph and best-first search (Dijkstra and A*)
//! - Kinematic steering: Arrive, Align, VelocityMatch, Wander and FollowPath
//! - A behavior-tree decision engine that chases, wanders and guesses
//! - A headless simulation driving a monster after a wandering player

pub mod config;
pub mod decision;
pub mod graph;
pub mod grid;
pub mod search;
pub mod sim;
pub mod steering;
pub mod world;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{ConfigError, WorldConfig};
    pub use crate::decision::{Action, DecisionEngine, DecisionError, DecisionTree};
    pub use crate::graph::{Graph, GraphError};
    pub use crate::grid::{CostClass, Grid, Location, WorldFrame};
    pub use crate::search::{HeuristicKind, Path, Strategy, astar, dijkstra, search};
    pub use crate::sim::{Character, SimConfig, SimError, Simulation, TickStats};
    pub use crate::steering::{
        Align, Arrive, FollowPath, Kinematic, Steering, SteeringBehavior, SteeringOutput, Wander,
    };
    pub use crate::world::World;
    pub use glam::Vec2;
}
