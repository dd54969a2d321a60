//! Steering behaviors and kinematic integration
//!
//! Behaviors are independent value types that turn an (agent, target) pair
//! into a bounded acceleration. Complex behaviors reuse simpler ones by
//! holding them and combining their outputs, never by inheritance.

mod basic;
mod follow_path;
mod kinematic;
mod wander;

use glam::Vec2;

use crate::grid::{Grid, Location, WorldFrame};

pub use basic::{Align, Arrive, VelocityMatch, normalize_angle};
pub use follow_path::FollowPath;
pub use kinematic::{Kinematic, MotionBounds, direction_of, orientation_of};
pub use wander::Wander;

/// Linear and angular acceleration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Linear acceleration
    pub linear: Vec2,
    /// Angular acceleration (degrees per second squared)
    pub angular: f32,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Combine with another steering output
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}

/// What a behavior asks the agent to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// Integrate this acceleration
    Accelerate(SteeringOutput),
    /// No acceleration this tick; keep moving on current velocity
    Coast,
    /// Come to rest: zero both velocities
    Stop,
}

/// The navigable region behaviors may steer into
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    /// Grid whose member cells are navigable
    pub grid: &'a Grid,
    /// Position <-> location mapping for the grid
    pub frame: &'a WorldFrame,
}

impl<'a> Terrain<'a> {
    /// Bundle a grid with its frame
    #[must_use]
    pub fn new(grid: &'a Grid, frame: &'a WorldFrame) -> Self {
        Self { grid, frame }
    }

    /// The member cell containing `position`, if any
    #[must_use]
    pub fn navigable_location(&self, position: Vec2) -> Option<Location> {
        self.frame
            .location_of(position)
            .filter(|&location| self.grid.contains(location) && self.grid.is_member(location))
    }

    /// Whether `position` lies inside a member cell
    #[must_use]
    pub fn is_navigable(&self, position: Vec2) -> bool {
        self.navigable_location(position).is_some()
    }
}

/// A steering behavior
pub trait SteeringBehavior {
    /// Compute this tick's steering for `agent` relative to `target`
    fn calculate(&mut self, agent: &Kinematic, target: &Kinematic, terrain: &Terrain<'_>) -> Steering;
}
