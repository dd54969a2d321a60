//! Arrive, Align and VelocityMatch

use glam::Vec2;

use super::{Kinematic, Steering, SteeringBehavior, SteeringOutput, Terrain};

/// Normalize an angle in degrees into (-180, 180]
#[must_use]
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Arrive behavior - move towards target and slow down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrive {
    /// Maximum acceleration
    pub max_acceleration: f32,
    /// Maximum speed
    pub max_speed: f32,
    /// Slowing distance
    pub slow_radius: f32,
    /// Stopping distance
    pub arrival_radius: f32,
    /// Time over which to reach the desired speed
    pub time_to_target: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(max_acceleration: f32, max_speed: f32) -> Self {
        Self {
            max_acceleration,
            max_speed,
            slow_radius: 5.0,
            arrival_radius: 0.5,
            time_to_target: 0.1,
        }
    }

    /// Set the stopping and slowing distances
    #[must_use]
    pub fn with_radii(mut self, arrival_radius: f32, slow_radius: f32) -> Self {
        self.arrival_radius = arrival_radius;
        self.slow_radius = slow_radius;
        self
    }

    /// Set the time over which the desired speed is reached
    #[must_use]
    pub fn with_time_to_target(mut self, time_to_target: f32) -> Self {
        self.time_to_target = time_to_target;
        self
    }

    /// Acceleration that brings `agent` to rest at `target`
    #[must_use]
    pub fn toward(&self, agent: &Kinematic, target: Vec2) -> Vec2 {
        let to_target = target - agent.position;
        let distance = to_target.length();

        let target_speed = if distance < self.arrival_radius {
            0.0
        } else if distance > self.slow_radius {
            self.max_speed
        } else {
            self.max_speed * distance / self.slow_radius
        };

        let desired = to_target.normalize_or_zero() * target_speed;
        ((desired - agent.velocity) / self.time_to_target).clamp_length_max(self.max_acceleration)
    }
}

impl SteeringBehavior for Arrive {
    fn calculate(&mut self, agent: &Kinematic, target: &Kinematic, _terrain: &Terrain<'_>) -> Steering {
        Steering::Accelerate(SteeringOutput {
            linear: self.toward(agent, target.position),
            angular: 0.0,
        })
    }
}

/// Align behavior - turn to match a target orientation and slow the turn down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Align {
    /// Maximum angular acceleration
    pub max_angular_acceleration: f32,
    /// Maximum rotation speed
    pub max_rotation: f32,
    /// Angle inside which the agent stops turning
    pub arrival_angle: f32,
    /// Angle inside which the turn slows down
    pub slow_angle: f32,
    /// Time over which to reach the desired rotation
    pub time_to_target: f32,
}

impl Align {
    /// Create a new align behavior
    #[must_use]
    pub fn new(max_angular_acceleration: f32, max_rotation: f32) -> Self {
        Self {
            max_angular_acceleration,
            max_rotation,
            arrival_angle: 1.0,
            slow_angle: 30.0,
            time_to_target: 0.1,
        }
    }

    /// Set the stopping and slowing angles
    #[must_use]
    pub fn with_angles(mut self, arrival_angle: f32, slow_angle: f32) -> Self {
        self.arrival_angle = arrival_angle;
        self.slow_angle = slow_angle;
        self
    }

    /// Set the time over which the desired rotation is reached
    #[must_use]
    pub fn with_time_to_target(mut self, time_to_target: f32) -> Self {
        self.time_to_target = time_to_target;
        self
    }

    /// Angular acceleration that brings `agent` to rest facing `orientation`
    #[must_use]
    pub fn toward(&self, agent: &Kinematic, orientation: f32) -> f32 {
        let difference = normalize_angle(orientation - agent.orientation);
        let size = difference.abs();

        let target_speed = if size < self.arrival_angle {
            0.0
        } else if size > self.slow_angle {
            self.max_rotation
        } else {
            self.max_rotation * size / self.slow_angle
        };
        let target_rotation = target_speed * difference.signum();

        let angular = (target_rotation - agent.rotation) / self.time_to_target;
        angular
            .max(-self.max_angular_acceleration)
            .min(self.max_angular_acceleration)
    }
}

impl SteeringBehavior for Align {
    fn calculate(&mut self, agent: &Kinematic, target: &Kinematic, _terrain: &Terrain<'_>) -> Steering {
        Steering::Accelerate(SteeringOutput {
            linear: Vec2::ZERO,
            angular: self.toward(agent, target.orientation),
        })
    }
}

/// VelocityMatch behavior - match the target's linear velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityMatch {
    /// Maximum acceleration
    pub max_acceleration: f32,
    /// Time over which to close the velocity gap
    pub time_to_target: f32,
}

impl VelocityMatch {
    /// Create a new velocity-match behavior
    #[must_use]
    pub fn new(max_acceleration: f32, time_to_target: f32) -> Self {
        Self {
            max_acceleration,
            time_to_target,
        }
    }
}

impl SteeringBehavior for VelocityMatch {
    fn calculate(&mut self, agent: &Kinematic, target: &Kinematic, _terrain: &Terrain<'_>) -> Steering {
        let linear = ((target.velocity - agent.velocity) / self.time_to_target)
            .clamp_length_max(self.max_acceleration);
        Steering::Accelerate(SteeringOutput {
            linear,
            angular: 0.0,
        })
    }
}
