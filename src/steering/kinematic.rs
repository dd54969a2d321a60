//! Kinematic state and explicit-Euler integration

use glam::Vec2;

use super::{Steering, SteeringOutput};

/// Position, orientation and their first derivatives
///
/// Orientation is in degrees; 0 points along +x and positive angles turn
/// towards +y.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematic {
    /// World position
    pub position: Vec2,
    /// Facing, in degrees
    pub orientation: f32,
    /// Linear velocity
    pub velocity: Vec2,
    /// Angular velocity, in degrees per second
    pub rotation: f32,
}

/// Limits applied after integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionBounds {
    /// World top-left corner
    pub min: Vec2,
    /// World bottom-right corner
    pub max: Vec2,
    /// Margin kept between the agent and the world edge
    pub border: f32,
    /// Maximum linear speed
    pub max_speed: f32,
    /// Maximum angular speed, in degrees per second
    pub max_rotation: f32,
}

impl MotionBounds {
    /// Corners of the region an agent may occupy
    #[must_use]
    pub fn interior(&self) -> (Vec2, Vec2) {
        let border = Vec2::splat(self.border);
        (self.min + border, self.max - border)
    }

    /// Whether `point` lies in the bordered region
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let (low, high) = self.interior();
        point.cmpge(low).all() && point.cmple(high).all()
    }
}

impl Kinematic {
    /// A resting kinematic at `position`
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector along the current orientation
    #[must_use]
    pub fn heading(&self) -> Vec2 {
        direction_of(self.orientation)
    }

    /// Advance one step
    ///
    /// Motion uses last tick's velocities before this tick's acceleration is
    /// integrated into them.
    pub fn integrate(&mut self, steering: SteeringOutput, dt: f32) {
        self.position += self.velocity * dt;
        self.orientation += self.rotation * dt;
        self.velocity += steering.linear * dt;
        self.rotation += steering.angular * dt;
    }

    /// Clamp position into the bordered world and velocities into their limits
    pub fn clip(&mut self, bounds: &MotionBounds) {
        let (low, high) = bounds.interior();
        self.position = self.position.max(low).min(high);

        self.velocity = self.velocity.clamp_length_max(bounds.max_speed);
        self.rotation = self
            .rotation
            .max(-bounds.max_rotation)
            .min(bounds.max_rotation);
    }

    /// Zero both velocities
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
    }

    /// Apply a behavior's request, then clip
    pub fn apply(&mut self, steering: Steering, dt: f32, bounds: &MotionBounds) {
        match steering {
            Steering::Accelerate(output) => self.integrate(output, dt),
            Steering::Coast => self.integrate(SteeringOutput::ZERO, dt),
            Steering::Stop => self.stop(),
        }
        self.clip(bounds);
    }

    /// Jump straight onto `point`, facing the way it lies
    ///
    /// No velocity is carried over; the agent lands at rest.
    pub fn jump_to(&mut self, point: Vec2, bounds: &MotionBounds) {
        if let Some(orientation) = orientation_of(point - self.position) {
            self.orientation = orientation;
        }
        self.position = point;
        self.stop();
        self.clip(bounds);
    }
}

/// Unit vector for an orientation in degrees
#[must_use]
pub fn direction_of(orientation: f32) -> Vec2 {
    Vec2::from_angle(orientation.to_radians())
}

/// Orientation in degrees of a vector; `None` for the zero vector
#[must_use]
pub fn orientation_of(vector: Vec2) -> Option<f32> {
    (vector.length_squared() > f32::EPSILON).then(|| vector.y.atan2(vector.x).to_degrees())
}
