//! Wander behavior

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    Align, Arrive, Kinematic, Steering, SteeringBehavior, SteeringOutput, Terrain, direction_of,
    orientation_of,
};

/// Wander behavior - arrive at a jittering point projected ahead of the agent
///
/// Each tick the wander orientation drifts by up to `rate` degrees and a
/// candidate point is placed on a circle of `radius` centred `offset` ahead
/// of the agent. Candidates outside the navigable region produce no
/// acceleration; the wanderer then turns its projection a quarter so the
/// next candidate is looked for elsewhere.
#[derive(Debug, Clone)]
pub struct Wander {
    /// Wander circle distance
    pub offset: f32,
    /// Wander circle radius
    pub radius: f32,
    /// Maximum orientation change per update, in degrees
    pub rate: f32,
    arrive: Arrive,
    align: Align,
    /// Current wander orientation, relative to the agent
    orientation: f32,
    /// Projection orientation overriding the agent's after a rejection
    turned: Option<f32>,
    candidate: Option<Vec2>,
    rng: StdRng,
}

impl Wander {
    /// Create a new wander behavior with its own seeded random source
    #[must_use]
    pub fn new(offset: f32, radius: f32, rate: f32, arrive: Arrive, align: Align, seed: u64) -> Self {
        Self {
            offset,
            radius,
            rate,
            arrive,
            align,
            orientation: 0.0,
            turned: None,
            candidate: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The last accepted candidate point
    #[must_use]
    pub fn candidate(&self) -> Option<Vec2> {
        self.candidate
    }

    // Difference of two uniforms: in (-1, 1), more likely near zero
    fn random_binomial(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0_f32) - self.rng.gen_range(0.0..1.0_f32)
    }
}

impl SteeringBehavior for Wander {
    fn calculate(&mut self, agent: &Kinematic, _target: &Kinematic, terrain: &Terrain<'_>) -> Steering {
        self.orientation += self.random_binomial() * self.rate;

        let base = self.turned.take().unwrap_or(agent.orientation);
        let target_orientation = base + self.orientation;
        let centre = agent.position + direction_of(base) * self.offset;
        let candidate = centre + direction_of(target_orientation) * self.radius;

        if !terrain.is_navigable(candidate) {
            log::trace!("Wander candidate {candidate} rejected");
            self.turned = Some(base + 90.0);
            return Steering::Coast;
        }
        self.candidate = Some(candidate);

        let facing = orientation_of(candidate - agent.position).unwrap_or(agent.orientation);
        Steering::Accelerate(SteeringOutput {
            linear: self.arrive.toward(agent, candidate),
            angular: self.align.toward(agent, facing),
        })
    }
}
