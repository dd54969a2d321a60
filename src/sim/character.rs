//! The player stand-in the monster hunts

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WorldConfig;
use crate::graph::GraphError;
use crate::grid::Location;
use crate::search::{HeuristicKind, Path, Strategy, search};
use crate::steering::{FollowPath, Kinematic, Steering, SteeringBehavior};
use crate::world::World;

/// A walker that keeps clicking on random destinations
///
/// Each destination is reached along a Manhattan A* route; once there, the
/// next update picks a new one.
#[derive(Debug, Clone)]
pub struct Character {
    kinematic: Kinematic,
    follow: Option<FollowPath>,
    destination: Option<Location>,
    rng: StdRng,
}

impl Character {
    /// Random picks tried per update before giving up until the next one
    const CLICK_ATTEMPTS: usize = 16;

    /// Create a character standing at `position`
    pub fn new(position: Vec2, seed: u64) -> Self {
        Self {
            kinematic: Kinematic::at(position),
            follow: None,
            destination: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kinematic(&self) -> &Kinematic {
        &self.kinematic
    }

    /// Where the character is heading, if anywhere
    pub fn destination(&self) -> Option<Location> {
        self.destination
    }

    /// Route being walked, if any
    pub fn path(&self) -> Option<&Path> {
        self.follow.as_ref().map(FollowPath::path)
    }

    /// Plan a walk to `destination`
    ///
    /// Returns false, leaving the current walk alone, when the character is
    /// off the navigable region or no route exists.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::LocationNotFound`] if `destination` is not a member cell
    pub fn travel_to(
        &mut self,
        destination: Location,
        world: &World,
        config: &WorldConfig,
    ) -> Result<bool, GraphError> {
        let Some(here) = world.navigable_location(self.kinematic.position) else {
            return Ok(false);
        };
        let path = search(
            world.graph(),
            here,
            destination,
            Strategy::AStar(HeuristicKind::Manhattan),
        )?;
        if path.is_empty() {
            return Ok(false);
        }

        log::debug!("Player heading from {here} to {destination}");
        self.follow = Some(
            FollowPath::new(path, config.arrive(), config.align())
                .with_lookahead(config.follow.path_offset, config.follow.prediction_time)
                .with_terminal_nudge(config.follow.terminal_nudge),
        );
        self.destination = Some(destination);
        Ok(true)
    }

    /// Walk for one frame, choosing a new destination when idle
    ///
    /// # Errors
    ///
    /// Propagates graph lookup failures from route planning
    pub fn update(&mut self, world: &World, config: &WorldConfig, dt: f32) -> Result<(), GraphError> {
        if self.follow.is_none() {
            self.click(world, config)?;
        }

        let bounds = config.motion_bounds(world.frame());
        let Some(follow) = &mut self.follow else {
            self.kinematic.stop();
            return Ok(());
        };
        let steering = follow.calculate(&self.kinematic, &self.kinematic, &world.terrain());
        self.kinematic.apply(steering, dt, &bounds);

        if steering == Steering::Stop {
            if let Some(destination) = self.destination.take() {
                log::debug!("Player arrived at {destination}");
            }
            self.follow = None;
        }
        Ok(())
    }

    fn click(&mut self, world: &World, config: &WorldConfig) -> Result<(), GraphError> {
        let grid = world.grid();
        for _ in 0..Self::CLICK_ATTEMPTS {
            let location = Location::new(
                self.rng.gen_range(0..grid.rows()),
                self.rng.gen_range(0..grid.cols()),
            );
            if grid.is_member(location) && self.travel_to(location, world, config)? {
                return Ok(());
            }
        }
        log::trace!("Player found nowhere to go");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_walks_to_destination() {
        let config = WorldConfig::default();
        let world = World::new(Grid::open(3, 6), config.grid.cell_size);
        let start = world.frame().center_of(Location::new(0, 0));
        let mut character = Character::new(start, 5);

        assert_eq!(character.travel_to(Location::new(0, 4), &world, &config), Ok(true));
        assert_eq!(character.path().unwrap().len(), 5);

        let mut arrived = false;
        for _ in 0..2000 {
            character.update(&world, &config, 1.0 / 60.0).unwrap();
            if character.path().is_none() {
                arrived = true;
                break;
            }
        }

        assert!(arrived);
        assert_eq!(character.destination(), None);
        let goal = world.frame().center_of(Location::new(0, 4));
        assert!(character.kinematic().position.distance(goal) <= 4.5);
    }

    #[test]
    fn test_idle_character_picks_destination() {
        let config = WorldConfig::default();
        let world = World::new(Grid::open(5, 5), config.grid.cell_size);
        let mut character = Character::new(world.frame().center_of(Location::new(2, 2)), 11);

        character.update(&world, &config, 1.0 / 60.0).unwrap();
        // Picking its own cell completes at once, so keep going until it walks
        for _ in 0..10 {
            if character.destination().is_some() {
                break;
            }
            character.update(&world, &config, 1.0 / 60.0).unwrap();
        }
        assert!(character.destination().is_some());
    }

    #[test]
    fn test_unreachable_destination_is_refused() {
        let config = WorldConfig::default();
        let grid = Grid::from_layout("..#..").unwrap();
        let world = World::new(grid, config.grid.cell_size);
        let mut character = Character::new(world.frame().center_of(Location::new(0, 0)), 1);

        assert_eq!(character.travel_to(Location::new(0, 4), &world, &config), Ok(false));
        assert!(character.path().is_none());
        assert_eq!(
            character.travel_to(Location::new(0, 2), &world, &config),
            Err(GraphError::LocationNotFound(Location::new(0, 2)))
        );
    }
}
