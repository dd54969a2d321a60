//! FollowPath behavior

use glam::Vec2;

use super::{Align, Arrive, Kinematic, Steering, SteeringBehavior, SteeringOutput, Terrain, orientation_of};
use crate::search::Path;

/// FollowPath behavior - track a precomputed route with a lookahead
///
/// The agent's position is projected `prediction_time` ahead, matched to
/// the nearest path record at or after the cursor, and the agent arrives at
/// the record `path_offset` further on. Near the end the goal is the
/// terminal cell itself, shifted by `terminal_nudge` along the last step.
/// Once the cursor sits on the terminal record and the agent is within the
/// arrival radius of it the behavior answers [`Steering::Stop`].
#[derive(Debug, Clone)]
pub struct FollowPath {
    path: Path,
    cursor: usize,
    /// Records to look ahead of the nearest one
    pub path_offset: usize,
    /// Seconds of current velocity to project ahead
    pub prediction_time: f32,
    /// Distance the terminal target is pushed along the final step
    pub terminal_nudge: f32,
    arrive: Arrive,
    align: Align,
}

impl FollowPath {
    /// Follow `path` from its first record
    #[must_use]
    pub fn new(path: Path, arrive: Arrive, align: Align) -> Self {
        Self {
            path,
            cursor: 0,
            path_offset: 1,
            prediction_time: 0.1,
            terminal_nudge: 0.0,
            arrive,
            align,
        }
    }

    /// Set lookahead parameters
    #[must_use]
    pub fn with_lookahead(mut self, path_offset: usize, prediction_time: f32) -> Self {
        self.path_offset = path_offset;
        self.prediction_time = prediction_time;
        self
    }

    /// Set the terminal nudge distance
    #[must_use]
    pub fn with_terminal_nudge(mut self, terminal_nudge: f32) -> Self {
        self.terminal_nudge = terminal_nudge;
        self
    }

    /// The route being followed
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the record the agent was last matched to
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// World point the agent should come to rest on
    #[must_use]
    pub fn terminal_point(&self, terrain: &Terrain<'_>) -> Option<Vec2> {
        let last = self.path.last()?;
        let centre = terrain.frame.center_of(last.location);
        let approach = self
            .path
            .len()
            .checked_sub(2)
            .and_then(|index| self.path.get(index))
            .map_or(Vec2::ZERO, |previous| {
                (centre - terrain.frame.center_of(previous.location)).normalize_or_zero()
            });
        Some(centre + approach * self.terminal_nudge)
    }
}

impl SteeringBehavior for FollowPath {
    fn calculate(&mut self, agent: &Kinematic, _target: &Kinematic, terrain: &Terrain<'_>) -> Steering {
        let Some(terminal) = self.terminal_point(terrain) else {
            return Steering::Stop;
        };
        let last = self.path.len() - 1;

        let future = agent.position + agent.velocity * self.prediction_time;
        self.cursor = self
            .path
            .nearest_index(future, terrain.frame, self.cursor)
            .unwrap_or(last);

        let target_index = self.cursor + self.path_offset;
        let target = if target_index >= last {
            // Past the end of the route: stop once on the terminal cell
            if target_index > last
                && self.cursor == last
                && agent.position.distance(terminal) <= self.arrive.arrival_radius
            {
                return Steering::Stop;
            }
            terminal
        } else {
            match self.path.get(target_index) {
                Some(node) => terrain.frame.center_of(node.location),
                None => terminal,
            }
        };

        let facing = orientation_of(target - agent.position).unwrap_or(agent.orientation);
        Steering::Accelerate(SteeringOutput {
            linear: self.arrive.toward(agent, target),
            angular: self.align.toward(agent, facing),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::grid::{Grid, Location, WorldFrame};
    use crate::search::dijkstra;

    struct Fixture {
        grid: Grid,
        frame: WorldFrame,
        graph: Graph,
    }

    impl Fixture {
        fn new(rows: usize, cols: usize) -> Self {
            let grid = Grid::open(rows, cols);
            let frame = WorldFrame::new(&grid, 10.0);
            let graph = Graph::build(&grid);
            Self { grid, frame, graph }
        }

        fn follower(&self, from: Location, to: Location) -> FollowPath {
            let path = dijkstra(&self.graph, from, to).unwrap();
            let arrive = Arrive::new(200.0, 20.0).with_radii(0.5, 5.0);
            let align = Align::new(720.0, 360.0);
            FollowPath::new(path, arrive, align)
        }
    }

    #[test]
    fn test_empty_path_stops() {
        let fixture = Fixture::new(2, 2);
        let terrain = Terrain::new(&fixture.grid, &fixture.frame);
        let arrive = Arrive::new(1.0, 1.0);
        let mut follow = FollowPath::new(Path::default(), arrive, Align::new(1.0, 1.0));
        let agent = Kinematic::at(Vec2::new(5.0, 5.0));

        assert_eq!(follow.calculate(&agent, &agent, &terrain), Steering::Stop);
    }

    #[test]
    fn test_heads_for_the_next_record() {
        let fixture = Fixture::new(1, 5);
        let terrain = Terrain::new(&fixture.grid, &fixture.frame);
        let mut follow = fixture.follower(Location::new(0, 0), Location::new(0, 4));
        let agent = Kinematic::at(Vec2::new(5.0, 5.0));

        match follow.calculate(&agent, &agent, &terrain) {
            Steering::Accelerate(output) => {
                assert!(output.linear.x > 0.0);
                assert!(output.linear.y.abs() < 1e-4);
            }
            other => panic!("expected acceleration, got {other:?}"),
        }
        assert_eq!(follow.cursor(), 0);
    }

    #[test]
    fn test_terminal_nudge_follows_approach() {
        let fixture = Fixture::new(3, 3);
        let terrain = Terrain::new(&fixture.grid, &fixture.frame);
        let follow = fixture
            .follower(Location::new(0, 1), Location::new(2, 1))
            .with_terminal_nudge(2.0);

        assert_eq!(follow.terminal_point(&terrain), Some(Vec2::new(15.0, 27.0)));
    }

    #[test]
    fn test_reaches_and_stops_on_terminal() {
        let fixture = Fixture::new(1, 6);
        let terrain = Terrain::new(&fixture.grid, &fixture.frame);
        let mut follow = fixture.follower(Location::new(0, 0), Location::new(0, 5));
        let mut agent = Kinematic::at(Vec2::new(5.0, 5.0));
        let bounds = crate::steering::MotionBounds {
            min: fixture.frame.world_min(),
            max: fixture.frame.world_max(),
            border: 0.0,
            max_speed: 20.0,
            max_rotation: 360.0,
        };

        let mut stopped = false;
        for _ in 0..2000 {
            let steering = follow.calculate(&agent, &agent, &terrain);
            agent.apply(steering, 1.0 / 60.0, &bounds);
            if steering == Steering::Stop {
                stopped = true;
                break;
            }
        }

        assert!(stopped);
        assert_eq!(follow.cursor(), 5);
        assert!(agent.position.distance(Vec2::new(55.0, 5.0)) <= 0.5);
        assert_eq!(agent.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_single_record_path() {
        let fixture = Fixture::new(2, 2);
        let terrain = Terrain::new(&fixture.grid, &fixture.frame);
        let node = fixture.graph.quantize(Location::new(1, 1)).unwrap();
        let arrive = Arrive::new(100.0, 10.0).with_radii(1.0, 5.0);
        let mut follow = FollowPath::new(Path::trivial(node), arrive, Align::new(1.0, 1.0));

        let resting = Kinematic::at(Vec2::new(15.0, 15.0));
        assert_eq!(follow.calculate(&resting, &resting, &terrain), Steering::Stop);

        let mut away = FollowPath::new(Path::trivial(node), arrive, Align::new(1.0, 1.0));
        let elsewhere = Kinematic::at(Vec2::new(5.0, 5.0));
        assert!(matches!(
            away.calculate(&elsewhere, &elsewhere, &terrain),
            Steering::Accelerate(_)
        ));
    }
}
