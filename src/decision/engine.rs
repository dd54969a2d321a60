//! Per-agent decision state and the per-tick setup protocol

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::{Action, ActionSet, Blackboard, DecisionError, DecisionTree};
use crate::config::WorldConfig;
use crate::grid::Location;
use crate::search::{Path, Strategy, search};
use crate::steering::{FollowPath, Kinematic, MotionBounds, SteeringBehavior, Wander};
use crate::world::World;

/// Iterations spent in the current bout of each action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub chasing: u32,
    pub wandering: u32,
    pub guessing: u32,
}

impl Counters {
    /// Counter for `action`; always 0 for `Nothing`
    #[must_use]
    pub fn get(&self, action: Action) -> u32 {
        match action {
            Action::Chasing => self.chasing,
            Action::Wandering => self.wandering,
            Action::Guessing => self.guessing,
            Action::Nothing => 0,
        }
    }

    fn slot(&mut self, action: Action) -> Option<&mut u32> {
        match action {
            Action::Chasing => Some(&mut self.chasing),
            Action::Wandering => Some(&mut self.wandering),
            Action::Guessing => Some(&mut self.guessing),
            Action::Nothing => None,
        }
    }

    fn increment(&mut self, action: Action) {
        if let Some(count) = self.slot(action) {
            *count += 1;
        }
    }

    fn reset(&mut self, action: Action) {
        if let Some(count) = self.slot(action) {
            *count = 0;
        }
    }
}

/// Remaining ticks of each pause window; 0 when inactive
///
/// The chase entry is the cooldown during which chasing is refused.
#[derive(Debug, Clone, Copy, Default)]
struct Pauses {
    chase: u32,
    wander: u32,
    guess: u32,
}

impl Pauses {
    fn slot(&mut self, action: Action) -> Option<&mut u32> {
        match action {
            Action::Chasing => Some(&mut self.chase),
            Action::Wandering => Some(&mut self.wander),
            Action::Guessing => Some(&mut self.guess),
            Action::Nothing => None,
        }
    }

    fn get(&self, action: Action) -> u32 {
        match action {
            Action::Chasing => self.chase,
            Action::Wandering => self.wander,
            Action::Guessing => self.guess,
            Action::Nothing => 0,
        }
    }
}

/// Decision state of one agent
///
/// Each [`tick`](Self::tick) evaluates the tree, vets a chase (cooldown,
/// iteration cap and route planning), cleans up after a change of action,
/// prepares the chosen action and finally moves the agent.
///
/// A refused chase vetoes `Chasing` and the tree is asked again, so the tree
/// must answer something else once chasing is vetoed; a tree that offers a
/// vetoed chase ends the tick with [`DecisionError::InvalidInternalState`].
#[derive(Debug)]
pub struct DecisionEngine {
    tree: DecisionTree,
    config: WorldConfig,
    rng: StdRng,
    action: Action,
    counters: Counters,
    pauses: Pauses,
    /// Route planned by the chase admission, installed during setup
    plan: Option<Path>,
    follow: Option<FollowPath>,
    wander: Option<Wander>,
    guess_target: Option<Vec2>,
    plans: u64,
}

impl DecisionEngine {
    /// Engine running the standard tree
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_tree(config, DecisionTree::standard(&config.decision))
    }

    /// Engine running a custom tree
    #[must_use]
    pub fn with_tree(config: &WorldConfig, tree: DecisionTree) -> Self {
        Self {
            tree,
            config: config.clone(),
            rng: StdRng::seed_from_u64(config.decision.seed),
            action: Action::Nothing,
            counters: Counters::default(),
            pauses: Pauses::default(),
            plan: None,
            follow: None,
            wander: None,
            guess_target: None,
            plans: 0,
        }
    }

    /// Action taken on the last tick
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Route being followed, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.follow.as_ref().map(FollowPath::path)
    }

    /// Iteration counters of the current bouts
    #[must_use]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Whether `action` is resting (wander, guess) or cooling down (chase)
    #[must_use]
    pub fn is_paused(&self, action: Action) -> bool {
        self.pauses.get(action) > 0
    }

    /// Chase routes planned so far
    #[must_use]
    pub fn plans(&self) -> u64 {
        self.plans
    }

    /// Position the last guess aimed at
    #[must_use]
    pub fn guess_target(&self) -> Option<Vec2> {
        self.guess_target
    }

    /// Decide and act for one frame
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::InvalidInternalState`] if the tree breaks its
    /// own rules, or [`DecisionError::Graph`] if planning hits a graph lookup
    /// failure
    pub fn tick(
        &mut self,
        agent: &mut Kinematic,
        target: &Kinematic,
        world: &World,
        dt: f32,
    ) -> Result<Action, DecisionError> {
        let frame = world.frame();
        let here = frame.nearest_location(agent.position);
        let there = frame.nearest_location(target.position);

        let mut vetoed = ActionSet::default();
        let action = loop {
            let action = {
                let mut board = Blackboard {
                    agent: here,
                    target: there,
                    rng: &mut self.rng,
                    vetoed,
                };
                self.tree.evaluate(&mut board)?
            };
            if action != Action::Chasing {
                break action;
            }
            if vetoed.contains(Action::Chasing) {
                return Err(DecisionError::InvalidInternalState(
                    "tree offered a vetoed chase".into(),
                ));
            }
            if self.admit_chase(agent, here, there, world)? {
                break action;
            }
            vetoed.insert(Action::Chasing);
        };

        if action != self.action {
            self.transition(action, agent);
        }

        let bounds = self.config.motion_bounds(frame);
        if self.setup(action, agent, here, world) {
            self.execute(action, agent, target, world, dt, &bounds);
            self.counters.increment(action);
        }
        Ok(action)
    }

    /// Decide whether a chase may run this tick, planning it if fresh
    fn admit_chase(
        &mut self,
        agent: &mut Kinematic,
        here: Location,
        there: Location,
        world: &World,
    ) -> Result<bool, DecisionError> {
        if self.pauses.chase > 0 {
            self.pauses.chase -= 1;
            log::trace!("Chase cooling down, {} ticks left", self.pauses.chase);
            return Ok(false);
        }

        let decision = &self.config.decision;
        if self.counters.chasing > decision.chase_cap {
            log::debug!(
                "Chase ran {} ticks, cooling down for {}",
                self.counters.chasing,
                decision.chase_cooldown
            );
            self.pauses.chase = decision.chase_cooldown;
            self.counters.chasing = 0;
            agent.stop();
            return Ok(false);
        }

        if let (Action::Chasing, Some(follow)) = (self.action, &self.follow) {
            // Keep the plan unless it is used up and the target has moved on
            let finished = follow.cursor() + 1 >= follow.path().len();
            let stale = follow.path().last().is_some_and(|end| end.location != there);
            if !(finished && stale) {
                return Ok(true);
            }
        }

        let graph = world.graph();
        let path = if graph.contains(here) && graph.contains(there) {
            let heuristic = self.config.decision.chase_heuristic;
            search(graph, here, there, Strategy::AStar(heuristic))?
        } else {
            Path::default()
        };
        if path.is_empty() {
            log::debug!("No route from {here} to {there}, chase refused");
            return Ok(false);
        }
        log::debug!(
            "Chase planned {} steps from {here} to {there}, cost {}",
            path.len() - 1,
            path.total_cost()
        );
        self.plans += 1;
        self.plan = Some(path);
        Ok(true)
    }

    /// Leave the previous action behind
    ///
    /// The chase cooldown outlives the change; wander and guess pauses do not.
    fn transition(&mut self, to: Action, agent: &mut Kinematic) {
        let from = self.action;
        log::debug!("{from} -> {to}");
        agent.stop();
        self.counters.reset(from);
        match from {
            Action::Wandering => self.pauses.wander = 0,
            Action::Guessing => self.pauses.guess = 0,
            Action::Chasing | Action::Nothing => {}
        }
        self.follow = None;
        self.wander = None;
        self.guess_target = None;
        self.action = to;
    }

    /// Prepare `action`; returns false while the agent rests
    fn setup(&mut self, action: Action, agent: &mut Kinematic, here: Location, world: &World) -> bool {
        match action {
            Action::Chasing => {
                if let Some(path) = self.plan.take() {
                    let follow = &self.config.follow;
                    self.follow = Some(
                        FollowPath::new(path, self.config.arrive(), self.config.align())
                            .with_lookahead(follow.path_offset, follow.prediction_time)
                            .with_terminal_nudge(follow.terminal_nudge),
                    );
                }
                self.follow.is_some()
            }
            Action::Wandering => {
                if self.resting(action, agent) {
                    return false;
                }
                if self.wander.is_none() {
                    let wander = &self.config.wander;
                    self.wander = Some(Wander::new(
                        wander.offset,
                        wander.radius,
                        wander.rate,
                        self.config.arrive(),
                        self.config.align(),
                        self.rng.next_u64(),
                    ));
                    // Self-to-self route, only so `path()` has something to show
                    self.follow = world.graph().quantize(here).ok().map(|node| {
                        FollowPath::new(Path::trivial(node), self.config.arrive(), self.config.align())
                    });
                }
                true
            }
            Action::Guessing => {
                if self.resting(action, agent) {
                    return false;
                }
                self.guess_target = Some(self.sample_guess(agent.position, world));
                true
            }
            Action::Nothing => {
                agent.stop();
                false
            }
        }
    }

    /// Count a pause down, or start one once the bout passes its cap
    fn resting(&mut self, action: Action, agent: &mut Kinematic) -> bool {
        let decision = &self.config.decision;
        let (cap, length) = match action {
            Action::Wandering => (decision.wander_cap, decision.wander_pause),
            Action::Guessing => (decision.guess_cap, decision.guess_pause),
            _ => return false,
        };
        let Some(remaining) = self.pauses.slot(action) else {
            return false;
        };

        if *remaining > 0 {
            *remaining -= 1;
            if *remaining == 0 {
                log::debug!("{action} pause over");
                self.counters.reset(action);
                self.wander = None;
            }
            return true;
        }

        if self.counters.get(action) > cap {
            agent.stop();
            if length == 0 {
                self.counters.reset(action);
                self.wander = None;
                return false;
            }
            log::debug!("{action} ran {} ticks, pausing for {length}", self.counters.get(action));
            *remaining = length;
            return true;
        }
        false
    }

    /// A random navigable point near `position`, or `position` itself
    ///
    /// Candidates must also lie inside the motion bounds, so the agent lands
    /// exactly on the guess.
    fn sample_guess(&mut self, position: Vec2, world: &World) -> Vec2 {
        let bounds = self.config.motion_bounds(world.frame());
        let radius = self.config.decision.guess_radius * world.frame().cell_size;
        for _ in 0..self.config.decision.guess_retries {
            let offset = Vec2::new(
                self.rng.gen_range(-radius..=radius),
                self.rng.gen_range(-radius..=radius),
            );
            // Reflected about the agent
            let candidate = position - offset;
            if bounds.contains(candidate) && world.navigable_location(candidate).is_some() {
                return candidate;
            }
        }
        log::trace!("No guess candidate near {position}, staying put");
        position
    }

    fn execute(
        &mut self,
        action: Action,
        agent: &mut Kinematic,
        target: &Kinematic,
        world: &World,
        dt: f32,
        bounds: &MotionBounds,
    ) {
        let terrain = world.terrain();
        match action {
            Action::Chasing => {
                if let Some(follow) = &mut self.follow {
                    let steering = follow.calculate(agent, target, &terrain);
                    agent.apply(steering, dt, bounds);
                }
            }
            Action::Wandering => {
                if let Some(wander) = &mut self.wander {
                    let steering = wander.calculate(agent, target, &terrain);
                    agent.apply(steering, dt, bounds);
                }
            }
            Action::Guessing => {
                if let Some(point) = self.guess_target {
                    agent.jump_to(point, bounds);
                }
            }
            Action::Nothing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::decision::{Always, DecisionNode};
    use crate::grid::Grid;
    use crate::search::HeuristicKind;

    const DT: f32 = 1.0 / 60.0;

    fn world(grid: Grid, config: &WorldConfig) -> World {
        World::new(grid, config.grid.cell_size)
    }

    fn at(world: &World, row: i32, col: i32) -> Kinematic {
        Kinematic::at(world.frame().center_of(Location::new(row, col)))
    }

    fn always(config: &WorldConfig, action: Action) -> DecisionEngine {
        DecisionEngine::with_tree(config, DecisionTree::new(Box::new(Always(action))))
    }

    /// Answers whatever the shared cell holds
    #[derive(Debug)]
    struct Switch(Rc<Cell<Action>>);

    impl DecisionNode for Switch {
        fn name(&self) -> &'static str {
            "Switch"
        }

        fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
            Always(self.0.get()).evaluate(board)
        }
    }

    #[test]
    fn test_chases_nearby_target() {
        let config = WorldConfig::default();
        let world = world(Grid::open(8, 8), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 0, 0);
        let target = at(&world, 0, 3);

        assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Chasing));
        let path = engine.path().unwrap();
        assert_eq!(path.first().unwrap().location, Location::new(0, 0));
        assert_eq!(path.last().unwrap().location, Location::new(0, 3));
        assert_eq!(engine.counters().chasing, 1);

        for _ in 0..30 {
            engine.tick(&mut agent, &target, &world, DT).unwrap();
        }
        assert!(agent.position.x > world.frame().center_of(Location::new(0, 0)).x);
    }

    #[test]
    fn test_far_target_roams() {
        let config = WorldConfig::default();
        let world = world(Grid::open(12, 12), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 0, 0);
        let target = at(&world, 11, 11);

        for _ in 0..50 {
            let action = engine.tick(&mut agent, &target, &world, DT).unwrap();
            assert!(matches!(action, Action::Wandering | Action::Guessing));
        }
    }

    #[test]
    fn test_chase_cap_starts_cooldown() {
        let mut config = WorldConfig::default();
        config.decision.chase_cap = 3;
        config.decision.chase_cooldown = 5;
        let world = world(Grid::open(8, 8), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 2, 2);
        let target = at(&world, 2, 5);

        let actions: Vec<Action> = (0..11)
            .map(|_| engine.tick(&mut agent, &target, &world, DT).unwrap())
            .collect();

        assert!(actions[..4].iter().all(|&a| a == Action::Chasing));
        assert!(actions[4..10].iter().all(|&a| a != Action::Chasing));
        assert_eq!(actions[10], Action::Chasing);
        assert!(!engine.is_paused(Action::Chasing));
    }

    #[test]
    fn test_cooldown_is_reported_and_stops_agent() {
        let mut config = WorldConfig::default();
        config.decision.chase_cap = 1;
        config.decision.chase_cooldown = 4;
        let world = world(Grid::open(8, 8), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 2, 2);
        let target = at(&world, 2, 5);

        for _ in 0..3 {
            engine.tick(&mut agent, &target, &world, DT).unwrap();
        }
        assert!(engine.is_paused(Action::Chasing));
        assert_eq!(engine.counters().chasing, 0);
        assert_ne!(engine.action(), Action::Chasing);
    }

    #[test]
    fn test_unreachable_target_is_not_chased() {
        let config = WorldConfig::default();
        let grid = Grid::from_layout("..#..\n..#..\n..#..").unwrap();
        let world = world(grid, &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 1, 0);
        let target = at(&world, 1, 4);

        for _ in 0..20 {
            let action = engine.tick(&mut agent, &target, &world, DT).unwrap();
            assert_ne!(action, Action::Chasing);
        }
        assert!(!engine.is_paused(Action::Chasing));
    }

    #[test]
    fn test_wander_pause_cycle() {
        let mut config = WorldConfig::default();
        config.decision.wander_cap = 2;
        config.decision.wander_pause = 3;
        let world = world(Grid::open(8, 8), &config);
        let mut engine = always(&config, Action::Wandering);
        let mut agent = at(&world, 4, 4);
        let target = at(&world, 0, 0);

        for _ in 0..3 {
            engine.tick(&mut agent, &target, &world, DT).unwrap();
        }
        assert_eq!(engine.counters().wandering, 3);
        assert!(!engine.is_paused(Action::Wandering));

        // Fourth tick passes the cap
        engine.tick(&mut agent, &target, &world, DT).unwrap();
        assert!(engine.is_paused(Action::Wandering));
        assert_eq!(agent.velocity, Vec2::ZERO);

        for _ in 0..2 {
            engine.tick(&mut agent, &target, &world, DT).unwrap();
            assert!(engine.is_paused(Action::Wandering));
        }
        engine.tick(&mut agent, &target, &world, DT).unwrap();
        assert!(!engine.is_paused(Action::Wandering));
        assert_eq!(engine.counters().wandering, 0);

        engine.tick(&mut agent, &target, &world, DT).unwrap();
        assert_eq!(engine.counters().wandering, 1);
    }

    #[test]
    fn test_wander_holds_trivial_route() {
        let config = WorldConfig::default();
        let world = world(Grid::open(8, 8), &config);
        let mut engine = always(&config, Action::Wandering);
        let mut agent = at(&world, 3, 3);
        let target = at(&world, 0, 0);

        engine.tick(&mut agent, &target, &world, DT).unwrap();
        let path = engine.path().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.first().unwrap().location, Location::new(3, 3));
    }

    #[test]
    fn test_transition_resets_outgoing_bout() {
        let config = WorldConfig::default();
        let world = world(Grid::open(8, 8), &config);
        let answer = Rc::new(Cell::new(Action::Wandering));
        let tree = DecisionTree::new(Box::new(Switch(Rc::clone(&answer))));
        let mut engine = DecisionEngine::with_tree(&config, tree);
        let mut agent = at(&world, 4, 4);
        let target = at(&world, 0, 0);

        for _ in 0..3 {
            engine.tick(&mut agent, &target, &world, DT).unwrap();
        }
        assert_eq!(engine.counters().wandering, 3);

        answer.set(Action::Guessing);
        assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Guessing));
        assert_eq!(engine.counters().wandering, 0);
        assert_eq!(engine.counters().guessing, 1);
        assert!(engine.path().is_none());
        assert!(engine.guess_target().is_some());
    }

    #[test]
    fn test_guess_without_candidates_stays_put() {
        let mut config = WorldConfig::default();
        config.decision.guess_retries = 0;
        let world = world(Grid::open(6, 6), &config);
        let mut engine = always(&config, Action::Guessing);
        let mut agent = at(&world, 2, 2);
        let start = agent.position;
        let target = at(&world, 0, 0);

        engine.tick(&mut agent, &target, &world, DT).unwrap();
        assert_eq!(engine.guess_target(), Some(start));
        assert_eq!(agent.position, start);
    }

    #[test]
    fn test_guess_targets_are_navigable_or_home() {
        let config = WorldConfig::default();
        let world = world(Grid::open(6, 6), &config);
        let bounds = config.motion_bounds(world.frame());
        let mut engine = always(&config, Action::Guessing);
        let mut agent = at(&world, 0, 0);
        let target = at(&world, 5, 5);

        for _ in 0..50 {
            let before = agent.position;
            engine.tick(&mut agent, &target, &world, DT).unwrap();
            let guess = engine.guess_target().unwrap();
            assert!(guess == before || world.navigable_location(guess).is_some());
            assert!(bounds.contains(guess));
            assert_eq!(agent.position, guess);
        }
    }

    #[test]
    fn test_guess_moves_straight_onto_target() {
        let config = WorldConfig::default();
        let world = world(Grid::open(10, 10), &config);
        let mut engine = always(&config, Action::Guessing);
        let mut agent = at(&world, 5, 5);
        let start = agent.position;
        let target = at(&world, 0, 0);

        assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Guessing));
        let guess = engine.guess_target().unwrap();
        assert_eq!(agent.position, guess);
        assert_ne!(guess, start);
        assert_eq!(agent.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_running_chase_replans_only_when_route_is_used_up() {
        let mut config = WorldConfig::default();
        config.decision.chase_cap = 10_000;
        let world = world(Grid::open(1, 8), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 0, 0);
        let mut target = at(&world, 0, 3);

        assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Chasing));
        assert_eq!(engine.plans(), 1);

        // The target moves while the route is still being walked
        target = at(&world, 0, 5);
        engine.tick(&mut agent, &target, &world, DT).unwrap();
        assert_eq!(engine.plans(), 1);
        assert_eq!(engine.path().unwrap().last().unwrap().location, Location::new(0, 3));

        let mut used_up = false;
        for _ in 0..2000 {
            let follow = engine.follow.as_ref().unwrap();
            used_up = follow.cursor() + 1 >= follow.path().len();
            assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Chasing));
            if engine.plans() == 2 {
                break;
            }
        }

        assert!(used_up);
        assert_eq!(engine.plans(), 2);
        let path = engine.path().unwrap();
        assert_eq!(path.last().unwrap().location, Location::new(0, 5));
    }

    #[test]
    fn test_chase_uses_configured_heuristic() {
        let mut config = WorldConfig::default();
        config.decision.chase_heuristic = HeuristicKind::Manhattan;
        let world = world(Grid::open(6, 6), &config);
        let mut engine = DecisionEngine::new(&config);
        let mut agent = at(&world, 0, 0);
        let target = at(&world, 3, 2);

        engine.tick(&mut agent, &target, &world, DT).unwrap();
        let expected = search(
            world.graph(),
            Location::new(0, 0),
            Location::new(3, 2),
            Strategy::AStar(HeuristicKind::Manhattan),
        )
        .unwrap();
        assert_eq!(engine.path(), Some(&expected));
    }

    #[test]
    fn test_nothing_stops_agent() {
        let config = WorldConfig::default();
        let world = world(Grid::open(4, 4), &config);
        let mut engine = always(&config, Action::Nothing);
        let mut agent = at(&world, 1, 1);
        agent.velocity = Vec2::new(10.0, 0.0);
        let target = at(&world, 3, 3);

        assert_eq!(engine.tick(&mut agent, &target, &world, DT), Ok(Action::Nothing));
        assert_eq!(agent.velocity, Vec2::ZERO);
        assert_eq!(engine.counters(), Counters::default());
    }

    #[test]
    fn test_vetoed_chase_offered_again_is_fatal() {
        /// Offers a chase no matter what
        #[derive(Debug)]
        struct Stubborn;

        impl DecisionNode for Stubborn {
            fn name(&self) -> &'static str {
                "Stubborn"
            }

            fn evaluate(&mut self, _board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
                Ok(Action::Chasing)
            }
        }

        let config = WorldConfig::default();
        let grid = Grid::from_layout(".#.").unwrap();
        let world = world(grid, &config);
        let mut engine = DecisionEngine::with_tree(&config, DecisionTree::new(Box::new(Stubborn)));
        let mut agent = at(&world, 0, 0);
        let target = at(&world, 0, 2);

        assert!(matches!(
            engine.tick(&mut agent, &target, &world, DT),
            Err(DecisionError::InvalidInternalState(_))
        ));
    }
}
