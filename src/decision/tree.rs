//! Behavior tree nodes
//!
//! Every node answers with an [`Action`]; `Nothing` plays the role of
//! failure. Composites short-circuit on it the usual way:
//!
//! - [`Selector`]: first child that answers something other than `Nothing`
//! - [`Sequence`]: `Nothing` as soon as any child says so, else the last answer
//! - [`RandomSelector`]: a random child, kept for several ticks once chosen
//!
//! # Example
//!
//! ```ignore
//! let mut tree = DecisionTree::standard(&DecisionConfig::default());
//! let mut board = Blackboard::new(monster, player, &mut rng);
//! let action = tree.evaluate(&mut board)?;
//! ```

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

use super::DecisionError;
use crate::config::DecisionConfig;
use crate::grid::Location;

// ============================================================================
// Actions
// ============================================================================

/// Top-level action alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Follow a planned route to the target
    Chasing,
    /// Roam without a goal
    Wandering,
    /// Jump between guessed positions nearby
    Guessing,
    /// No action; also the "failure" answer of tree nodes
    #[default]
    Nothing,
}

impl Action {
    /// Every action, in histogram order
    pub const ALL: [Action; 4] = [
        Action::Chasing,
        Action::Wandering,
        Action::Guessing,
        Action::Nothing,
    ];

    /// Action name for logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Action::Chasing => "Chasing",
            Action::Wandering => "Wandering",
            Action::Guessing => "Guessing",
            Action::Nothing => "Nothing",
        }
    }

    /// Position of this action in [`Action::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Action::Chasing => 0,
            Action::Wandering => 1,
            Action::Guessing => 2,
            Action::Nothing => 3,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A small set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet(u8);

impl ActionSet {
    /// Add an action
    pub fn insert(&mut self, action: Action) {
        self.0 |= 1 << action.index();
    }

    /// Whether the set holds `action`
    #[must_use]
    pub const fn contains(self, action: Action) -> bool {
        self.0 & (1 << action.index()) != 0
    }
}

// ============================================================================
// Blackboard
// ============================================================================

/// What the tree can see while it is evaluated
pub struct Blackboard<'a> {
    /// Location of the deciding agent
    pub agent: Location,
    /// Location of the tracked target
    pub target: Location,
    /// Random source for stochastic nodes
    pub rng: &'a mut StdRng,
    /// Actions leaves must not offer this evaluation
    pub vetoed: ActionSet,
}

impl<'a> Blackboard<'a> {
    /// A blackboard with nothing vetoed
    pub fn new(agent: Location, target: Location, rng: &'a mut StdRng) -> Self {
        Self {
            agent,
            target,
            rng,
            vetoed: ActionSet::default(),
        }
    }
}

// ============================================================================
// Node trait
// ============================================================================

/// A node of the decision tree
pub trait DecisionNode: fmt::Debug {
    /// Node name for debugging and logging
    fn name(&self) -> &'static str;

    /// Evaluate this node for one tick
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::InvalidInternalState`] when a node reaches a
    /// state its own rules exclude
    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError>;
}

type Children = Vec<Box<dyn DecisionNode>>;

// ============================================================================
// Composites
// ============================================================================

/// Returns the first child answer that is not `Nothing`
#[derive(Debug)]
pub struct Selector {
    children: Children,
}

impl Selector {
    /// Create a new selector
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty
    #[must_use]
    pub fn new(children: Children) -> Self {
        assert!(!children.is_empty(), "Selector must have at least one child");
        Self { children }
    }
}

impl DecisionNode for Selector {
    fn name(&self) -> &'static str {
        "Selector"
    }

    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        for child in &mut self.children {
            let action = child.evaluate(board)?;
            if action != Action::Nothing {
                return Ok(action);
            }
        }
        Ok(Action::Nothing)
    }
}

/// Returns `Nothing` as soon as a child does, otherwise the last child's answer
#[derive(Debug)]
pub struct Sequence {
    children: Children,
}

impl Sequence {
    /// Create a new sequence
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty
    #[must_use]
    pub fn new(children: Children) -> Self {
        assert!(!children.is_empty(), "Sequence must have at least one child");
        Self { children }
    }
}

impl DecisionNode for Sequence {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        let mut last = Action::Nothing;
        for child in &mut self.children {
            last = child.evaluate(board)?;
            if last == Action::Nothing {
                return Ok(Action::Nothing);
            }
        }
        Ok(last)
    }
}

/// Cooldown added per tick while the sticky child keeps answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownSteps {
    /// Step while the child answers `Guessing`
    pub guessing: u32,
    /// Step while the child answers `Wandering`
    pub wandering: u32,
}

/// Picks a child at random and sticks with it for a while
///
/// A child answering `Nothing` is skipped by drawing again, up to a retry
/// budget. Once a child answers something else it is asked again on every
/// later tick, and each answer adds to a cooldown; when the cooldown passes
/// the threshold the choice is dropped and the next tick draws afresh.
/// Only `Guessing` and `Wandering` may come out of a sticky choice.
#[derive(Debug)]
pub struct RandomSelector {
    children: Children,
    choice: Option<usize>,
    cooldown: u32,
    threshold: u32,
    steps: CooldownSteps,
    retries: usize,
}

impl RandomSelector {
    /// Draws allowed per tick, per child
    const RETRIES_PER_CHILD: usize = 8;

    /// Create a new random selector
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty
    #[must_use]
    pub fn new(children: Children, threshold: u32, steps: CooldownSteps) -> Self {
        assert!(
            !children.is_empty(),
            "RandomSelector must have at least one child"
        );
        let retries = children.len() * Self::RETRIES_PER_CHILD;
        Self {
            children,
            choice: None,
            cooldown: 0,
            threshold,
            steps,
            retries,
        }
    }

    /// Index of the sticky child, if one is chosen
    #[must_use]
    pub fn choice(&self) -> Option<usize> {
        self.choice
    }

    /// Accumulated cooldown of the sticky child
    #[must_use]
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    fn reset(&mut self) {
        self.choice = None;
        self.cooldown = 0;
    }

    fn advance(&mut self, action: Action) -> Result<(), DecisionError> {
        let step = match action {
            Action::Guessing => self.steps.guessing,
            Action::Wandering => self.steps.wandering,
            other => {
                return Err(DecisionError::InvalidInternalState(format!(
                    "random selector resolved to {other}"
                )));
            }
        };
        self.cooldown += step;
        if self.cooldown > self.threshold {
            log::debug!("Random selector cooldown {} expired", self.cooldown);
            self.reset();
        }
        Ok(())
    }
}

impl DecisionNode for RandomSelector {
    fn name(&self) -> &'static str {
        "RandomSelector"
    }

    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        if let Some(index) = self.choice {
            let action = self.children[index].evaluate(board)?;
            if action != Action::Nothing {
                self.advance(action)?;
                return Ok(action);
            }
            // The sticky child went quiet; draw again
            self.reset();
        }

        for _ in 0..self.retries {
            let index = board.rng.gen_range(0..self.children.len());
            let action = self.children[index].evaluate(board)?;
            if action == Action::Nothing {
                continue;
            }
            self.choice = Some(index);
            self.advance(action)?;
            return Ok(action);
        }

        Ok(Action::Nothing)
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// Answers `Chasing` when agent and target are closer than a threshold
#[derive(Debug, Clone, Copy)]
pub struct NearbyCheck {
    /// Distance in cells
    pub threshold: f32,
}

impl DecisionNode for NearbyCheck {
    fn name(&self) -> &'static str {
        "NearbyCheck"
    }

    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        if board.agent.distance(board.target) < self.threshold {
            Ok(Action::Chasing)
        } else {
            Ok(Action::Nothing)
        }
    }
}

/// Always answers the same action, unless it is vetoed
#[derive(Debug, Clone, Copy)]
pub struct Always(pub Action);

impl DecisionNode for Always {
    fn name(&self) -> &'static str {
        "Always"
    }

    fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        if board.vetoed.contains(self.0) {
            return Ok(Action::Nothing);
        }
        Ok(self.0)
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A rooted decision tree
#[derive(Debug)]
pub struct DecisionTree {
    root: Box<dyn DecisionNode>,
}

impl DecisionTree {
    /// Wrap a root node
    #[must_use]
    pub fn new(root: Box<dyn DecisionNode>) -> Self {
        Self { root }
    }

    /// Chase when the target is near, otherwise guess or wander at random
    #[must_use]
    pub fn standard(config: &DecisionConfig) -> Self {
        let chase = Sequence::new(vec![
            Box::new(NearbyCheck {
                threshold: config.nearby_threshold,
            }),
            Box::new(Always(Action::Chasing)),
        ]);
        let roam = RandomSelector::new(
            vec![
                Box::new(Always(Action::Guessing)),
                Box::new(Always(Action::Wandering)),
            ],
            config.selector_threshold,
            CooldownSteps {
                guessing: config.guessing_step,
                wandering: config.wandering_step,
            },
        );
        Self::new(Box::new(Selector::new(vec![Box::new(chase), Box::new(roam)])))
    }

    /// Evaluate the whole tree for one tick
    ///
    /// # Errors
    ///
    /// Propagates [`DecisionError::InvalidInternalState`] from any node
    pub fn evaluate(&mut self, board: &mut Blackboard<'_>) -> Result<Action, DecisionError> {
        self.root.evaluate(board)
    }
}

// ============================================================================
// Tests
// ============================================================================
