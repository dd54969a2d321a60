//! Decision making
//!
//! A behavior tree picks one [`Action`] per tick; the [`DecisionEngine`]
//! turns that pick into motion. It owns everything an agent remembers
//! between ticks: the running plan, iteration counters, pause windows and
//! the chase cooldown.

mod engine;
mod error;
mod tree;

pub use engine::{Counters, DecisionEngine};
pub use error::DecisionError;
pub use tree::{
    Action, ActionSet, Always, Blackboard, CooldownSteps, DecisionNode, DecisionTree, NearbyCheck,
    RandomSelector, Selector, Sequence,
};
