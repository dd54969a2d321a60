//! Route search over the navigation graph
//!
//! Dijkstra and A* share one best-first loop. Equal priorities pop in
//! insertion order, and only A* re-opens closed nodes.

mod best_first;
mod heuristic;
mod path;

pub use best_first::{Strategy, astar, dijkstra, search};
pub use heuristic::{Heuristic, HeuristicKind};
pub use path::{Path, PathNode};
