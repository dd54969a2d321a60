//! Heuristics for informed search

use serde::{Deserialize, Serialize};

use crate::grid::Location;

/// An estimate of the remaining cost from a location to the goal
pub trait Heuristic {
    /// Estimated cost from `from` to `goal`
    fn estimate(&self, from: Location, goal: Location) -> f32;
}

impl<F> Heuristic for F
where
    F: Fn(Location, Location) -> f32,
{
    fn estimate(&self, from: Location, goal: Location) -> f32 {
        self(from, goal)
    }
}

/// Built-in heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeuristicKind {
    /// |drow| + |dcol|; admissible on a 4-connected grid with unit or higher costs
    Manhattan,
    /// Straight-line distance; admissible
    Euclidean,
    /// Ten times the straight-line distance
    ///
    /// Deliberately inadmissible. It makes A* behave close to greedy
    /// best-first: far fewer expansions, at the price of routes that may be
    /// longer than optimal. Chase planning uses it by default.
    Custom,
}

impl HeuristicKind {
    /// Scale applied to the Euclidean distance by [`HeuristicKind::Custom`]
    pub const CUSTOM_FACTOR: f32 = 10.0;

    /// Whether the heuristic never overestimates on unit-cost grids
    #[must_use]
    pub const fn is_admissible(self) -> bool {
        !matches!(self, HeuristicKind::Custom)
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, from: Location, goal: Location) -> f32 {
        match self {
            HeuristicKind::Manhattan => from.manhattan(goal) as f32,
            HeuristicKind::Euclidean => from.distance(goal),
            HeuristicKind::Custom => Self::CUSTOM_FACTOR * from.distance(goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimates() {
        let a = Location::new(1, 1);
        let b = Location::new(4, 5);

        assert_eq!(HeuristicKind::Manhattan.estimate(a, b), 7.0);
        assert!((HeuristicKind::Euclidean.estimate(a, b) - 5.0).abs() < 1e-5);
        assert!((HeuristicKind::Custom.estimate(a, b) - 50.0).abs() < 1e-4);
        assert!(!HeuristicKind::Custom.is_admissible());
    }

    #[test]
    fn test_closure_heuristic() {
        let zero = |_: Location, _: Location| 0.0;
        assert_eq!(zero.estimate(Location::new(0, 0), Location::new(9, 9)), 0.0);
    }
}
