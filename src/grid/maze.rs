//! Depth-first maze carving

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{CostClass, Direction, Grid, Location};

/// Tunables for [`Grid::carve`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeOptions {
    /// Fraction of remaining walls between members knocked through after carving
    pub braid: f32,
    /// Fraction of cells given the pricey cost class
    pub pricey: f32,
    /// Fraction of cells given the expensive cost class
    pub expensive: f32,
}

impl Default for MazeOptions {
    fn default() -> Self {
        Self {
            braid: 0.15,
            pricey: 0.1,
            expensive: 0.05,
        }
    }
}

impl Grid {
    /// Carve a perfect maze by randomized depth-first search, then braid it
    ///
    /// Every cell becomes a member, so the result is always connected. The
    /// braid pass adds loops so that cost classes actually matter to search.
    pub fn carve(rows: usize, cols: usize, options: &MazeOptions, rng: &mut impl Rng) -> Self {
        let mut grid = Grid::walled(rows, cols);
        if rows == 0 || cols == 0 {
            return grid;
        }

        for location in grid.locations().collect::<Vec<_>>() {
            grid.set_open(location, CostClass::Normal);
        }

        let mut visited = vec![false; rows * cols];
        let slot = |location: Location| (location.row as usize) * cols + location.col as usize;

        let start = Location::new(
            rng.gen_range(0..rows as i32),
            rng.gen_range(0..cols as i32),
        );
        let mut stack = vec![start];
        visited[slot(start)] = true;

        while let Some(&current) = stack.last() {
            let mut candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&direction| {
                    let next = current.step(direction);
                    grid.contains(next) && !visited[slot(next)]
                })
                .collect();

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            candidates.shuffle(rng);
            let direction = candidates[0];
            let next = current.step(direction);
            grid.link(current, direction);
            visited[slot(next)] = true;
            stack.push(next);
        }

        let braid = options.braid.clamp(0.0, 1.0) as f64;
        let pricey = options.pricey.clamp(0.0, 1.0);
        let expensive = options.expensive.clamp(0.0, 1.0 - pricey);
        for location in grid.locations().collect::<Vec<_>>() {
            for direction in [Direction::East, Direction::South] {
                let next = location.step(direction);
                if grid.contains(next)
                    && !grid.connection(location).links_to(direction)
                    && rng.gen_bool(braid)
                {
                    grid.link(location, direction);
                }
            }

            let roll: f32 = rng.gen_range(0.0..1.0);
            if roll < expensive {
                grid.set_cost(location, CostClass::Expensive);
            } else if roll < expensive + pricey {
                grid.set_cost(location, CostClass::Pricey);
            }
        }

        log::debug!(
            "Carved {}x{} maze (braid {:.2}, pricey {:.2}, expensive {:.2})",
            rows,
            cols,
            braid,
            pricey,
            expensive
        );

        grid
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn reachable(grid: &Grid, from: Location) -> usize {
        let mut seen = vec![from];
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for direction in Direction::ALL {
                let next = current.step(direction);
                if grid.connection(current).links_to(direction) && !seen.contains(&next) {
                    seen.push(next);
                    queue.push_back(next);
                }
            }
        }
        seen.len()
    }

    #[test]
    fn test_carved_maze_is_connected() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::carve(8, 11, &MazeOptions::default(), &mut rng);

        assert_eq!(grid.member_count(), 88);
        assert_eq!(reachable(&grid, Location::new(0, 0)), 88);
    }

    #[test]
    fn test_carved_links_are_mirrored() {
        let mut rng = StdRng::seed_from_u64(3);
        let grid = Grid::carve(6, 6, &MazeOptions::default(), &mut rng);

        for location in grid.locations() {
            for direction in Direction::ALL {
                if grid.connection(location).links_to(direction) {
                    let next = location.step(direction);
                    assert!(grid.contains(next));
                    assert!(grid.connection(next).links_to(direction.opposite()));
                }
            }
        }
    }

    #[test]
    fn test_carving_is_deterministic_per_seed() {
        let options = MazeOptions::default();
        let a = Grid::carve(5, 7, &options, &mut StdRng::seed_from_u64(42));
        let b = Grid::carve(5, 7, &options, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_perfect_maze_without_braid() {
        let options = MazeOptions {
            braid: 0.0,
            pricey: 0.0,
            expensive: 0.0,
        };
        let grid = Grid::carve(4, 4, &options, &mut StdRng::seed_from_u64(1));

        // A spanning tree over n cells has n - 1 undirected links
        let links: usize = grid
            .locations()
            .map(|l| grid.links_of(l).iter().filter(|&&linked| linked).count())
            .sum();
        assert_eq!(links, 2 * 15);
    }
}
