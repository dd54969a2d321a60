//! The immutable navigation context shared by every agent

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::WorldConfig;
use crate::graph::Graph;
use crate::grid::{Grid, Location, WorldFrame};
use crate::steering::Terrain;

/// A grid, its graph and its world frame
///
/// Built once; searches and behaviors only ever borrow it.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    graph: Graph,
    frame: WorldFrame,
}

impl World {
    /// Build the graph and frame for a grid
    #[must_use]
    pub fn new(grid: Grid, cell_size: f32) -> Self {
        let graph = Graph::build(&grid);
        let frame = WorldFrame::new(&grid, cell_size);
        Self { grid, graph, frame }
    }

    /// Carve a maze as configured and build around it
    #[must_use]
    pub fn generate(config: &WorldConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.grid.seed);
        let grid = Grid::carve(config.grid.rows, config.grid.cols, &config.grid.maze, &mut rng);
        log::info!(
            "Generated {}x{} world with seed {}",
            config.grid.rows,
            config.grid.cols,
            config.grid.seed
        );
        Self::new(grid, config.grid.cell_size)
    }

    /// The tile grid
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The navigation graph
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Position <-> location mapping
    #[must_use]
    pub fn frame(&self) -> &WorldFrame {
        &self.frame
    }

    /// Navigability view for steering behaviors
    #[must_use]
    pub fn terrain(&self) -> Terrain<'_> {
        Terrain::new(&self.grid, &self.frame)
    }

    /// The member cell containing `position`, if any
    #[must_use]
    pub fn navigable_location(&self, position: Vec2) -> Option<Location> {
        self.terrain().navigable_location(position)
    }
}
