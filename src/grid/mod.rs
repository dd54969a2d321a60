//! Tile grid and cost model
//!
//! A rows x cols array of cells, each with a traversal-cost class, a
//! membership flag and four directional links, plus the mapping between
//! world positions and grid locations.

mod cell;
mod frame;
mod location;
mod map;
mod maze;

pub use cell::{Connection, CostClass};
pub use frame::WorldFrame;
pub use location::{Direction, Location};
pub use map::{Grid, LayoutError};
pub use maze::MazeOptions;
