//! Mapping between world positions and grid locations

use glam::Vec2;

use super::{Grid, Location};

/// Binds a grid's extents to a cell size in world units
///
/// World x grows with the column and world y with the row, so the cell at
/// (row, col) spans `origin + (col, row) * cell_size` to one cell further.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFrame {
    /// Number of rows
    pub rows: i32,
    /// Number of columns
    pub cols: i32,
    /// Cell size in world units
    pub cell_size: f32,
    /// World position of the grid's top-left corner
    pub origin: Vec2,
}

impl WorldFrame {
    /// Create a frame for a grid with the given cell size
    #[must_use]
    pub fn new(grid: &Grid, cell_size: f32) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            cell_size,
            origin: Vec2::ZERO,
        }
    }

    /// Convert a world position to the location containing it
    ///
    /// Returns `None` outside the grid extents.
    #[must_use]
    pub fn location_of(&self, position: Vec2) -> Option<Location> {
        let local = (position - self.origin) / self.cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let location = Location::new(local.y.floor() as i32, local.x.floor() as i32);
        (location.row < self.rows && location.col < self.cols).then_some(location)
    }

    /// The location containing `position`, clamped into the grid extents
    #[must_use]
    pub fn nearest_location(&self, position: Vec2) -> Location {
        let local = (position - self.origin) / self.cell_size;
        Location::new(
            (local.y.floor() as i32).max(0).min(self.rows - 1),
            (local.x.floor() as i32).max(0).min(self.cols - 1),
        )
    }

    /// World position of a cell's centre
    #[must_use]
    pub fn center_of(&self, location: Location) -> Vec2 {
        self.origin
            + Vec2::new(
                (location.col as f32 + 0.5) * self.cell_size,
                (location.row as f32 + 0.5) * self.cell_size,
            )
    }

    /// Top-left corner of the world
    #[must_use]
    pub fn world_min(&self) -> Vec2 {
        self.origin
    }

    /// Bottom-right corner of the world
    #[must_use]
    pub fn world_max(&self) -> Vec2 {
        self.origin + Vec2::new(self.cols as f32, self.rows as f32) * self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_centre() {
        let grid = Grid::open(4, 6);
        let frame = WorldFrame::new(&grid, 32.0);

        let location = Location::new(3, 5);
        let centre = frame.center_of(location);
        assert_eq!(centre, Vec2::new(176.0, 112.0));
        assert_eq!(frame.location_of(centre), Some(location));
    }

    #[test]
    fn test_outside_positions() {
        let grid = Grid::open(4, 6);
        let frame = WorldFrame::new(&grid, 32.0);

        assert_eq!(frame.location_of(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(frame.location_of(Vec2::new(10.0, 128.0)), None);
        assert_eq!(frame.location_of(Vec2::new(192.0, 10.0)), None);
        assert_eq!(frame.location_of(Vec2::NAN), None);
        assert_eq!(frame.world_max(), Vec2::new(192.0, 128.0));
    }

    #[test]
    fn test_nearest_location_clamps() {
        let grid = Grid::open(4, 6);
        let frame = WorldFrame::new(&grid, 32.0);

        assert_eq!(frame.nearest_location(Vec2::new(-50.0, 40.0)), Location::new(1, 0));
        assert_eq!(frame.nearest_location(Vec2::new(500.0, 500.0)), Location::new(3, 5));
        assert_eq!(frame.nearest_location(Vec2::new(40.0, 70.0)), Location::new(2, 1));
    }
}
