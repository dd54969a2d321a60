//! Grid coordinates and the four axis-aligned directions

use std::fmt;

/// An integer (row, column) coordinate on the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// Row index (grows downwards)
    pub row: i32,
    /// Column index (grows to the right)
    pub col: i32,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Straight-line distance in cells
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dr = (self.row - other.row) as f32;
        let dc = (self.col - other.col) as f32;
        (dr * dr + dc * dc).sqrt()
    }

    /// Taxicab distance in cells
    #[must_use]
    pub fn manhattan(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// The neighbouring location one step in `direction`
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.offset();
        Self::new(self.row + dr, self.col + dc)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four directional links a cell can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions, in link-slot order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Slot of this direction in a cell's link array
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// The direction pointing back
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// (row, col) delta of a single step
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}
