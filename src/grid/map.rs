//! The tile grid: a rows x cols array of [`Connection`]s

use super::{CostClass, Direction, Location};
use super::cell::Connection;

/// A 2D tile grid with per-cell traversal cost and directional links
///
/// Built once (open, from a text layout, or by maze carving) and then only
/// read by the graph builder. The mutators keep the mirrored-link invariant:
/// a link from A towards B exists iff the opposite link from B to A exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Connection>,
}

impl Grid {
    /// A grid where every cell is a wall
    #[must_use]
    pub fn walled(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows as i32,
            cols: cols as i32,
            cells: vec![Connection::wall(); rows * cols],
        }
    }

    /// A grid where every cell is a normal-cost member linked to all neighbours
    #[must_use]
    pub fn open(rows: usize, cols: usize) -> Self {
        let mut grid = Self {
            rows: rows as i32,
            cols: cols as i32,
            cells: vec![Connection::open(CostClass::Normal); rows * cols],
        };
        grid.link_all_members();
        grid
    }

    /// Parse a text layout, one line per row
    ///
    /// Glyphs: `.` normal, `~` pricey, `^` expensive, `#` wall. Every pair of
    /// adjacent member cells is linked. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown glyph, ragged rows, or an empty layout
    pub fn from_layout(layout: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };
        let cols = first.chars().count();

        let mut cells = Vec::with_capacity(lines.len() * cols);
        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != cols {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: cols,
                    found: width,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let cost = CostClass::from_glyph(glyph)
                    .ok_or(LayoutError::UnknownGlyph { row, col, glyph })?;
                cells.push(if cost == CostClass::Wall {
                    Connection::wall()
                } else {
                    Connection::open(cost)
                });
            }
        }

        let mut grid = Self {
            rows: lines.len() as i32,
            cols: cols as i32,
            cells,
        };
        grid.link_all_members();
        Ok(grid)
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Whether `location` lies inside the grid extents
    #[must_use]
    pub const fn contains(&self, location: Location) -> bool {
        location.row >= 0 && location.col >= 0 && location.row < self.rows && location.col < self.cols
    }

    /// All locations in row-major order
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Location::new(row, col)))
    }

    /// The full record of a cell
    ///
    /// # Panics
    ///
    /// Panics if `location` is out of bounds; callers check [`Grid::contains`] first
    #[must_use]
    pub fn connection(&self, location: Location) -> &Connection {
        &self.cells[self.index(location)]
    }

    /// Traversal cost class of a cell
    #[must_use]
    pub fn cell_cost(&self, location: Location) -> CostClass {
        self.connection(location).cost
    }

    /// Whether the cell is part of the navigable region
    #[must_use]
    pub fn is_member(&self, location: Location) -> bool {
        self.connection(location).member
    }

    /// Directional links of a cell, indexed by [`Direction::index`]
    #[must_use]
    pub fn links_of(&self, location: Location) -> [bool; 4] {
        self.connection(location).links
    }

    /// Link two adjacent cells in both directions
    ///
    /// Does nothing if the neighbour is out of bounds or either cell is not
    /// a member.
    pub fn link(&mut self, from: Location, direction: Direction) {
        let to = from.step(direction);
        if !self.contains(from) || !self.contains(to) {
            return;
        }
        if !self.is_member(from) || !self.is_member(to) {
            return;
        }
        self.set_link(from, direction, true);
        self.set_link(to, direction.opposite(), true);
    }

    /// Remove the link between two adjacent cells in both directions
    pub fn unlink(&mut self, from: Location, direction: Direction) {
        let to = from.step(direction);
        if self.contains(from) {
            self.set_link(from, direction, false);
        }
        if self.contains(to) {
            self.set_link(to, direction.opposite(), false);
        }
    }

    /// Change the cost class of a member cell
    ///
    /// Setting [`CostClass::Wall`] is the same as [`Grid::set_wall`].
    pub fn set_cost(&mut self, location: Location, cost: CostClass) {
        if cost == CostClass::Wall {
            self.set_wall(location);
            return;
        }
        let index = self.index(location);
        self.cells[index].cost = cost;
    }

    /// Turn a cell into a wall, dropping every link into and out of it
    pub fn set_wall(&mut self, location: Location) {
        for direction in Direction::ALL {
            self.unlink(location, direction);
        }
        let index = self.index(location);
        self.cells[index] = Connection::wall();
    }

    /// Turn a cell into an unlinked member of the given cost
    pub fn set_open(&mut self, location: Location, cost: CostClass) {
        let index = self.index(location);
        if !self.cells[index].member {
            self.cells[index] = Connection::open(cost);
        } else {
            self.cells[index].cost = cost;
        }
    }

    /// Link every pair of adjacent member cells
    pub fn link_all_members(&mut self) {
        for location in self.locations().collect::<Vec<_>>() {
            // East and south cover each pair once
            self.link(location, Direction::East);
            self.link(location, Direction::South);
        }
    }

    /// Count member cells
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.member).count()
    }

    fn set_link(&mut self, location: Location, direction: Direction, linked: bool) {
        let index = self.index(location);
        self.cells[index].links[direction.index()] = linked;
    }

    fn index(&self, location: Location) -> usize {
        assert!(
            self.contains(location),
            "location {location} outside {}x{} grid",
            self.rows,
            self.cols
        );
        (location.row * self.cols + location.col) as usize
    }
}

/// Errors produced while parsing a text layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout contained no rows
    Empty,
    /// A row had a different width from the first row
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A glyph outside the cost-class alphabet
    UnknownGlyph { row: usize, col: usize, glyph: char },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "layout is empty"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            Self::UnknownGlyph { row, col, glyph } => {
                write!(f, "unknown glyph {glyph:?} at ({row}, {col})")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
