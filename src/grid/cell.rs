//! Per-cell traversal data

use super::Direction;

/// Categorical traversal cost of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CostClass {
    #[default]
    Normal,
    Pricey,
    Expensive,
    Wall,
}

impl CostClass {
    /// Edge cost of entering a cell of this class
    #[must_use]
    pub const fn weight(self) -> f32 {
        match self {
            CostClass::Normal => 1.0,
            CostClass::Pricey => 2.0,
            CostClass::Expensive => 4.0,
            CostClass::Wall => 100.0,
        }
    }

    /// Layout glyph used by [`super::Grid::from_layout`]
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            CostClass::Normal => '.',
            CostClass::Pricey => '~',
            CostClass::Expensive => '^',
            CostClass::Wall => '#',
        }
    }

    /// Parse a layout glyph
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(CostClass::Normal),
            '~' => Some(CostClass::Pricey),
            '^' => Some(CostClass::Expensive),
            '#' => Some(CostClass::Wall),
            _ => None,
        }
    }
}

/// Traversal record of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Cost class of entering this cell
    pub cost: CostClass,
    /// Whether the cell is part of the navigable region
    pub member: bool,
    /// Links towards the four neighbours, indexed by [`Direction::index`]
    pub links: [bool; 4],
}

impl Connection {
    /// A navigable cell with no links yet
    #[must_use]
    pub const fn open(cost: CostClass) -> Self {
        Self {
            cost,
            member: true,
            links: [false; 4],
        }
    }

    /// A wall: never a member, never linked
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            cost: CostClass::Wall,
            member: false,
            links: [false; 4],
        }
    }

    /// Whether the cell links towards `direction`
    #[must_use]
    pub const fn links_to(&self, direction: Direction) -> bool {
        self.links[direction.index()]
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::wall()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(CostClass::Normal.weight(), 1.0);
        assert_eq!(CostClass::Pricey.weight(), 2.0);
        assert_eq!(CostClass::Expensive.weight(), 4.0);
        assert_eq!(CostClass::Wall.weight(), 100.0);
    }

    #[test]
    fn test_glyphs() {
        for class in [
            CostClass::Normal,
            CostClass::Pricey,
            CostClass::Expensive,
            CostClass::Wall,
        ] {
            assert_eq!(CostClass::from_glyph(class.glyph()), Some(class));
        }
        assert_eq!(CostClass::from_glyph('x'), None);
    }
}
