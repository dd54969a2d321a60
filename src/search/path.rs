//! Search results

use glam::Vec2;

use crate::graph::{Edge, GraphNode, VertexId};
use crate::grid::{Location, WorldFrame};

/// One visited node on a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    /// Grid cell of the node
    pub location: Location,
    /// Graph vertex of the node
    pub vertex: VertexId,
    /// Accumulated cost from the start
    pub cost_so_far: f32,
    /// Cost so far plus the heuristic estimate at the time it was recorded
    pub estimated_total: f32,
    /// Edge this node was reached by; `None` for the start
    pub came_from: Option<Edge>,
}

impl PathNode {
    /// A start record for a graph node
    #[must_use]
    pub fn start(node: &GraphNode, estimate: f32) -> Self {
        Self {
            location: node.location,
            vertex: node.vertex,
            cost_so_far: 0.0,
            estimated_total: estimate,
            came_from: None,
        }
    }
}

/// An ordered route from start to goal
///
/// An empty path means no route was found; callers must check
/// [`Path::is_empty`] before following it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    nodes: Vec<PathNode>,
    explored: usize,
}

impl Path {
    /// Wrap an ordered list of records
    #[must_use]
    pub fn new(nodes: Vec<PathNode>, explored: usize) -> Self {
        Self { nodes, explored }
    }

    /// The "no route" result
    #[must_use]
    pub fn not_found(explored: usize) -> Self {
        Self {
            nodes: Vec::new(),
            explored,
        }
    }

    /// A path that starts and ends on the same node
    #[must_use]
    pub fn trivial(node: &GraphNode) -> Self {
        Self::new(vec![PathNode::start(node, 0.0)], 0)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no route was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes closed while searching
    #[must_use]
    pub fn explored(&self) -> usize {
        self.explored
    }

    /// All records in order
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Record at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    /// Start record
    #[must_use]
    pub fn first(&self) -> Option<&PathNode> {
        self.nodes.first()
    }

    /// Goal record
    #[must_use]
    pub fn last(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// Cost of the whole route; zero when empty
    #[must_use]
    pub fn total_cost(&self) -> f32 {
        self.last().map_or(0.0, |node| node.cost_so_far)
    }

    /// Locations along the route
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.nodes.iter().map(|node| node.location)
    }

    /// Index of the record whose cell centre is nearest to `position`,
    /// considering only indices at or after `from`
    ///
    /// Ties go to the later index so an agent never slides backwards.
    #[must_use]
    pub fn nearest_index(&self, position: Vec2, frame: &WorldFrame, from: usize) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, node) in self.nodes.iter().enumerate().skip(from) {
            let distance = frame.center_of(node.location).distance_squared(position);
            match best {
                Some((_, closest)) if distance > closest => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }
}
