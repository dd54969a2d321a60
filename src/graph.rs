//! Weighted directed graph built from a tile grid
//!
//! One vertex per member cell, one edge per directional link between two
//! member cells. Vertices live in an arena and are addressed by index, so
//! identifiers are unique per graph without any shared counter.

use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::grid::{Direction, Grid, Location};

/// Arena index of a graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u32);

impl VertexId {
    /// Raw arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A directed edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Source vertex
    pub from: VertexId,
    /// Destination vertex
    pub to: VertexId,
    /// Reserved; always 1
    pub weight: f32,
    /// Cost of entering the destination cell
    pub cost: f32,
}

/// A vertex with its grid location and outgoing edges
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Grid cell this vertex stands for
    pub location: Location,
    /// Identifier of this vertex
    pub vertex: VertexId,
    /// Outgoing edges (at most four on a 4-connected grid)
    pub edges: SmallVec<[Edge; 4]>,
}

/// Graph lookup failures
///
/// These indicate a programming error (asking about a vertex or cell the
/// graph never contained) and are propagated rather than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// No vertex with this id
    VertexNotFound(VertexId),
    /// No vertex stands for this location (out of bounds or not a member)
    LocationNotFound(Location),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexNotFound(vertex) => write!(f, "vertex {vertex} not found"),
            Self::LocationNotFound(location) => {
                write!(f, "no vertex for location {location}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Immutable navigation graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    by_location: FxHashMap<Location, VertexId>,
}

impl Graph {
    /// Build the graph for a grid
    ///
    /// First pass allocates a vertex per member cell in row-major order; the
    /// second adds an edge for every link whose neighbour is in bounds and a
    /// member. The edge cost is the weight of the destination cell.
    #[must_use]
    pub fn build(grid: &Grid) -> Self {
        let mut graph = Self::default();

        for location in grid.locations().filter(|&l| grid.is_member(l)) {
            let vertex = VertexId(graph.nodes.len() as u32);
            graph.nodes.push(GraphNode {
                location,
                vertex,
                edges: SmallVec::new(),
            });
            graph.by_location.insert(location, vertex);
        }

        for node in &mut graph.nodes {
            let links = grid.links_of(node.location);
            for direction in Direction::ALL {
                if !links[direction.index()] {
                    continue;
                }
                let neighbour = node.location.step(direction);
                if !grid.contains(neighbour) {
                    continue;
                }
                // Non-members have no vertex
                let Some(&to) = graph.by_location.get(&neighbour) else {
                    continue;
                };
                node.edges.push(Edge {
                    from: node.vertex,
                    to,
                    weight: 1.0,
                    cost: grid.cell_cost(neighbour).weight(),
                });
            }
        }

        log::debug!(
            "Built graph: {} vertices, {} edges from {}x{} grid",
            graph.vertex_count(),
            graph.edge_count(),
            grid.rows(),
            grid.cols()
        );

        graph
    }

    /// Number of vertices
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.edges.len()).sum()
    }

    /// All nodes in vertex order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    /// Look up a node by vertex id
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexNotFound`] if the id is not in this graph
    pub fn node(&self, vertex: VertexId) -> Result<&GraphNode, GraphError> {
        self.nodes
            .get(vertex.index())
            .ok_or(GraphError::VertexNotFound(vertex))
    }

    /// Outgoing edges of a vertex; empty for a dead end
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexNotFound`] if the id is not in this graph
    pub fn outgoing_edges(&self, vertex: VertexId) -> Result<&[Edge], GraphError> {
        Ok(&self.node(vertex)?.edges)
    }

    /// Grid location of a vertex
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexNotFound`] if the id is not in this graph
    pub fn locate(&self, vertex: VertexId) -> Result<Location, GraphError> {
        Ok(self.node(vertex)?.location)
    }

    /// The node standing for a grid location
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::LocationNotFound`] if the location is not a member cell
    pub fn quantize(&self, location: Location) -> Result<&GraphNode, GraphError> {
        let vertex = self
            .by_location
            .get(&location)
            .copied()
            .ok_or(GraphError::LocationNotFound(location))?;
        self.node(vertex)
    }

    /// Whether a location has a vertex
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        self.by_location.contains_key(&location)
    }
}
