//! Best-first search shared by Dijkstra and A*
//!
//! Both algorithms are the same loop: pop the cheapest open record, stop if
//! it is the goal, otherwise relax its outgoing edges and close it. They
//! differ only in how the open list is ranked and in whether a closed node
//! may be re-opened when a cheaper route to it turns up.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use super::{Heuristic, HeuristicKind, Path, PathNode};
use crate::graph::{Graph, GraphError, VertexId};
use crate::grid::Location;

/// Which algorithm to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Uninformed; ranks by cost so far
    Dijkstra,
    /// Informed; ranks by cost so far plus the heuristic
    AStar(HeuristicKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Record {
    node: PathNode,
    status: Status,
    // Sequence number of the heap entry that is currently valid
    ticket: u64,
}

/// Open-list entry
#[derive(Debug, Clone, Copy)]
struct Entry {
    vertex: VertexId,
    priority: f32,
    ticket: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; equal priorities pop in insertion order
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.ticket.cmp(&self.ticket))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Run a search with the chosen strategy
///
/// # Errors
///
/// Returns [`GraphError::LocationNotFound`] if `start` or `goal` is not a
/// member cell of the graph
pub fn search(
    graph: &Graph,
    start: Location,
    goal: Location,
    strategy: Strategy,
) -> Result<Path, GraphError> {
    match strategy {
        Strategy::Dijkstra => dijkstra(graph, start, goal),
        Strategy::AStar(heuristic) => astar(graph, start, goal, &heuristic),
    }
}

/// Dijkstra's algorithm: closed nodes are never re-opened
///
/// # Errors
///
/// Returns [`GraphError::LocationNotFound`] if `start` or `goal` is not in the graph
pub fn dijkstra(graph: &Graph, start: Location, goal: Location) -> Result<Path, GraphError> {
    let path = best_first(graph, start, goal, |_| 0.0, false)?;
    log_outcome("Dijkstra", start, goal, &path);
    Ok(path)
}

/// A*: ranks by estimated total cost and re-opens closed nodes whose cost improves
///
/// # Errors
///
/// Returns [`GraphError::LocationNotFound`] if `start` or `goal` is not in the graph
pub fn astar<H: Heuristic + ?Sized>(
    graph: &Graph,
    start: Location,
    goal: Location,
    heuristic: &H,
) -> Result<Path, GraphError> {
    let path = best_first(graph, start, goal, |l| heuristic.estimate(l, goal), true)?;
    log_outcome("A*", start, goal, &path);
    Ok(path)
}

fn log_outcome(algorithm: &str, start: Location, goal: Location, path: &Path) {
    if path.is_empty() {
        log::warn!(
            "{algorithm}: no route {start} -> {goal} ({} explored)",
            path.explored()
        );
    } else {
        log::debug!(
            "{algorithm}: {start} -> {goal} in {} steps, cost {}, {} explored",
            path.len() - 1,
            path.total_cost(),
            path.explored()
        );
    }
}

fn best_first<F>(
    graph: &Graph,
    start: Location,
    goal: Location,
    heuristic: F,
    reopen_closed: bool,
) -> Result<Path, GraphError>
where
    F: Fn(Location) -> f32,
{
    let start_node = graph.quantize(start)?;
    let goal_vertex = graph.quantize(goal)?.vertex;

    let mut records: FxHashMap<VertexId, Record> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut next_ticket = 0_u64;
    let mut closed = 0_usize;

    let first = PathNode::start(start_node, heuristic(start));
    records.insert(
        first.vertex,
        Record {
            node: first,
            status: Status::Open,
            ticket: next_ticket,
        },
    );
    open.push(Entry {
        vertex: first.vertex,
        priority: first.estimated_total,
        ticket: next_ticket,
    });
    next_ticket += 1;

    let mut found = false;
    while let Some(entry) = open.pop() {
        let current = match records.get(&entry.vertex) {
            Some(record) if record.status == Status::Open && record.ticket == entry.ticket => {
                record.node
            }
            // Superseded by a cheaper entry, or already closed
            _ => continue,
        };

        if current.vertex == goal_vertex {
            found = true;
            break;
        }

        for edge in graph.outgoing_edges(current.vertex)? {
            let cost_so_far = current.cost_so_far + edge.cost;

            if let Some(existing) = records.get(&edge.to) {
                if existing.node.cost_so_far <= cost_so_far {
                    continue;
                }
                if existing.status == Status::Closed {
                    if !reopen_closed {
                        continue;
                    }
                    closed -= 1;
                }
            }

            let location = graph.locate(edge.to)?;
            let node = PathNode {
                location,
                vertex: edge.to,
                cost_so_far,
                estimated_total: cost_so_far + heuristic(location),
                came_from: Some(*edge),
            };
            records.insert(
                edge.to,
                Record {
                    node,
                    status: Status::Open,
                    ticket: next_ticket,
                },
            );
            open.push(Entry {
                vertex: edge.to,
                priority: node.estimated_total,
                ticket: next_ticket,
            });
            next_ticket += 1;
        }

        if let Some(record) = records.get_mut(&current.vertex) {
            record.status = Status::Closed;
            closed += 1;
        }
    }

    if !found {
        return Ok(Path::not_found(closed));
    }

    // Walk back-edges from the goal; the start has none
    let mut nodes = Vec::new();
    let mut vertex = goal_vertex;
    while let Some(record) = records.get(&vertex) {
        nodes.push(record.node);
        match record.node.came_from {
            Some(edge) => vertex = edge.from,
            None => break,
        }
    }
    nodes.reverse();

    Ok(Path::new(nodes, closed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CostClass, Grid};

    fn open_graph(rows: usize, cols: usize) -> Graph {
        Graph::build(&Grid::open(rows, cols))
    }

    fn assert_contiguous(path: &Path) {
        for pair in path.nodes().windows(2) {
            assert_eq!(pair[0].location.manhattan(pair[1].location), 1);
            let edge = pair[1].came_from.unwrap();
            assert_eq!(edge.from, pair[0].vertex);
            assert_eq!(edge.to, pair[1].vertex);
        }
    }

    #[test]
    fn test_manhattan_five_by_five() {
        let graph = open_graph(5, 5);
        let path = search(
            &graph,
            Location::new(0, 0),
            Location::new(4, 4),
            Strategy::AStar(HeuristicKind::Manhattan),
        )
        .unwrap();

        assert_eq!(path.len(), 9);
        assert_eq!(path.total_cost(), 8.0);
        assert_eq!(path.first().unwrap().location, Location::new(0, 0));
        assert_eq!(path.last().unwrap().location, Location::new(4, 4));
        assert!(path.first().unwrap().came_from.is_none());
        assert_contiguous(&path);
    }

    #[test]
    fn test_dijkstra_matches_admissible_astar() {
        let graph = open_graph(7, 9);
        let pairs = [
            (Location::new(0, 0), Location::new(6, 8)),
            (Location::new(3, 4), Location::new(0, 8)),
            (Location::new(6, 0), Location::new(2, 2)),
        ];

        for (start, goal) in pairs {
            let reference = dijkstra(&graph, start, goal).unwrap();
            for heuristic in [HeuristicKind::Manhattan, HeuristicKind::Euclidean] {
                let path = astar(&graph, start, goal, &heuristic).unwrap();
                assert_eq!(path.total_cost(), reference.total_cost());
                assert_eq!(path.first().unwrap().location, start);
                assert_eq!(path.last().unwrap().location, goal);
            }
        }
    }

    #[test]
    fn test_weighted_costs_route_around_expensive_cells() {
        let grid = Grid::from_layout(
            "
            ...
            .^.
            ...
            ",
        )
        .unwrap();
        let graph = Graph::build(&grid);
        let path = dijkstra(&graph, Location::new(1, 0), Location::new(1, 2)).unwrap();

        // Through the middle costs 4 + 1; around costs 4 unit steps
        assert_eq!(path.total_cost(), 4.0);
        assert!(path.locations().all(|l| l != Location::new(1, 1)));
        assert_contiguous(&path);
    }

    #[test]
    fn test_disconnected_components() {
        let grid = Grid::from_layout(
            "
            ..#..
            ..#..
            ",
        )
        .unwrap();
        let graph = Graph::build(&grid);

        for strategy in [
            Strategy::Dijkstra,
            Strategy::AStar(HeuristicKind::Manhattan),
            Strategy::AStar(HeuristicKind::Custom),
        ] {
            let path = search(&graph, Location::new(0, 0), Location::new(1, 4), strategy).unwrap();
            assert!(path.is_empty());
            assert_eq!(path.explored(), 4);
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = open_graph(3, 3);
        let path = dijkstra(&graph, Location::new(1, 1), Location::new(1, 1)).unwrap();

        assert_eq!(path.len(), 1);
        assert_eq!(path.total_cost(), 0.0);
    }

    #[test]
    fn test_unknown_endpoints_are_errors() {
        let grid = Grid::from_layout(".#").unwrap();
        let graph = Graph::build(&grid);

        assert_eq!(
            dijkstra(&graph, Location::new(0, 0), Location::new(0, 1)),
            Err(GraphError::LocationNotFound(Location::new(0, 1)))
        );
        assert!(dijkstra(&graph, Location::new(4, 4), Location::new(0, 0)).is_err());
    }

    #[test]
    fn test_inadmissible_heuristic_may_cost_more() {
        // A cheap detour the greedy heuristic ignores in favour of the
        // straight pricey corridor
        let grid = Grid::from_layout(
            "
            .^^^^^.
            .#####.
            .......
            ",
        )
        .unwrap();
        let graph = Graph::build(&grid);
        let start = Location::new(0, 0);
        let goal = Location::new(0, 6);

        let optimal = dijkstra(&graph, start, goal).unwrap();
        let custom = astar(&graph, start, goal, &HeuristicKind::Custom).unwrap();
        let manhattan = astar(&graph, start, goal, &HeuristicKind::Manhattan).unwrap();

        assert_eq!(optimal.total_cost(), 10.0);
        assert_eq!(manhattan.total_cost(), optimal.total_cost());
        assert!(custom.total_cost() >= optimal.total_cost());
        assert_eq!(custom.last().unwrap().location, goal);
    }

    #[test]
    fn test_deterministic_tie_breaking() {
        let graph = open_graph(6, 6);
        let a = astar(&graph, Location::new(0, 0), Location::new(5, 5), &HeuristicKind::Euclidean)
            .unwrap();
        let b = astar(&graph, Location::new(0, 0), Location::new(5, 5), &HeuristicKind::Euclidean)
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_costs_never_undercut_dijkstra() {
        let mut grid = Grid::open(6, 6);
        grid.set_cost(Location::new(2, 2), CostClass::Pricey);
        grid.set_wall(Location::new(3, 3));
        let graph = Graph::build(&grid);
        let start = Location::new(0, 0);
        let goal = Location::new(5, 5);
        let reference = dijkstra(&graph, start, goal).unwrap().total_cost();

        for heuristic in [
            HeuristicKind::Manhattan,
            HeuristicKind::Euclidean,
            HeuristicKind::Custom,
        ] {
            let cost = astar(&graph, start, goal, &heuristic).unwrap().total_cost();
            assert!(cost >= reference);
        }
    }
}
