use log::warn;
use ncsim_core::{NcError, NcResult, NodeId};
use rand::Rng;

use crate::config::Area;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Neighbor lists indexed by node id. Stable for a generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    neighbors: Vec<Vec<NodeId>>,
    positions: Vec<Position>,
}

impl Topology {
    pub fn full_mesh(nodes: usize) -> Self {
        let neighbors = (0..nodes)
            .map(|i| (0..nodes).filter(|&j| j != i).collect())
            .collect();
        Self { neighbors, positions: Vec::new() }
    }

    /// Explicit neighbor lists. Self-links and repeats are dropped, order is kept.
    pub fn from_lists(lists: Vec<Vec<NodeId>>) -> NcResult<Self> {
        let nodes = lists.len();
        let mut neighbors = Vec::with_capacity(nodes);
        for (node, list) in lists.into_iter().enumerate() {
            let mut clean: Vec<NodeId> = Vec::with_capacity(list.len());
            for neighbor in list {
                if neighbor >= nodes {
                    return Err(NcError::InvalidTopology { node, neighbor });
                }
                if neighbor != node && !clean.contains(&neighbor) {
                    clean.push(neighbor);
                }
            }
            neighbors.push(clean);
        }
        Ok(Self { neighbors, positions: Vec::new() })
    }

    /// Uniform placement inside the area margins. Two nodes are neighbors
    /// when they are within `coverage` of each other.
    pub fn random_geometric<R: Rng + ?Sized>(nodes: usize, area: &Area, coverage: f64, rng: &mut R) -> Self {
        let (x_lo, x_hi) = (area.margin as f64, area.width.saturating_sub(area.margin).max(area.margin) as f64);
        let (y_lo, y_hi) = (area.margin as f64, area.height.saturating_sub(area.margin).max(area.margin) as f64);
        let positions: Vec<Position> = (0..nodes)
            .map(|_| Position { x: rng.gen_range(x_lo..=x_hi), y: rng.gen_range(y_lo..=y_hi) })
            .collect();

        let neighbors = (0..nodes)
            .map(|i| {
                (0..nodes)
                    .filter(|&j| j != i && positions[i].distance(&positions[j]) <= coverage)
                    .collect()
            })
            .collect();
        Self { neighbors, positions }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.neighbors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Placement of each node, empty unless the topology is geometric.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn is_isolated(&self, node: NodeId) -> bool {
        self.neighbors(node).is_empty()
    }

    /// Logs a warning per isolated node and returns them as non-fatal errors.
    pub fn report_isolated(&self) -> Vec<NcError> {
        (0..self.len())
            .filter(|&n| self.is_isolated(n))
            .map(|n| {
                let e = NcError::EmptyNeighborSet(n);
                warn!("{}", e);
                e
            })
            .collect()
    }
}
