use ncsim_core::{NodeId, PerStrategy};
use serde::Serialize;

/// Snapshot of one node after one round. Never mutated once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStats {
    pub generation: u32,
    pub round: u32,
    pub node: NodeId,
    pub aod: PerStrategy<f64>,
    pub rank: PerStrategy<usize>,
    pub tx_total: u64,
    pub rx_total: u64,
    pub collisions: u64,
    pub ignored: u64,
    pub missed: u64,
    pub lost: u64,
    pub overflow: u64,
    pub rejected: u64,
    /// Cumulative signaling bits.
    pub overhead: PerStrategy<u64>,
    pub sleeping: bool,
}

/// Consumer of per-round statistics. The simulation never reads back.
pub trait StatsSink {
    fn record(&mut self, stats: &NodeStats);
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<NodeStats>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of the most recent round reported.
    pub fn last_round(&self) -> &[NodeStats] {
        let Some(last) = self.records.last() else { return &[] };
        let start = self
            .records
            .iter()
            .rposition(|r| r.round != last.round || r.generation != last.generation)
            .map_or(0, |p| p + 1);
        &self.records[start..]
    }
}

impl StatsSink for MemorySink {
    fn record(&mut self, stats: &NodeStats) {
        self.records.push(stats.clone());
    }
}

/// Spread of AoD across nodes for one strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AodSummary {
    pub max: f64,
    pub mean: f64,
    /// Nodes at 100%.
    pub complete: usize,
    /// Nodes at or under 50%.
    pub below_half: usize,
}

impl AodSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            max: values.iter().copied().fold(0.0, f64::max),
            mean: values.iter().sum::<f64>() / values.len() as f64,
            complete: values.iter().filter(|&&v| v >= 100.0).count(),
            below_half: values.iter().filter(|&&v| v <= 50.0).count(),
        }
    }
}
