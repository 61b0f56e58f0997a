use ncsim_channel::{ChannelAssignment, Inbox, ReceptionCounters};
use ncsim_core::{NodeId, PerStrategy};
use ncsim_math::Field;
use ncsim_rlnc::RlncDecoder;

/// Heuristic transmit state. Sleeping lasts until the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicState {
    Active,
    Sleeping,
}

/// Per-node simulation state. Nodes live in a flat arena and refer to each
/// other by index only.
pub struct Node {
    pub id: NodeId,
    pub decoders: PerStrategy<RlncDecoder>,
    pub heuristic: HeuristicState,
    pub assignment: Option<ChannelAssignment>,
    pub inbox: Inbox,
    pub counters: ReceptionCounters,
    pub tx_total: u64,
    /// Cumulative signaling bits sent this generation.
    pub overhead: PerStrategy<u64>,
    /// First round each strategy reached 100% AoD.
    pub done_round: PerStrategy<Option<u32>>,
}

impl Node {
    pub fn new(id: NodeId, field: Field, symbols: usize, symbol_size: usize) -> Self {
        Self {
            id,
            decoders: PerStrategy::from_fn(|_| RlncDecoder::new(field, symbols, symbol_size)),
            heuristic: HeuristicState::Active,
            assignment: None,
            inbox: Inbox::new(),
            counters: ReceptionCounters::default(),
            tx_total: 0,
            overhead: PerStrategy::default(),
            done_round: PerStrategy::default(),
        }
    }

    /// Clears everything for a new generation.
    pub fn reset(&mut self) {
        self.decoders.simple.reset();
        self.decoders.greedy.reset();
        self.decoders.heuristic.reset();
        self.heuristic = HeuristicState::Active;
        self.assignment = None;
        self.inbox.clear();
        self.counters.clear();
        self.tx_total = 0;
        self.overhead = PerStrategy::default();
        self.done_round = PerStrategy::default();
    }

    pub fn is_sleeping(&self) -> bool {
        self.heuristic == HeuristicState::Sleeping
    }

    pub fn ranks(&self) -> PerStrategy<usize> {
        self.decoders.map(|_, d| d.rank())
    }
}
