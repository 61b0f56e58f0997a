use alloc::sync::Arc;
use alloc::vec::Vec;
use ncsim_core::{NodeId, PerStrategy, Strategy};
use ncsim_rlnc::CodedPacket;

use crate::ChannelAssignment;

/// One node's broadcast for a round: a payload per strategy on one assignment.
/// A sleeping heuristic node leaves its heuristic slot empty.
#[derive(Debug, Clone)]
pub struct Transmission {
    pub source: NodeId,
    pub assignment: ChannelAssignment,
    pub packets: PerStrategy<Option<CodedPacket>>,
}

impl Transmission {
    pub fn carries(&self, strategy: Strategy) -> bool {
        self.packets[strategy].is_some()
    }
}

/// A transmission as seen by one receiver, with the strategy payloads that
/// survived contention.
#[derive(Debug, Clone)]
pub struct Reception {
    pub transmission: Arc<Transmission>,
    pub accepted: PerStrategy<bool>,
}

impl Reception {
    pub fn new(transmission: Arc<Transmission>) -> Self {
        let accepted = transmission.packets.map(|_, p| p.is_some());
        Self { transmission, accepted }
    }

    pub fn source(&self) -> NodeId {
        self.transmission.source
    }

    pub fn packet(&self, strategy: Strategy) -> Option<&CodedPacket> {
        if !self.accepted[strategy] { return None; }
        self.transmission.packets[strategy].as_ref()
    }

    pub fn is_void(&self) -> bool {
        Strategy::ALL.iter().all(|&s| !self.accepted[s])
    }
}

/// Pending broadcasts heard by a node during the transmit phase.
#[derive(Debug, Default)]
pub struct Inbox {
    pending: Vec<Arc<Transmission>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    pub fn push(&mut self, transmission: Arc<Transmission>) {
        self.pending.push(transmission);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Empties the inbox, handing its content to the receive phase.
    pub fn take(&mut self) -> Vec<Arc<Transmission>> {
        core::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
