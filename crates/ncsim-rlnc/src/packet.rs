#![forbid(unsafe_code)]
use alloc::vec::Vec;
use ncsim_core::{NodeId, Strategy};
use ncsim_math::GfElement;

/// A coded symbol as broadcast on the medium.
/// Immutable once built: [ coefficients | payload ] plus provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodedPacket {
    pub source: NodeId,
    pub strategy: Strategy,
    pub coefficients: Vec<GfElement>, // One per generation symbol
    pub payload: Vec<u8>,
    /// Sender's own heuristic decoder is complete. Only heuristic packets carry it.
    pub done: Option<bool>,
}

impl CodedPacket {
    pub fn nonzero_coefficients(&self) -> usize {
        self.coefficients.iter().filter(|c| !c.is_zero()).count()
    }

    /// All-zero coefficient vector: legal, carries no information.
    pub fn is_empty(&self) -> bool {
        self.nonzero_coefficients() == 0
    }

    /// True if the combination includes source symbol `index`.
    pub fn touches(&self, index: usize) -> bool {
        self.coefficients.get(index).map_or(false, |c| !c.is_zero())
    }
}
