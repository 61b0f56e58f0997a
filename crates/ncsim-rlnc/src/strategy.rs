#![forbid(unsafe_code)]

use alloc::vec::Vec;
use ncsim_core::{NcResult, NodeId, Strategy, DONE_FLAG_BITS, SOURCE_ID_BITS};
use ncsim_math::{Field, GfElement};
use rand::Rng;

use crate::{CodedPacket, RlncDecoder, RlncEncoder};

/// Chance that Simple keeps a coefficient it is allowed to send.
pub const DEFAULT_INCLUDE_PROBABILITY: f64 = 0.5;

/// One random coefficient per generation symbol, each in [1, field_max).
/// Drawn once per node per round and shared by all strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientDraw {
    values: Vec<GfElement>,
}

impl CoefficientDraw {
    pub fn sample<R: Rng + ?Sized>(field: Field, symbols: usize, rng: &mut R) -> Self {
        let values = (0..symbols)
            .map(|_| GfElement(rng.gen_range(1..field.order()) as u16))
            .collect();
        Self { values }
    }

    pub fn from_values(values: Vec<GfElement>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[GfElement] {
        &self.values
    }
}

/// Decides which coded combination a node broadcasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoefficientStrategy {
    /// Pivot coefficients kept independently with `include_probability`.
    Simple { include_probability: f64 },
    /// Every pivot coefficient.
    Greedy,
    /// Greedy density plus a source id / done header.
    Heuristic,
}

impl CoefficientStrategy {
    pub fn kind(&self) -> Strategy {
        match self {
            CoefficientStrategy::Simple { .. } => Strategy::Simple,
            CoefficientStrategy::Greedy => Strategy::Greedy,
            CoefficientStrategy::Heuristic => Strategy::Heuristic,
        }
    }

    /// Coefficient vector for this round. Non-pivot positions are always zero,
    /// so an empty pivot set yields the all-zero vector.
    pub fn select<R: Rng + ?Sized>(&self, decoder: &RlncDecoder, draw: &CoefficientDraw, rng: &mut R) -> Vec<GfElement> {
        (0..decoder.symbols())
            .map(|i| {
                let r = draw.values.get(i).copied().unwrap_or(GfElement::ZERO);
                if !decoder.is_pivot(i) {
                    return GfElement::ZERO;
                }
                match self {
                    CoefficientStrategy::Simple { include_probability } => {
                        if rng.gen_bool(*include_probability) { r } else { GfElement::ZERO }
                    }
                    CoefficientStrategy::Greedy | CoefficientStrategy::Heuristic => r,
                }
            })
            .collect()
    }

    /// Signaling cost of a packet carrying `coefficients`, in bits.
    pub fn packet_overhead(&self, field: Field, coefficients: &[GfElement]) -> u64 {
        let nonzero = coefficients.iter().filter(|c| !c.is_zero()).count() as u64;
        let header = match self {
            CoefficientStrategy::Heuristic => SOURCE_ID_BITS + DONE_FLAG_BITS,
            _ => 0,
        };
        nonzero * field.bits() as u64 + header
    }

    /// Select coefficients against `decoder` and encode them from the master data.
    pub fn build_packet<R: Rng + ?Sized>(
        &self,
        source: NodeId,
        encoder: &RlncEncoder,
        decoder: &RlncDecoder,
        draw: &CoefficientDraw,
        rng: &mut R,
    ) -> NcResult<CodedPacket> {
        let coefficients = self.select(decoder, draw, rng);
        let payload = encoder.encode(&coefficients)?;
        let done = match self {
            CoefficientStrategy::Heuristic => Some(decoder.is_complete()),
            _ => None,
        };
        Ok(CodedPacket { source, strategy: self.kind(), coefficients, payload, done })
    }
}
