#![no_std]
#[cfg(feature = "std")]
extern crate std;

use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};

/// Index of a node in the simulation arena.
pub type NodeId = usize;

/// Width of the source id carried in a heuristic packet header.
pub const SOURCE_ID_BITS: u64 = 8;
/// Width of the "done" flag carried in a heuristic packet header.
pub const DONE_FLAG_BITS: u64 = 1;

/// Extra rounds allowed when running a generation to full AoD.
pub const DEFAULT_ROUND_CEILING: u32 = 100;

/// Coefficient selection policy a decoder is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Simple,
    Greedy,
    Heuristic,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Simple, Strategy::Greedy, Strategy::Heuristic];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Simple => "Simple",
            Strategy::Greedy => "Greedy",
            Strategy::Heuristic => "Heuristic",
        }
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per strategy. Replaces the (simple, greedy, heuristic) triples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerStrategy<T> {
    pub simple: T,
    pub greedy: T,
    pub heuristic: T,
}

impl<T> PerStrategy<T> {
    pub fn from_fn(mut f: impl FnMut(Strategy) -> T) -> Self {
        Self {
            simple: f(Strategy::Simple),
            greedy: f(Strategy::Greedy),
            heuristic: f(Strategy::Heuristic),
        }
    }

    pub fn get(&self, strategy: Strategy) -> &T {
        match strategy {
            Strategy::Simple => &self.simple,
            Strategy::Greedy => &self.greedy,
            Strategy::Heuristic => &self.heuristic,
        }
    }

    pub fn get_mut(&mut self, strategy: Strategy) -> &mut T {
        match strategy {
            Strategy::Simple => &mut self.simple,
            Strategy::Greedy => &mut self.greedy,
            Strategy::Heuristic => &mut self.heuristic,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Strategy, &T) -> U) -> PerStrategy<U> {
        PerStrategy::from_fn(|s| f(s, self.get(s)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Strategy, &T)> {
        Strategy::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl<T> Index<Strategy> for PerStrategy<T> {
    type Output = T;
    fn index(&self, strategy: Strategy) -> &T { self.get(strategy) }
}

impl<T> IndexMut<Strategy> for PerStrategy<T> {
    fn index_mut(&mut self, strategy: Strategy) -> &mut T { self.get_mut(strategy) }
}

pub type NcResult<T> = Result<T, NcError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NcError {
    /// Coefficient vector length or values do not fit the generation.
    MalformedCoefficients { expected: usize, actual: usize },
    /// A coefficient is not an element of the configured field.
    CoefficientOutOfField { index: usize, value: u32 },
    /// Coded payload length differs from the symbol size.
    MalformedPayload { expected: usize, actual: usize },
    /// Source symbol index past the generation size.
    SymbolOutOfRange { index: usize, symbols: usize },
    /// A node has no neighbors. Reported, never fatal.
    EmptyNeighborSet(NodeId),
    /// Neighbor list references a node outside the arena.
    InvalidTopology { node: NodeId, neighbor: NodeId },
    UnknownField,
    InvalidConfig(&'static str),
}

impl core::fmt::Display for NcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NcError::MalformedCoefficients { expected, actual } => {
                write!(f, "malformed coefficients: expected {} got {}", expected, actual)
            }
            NcError::CoefficientOutOfField { index, value } => {
                write!(f, "coefficient {} at index {} is outside the field", value, index)
            }
            NcError::MalformedPayload { expected, actual } => {
                write!(f, "malformed payload: expected {} bytes got {}", expected, actual)
            }
            NcError::SymbolOutOfRange { index, symbols } => {
                write!(f, "symbol {} out of range for generation of {}", index, symbols)
            }
            NcError::EmptyNeighborSet(node) => write!(f, "node {} has no neighbors", node),
            NcError::InvalidTopology { node, neighbor } => {
                write!(f, "node {} lists unknown neighbor {}", node, neighbor)
            }
            NcError::UnknownField => {
                f.write_str("unknown finite field (expected binary|binary4|binary8|binary16)")
            }
            NcError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NcError {}
