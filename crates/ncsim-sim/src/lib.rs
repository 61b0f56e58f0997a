//! Round orchestration for the coded dissemination simulator.
//!
//! A [`SimulationContext`] owns every node, the topology, the current
//! generation and one seeded RNG. Each round is a transmit phase over all
//! nodes in random order followed by a receive phase in a fresh random order;
//! nothing sent in a round is decoded before every node has transmitted.

pub mod config;
pub mod context;
pub mod gate;
pub mod generation;
pub mod node;
pub mod stats;
pub mod topology;

pub use config::{Area, ConfigError, SimConfig, TopologyKind};
pub use context::{RunOutcome, SimulationContext};
pub use gate::{NoGate, StepGate};
pub use generation::{node_message, Generation};
pub use node::{HeuristicState, Node};
pub use stats::{AodSummary, MemorySink, NodeStats, StatsSink};
pub use topology::{Position, Topology};
