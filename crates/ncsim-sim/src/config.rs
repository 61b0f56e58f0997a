//! Simulation parameters.
//!
//! Loaded from JSON, either flat or under a `"Parameters"` object with an
//! optional `"Simulation"` object carrying the placement area.

use std::fs;
use std::path::Path;

use ncsim_channel::{ChannelConfig, CollisionPolicy};
use ncsim_core::{NcError, NcResult, PerStrategy, Strategy, DEFAULT_ROUND_CEILING};
use ncsim_math::Field;
use ncsim_rlnc::{CoefficientStrategy, DEFAULT_INCLUDE_PROBABILITY};
use serde::Deserialize;
use serde_json::Value;

/// Largest node count the 8-bit source id of a heuristic header can address.
pub const MAX_NODES: usize = 256;

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(serde_json::Error),
    Invalid(NcError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(e) => Some(e),
        }
    }
}

impl From<NcError> for ConfigError {
    fn from(e: NcError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// How neighbor lists are built at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    /// Everyone hears everyone.
    Mesh,
    /// Uniform placement in the area, neighbors within coverage radius.
    Random,
}

/// Placement area for random topologies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Area {
    #[serde(alias = "screen_width")]
    pub width: u32,
    #[serde(alias = "screen_height")]
    pub height: u32,
    #[serde(alias = "screen_margin")]
    pub margin: u32,
}

impl Default for Area {
    fn default() -> Self {
        Self { width: 600, height: 600, margin: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Node count, which is also the generation size.
    #[serde(alias = "nodes_num")]
    pub nodes: usize,
    #[serde(alias = "packet_size_bytes")]
    pub symbol_size: usize,
    #[serde(alias = "fifi")]
    pub field: Field,
    pub seed: u64,

    #[serde(alias = "rounds_num")]
    pub rounds: u32,
    pub generations: u32,
    /// Extra rounds allowed when running a generation to full AoD.
    pub round_ceiling: u32,

    /// Chance Simple keeps each pivot coefficient.
    #[serde(alias = "sparsity")]
    pub include_probability: f64,

    pub packet_loss_percent: f64,
    pub channels: u16,
    pub timeslots: u16,
    pub full_duplex: bool,
    pub multi_channel_rx: bool,
    pub rx_buffer_size: usize,
    pub collisions: CollisionPolicy,
    pub prefer_empty_slots: bool,

    pub topology: TopologyKind,
    #[serde(alias = "nodes_coverage")]
    pub coverage: f64,
    pub area: Area,
}

impl Default for SimConfig {
    fn default() -> Self {
        let channel = ChannelConfig::default();
        Self {
            nodes: 10,
            symbol_size: 10,
            field: Field::Binary,
            seed: 0,
            rounds: 5,
            generations: 1,
            round_ceiling: DEFAULT_ROUND_CEILING,
            include_probability: DEFAULT_INCLUDE_PROBABILITY,
            packet_loss_percent: channel.packet_loss_percent,
            channels: channel.channels,
            timeslots: channel.timeslots,
            full_duplex: channel.full_duplex,
            multi_channel_rx: channel.multi_channel_rx,
            rx_buffer_size: channel.rx_buffer_size,
            collisions: channel.collisions,
            prefer_empty_slots: channel.prefer_empty_slots,
            topology: TopologyKind::Mesh,
            coverage: 200.0,
            area: Area::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let mut value: Value = serde_json::from_str(data).map_err(ConfigError::Parse)?;
        let config = match value.get_mut("Parameters").map(Value::take) {
            Some(parameters) => {
                let mut config: SimConfig = serde_json::from_value(parameters).map_err(ConfigError::Parse)?;
                if let Some(simulation) = value.get_mut("Simulation").map(Value::take) {
                    config.area = serde_json::from_value(simulation).map_err(ConfigError::Parse)?;
                }
                config
            }
            None => serde_json::from_value(value).map_err(ConfigError::Parse)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json_str(&data)
    }

    /// Fatal startup checks. Nothing past this point rejects a configuration.
    pub fn validate(&self) -> NcResult<()> {
        if self.nodes == 0 {
            return Err(NcError::InvalidConfig("generation size must be positive"));
        }
        if self.nodes > MAX_NODES {
            return Err(NcError::InvalidConfig("node count exceeds the 8-bit source id"));
        }
        self.field.validate_symbol_size(self.symbol_size)?;
        if !(0.0..=1.0).contains(&self.include_probability) {
            return Err(NcError::InvalidConfig("include probability must be within 0-1"));
        }
        if self.topology == TopologyKind::Random {
            if !(self.coverage > 0.0) {
                return Err(NcError::InvalidConfig("coverage radius must be positive"));
            }
            if self.area.width <= 2 * self.area.margin || self.area.height <= 2 * self.area.margin {
                return Err(NcError::InvalidConfig("placement area is smaller than its margins"));
            }
        }
        self.channel().validate()
    }

    pub fn channel(&self) -> ChannelConfig {
        ChannelConfig {
            channels: self.channels,
            timeslots: self.timeslots,
            packet_loss_percent: self.packet_loss_percent,
            full_duplex: self.full_duplex,
            multi_channel_rx: self.multi_channel_rx,
            rx_buffer_size: self.rx_buffer_size,
            collisions: self.collisions,
            prefer_empty_slots: self.prefer_empty_slots,
        }
    }

    /// Copies the medium parameters back from a channel configuration.
    pub fn set_channel(&mut self, channel: ChannelConfig) {
        self.channels = channel.channels;
        self.timeslots = channel.timeslots;
        self.packet_loss_percent = channel.packet_loss_percent;
        self.full_duplex = channel.full_duplex;
        self.multi_channel_rx = channel.multi_channel_rx;
        self.rx_buffer_size = channel.rx_buffer_size;
        self.collisions = channel.collisions;
        self.prefer_empty_slots = channel.prefer_empty_slots;
    }

    pub fn strategies(&self) -> PerStrategy<CoefficientStrategy> {
        PerStrategy::from_fn(|s| match s {
            Strategy::Simple => CoefficientStrategy::Simple { include_probability: self.include_probability },
            Strategy::Greedy => CoefficientStrategy::Greedy,
            Strategy::Heuristic => CoefficientStrategy::Heuristic,
        })
    }
}
