use rand::Rng;

use crate::ChannelConfig;

/// (frequency, timeslot) a node sends on for one round. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelAssignment {
    pub frequency: u16,
    pub timeslot: u16,
}

impl ChannelAssignment {
    pub fn new(frequency: u16, timeslot: u16) -> Self {
        Self { frequency, timeslot }
    }

    /// Uniform draw over the configured channels and timeslots.
    pub fn draw<R: Rng + ?Sized>(config: &ChannelConfig, rng: &mut R) -> Self {
        Self {
            frequency: rng.gen_range(0..config.channels.max(1)),
            timeslot: rng.gen_range(0..config.timeslots.max(1)),
        }
    }
}
