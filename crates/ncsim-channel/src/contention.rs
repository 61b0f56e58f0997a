use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use log::trace;
use ncsim_core::{NcError, NcResult, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ChannelAssignment, Reception, Transmission};

/// How transmissions sharing a (frequency, timeslot) interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Every payload in a colliding group is lost, except a heuristic payload
    /// that is the only heuristic payload of its group.
    HeuristicPrivileged,
    /// Every payload in a colliding group is lost.
    Destructive,
    /// No interference between transmissions.
    Disabled,
}

/// Medium parameters consumed verbatim from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub channels: u16,
    pub timeslots: u16,
    /// Independent per-transmission loss, 0-100.
    pub packet_loss_percent: f64,
    /// A sender can hear its own timeslot.
    pub full_duplex: bool,
    /// A receiver can take several transmissions in one timeslot.
    pub multi_channel_rx: bool,
    pub rx_buffer_size: usize,
    pub collisions: CollisionPolicy,
    /// Break single-reception ties towards transmissions that fill empty decode slots.
    pub prefer_empty_slots: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            timeslots: 4,
            packet_loss_percent: 0.0,
            full_duplex: false,
            multi_channel_rx: false,
            rx_buffer_size: 4,
            collisions: CollisionPolicy::HeuristicPrivileged,
            prefer_empty_slots: true,
        }
    }
}

impl ChannelConfig {
    /// Contention-free medium: only loss applies.
    pub fn ideal(packet_loss_percent: f64) -> Self {
        Self {
            packet_loss_percent,
            full_duplex: true,
            multi_channel_rx: true,
            rx_buffer_size: usize::MAX,
            collisions: CollisionPolicy::Disabled,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> NcResult<()> {
        if self.channels == 0 { return Err(NcError::InvalidConfig("channel count must be positive")); }
        if self.timeslots == 0 { return Err(NcError::InvalidConfig("timeslot count must be positive")); }
        if !(0.0..=100.0).contains(&self.packet_loss_percent) {
            return Err(NcError::InvalidConfig("packet loss must be within 0-100 percent"));
        }
        if self.rx_buffer_size == 0 { return Err(NcError::InvalidConfig("receive buffer must hold at least one packet")); }
        Ok(())
    }

    fn loss_probability(&self) -> f64 {
        (self.packet_loss_percent / 100.0).clamp(0.0, 1.0)
    }
}

/// Per-receiver outcome counters. Cumulative over a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceptionCounters {
    pub received: u64,
    /// Dropped because the receiver was sending in the same timeslot.
    pub ignored: u64,
    pub collisions: u64,
    /// Lost to the single-reception-per-timeslot limit.
    pub missed: u64,
    /// Lost to path loss.
    pub lost: u64,
    /// Subsampled away by the receive buffer limit.
    pub overflow: u64,
    /// Strategy payloads the receiver's decoder refused as malformed. The
    /// carrying transmission still counts as received.
    pub rejected: u64,
}

impl ReceptionCounters {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Resolves what one receiver actually hears this round.
///
/// Stages run in order: self-interference, collisions, path loss, single
/// reception per timeslot, receive buffer limit. `fills_empty_slot` ranks
/// candidates in the single-reception stage.
pub fn resolve<R, F>(
    config: &ChannelConfig,
    own: Option<ChannelAssignment>,
    pending: Vec<Arc<Transmission>>,
    mut fills_empty_slot: F,
    rng: &mut R,
    counters: &mut ReceptionCounters,
) -> Vec<Reception>
where
    R: Rng + ?Sized,
    F: FnMut(&Reception) -> bool,
{
    // 1. Half duplex: deaf while sending
    let mut heard: Vec<Arc<Transmission>> = Vec::with_capacity(pending.len());
    for t in pending {
        match own {
            Some(a) if !config.full_duplex && t.assignment.timeslot == a.timeslot => counters.ignored += 1,
            _ => heard.push(t),
        }
    }

    // 2. Collisions
    let mut candidates: Vec<Reception> = heard.into_iter().map(Reception::new).collect();
    if config.collisions != CollisionPolicy::Disabled {
        apply_collisions(config.collisions, &mut candidates, counters);
    }

    // 3. Path loss
    let p = config.loss_probability();
    candidates.retain(|_| {
        let dropped = p > 0.0 && rng.gen_bool(p);
        if dropped { counters.lost += 1; }
        !dropped
    });

    // 4. One reception per timeslot
    if !config.multi_channel_rx {
        candidates = single_reception(config, candidates, &mut fills_empty_slot, rng, counters);
    }

    // 5. Receive buffer
    if candidates.len() > config.rx_buffer_size {
        candidates.shuffle(rng);
        counters.overflow += (candidates.len() - config.rx_buffer_size) as u64;
        candidates.truncate(config.rx_buffer_size);
    }

    counters.received += candidates.len() as u64;
    trace!("resolved {} receptions", candidates.len());
    candidates
}

fn apply_collisions(policy: CollisionPolicy, candidates: &mut Vec<Reception>, counters: &mut ReceptionCounters) {
    let mut groups: BTreeMap<ChannelAssignment, Vec<usize>> = BTreeMap::new();
    for (i, r) in candidates.iter().enumerate() {
        groups.entry(r.transmission.assignment).or_default().push(i);
    }

    for members in groups.values().filter(|m| m.len() > 1) {
        let heuristic_carriers = members
            .iter()
            .filter(|&&i| candidates[i].transmission.carries(Strategy::Heuristic))
            .count();
        let heuristic_survives = policy == CollisionPolicy::HeuristicPrivileged && heuristic_carriers == 1;

        for &i in members {
            counters.collisions += 1;
            let accepted = &mut candidates[i].accepted;
            accepted.simple = false;
            accepted.greedy = false;
            accepted.heuristic = accepted.heuristic && heuristic_survives;
        }
    }

    candidates.retain(|r| !r.is_void());
}

fn single_reception<R, F>(
    config: &ChannelConfig,
    candidates: Vec<Reception>,
    fills_empty_slot: &mut F,
    rng: &mut R,
    counters: &mut ReceptionCounters,
) -> Vec<Reception>
where
    R: Rng + ?Sized,
    F: FnMut(&Reception) -> bool,
{
    let mut slots: BTreeMap<u16, Vec<Reception>> = BTreeMap::new();
    for r in candidates {
        slots.entry(r.transmission.assignment.timeslot).or_default().push(r);
    }

    let mut kept = Vec::with_capacity(slots.len());
    for (_, mut group) in slots {
        if group.len() > 1 {
            let preferred: Vec<usize> = if config.prefer_empty_slots {
                (0..group.len()).filter(|&i| fills_empty_slot(&group[i])).collect()
            } else {
                Vec::new()
            };
            let pick = match preferred.choose(rng) {
                Some(&i) => i,
                None => rng.gen_range(0..group.len()),
            };
            counters.missed += (group.len() - 1) as u64;
            kept.push(group.swap_remove(pick));
        } else {
            kept.append(&mut group);
        }
    }
    kept
}
