use std::sync::Arc;

use log::{debug, info, warn};
use ncsim_channel::{resolve, ChannelAssignment, ChannelConfig, Reception, Transmission};
use ncsim_core::{NcError, NcResult, NodeId, PerStrategy, Strategy};
use ncsim_rlnc::{CoefficientDraw, CoefficientStrategy, RlncDecoder};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{SimConfig, TopologyKind};
use crate::gate::StepGate;
use crate::generation::Generation;
use crate::node::{HeuristicState, Node};
use crate::stats::{AodSummary, NodeStats, StatsSink};
use crate::topology::Topology;

/// How a run-to-full-AoD loop ended. `rounds` is the generation's round
/// counter when the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Complete { rounds: u32 },
    TimedOut { rounds: u32 },
    /// The gate asked to stop first.
    Interrupted { rounds: u32 },
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunOutcome::Complete { .. })
    }

    pub fn rounds(&self) -> u32 {
        match *self {
            RunOutcome::Complete { rounds }
            | RunOutcome::TimedOut { rounds }
            | RunOutcome::Interrupted { rounds } => rounds,
        }
    }
}

/// Owns all state of a simulation: nodes, topology, the current generation
/// and the single seeded RNG every stochastic step draws from.
pub struct SimulationContext {
    config: SimConfig,
    channel: ChannelConfig,
    strategies: PerStrategy<CoefficientStrategy>,
    rng: ChaCha8Rng,

    topology: Topology,
    nodes: Vec<Node>,
    generation: Generation,
    round: u32,
}

impl SimulationContext {
    /// Builds the topology the configuration asks for, then bootstraps
    /// generation 0.
    pub fn new(config: SimConfig) -> NcResult<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let topology = match config.topology {
            TopologyKind::Mesh => Topology::full_mesh(config.nodes),
            TopologyKind::Random => Topology::random_geometric(config.nodes, &config.area, config.coverage, &mut rng),
        };
        Self::assemble(config, topology, rng)
    }

    pub fn with_topology(config: SimConfig, topology: Topology) -> NcResult<Self> {
        config.validate()?;
        if topology.len() != config.nodes {
            return Err(NcError::InvalidConfig("topology size differs from node count"));
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::assemble(config, topology, rng)
    }

    fn assemble(config: SimConfig, topology: Topology, mut rng: ChaCha8Rng) -> NcResult<Self> {
        topology.report_isolated();

        let nodes = (0..config.nodes)
            .map(|id| Node::new(id, config.field, config.nodes, config.symbol_size))
            .collect();
        let generation = Generation::random(0, config.field, config.nodes, config.symbol_size, &mut rng)?;

        let mut ctx = Self {
            channel: config.channel(),
            strategies: config.strategies(),
            config,
            rng,
            topology,
            nodes,
            generation,
            round: 0,
        };
        ctx.bootstrap()?;
        Ok(ctx)
    }

    /// Fresh messages, reset decoders, counters and sleep states.
    pub fn start_generation(&mut self) -> NcResult<()> {
        let index = self.generation.index() + 1;
        self.generation = Generation::random(index, self.config.field, self.config.nodes, self.config.symbol_size, &mut self.rng)?;
        for node in &mut self.nodes {
            node.reset();
        }
        self.round = 0;
        self.bootstrap()
    }

    /// Every node learns its own symbol, uncoded, in every decoder.
    fn bootstrap(&mut self) -> NcResult<()> {
        for node in &mut self.nodes {
            let own = self.generation.message(node.id)?;
            for s in Strategy::ALL {
                node.decoders[s].consume_systematic(node.id, own)?;
            }
        }
        info!(
            "generation {} bootstrapped: {} nodes, {} byte symbols over {}",
            self.generation.index(),
            self.nodes.len(),
            self.config.symbol_size,
            self.config.field
        );
        Ok(())
    }

    /// One transmit phase then one receive phase. Returns a record per node.
    pub fn run_round(&mut self) -> Vec<NodeStats> {
        self.round += 1;
        self.tx_phase();
        self.rx_phase();

        let round = self.round;
        let mut stats = Vec::with_capacity(self.nodes.len());
        for id in 0..self.nodes.len() {
            let aod = PerStrategy::from_fn(|s| self.aod(id, s));
            let node = &mut self.nodes[id];
            for s in Strategy::ALL {
                if node.done_round[s].is_none() && aod[s] >= 100.0 {
                    node.done_round[s] = Some(round);
                }
            }
            stats.push(NodeStats {
                generation: self.generation.index(),
                round,
                node: id,
                aod,
                rank: node.ranks(),
                tx_total: node.tx_total,
                rx_total: node.counters.received,
                collisions: node.counters.collisions,
                ignored: node.counters.ignored,
                missed: node.counters.missed,
                lost: node.counters.lost,
                overflow: node.counters.overflow,
                rejected: node.counters.rejected,
                overhead: node.overhead,
                sleeping: node.is_sleeping(),
            });
        }
        debug!("round {} done", round);
        stats
    }

    fn tx_phase(&mut self) {
        let field = self.config.field;
        let symbols = self.generation.symbols();
        let mut order: Vec<NodeId> = (0..self.nodes.len()).collect();
        order.shuffle(&mut self.rng);

        for id in order {
            let assignment = ChannelAssignment::draw(&self.channel, &mut self.rng);
            let draw = CoefficientDraw::sample(field, symbols, &mut self.rng);

            let neighbors = self.topology.neighbors(id);
            let neighbors_done = neighbors.iter().all(|&n| self.nodes[n].decoders.heuristic.is_complete());

            let node = &mut self.nodes[id];
            if node.heuristic == HeuristicState::Active && neighbors_done {
                node.heuristic = HeuristicState::Sleeping;
                debug!("node {} sleeping from round {}", id, self.round);
            }

            let mut packets = PerStrategy::from_fn(|_| None);
            for s in Strategy::ALL {
                if s == Strategy::Heuristic && node.is_sleeping() {
                    continue;
                }
                let strategy = &self.strategies[s];
                match strategy.build_packet(id, self.generation.encoder(), &node.decoders[s], &draw, &mut self.rng) {
                    Ok(packet) => {
                        node.overhead[s] += strategy.packet_overhead(field, &packet.coefficients);
                        packets[s] = Some(packet);
                    }
                    Err(e) => warn!("node {} dropped its {} packet: {}", id, s, e),
                }
            }
            node.assignment = Some(assignment);
            node.tx_total += 1;

            let transmission = Arc::new(Transmission { source: id, assignment, packets });
            for &n in neighbors {
                self.nodes[n].inbox.push(Arc::clone(&transmission));
            }
        }
    }

    fn rx_phase(&mut self) {
        let mut order: Vec<NodeId> = (0..self.nodes.len()).collect();
        order.shuffle(&mut self.rng);

        for id in order {
            let Node { decoders, inbox, counters, assignment, .. } = &mut self.nodes[id];
            let pending = inbox.take();
            let receptions = resolve(
                &self.channel,
                *assignment,
                pending,
                |r| fills_empty_slot(decoders, r),
                &mut self.rng,
                counters,
            );

            for reception in &receptions {
                for s in Strategy::ALL {
                    let Some(packet) = reception.packet(s) else { continue };
                    if let Err(e) = decoders[s].consume(&packet.coefficients, &packet.payload) {
                        counters.rejected += 1;
                        warn!("node {} rejected {} packet from {}: {}", id, s, packet.source, e);
                    }
                }
            }
            *assignment = None;
        }
    }

    /// Runs `rounds` rounds, waiting on `gate` before each one. Returns the
    /// number of rounds actually run.
    pub fn run_rounds<S, G>(&mut self, rounds: u32, sink: &mut S, gate: &mut G) -> u32
    where
        S: StatsSink + ?Sized,
        G: StepGate + ?Sized,
    {
        for done in 0..rounds {
            if gate.should_stop() {
                return done;
            }
            gate.wait_for_next();
            for record in self.run_round() {
                sink.record(&record);
            }
        }
        rounds
    }

    /// Keeps running until every decoder of every node is at 100% AoD, for
    /// at most `ceiling` more rounds.
    pub fn run_to_full_aod<S, G>(&mut self, ceiling: u32, sink: &mut S, gate: &mut G) -> RunOutcome
    where
        S: StatsSink + ?Sized,
        G: StepGate + ?Sized,
    {
        for _ in 0..ceiling {
            if self.is_full_aod() {
                break;
            }
            if self.run_rounds(1, sink, gate) == 0 {
                warn!("generation {} interrupted after {} rounds", self.generation.index(), self.round);
                return RunOutcome::Interrupted { rounds: self.round };
            }
        }

        if self.is_full_aod() {
            info!("generation {} complete after {} rounds", self.generation.index(), self.round);
            RunOutcome::Complete { rounds: self.round }
        } else {
            warn!("generation {} timed out after {} rounds", self.generation.index(), self.round);
            RunOutcome::TimedOut { rounds: self.round }
        }
    }

    /// Percentage of source symbols `node` holds byte-exact in its `strategy` decoder.
    pub fn aod(&self, node: NodeId, strategy: Strategy) -> f64 {
        let Some(n) = self.nodes.get(node) else { return 0.0 };
        let decoder = &n.decoders[strategy];
        let symbols = self.generation.symbols();
        let exact = (0..symbols)
            .filter(|&i| match (decoder.symbol(i), self.generation.message(i)) {
                (Some(held), Ok(source)) => held == source,
                _ => false,
            })
            .count();
        exact as f64 * 100.0 / symbols as f64
    }

    pub fn is_full_aod(&self) -> bool {
        (0..self.nodes.len()).all(|id| Strategy::ALL.iter().all(|&s| self.aod(id, s) >= 100.0))
    }

    pub fn summary(&self) -> PerStrategy<AodSummary> {
        PerStrategy::from_fn(|s| {
            let values: Vec<f64> = (0..self.nodes.len()).map(|id| self.aod(id, s)).collect();
            AodSummary::from_values(&values)
        })
    }

    /// Per-round loss updates from an external controller.
    pub fn set_packet_loss(&mut self, percent: f64) -> NcResult<()> {
        let channel = ChannelConfig { packet_loss_percent: percent, ..self.channel };
        channel.validate()?;
        self.channel = channel;
        self.config.packet_loss_percent = percent;
        Ok(())
    }

    pub fn config(&self) -> &SimConfig { &self.config }
    pub fn channel(&self) -> &ChannelConfig { &self.channel }
    pub fn topology(&self) -> &Topology { &self.topology }
    pub fn nodes(&self) -> &[Node] { &self.nodes }
    pub fn node(&self, id: NodeId) -> Option<&Node> { self.nodes.get(id) }
    pub fn generation(&self) -> &Generation { &self.generation }
    pub fn round(&self) -> u32 { self.round }
}

/// True when the Simple or Heuristic payload of `reception` touches a symbol
/// the matching decoder has seen in no combination yet.
pub(crate) fn fills_empty_slot(decoders: &PerStrategy<RlncDecoder>, reception: &Reception) -> bool {
    [Strategy::Simple, Strategy::Heuristic].iter().any(|&s| {
        let Some(packet) = reception.packet(s) else { return false };
        let decoder = &decoders[s];
        (0..decoder.symbols()).any(|i| packet.touches(i) && decoder.is_missing(i))
    })
}
