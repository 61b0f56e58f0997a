use ncsim_channel::{ChannelConfig, CollisionPolicy};
use ncsim_core::Strategy;
use ncsim_math::Field;
use ncsim_sim::{AodSummary, MemorySink, NoGate, RunOutcome, SimConfig, SimulationContext, StepGate, Topology};

fn mesh(nodes: usize, field: Field, loss: f64, seed: u64) -> SimConfig {
    let mut config = SimConfig {
        nodes,
        symbol_size: 10,
        field,
        seed,
        include_probability: 1.0,
        ..SimConfig::default()
    };
    config.set_channel(ChannelConfig::ideal(loss));
    config
}

#[test]
fn test_bootstrap_knows_own_symbol() {
    let ctx = SimulationContext::new(mesh(5, Field::Binary8, 0.0, 1)).unwrap();
    for node in ctx.nodes() {
        for s in Strategy::ALL {
            let d = &node.decoders[s];
            assert_eq!(d.rank(), 1);
            assert!(d.is_pivot(node.id));
            assert_eq!(ctx.aod(node.id, s), 20.0);
        }
    }
    assert_eq!(ctx.round(), 0);
}

#[test]
fn test_three_node_mesh_completes_in_one_round() {
    for field in [Field::Binary, Field::Binary4, Field::Binary8, Field::Binary16] {
        let mut ctx = SimulationContext::new(mesh(3, field, 0.0, 42)).unwrap();
        let stats = ctx.run_round();
        assert_eq!(stats.len(), 3);
        for record in &stats {
            assert_eq!(record.rank.simple, 3, "{}", field);
            assert_eq!(record.aod.simple, 100.0, "{}", field);
            assert_eq!(record.rank.greedy, 3);
            assert_eq!(record.rank.heuristic, 3);
            assert_eq!(record.rx_total, 2);
        }
        assert!(ctx.is_full_aod());
    }
}

#[test]
fn test_three_node_mesh_at_default_sparsity() {
    // Greedy and heuristic always finish in round 1. Simple finishes exactly
    // when every sender kept its own coefficient, which shows as 8 overhead bits.
    let mut completed = 0;
    for seed in 0..40 {
        let mut config = mesh(3, Field::Binary8, 0.0, seed);
        config.include_probability = 0.5;
        let mut ctx = SimulationContext::new(config).unwrap();
        let stats = ctx.run_round();

        let senders: Vec<bool> = stats.iter().map(|r| r.overhead.simple > 0).collect();
        for record in &stats {
            assert_eq!(record.rank.greedy, 3, "seed {}", seed);
            assert_eq!(record.rank.heuristic, 3, "seed {}", seed);
            let heard = (0..3).filter(|&n| n != record.node && senders[n]).count();
            assert_eq!(record.rank.simple, 1 + heard, "seed {}", seed);
        }
        if senders.iter().all(|&s| s) {
            assert!(ctx.is_full_aod(), "seed {}", seed);
            completed += 1;
        }
    }
    assert!(completed > 0);
}

#[test]
fn test_relay_forwards_only_in_next_round() {
    // 0 - 1 - 2: whatever 1 learns in round 1 reaches 2 in round 2 at the earliest
    for seed in 0..30 {
        let topology = Topology::from_lists(vec![vec![1], vec![0, 2], vec![1]]).unwrap();
        let mut ctx = SimulationContext::with_topology(mesh(3, Field::Binary8, 0.0, seed), topology).unwrap();

        let first = ctx.run_round();
        for s in Strategy::ALL {
            assert_eq!(first[2].rank[s], 2, "seed {} {}", seed, s);
            assert_eq!(first[0].rank[s], 2, "seed {} {}", seed, s);
            assert_eq!(first[1].rank[s], 3, "seed {} {}", seed, s);
        }

        let second = ctx.run_round();
        for s in Strategy::ALL {
            assert_eq!(second[2].rank[s], 3, "seed {} {}", seed, s);
        }
    }
}

#[test]
fn test_total_loss_keeps_rank_one() {
    let mut ctx = SimulationContext::new(mesh(3, Field::Binary8, 100.0, 42)).unwrap();
    let mut sink = MemorySink::new();
    ctx.run_rounds(10, &mut sink, &mut NoGate);

    assert_eq!(sink.records.len(), 30);
    for record in &sink.records {
        assert_eq!(record.rank.simple, 1);
        assert_eq!(record.rank.greedy, 1);
        assert_eq!(record.rank.heuristic, 1);
        assert_eq!(record.rx_total, 0);
    }
    assert_eq!(sink.last_round()[0].lost, 20);
}

#[test]
fn test_isolated_node_never_receives() {
    let config = mesh(3, Field::Binary8, 0.0, 5);
    let topology = Topology::from_lists(vec![vec![1], vec![0], vec![]]).unwrap();
    let mut ctx = SimulationContext::with_topology(config, topology).unwrap();
    let mut sink = MemorySink::new();
    ctx.run_rounds(8, &mut sink, &mut NoGate);

    for record in sink.records.iter().filter(|r| r.node == 2) {
        assert_eq!(record.rx_total, 0);
        assert_eq!(record.rank.simple, 1);
        assert_eq!(record.rank.heuristic, 1);
    }
}

#[test]
fn test_single_node_without_neighbors() {
    let mut ctx = SimulationContext::new(mesh(1, Field::Binary, 0.0, 0)).unwrap();
    let mut sink = MemorySink::new();
    let outcome = ctx.run_to_full_aod(10, &mut sink, &mut NoGate);

    // One node already holds the whole generation
    assert_eq!(outcome, RunOutcome::Complete { rounds: 0 });
    ctx.run_rounds(3, &mut sink, &mut NoGate);
    assert!(sink.records.iter().all(|r| r.rx_total == 0 && r.rank.simple == 1));
}

#[test]
fn test_rank_is_monotonic() {
    let config = SimConfig {
        nodes: 10,
        field: Field::Binary4,
        seed: 9,
        packet_loss_percent: 20.0,
        ..SimConfig::default()
    };
    let mut ctx = SimulationContext::new(config).unwrap();
    let mut sink = MemorySink::new();
    ctx.run_rounds(25, &mut sink, &mut NoGate);

    for node in 0..10 {
        let ranks: Vec<_> = sink.records.iter().filter(|r| r.node == node).map(|r| r.rank).collect();
        for pair in ranks.windows(2) {
            for s in Strategy::ALL {
                assert!(pair[1][s] >= pair[0][s]);
            }
        }
    }
}

#[test]
fn test_aod_is_idempotent() {
    let mut ctx = SimulationContext::new(SimConfig { seed: 3, ..SimConfig::default() }).unwrap();
    ctx.run_round();
    ctx.run_round();
    for id in 0..ctx.nodes().len() {
        for s in Strategy::ALL {
            assert_eq!(ctx.aod(id, s), ctx.aod(id, s));
        }
    }
}

#[test]
fn test_round_one_overhead_ordering() {
    let mut totals = [0u64; 3];
    for seed in 0..20 {
        let mut config = mesh(8, Field::Binary8, 0.0, seed);
        config.include_probability = 0.5;
        let mut ctx = SimulationContext::new(config).unwrap();
        for record in ctx.run_round() {
            let o = record.overhead;
            assert!(o.heuristic >= o.greedy);
            assert!(o.greedy >= o.simple);
            totals[0] += o.simple;
            totals[1] += o.greedy;
            totals[2] += o.heuristic;
        }
    }
    assert!(totals[2] > totals[1]);
    assert!(totals[1] > totals[0]);
}

#[test]
fn test_heuristic_sleeps_when_neighbors_done() {
    let mut ctx = SimulationContext::new(mesh(3, Field::Binary8, 0.0, 11)).unwrap();
    let first = ctx.run_round();
    assert!(first.iter().all(|r| !r.sleeping));

    let second = ctx.run_round();
    for (a, b) in first.iter().zip(&second) {
        assert!(b.sleeping);
        assert_eq!(a.overhead.heuristic, b.overhead.heuristic);
        assert!(b.overhead.greedy > a.overhead.greedy);
    }
}

#[test]
fn test_run_to_full_aod_completes_on_clean_medium() {
    let mut config = mesh(6, Field::Binary8, 0.0, 21);
    config.include_probability = 0.5;
    let mut ctx = SimulationContext::new(config).unwrap();
    let mut sink = MemorySink::new();
    let outcome = ctx.run_to_full_aod(100, &mut sink, &mut NoGate);

    assert!(outcome.is_complete());
    assert_eq!(outcome.rounds(), ctx.round());
    for node in ctx.nodes() {
        assert!(node.done_round.greedy.is_some());
        assert!(node.done_round.simple.unwrap() <= ctx.round());
    }
}

#[test]
fn test_run_to_full_aod_times_out() {
    let mut ctx = SimulationContext::new(mesh(4, Field::Binary8, 100.0, 2)).unwrap();
    let mut sink = MemorySink::new();
    let outcome = ctx.run_to_full_aod(5, &mut sink, &mut NoGate);

    assert_eq!(outcome, RunOutcome::TimedOut { rounds: 5 });
    assert_eq!(sink.records.len(), 20);
}

struct StopAfter(u32);

impl StepGate for StopAfter {
    fn wait_for_next(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    fn should_stop(&mut self) -> bool {
        self.0 == 0
    }
}

#[test]
fn test_gate_interrupts_runs() {
    let mut ctx = SimulationContext::new(mesh(4, Field::Binary8, 100.0, 2)).unwrap();
    let mut sink = MemorySink::new();
    let outcome = ctx.run_to_full_aod(100, &mut sink, &mut StopAfter(3));

    assert_eq!(outcome, RunOutcome::Interrupted { rounds: 3 });
    assert!(!outcome.is_complete());
    assert_eq!(sink.records.len(), 12);

    assert_eq!(ctx.run_rounds(10, &mut sink, &mut StopAfter(2)), 2);
    assert_eq!(ctx.round(), 5);
}

#[test]
fn test_destructive_collisions_block_decoding() {
    let config = SimConfig {
        nodes: 3,
        seed: 4,
        channels: 1,
        timeslots: 1,
        full_duplex: true,
        multi_channel_rx: true,
        collisions: CollisionPolicy::Destructive,
        ..SimConfig::default()
    };
    let mut ctx = SimulationContext::new(config).unwrap();
    let stats = ctx.run_round();
    for record in &stats {
        assert_eq!(record.rank.simple, 1);
        assert_eq!(record.rank.greedy, 1);
        assert_eq!(record.collisions, 2);
        assert_eq!(record.rx_total, 0);
    }
}

#[test]
fn test_half_duplex_single_slot_hears_nothing() {
    let config = SimConfig { nodes: 4, seed: 8, timeslots: 1, ..SimConfig::default() };
    let mut ctx = SimulationContext::new(config).unwrap();
    let stats = ctx.run_round();
    for record in &stats {
        assert_eq!(record.ignored, 3);
        assert_eq!(record.rx_total, 0);
    }
}

#[test]
fn test_same_seed_replays_exactly() {
    let config = SimConfig { nodes: 8, seed: 77, packet_loss_percent: 30.0, ..SimConfig::default() };
    let run = |config: SimConfig| {
        let mut ctx = SimulationContext::new(config).unwrap();
        let mut sink = MemorySink::new();
        ctx.run_rounds(6, &mut sink, &mut NoGate);
        sink.records
    };
    assert_eq!(run(config.clone()), run(config));
}

#[test]
fn test_seed_changes_messages() {
    let a = SimulationContext::new(SimConfig { seed: 1, ..SimConfig::default() }).unwrap();
    let b = SimulationContext::new(SimConfig { seed: 2, ..SimConfig::default() }).unwrap();
    assert_ne!(a.generation().encoder().data(), b.generation().encoder().data());
}

#[test]
fn test_start_generation_resets_state() {
    let mut ctx = SimulationContext::new(mesh(4, Field::Binary8, 0.0, 6)).unwrap();
    let previous = ctx.generation().encoder().data().to_vec();
    ctx.run_rounds(3, &mut MemorySink::new(), &mut NoGate);

    ctx.start_generation().unwrap();
    assert_eq!(ctx.generation().index(), 1);
    assert_eq!(ctx.round(), 0);
    assert_ne!(ctx.generation().encoder().data(), previous.as_slice());
    for node in ctx.nodes() {
        assert_eq!(node.ranks().heuristic, 1);
        assert_eq!(node.counters.received, 0);
        assert_eq!(node.tx_total, 0);
        assert!(!node.is_sleeping());
        assert!(node.done_round.simple.is_none());
        assert!(ctx.generation().message(node.id).unwrap().starts_with(b"IAM"));
    }
}

#[test]
fn test_packet_loss_update_is_validated() {
    let mut ctx = SimulationContext::new(SimConfig::default()).unwrap();
    assert!(ctx.set_packet_loss(40.0).is_ok());
    assert_eq!(ctx.channel().packet_loss_percent, 40.0);
    assert!(ctx.set_packet_loss(140.0).is_err());
    assert_eq!(ctx.channel().packet_loss_percent, 40.0);
}

#[test]
fn test_summary_counts_complete_nodes() {
    let mut ctx = SimulationContext::new(mesh(3, Field::Binary8, 0.0, 42)).unwrap();
    let before = ctx.summary();
    assert_eq!(before.greedy.complete, 0);
    assert_eq!(before.greedy.below_half, 3);

    ctx.run_round();
    let after = ctx.summary();
    assert_eq!(after.greedy.complete, 3);
    assert_eq!(after.greedy.mean, 100.0);
}

#[test]
fn test_summary_counts_exactly_half_as_below_half() {
    let summary = AodSummary::from_values(&[50.0, 100.0, 20.0, 50.1]);
    assert_eq!(summary.below_half, 2);
    assert_eq!(summary.complete, 1);
    assert_eq!(summary.max, 100.0);
}
