use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use log::{error, info, warn};
use ncsim_channel::ChannelConfig;
use ncsim_core::Strategy;
use ncsim_math::Field;
use ncsim_sim::{AodSummary, NodeStats, RunOutcome, SimConfig, SimulationContext, StatsSink, StepGate};

#[derive(Parser)]
#[command(about = "Cooperative RLNC dissemination simulator")]
struct Cli {
    /// JSON configuration, flat or with a "Parameters" section.
    #[arg(long)] config: Option<PathBuf>,
    #[arg(long)] nodes: Option<usize>,
    #[arg(long)] symbol_size: Option<usize>,
    #[arg(long, value_parser = parse_field)] field: Option<Field>,
    #[arg(long)] seed: Option<u64>,
    #[arg(long)] rounds: Option<u32>,
    #[arg(long)] generations: Option<u32>,
    /// Packet loss, 0-100.
    #[arg(long)] loss: Option<f64>,
    /// Chance Simple keeps each pivot coefficient.
    #[arg(long)] sparsity: Option<f64>,
    #[arg(long)] full_duplex: bool,
    #[arg(long)] multi_rx: bool,
    /// Contention-free medium: only packet loss applies.
    #[arg(long)] ideal: bool,
    /// Keep running each generation until every node decodes everything.
    #[arg(long)] to_full_aod: bool,
    /// Write one JSON record per node per round to this file.
    #[arg(long)] stats: Option<PathBuf>,
}

fn parse_field(s: &str) -> Result<Field, String> {
    s.parse::<Field>().map_err(|e| e.to_string())
}

impl Cli {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(v) = self.nodes { config.nodes = v; }
        if let Some(v) = self.symbol_size { config.symbol_size = v; }
        if let Some(v) = self.field { config.field = v; }
        if let Some(v) = self.seed { config.seed = v; }
        if let Some(v) = self.rounds { config.rounds = v; }
        if let Some(v) = self.generations { config.generations = v; }
        if let Some(v) = self.loss { config.packet_loss_percent = v; }
        if let Some(v) = self.sparsity { config.include_probability = v; }
        if self.full_duplex { config.full_duplex = true; }
        if self.multi_rx { config.multi_channel_rx = true; }
        if self.ideal {
            config.set_channel(ChannelConfig::ideal(config.packet_loss_percent));
        }
    }
}

/// JSON Lines statistics file. The first write error is kept and reported on finish.
struct StatsWriter {
    out: Option<BufWriter<File>>,
    failed: Option<std::io::Error>,
}

impl StatsWriter {
    fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        let out = match path {
            Some(p) => Some(BufWriter::new(
                File::create(p).with_context(|| format!("cannot create {}", p.display()))?,
            )),
            None => None,
        };
        Ok(Self { out, failed: None })
    }

    fn finish(mut self) -> anyhow::Result<()> {
        if let Some(e) = self.failed.take() {
            return Err(e).context("writing statistics");
        }
        if let Some(out) = self.out.as_mut() {
            out.flush().context("flushing statistics")?;
        }
        Ok(())
    }
}

impl StatsSink for StatsWriter {
    fn record(&mut self, stats: &NodeStats) {
        if self.failed.is_some() { return; }
        let Some(out) = self.out.as_mut() else { return };
        let written = serde_json::to_writer(&mut *out, stats)
            .map_err(std::io::Error::from)
            .and_then(|_| out.write_all(b"\n"));
        if let Err(e) = written {
            error!("statistics write failed: {}", e);
            self.failed = Some(e);
        }
    }
}

/// Stops the run once the signal handler clears the flag.
struct SignalGate {
    running: Arc<AtomicBool>,
}

impl StepGate for SignalGate {
    fn wait_for_next(&mut self) {}

    fn should_stop(&mut self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }
}

fn print_summary(ctx: &SimulationContext, outcome: Option<RunOutcome>) {
    let header = format!("generation {} after {} rounds", ctx.generation().index(), ctx.round());
    let status = match outcome {
        Some(RunOutcome::Complete { .. }) => "complete".green(),
        Some(RunOutcome::TimedOut { .. }) => "timed out".red(),
        Some(RunOutcome::Interrupted { .. }) => "interrupted".yellow(),
        None => "".normal(),
    };
    println!("{} {}", header.bold(), status);
    println!("{:<10} {:>8} {:>8} {:>11} {:>12}", "", "Max AoD", "Avg AoD", "Nodes 100%", "Nodes <=50%");

    let summary = ctx.summary();
    let nodes = ctx.nodes().len();
    for s in Strategy::ALL {
        let AodSummary { max, mean, complete, below_half } = summary[s];
        let line = format!("{:<10} {:>7.1}% {:>7.1}% {:>11} {:>12}", s.name(), max, mean, complete, below_half);
        let line = if complete == nodes {
            line.green()
        } else if below_half > 0 {
            line.red()
        } else {
            line.yellow()
        };
        println!("{}", line);
    }
    let overhead: Vec<String> = Strategy::ALL
        .iter()
        .map(|&s| format!("{} {}", s, ctx.nodes().iter().map(|n| n.overhead[s]).sum::<u64>()))
        .collect();
    println!("{} {}", "overhead bits:".dimmed(), overhead.join(", "));
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    info!(
        ">>> NCSIM: {} nodes, {} byte symbols over {}, seed {} <<<",
        config.nodes, config.symbol_size, config.field, config.seed
    );
    let channel = config.channel();
    info!(
        "Medium: {} channels x {} slots, loss {}%, collisions {:?}",
        channel.channels, channel.timeslots, channel.packet_loss_percent, channel.collisions
    );

    let mut ctx = SimulationContext::new(config.clone())?;
    let mut sink = StatsWriter::open(cli.stats.as_deref())?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut gate = SignalGate { running };
    for g in 0..config.generations {
        if gate.should_stop() { break; }
        if g > 0 { ctx.start_generation()?; }

        let outcome = if cli.to_full_aod {
            Some(ctx.run_to_full_aod(config.round_ceiling, &mut sink, &mut gate))
        } else {
            ctx.run_rounds(config.rounds, &mut sink, &mut gate);
            None
        };
        print_summary(&ctx, outcome);
    }

    sink.finish()
}
