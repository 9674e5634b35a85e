mod prompt;
mod report;

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use lbsim_core::{MetricsCollector, Observer, Scheduler, SimConfig, Snapshot, Summary};
use log::{info, warn};

use report::{CsvLog, StatusPrinter};

const SERVER_RANGE: std::ops::RangeInclusive<u64> = 1..=50;
const CYCLE_RANGE: std::ops::RangeInclusive<u64> = 100..=50_000;

#[derive(Parser, Debug)]
#[command(name = "lbsim")]
#[command(about = "Discrete-event load balancer simulation")]
struct Args {
    /// Initial (and minimum) number of servers; prompted for when omitted
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=50))]
    servers: Option<u64>,

    /// Number of clock cycles to simulate; prompted for when omitted
    #[arg(long, value_parser = clap::value_parser!(u64).range(100..=50_000))]
    cycles: Option<u64>,

    /// Upper bound for autoscaling (default: twice the initial servers)
    #[arg(long)]
    max_servers: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with simulation settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-cycle CSV log
    #[arg(long, default_value = "loadbalancer_log.csv")]
    csv: PathBuf,

    /// Human-readable run summary
    #[arg(long, default_value = "log.txt")]
    summary: PathBuf,

    /// Write a CSV row every N cycles (the last cycle is always written)
    #[arg(long, default_value = "100")]
    log_every: u64,

    /// Print a status line every N cycles; 0 disables
    #[arg(long, default_value = "1")]
    status_every: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("===== Load Balancer Simulation =====");
    let config = resolve_config(&args)?;
    let cycles = match args.cycles {
        Some(n) => n,
        None => match ask(CYCLE_PROMPT, CYCLE_RANGE)? {
            Some(n) => n,
            None => anyhow::bail!("no cycle count given"),
        },
    };

    println!(
        "\nRunning simulation with {} servers for {} cycles...\n",
        config.initial_servers, cycles
    );

    let mut scheduler = Scheduler::from_config(config).context("invalid simulation settings")?;

    let csv = match CsvLog::create(&args.csv, args.log_every, cycles) {
        Ok(log) => Some(log),
        Err(e) => {
            warn!("cannot open {}: {}, skipping CSV log", args.csv.display(), e);
            None
        }
    };
    let mut reporters = Reporters {
        csv,
        status: StatusPrinter {
            every: args.status_every,
        },
        metrics: MetricsCollector::new(1024, args.log_every),
    };
    scheduler.run(cycles, &mut reporters);
    let Reporters { csv, metrics, .. } = reporters;

    if let Some(csv) = csv {
        csv.finish()
            .with_context(|| format!("failed to flush {}", args.csv.display()))?;
        println!("\nLog file saved as '{}'", args.csv.display());
    }

    let summary = Summary::from_scheduler(&scheduler);
    fs::write(&args.summary, format!("{summary}\n"))
        .with_context(|| format!("failed to write {}", args.summary.display()))?;
    println!("Summary log saved as '{}'", args.summary.display());

    info!(
        "peak sampled queue depth {}, peak servers {}",
        metrics.peak_queue_depth(),
        scheduler.peak_servers()
    );

    println!("\n===== Simulation Summary =====");
    println!("Starting queue size: {}", summary.starting_queue_size);
    println!("Ending queue size: {}", summary.ending_queue_size);
    println!("Blocked requests: {}", summary.blocked_requests);
    println!("Blocked IP addresses: {}", summary.blocked_ips);
    println!(
        "Range of task times: {}-{} clock cycles",
        summary.min_service_time, summary.max_service_time
    );

    let teardown = scheduler.shutdown();
    info!(
        "discarded {} queued and {} in-flight requests",
        teardown.queued, teardown.in_flight
    );
    Ok(())
}

/// Everything that watches the run, fanned out from one observer.
struct Reporters {
    csv: Option<CsvLog<BufWriter<File>>>,
    status: StatusPrinter,
    metrics: MetricsCollector,
}

impl Observer for Reporters {
    fn on_cycle(&mut self, snapshot: &Snapshot) {
        if let Some(csv) = self.csv.as_mut() {
            csv.on_cycle(snapshot);
        }
        self.status.on_cycle(snapshot);
        self.metrics.on_cycle(snapshot);
    }
}

const SERVER_PROMPT: &str = "Enter number of servers";
const CYCLE_PROMPT: &str = "Enter total clock cycles to run the simulation";

fn ask(question: &str, range: std::ops::RangeInclusive<u64>) -> Result<Option<u64>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt::read_in_range(&mut stdin.lock(), &mut stdout, question, range)
        .context("failed to read from stdin")
}

fn resolve_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimConfig::default(),
    };

    let servers = match (args.servers, &args.config) {
        (Some(n), _) => Some(n),
        (None, Some(_)) => None,
        (None, None) => match ask(SERVER_PROMPT, SERVER_RANGE)? {
            Some(n) => Some(n),
            None => anyhow::bail!("no server count given"),
        },
    };
    apply_flags(&mut config, args, servers);

    config.validate()?;
    Ok(config)
}

/// A config file's `max_servers` survives `--servers`; only the built-in
/// default is derived from the server count.
fn apply_flags(config: &mut SimConfig, args: &Args, servers: Option<u64>) {
    if let Some(n) = servers {
        config.initial_servers = n as usize;
        if args.config.is_none() {
            config.max_servers = n as usize * 2;
        }
    }
    if let Some(max) = args.max_servers {
        config.max_servers = max;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
}
