// Copyright (c) Meta Platforms, Inc. and affiliates.

// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use clap::{Parser, Subcommand};

use scx_unitsched::config::{
    DEFAULT_CHILD_CPU, DEFAULT_PARENT_CPU, DEFAULT_TIME_QUANTUM, DEFAULT_UNIT_ITERATIONS,
};
use scx_unitsched::live::run_worker;
use scx_unitsched::{
    simulate, LiveConfig, LiveExecutor, Outcome, Report, SchedConfig, Simulator, Tick, Workload,
};

/// scx_unitsched: schedule a batch of processes with FIFO, RR, SJF or PSJF.
///
/// The batch is read from INPUT (or stdin) as: a policy token, a process
/// count N, then N records of `name ready_time exec_time`. The schedule is
/// printed as `name start end` lines sorted by completion time.
///
/// By default the schedule is computed on a virtual clock. With --live, every
/// process becomes a real worker pinned to --child-cpu and the scheduler
/// toggles workers between SCHED_OTHER and SCHED_IDLE to pick the runner.
#[derive(Debug, Parser)]
#[command(args_conflicts_with_subcommands = true)]
struct Opts {
    /// Batch input file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Drive real worker processes instead of the virtual clock.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    live: bool,

    /// Round-robin time quantum, in units.
    #[clap(short = 'q', long, default_value_t = DEFAULT_TIME_QUANTUM,
           value_parser = clap::value_parser!(u64).range(1..), env = "SCX_UNITSCHED_QUANTUM")]
    time_quantum: Tick,

    /// Busy-loop iterations making up one unit of time (live mode).
    #[clap(long, default_value_t = DEFAULT_UNIT_ITERATIONS)]
    unit_iterations: u64,

    /// CPU the scheduler pins itself to (live mode).
    #[clap(long, default_value_t = DEFAULT_PARENT_CPU)]
    parent_cpu: usize,

    /// CPU all workers are pinned to (live mode).
    #[clap(long, default_value_t = DEFAULT_CHILD_CPU)]
    child_cpu: usize,

    /// Print the scheduling trace to stderr.
    #[clap(long)]
    dump_trace: bool,

    /// Print turnaround, waiting and response statistics to stderr.
    #[clap(long)]
    stats: bool,

    /// Print the schedule as JSON.
    #[clap(long)]
    json: bool,

    /// Enable verbose output.
    /// Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Run as a launched worker. Used internally by --live.
    #[command(hide = true)]
    Worker {
        #[clap(long)]
        units: Tick,

        #[clap(long, default_value_t = DEFAULT_UNIT_ITERATIONS)]
        unit_iterations: u64,
    },
}

fn init_log(verbose: u8) -> Result<()> {
    let llv = match verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn run_live(opts: &Opts, config: SchedConfig, workload: &Workload) -> Result<Outcome> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::Relaxed);
    })
    .context("Failed to set Ctrl-C handler")?;

    let worker_program = std::env::current_exe().context("Failed to locate own executable")?;
    let live = LiveConfig {
        unit_iterations: opts.unit_iterations,
        parent_cpu: opts.parent_cpu,
        child_cpu: opts.child_cpu,
        ..LiveConfig::new(worker_program)
    };

    let executor = LiveExecutor::new(live, shutdown).context("Failed to set up live mode")?;
    let outcome = Simulator::new(config, executor)
        .run(workload)
        .context("Live scheduling aborted")?;
    Ok(outcome)
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_log(opts.verbose)?;

    if let Some(Cmd::Worker {
        units,
        unit_iterations,
    }) = opts.command
    {
        run_worker(units, unit_iterations);
        return Ok(());
    }

    let input = read_input(opts.input.as_ref())?;
    let workload = Workload::parse(&input).context("Failed to load workload")?;
    let config = SchedConfig {
        time_quantum: opts.time_quantum,
    };

    let outcome = if opts.live {
        run_live(&opts, config, &workload)?
    } else {
        simulate(&workload, config).context("Scheduling failed")?
    };

    if opts.dump_trace {
        outcome.trace.dump(&outcome.names());
    }

    let report = Report::new(&outcome);
    let mut stdout = io::stdout().lock();
    if opts.json {
        report.write_json(&mut stdout)?;
    } else {
        report.write_text(&mut stdout)?;
    }
    if opts.stats {
        report.write_summary(&mut io::stderr().lock())?;
    }

    Ok(())
}
