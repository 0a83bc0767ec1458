//! keylru - replay command scripts against an LRU cache, or stress it

mod config;
mod replay;
mod script;
mod stress;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keylru::Cache;
use tracing::info;

use crate::replay::Replayer;
use crate::stress::StressPlan;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON cache config file ({"capacity": N, "name": "..."})
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache capacity (number of items); overrides the config file
    #[arg(short, long, global = true)]
    capacity: Option<usize>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run a command script, printing one reply per command
    Run {
        /// Script file; reads stdin when omitted or "-"
        script: Option<PathBuf>,
    },

    /// Hammer one cache from many threads and verify it afterwards
    Stress {
        /// Worker threads
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
        threads: u64,

        /// Operations per thread
        #[arg(short, long, default_value_t = 10_000)]
        ops: usize,

        /// Distinct keys shared by all workers
        #[arg(short, long, default_value_t = 256)]
        keys: usize,
    },
}

fn main() -> Result<()> {
    // Replies go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref(), args.capacity)?;
    let cache = Arc::new(Cache::with_config(&config)?);
    info!(cache = %config.name, capacity = config.capacity, "cache ready");

    match args.command {
        Mode::Run { script } => run_script(cache, script),
        Mode::Stress { threads, ops, keys } => {
            let plan = StressPlan {
                threads: threads as usize,
                ops,
                keys,
            };
            let report = stress::run(cache, plan)?;
            println!(
                "{} threads x {} ops in {:.2?}, final size {}",
                plan.threads, plan.ops, report.elapsed, report.size
            );
            println!("{}", serde_json::to_string_pretty(&report.stats)?);
            Ok(())
        }
    }
}

fn run_script(cache: Arc<Cache<replay::Record>>, path: Option<PathBuf>) -> Result<()> {
    let src = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("reading script {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading script from stdin")?;
            buf
        }
    };

    let commands = script::parse_script(&src)?;
    if commands.is_empty() {
        bail!("script contains no commands");
    }

    let replayer = Replayer::new(cache);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (lineno, cmd) in commands {
        let reply = replayer.execute(cmd);
        writeln!(out, "{}", reply).with_context(|| format!("writing reply for line {}", lineno))?;
    }
    out.flush()?;
    Ok(())
}
