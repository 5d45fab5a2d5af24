//! levelup CLI - earliest level-up estimates from a progress snapshot.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use clap::{ArgAction, Parser, Subcommand};
use levelup_core::{Stage, StageDurationTable};
use levelup_execution::{EngineConfig, EstimationContext, RefreshEngine};
use levelup_progress::DateFormatter;
use levelup_storage::{ItemSource, JsonFileSource};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "levelup")]
#[command(about = "Estimate the earliest level-up date from a progress snapshot", long_about = None)]
struct Cli {
    /// JSON engine config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fraction of kanji that must reach Guru (overrides config)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Print the debug dump
    #[arg(long, global = true)]
    debug: bool,

    /// Render times in UTC instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate once and exit
    Estimate {
        /// Snapshot file or directory
        #[arg(long)]
        snapshot: PathBuf,
        /// Load time (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep estimating, refreshing whenever the next item becomes available.
    /// Press Enter to refresh on demand.
    Watch {
        /// Snapshot file or directory
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Show the stage ladder and hours to Guru
    Stages,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the estimate
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(path: Option<&Path>, threshold: Option<f64>, debug: bool) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold);
    }
    if debug {
        config = config.with_debug(true);
    }

    anyhow::ensure!(
        config.threshold > 0.0 && config.threshold <= 1.0,
        "threshold must be in (0, 1], got {}",
        config.threshold
    );
    debug!("Engine config: {:?}", config);
    Ok(config)
}

fn display_offset(utc: bool) -> FixedOffset {
    if utc {
        Utc.fix()
    } else {
        Local::now().offset().fix()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let offset = display_offset(cli.utc);

    match cli.command {
        Commands::Estimate { snapshot, now, json } => {
            let config = load_config(cli.config.as_deref(), cli.threshold, cli.debug).await?;
            let source = JsonFileSource::new(&snapshot);
            let raw = source
                .fetch_snapshot()
                .await
                .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

            let now = now.unwrap_or_else(Utc::now);
            let context = EstimationContext::build(raw, now, config.threshold);
            let summary = context.summary();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let formatter = DateFormatter::new(now, offset);
                println!("{}", summary.render(&formatter));
                if config.debug.enabled {
                    println!();
                    println!("{}", context.debug_dump(&formatter, config.debug.detailed));
                }
            }
        }
        Commands::Watch { snapshot } => {
            let config = load_config(cli.config.as_deref(), cli.threshold, cli.debug).await?;
            let mut engine = RefreshEngine::new(JsonFileSource::new(&snapshot))
                .with_config(config)
                .with_offset(offset)
                .with_observer(|outcome| {
                    println!("{}", outcome.summary.render(&outcome.formatter));
                    if let Some(dump) = &outcome.debug_dump {
                        println!();
                        println!("{}", dump);
                    }
                    println!();
                });

            // closing stdin must not end the watch, so keep one handle here
            let _keep_running = engine.handle();
            let handle = engine.handle();
            // A blocked stdin read must not hold up runtime shutdown
            std::thread::spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    if line.is_err() || !handle.trigger() {
                        break;
                    }
                }
            });

            info!("Watching {}", snapshot.display());
            engine.run().await?;
        }
        Commands::Stages => {
            println!("Stage\tLabel\tHours to Guru");
            for value in Stage::UNLOCKED.value()..=Stage::FINAL.value() {
                let stage = Stage::new(value);
                let hours = match StageDurationTable::hours_to_milestone(stage) {
                    Some(hours) => format!("{}h", hours),
                    None if stage.reached_milestone() => "reached".to_string(),
                    None => "-".to_string(),
                };
                println!("{}\t{}\t{}", value, stage.label(), hours);
            }
        }
    }

    Ok(())
}
