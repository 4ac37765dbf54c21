// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! ATIS - Automated Tire Inspection System
//!
//! Headless monitoring node: runs the live inspection feed, raises alerts
//! for unsafe tires, escalates the ones nobody answers and logs every
//! event as it happens.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use atis::{Config, Database, Engine, VERSION};

/// ATIS - Automated Tire Inspection System
#[derive(Parser, Debug)]
#[command(name = "atis")]
#[command(author = "ATIS Project")]
#[command(version = VERSION)]
#[command(about = "Live tire inspection feed with alert lifecycle monitoring")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Fixed RNG seed for a reproducible feed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration: Option<u64>,

    /// Data output directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("ATIS v{} - Automated Tire Inspection System", VERSION);

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if let Some(seed) = args.seed {
        config.simulator.rng_seed = Some(seed);
    }
    if let Some(data_dir) = args.data_dir {
        config.database.path = data_dir.join("atis.db");
        config.data_dir = data_dir;
    }
    config.validate()?;

    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_headless(config, args.duration.map(Duration::from_secs)))
}

/// Run until Ctrl+C or until `duration` elapses
async fn run_headless(config: Config, duration: Option<Duration>) -> Result<()> {
    info!("Initializing headless mode...");

    let db = Arc::new(Database::open(&config.database)?);
    info!("Database opened at {:?}", config.database.path);

    let engine = Engine::with_database(config, db)?;
    info!("Core engine initialized");

    // Event log
    let bus = engine.event_bus();
    let _subscriptions = vec![
        bus.on_inspection_created(|record| {
            info!(
                inspection_id = %record.inspection_id,
                location = %record.location,
                status = ?record.status,
                "inspection.created"
            );
            Ok(())
        }),
        bus.on_alert_updated(|alert| {
            info!(
                alert_id = %alert.alert_id,
                status = ?alert.status,
                escalated = alert.escalated,
                "alert.updated"
            );
            Ok(())
        }),
    ];
    let pending = engine.pending_count_view();
    let alarm = engine.alarm_notifier();

    engine.start()?;
    info!("ATIS running in headless mode");

    match duration {
        Some(duration) => {
            info!("   Running for {:?}", duration);
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                result = tokio::signal::ctrl_c() => result?,
            }
        }
        None => {
            info!("   Press Ctrl+C to shutdown");
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("Shutdown signal received, cleaning up...");
    engine.stop();

    let stats = engine.dashboard_stats();
    let state = engine.state();
    println!("ATIS summary");
    println!("  inspections today : {}", stats.total_inspections);
    println!("  safe / unsafe     : {} / {}", stats.safe_count, stats.unsafe_count);
    println!("  avg latency       : {} ms", stats.avg_processing_latency_ms);
    println!("  alerts pending    : {} (badge {})", stats.alerts_pending, pending.count());
    println!("  alerts total      : {}", state.alerts_total);
    println!("  alarms sounded    : {}", alarm.alarm_count());
    println!("  events published  : {}", state.events_published);
    println!("  uptime            : {} s", state.uptime_seconds);

    info!("ATIS shutdown complete");
    Ok(())
}
