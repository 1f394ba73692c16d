// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `wq-admin`: a direct CLI front end over `wq_engine::admin`'s operations
//! (spec.md §4.8). Deliberately not a JSON-RPC command dispatcher — that
//! indirection is an external collaborator (spec.md §1) this binary doesn't
//! need, since it talks to `wq_engine::admin` in process.

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use wq_adapters::RedisBrokerAdapter;
use wq_core::Priority;
use wq_engine::EngineConfig;

#[derive(Parser)]
#[command(name = "wq-admin", about = "Administrative commands for the work queue")]
struct Cli {
    /// Path to the engine's TOML config file.
    #[arg(long, default_value = "wqd.toml")]
    config: PathBuf,

    /// Redis connection URL; overrides the one implied by `--config` if set.
    #[arg(long)]
    redis_url: Option<String>,

    /// Render output as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print queue lengths, completed/dead-letter counts, and live worker count.
    Stats,
    /// Show up to `n` jobs from the tail of a queue without removing them.
    Peek {
        queue: String,
        #[arg(default_value_t = 10)]
        n: usize,
    },
    /// Delete jobs from the dead-letter list or every managed list.
    Purge {
        #[command(subcommand)]
        target: PurgeTarget,
    },
    /// Produce synthetic jobs and measure throughput until they complete.
    Bench {
        priority: String,
        #[arg(default_value_t = 100)]
        count: usize,
        #[arg(long, default_value_t = 50)]
        rate: u32,
        #[arg(long, default_value_t = 256)]
        payload_size: usize,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[derive(Subcommand)]
enum PurgeTarget {
    Dlq,
    All,
}

/// Just enough of the daemon's config shape to locate the broker and the
/// worker's queue layout; reuses `wq_engine::EngineConfig` directly so this
/// binary never drifts from the daemon's notion of queue names.
#[derive(Debug, serde::Deserialize)]
struct AdminConfig {
    redis_url: String,
    engine: EngineConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new("warn")).init();
    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.config).with_context(|| format!("reading config {}", cli.config.display()))?;
    let config: AdminConfig = toml::from_str(&raw).context("parsing config")?;
    let redis_url = cli.redis_url.unwrap_or(config.redis_url);

    let broker = RedisBrokerAdapter::connect(&redis_url).await.context("connecting to redis")?;

    match cli.command {
        Command::Stats => {
            let stats = wq_engine::admin::stats(&broker, &config.engine.worker).await?;
            output::print_stats(&stats, cli.json);
        }
        Command::Peek { queue, n } => {
            let jobs = wq_engine::admin::peek(&broker, &config.engine.worker, &queue, n).await?;
            output::print_jobs(&jobs, cli.json);
        }
        Command::Purge { target } => {
            let count = match target {
                PurgeTarget::Dlq => wq_engine::admin::purge_dlq(&broker, &config.engine.worker).await?,
                PurgeTarget::All => wq_engine::admin::purge_all(&broker, &config.engine.worker).await?,
            };
            if cli.json {
                println!("{}", serde_json::json!({ "purged": count }));
            } else {
                println!("purged {count} entries");
            }
        }
        Command::Bench { priority, count, rate, payload_size, timeout_secs } => {
            let result = wq_engine::admin::bench(
                &broker,
                &config.engine.worker,
                &config.engine.producer,
                &Priority::new(priority),
                count,
                rate,
                payload_size,
                Duration::from_secs(timeout_secs),
            )
            .await?;
            output::print_bench(&result, cli.json);
        }
    }

    Ok(())
}
