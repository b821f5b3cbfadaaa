//! # Reprocess
//!
//! Runs one reprocessing batch against a seeded in-memory store and prints the
//! batch report as JSON. Useful for exercising pool sizing, delays and failure
//! injection without a real store.

use anyhow::Context;
use clap::Parser;
use reprocessor_core::logging::init_structured_logging;
use reprocessor_core::{BatchReprocessor, ConfigManager, FaultPlan, InMemoryRecordStore, Record};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "reprocess")]
#[command(about = "Reprocess every record of a seeded in-memory store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file (default: config/reprocessor.yaml when present)
    #[arg(short, long, env = "REPROCESSOR_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Number of records to seed
    #[arg(short, long, default_value_t = 25, env = "REPROCESSOR_DEMO_RECORDS")]
    records: usize,

    /// Record ids whose persist should fail
    #[arg(long, value_delimiter = ',')]
    fail_ids: Vec<i64>,

    /// Record ids that are listed but gone by the time they are looked up
    #[arg(long, value_delimiter = ',')]
    missing_ids: Vec<i64>,

    /// Simulated store latency in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_file(path),
        None => ConfigManager::load(),
    }
    .context("loading reprocessor configuration")?;
    let config = manager.config().clone();
    init_structured_logging(config.log_format);

    let store = Arc::new(
        InMemoryRecordStore::new()
            .with_latency(std::time::Duration::from_millis(cli.latency_ms))
            .with_faults(FaultPlan {
                failing_persists: cli.fail_ids.iter().copied().collect::<HashSet<_>>(),
                vanishing: cli.missing_ids.iter().copied().collect::<HashSet<_>>(),
                ..Default::default()
            }),
    );
    for i in 1..=cli.records {
        store.insert(Record::new(
            format!("record-{i}"),
            format!("seeded record {i}"),
            format!("record{i}@example.com"),
        ));
    }

    let reprocessor = BatchReprocessor::from_config(store, config)?;

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling batch");
                cancel.cancel();
            }
        })
    };

    let report = reprocessor
        .reprocess_all_with_cancellation(cancel)
        .await
        .context("reprocessing batch")?;
    ctrl_c.abort();

    info!(
        batch_id = %report.batch_id,
        processed = report.processed_count(),
        skipped = report.skipped_count(),
        failed = report.failed_count(),
        "Batch finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
