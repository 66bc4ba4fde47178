//! Run one snapshot cleanup pass

use crate::config::SweepConfig;
use crate::report;
use crate::OutputFormat;
use anyhow::{Context, Result};
use longhorn::LonghornClient;
use std::sync::Arc;
use sweep_core::{ClusterApi, PolicyConfig};
use sweeper::{ClusterScanner, DeletionExecutor, RunSummary, VolumeProcessor};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn run(
    config: &SweepConfig,
    policy: &PolicyConfig,
    output: OutputFormat,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    // 1. Connect to the cluster
    let client = LonghornClient::new(&config.endpoint, config.request_timeout)
        .with_context(|| format!("Invalid cluster endpoint: {}", config.endpoint))?;
    info!(url = client.base_url(), "Using Longhorn manager");

    let api: Arc<dyn ClusterApi> = Arc::new(client);

    // 2. Sweep every volume
    let summary = execute(api, policy, config, cancel).await?;

    // 3. Display results
    match output {
        OutputFormat::Text => print!("{}", report::render_text(&summary)),
        OutputFormat::Json => println!("{}", report::render_json(&summary)?),
    }

    Ok(summary)
}

/// Scan the cluster behind `api` with the configured retry and dry-run settings
pub async fn execute(
    api: Arc<dyn ClusterApi>,
    policy: &PolicyConfig,
    config: &SweepConfig,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    if config.dry_run {
        info!("Dry run: no snapshot will be deleted or purged");
    }

    let executor = DeletionExecutor::new(api.clone(), config.retry).dry_run(config.dry_run);
    let processor = VolumeProcessor::new(api.clone(), executor, config.retry);
    let scanner = ClusterScanner::new(api, processor).with_cancellation(cancel);

    let mut summary = scanner
        .run(policy)
        .await
        .context("Snapshot cleanup aborted")?;
    summary.dry_run = config.dry_run;

    Ok(summary)
}
