mod cli;
mod config;
mod input;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sweep_engine::{CancellationToken, FetchPool, PoolError, ReqwestTransport, RunSummary};
use sweep_logging::{sweep_info, sweep_warn};

use crate::cli::Cli;
use crate::progress::LoggingProgressSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    sweep_logging::initialize(cli.log.into(), cli.level(), &cli.log_file);

    let mut config = config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let urls = input::load_urls(&cli.urls, cli.limit)?;
    sweep_info!(
        "Loaded {} URLs from {:?} (proxy: {})",
        urls.len(),
        cli.urls,
        if config.transport.proxy.is_some() { "yes" } else { "no" }
    );

    let transport =
        Arc::new(ReqwestTransport::new(&config.transport).context("building http transport")?);
    let sink = Arc::new(LoggingProgressSink::new(urls.len(), cli.progress_every));
    let pool = FetchPool::new(transport, config.pool).with_progress_sink(sink);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            sweep_warn!("Interrupt received, draining in-flight requests");
            on_interrupt.cancel();
        }
    });

    let (summary, stopped_early) = settle(pool.run(urls, &cancel).await)?;

    sweep_info!(
        "Done: {}/{} succeeded ({:.1}%), {:.2} URLs/sec, {} bytes in {:?}",
        summary.succeeded,
        summary.attempted,
        summary.success_rate() * 100.0,
        summary.throughput(),
        summary.total_bytes,
        summary.elapsed
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing summary")?
    );
    if stopped_early {
        anyhow::bail!(
            "run stopped before every URL was fetched ({} skipped)",
            summary.skipped
        );
    }
    Ok(())
}

/// The summary to print and whether the run stopped before every URL was
/// fetched.
fn settle(result: Result<RunSummary, PoolError>) -> anyhow::Result<(RunSummary, bool)> {
    match result {
        Ok(summary) => Ok((summary, false)),
        Err(err) => match err.partial_summary() {
            Some(summary) => {
                sweep_warn!("{}", err);
                Ok((summary, true))
            }
            None => Err(err).context("fetch run failed"),
        },
    }
}
