use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use sweep_logging::LogDestination;

use crate::config::AppConfig;

/// Fetch a list of URLs with bounded concurrency and report outcome counts.
#[derive(Debug, Parser)]
#[command(name = "sweep", version)]
pub struct Cli {
    /// URL list: a JSON array of strings, or one URL per line.
    #[arg(long, short = 'u')]
    pub urls: PathBuf,

    /// RON configuration file.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Only fetch the first N URLs.
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Retries for rate-limited and network failures.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Cancel the run after this many seconds.
    #[arg(long)]
    pub budget_secs: Option<u64>,

    #[arg(long)]
    pub proxy: Option<String>,

    /// Log a progress line every N finished URLs (0 disables).
    #[arg(long, default_value_t = 10)]
    pub progress_every: usize,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[arg(long, default_value = "./sweep.log")]
    pub log_file: PathBuf,

    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

impl Cli {
    pub fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Flags win over the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(workers) = self.workers {
            config.pool.worker_count = workers;
        }
        if let Some(ms) = self.timeout_ms {
            let timeout = Duration::from_millis(ms);
            config.pool.request_timeout = timeout;
            config.transport.request_timeout = timeout;
        }
        if let Some(retries) = self.retries {
            config.pool.retry.max_retries = retries;
        }
        if let Some(secs) = self.budget_secs {
            config.pool.run_budget = Some(Duration::from_secs(secs));
        }
        if let Some(proxy) = &self.proxy {
            config.transport.proxy = Some(proxy.clone());
        }
    }
}
