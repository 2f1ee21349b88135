//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Acquisition configuration.
///
/// Usable programmatically (every field has a default via [`Default`]) and
/// flattened into the CLI parser by the binary.
///
/// # Examples
///
/// ```no_run
/// use site_audit::Config;
///
/// let config = Config {
///     max_pages: 3,
///     skip_metrics: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Pages crawled beyond the homepage
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Concurrent crawl workers (capped at 3)
    #[arg(long, default_value_t = MAX_CRAWL_WORKERS)]
    pub crawl_workers: usize,

    /// Per-page crawl timeout in seconds
    #[arg(long, default_value_t = CRAWL_PAGE_TIMEOUT_SECS)]
    pub crawl_timeout_secs: u64,

    /// Delay between crawl worker starts in milliseconds
    #[arg(long, default_value_t = CRAWL_STAGGER_MS)]
    pub crawl_stagger_ms: u64,

    /// Attempts made by the direct HTTP tier
    #[arg(long, default_value_t = DIRECT_MAX_ATTEMPTS)]
    pub direct_attempts: usize,

    /// Per-attempt timeout of the direct HTTP tier in seconds
    #[arg(long, default_value_t = DIRECT_TIMEOUT_SECS)]
    pub direct_timeout_secs: u64,

    /// Backoff unit between direct attempts in milliseconds
    #[arg(long, default_value_t = RETRY_BACKOFF_UNIT_MS)]
    pub retry_backoff_ms: u64,

    /// Headless render budget in seconds
    #[arg(long, default_value_t = HEADLESS_TIMEOUT_SECS)]
    pub headless_timeout_secs: u64,

    /// Settle delay after headless navigation in milliseconds
    #[arg(long, default_value_t = RENDER_SETTLE_MS)]
    pub render_settle_ms: u64,

    /// Chromium executable used by the headless tier (auto-detected if unset)
    #[arg(long)]
    pub browser_executable: Option<PathBuf>,

    /// Third-party extraction API endpoint
    #[arg(long, default_value = DEFAULT_EXTRACTION_API_URL)]
    pub extraction_api_url: String,

    /// Third-party extraction API key (tier disabled when unset)
    #[arg(long, env = "EXTRACTION_API_KEY", hide_env_values = true)]
    pub extraction_api_key: Option<String>,

    /// Third-party extraction timeout in seconds
    #[arg(long, default_value_t = EXTRACTION_TIMEOUT_SECS)]
    pub extraction_timeout_secs: u64,

    /// Skip performance and SEO collection
    #[arg(long)]
    pub skip_metrics: bool,

    /// Performance service endpoint
    #[arg(long, default_value = DEFAULT_PAGESPEED_API_URL)]
    pub pagespeed_api_url: String,

    /// Performance service API key
    #[arg(long, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    pub pagespeed_api_key: Option<String>,

    /// Performance service timeout in seconds
    #[arg(long, default_value_t = PERFORMANCE_TIMEOUT_SECS)]
    pub performance_timeout_secs: u64,

    /// robots.txt / sitemap.xml probe timeout in seconds
    #[arg(long, default_value_t = PROBE_TIMEOUT_SECS)]
    pub probe_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            max_pages: DEFAULT_MAX_PAGES,
            crawl_workers: MAX_CRAWL_WORKERS,
            crawl_timeout_secs: CRAWL_PAGE_TIMEOUT_SECS,
            crawl_stagger_ms: CRAWL_STAGGER_MS,
            direct_attempts: DIRECT_MAX_ATTEMPTS,
            direct_timeout_secs: DIRECT_TIMEOUT_SECS,
            retry_backoff_ms: RETRY_BACKOFF_UNIT_MS,
            headless_timeout_secs: HEADLESS_TIMEOUT_SECS,
            render_settle_ms: RENDER_SETTLE_MS,
            browser_executable: None,
            extraction_api_url: DEFAULT_EXTRACTION_API_URL.to_string(),
            extraction_api_key: None,
            extraction_timeout_secs: EXTRACTION_TIMEOUT_SECS,
            skip_metrics: false,
            pagespeed_api_url: DEFAULT_PAGESPEED_API_URL.to_string(),
            pagespeed_api_key: None,
            performance_timeout_secs: PERFORMANCE_TIMEOUT_SECS,
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Per-attempt timeout of the direct HTTP tier.
    pub fn direct_timeout(&self) -> Duration {
        Duration::from_secs(self.direct_timeout_secs)
    }

    /// Backoff unit between direct attempts.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Total budget of the headless tier.
    pub fn headless_timeout(&self) -> Duration {
        Duration::from_secs(self.headless_timeout_secs)
    }

    /// Settle delay after headless navigation.
    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    /// Single-attempt timeout of the extraction tier.
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Per-page crawl timeout.
    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }

    /// Start offset between crawl workers.
    pub fn crawl_stagger(&self) -> Duration {
        Duration::from_millis(self.crawl_stagger_ms)
    }

    /// Crawl worker count, never more than [`MAX_CRAWL_WORKERS`] and never zero.
    pub fn effective_crawl_workers(&self) -> usize {
        self.crawl_workers.clamp(1, MAX_CRAWL_WORKERS)
    }

    /// Performance service timeout.
    pub fn performance_timeout(&self) -> Duration {
        Duration::from_secs(self.performance_timeout_secs)
    }

    /// robots.txt / sitemap.xml probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
