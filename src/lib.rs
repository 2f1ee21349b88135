//! site_audit library: website acquisition and normalization
//!
//! This library turns a website URL into structured site data ready for
//! scoring. Pages are fetched through escalating tiers (direct HTTP, a
//! headless browser, then a third-party extraction service), parsed,
//! crawled for a handful of internal pages and enriched with performance and
//! SEO metrics. When every tier fails the result is an explicit fallback, so
//! callers always get a fully populated value.
//!
//! # Example
//!
//! ```no_run
//! use site_audit::{fingerprint, Acquirer, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! site_audit::initialization::init_crypto_provider();
//! let acquirer = Acquirer::new(Config::default())?;
//!
//! let result = acquirer.acquire("example.com").await;
//! println!(
//!     "{}: {:?}, {} pages, fallback: {}",
//!     result.url,
//!     result.analysis_depth,
//!     result.pages.len(),
//!     result.fallback_used
//! );
//! let signature = fingerprint(&result);
//! println!("cache key {}", signature.cache_key());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod consistency;
mod crawl;
mod domain;
mod error_handling;
pub mod fetch;
mod fingerprint;
pub mod initialization;
pub mod metrics;
mod models;
mod orchestrator;
pub mod parse;
pub mod protection;
mod scoring;
pub mod structure;
mod user_agent;
mod utils;

// Re-export public API
pub use cache::{InMemoryScoreCache, ScoreCacheEntry, ScoreStore, SectionScore};
pub use config::{Config, LogFormat, LogLevel};
pub use crawl::{CrawlCoordinator, CrawlOptions};
pub use error_handling::{FetchError, InitializationError, ProcessingStats};
pub use fingerprint::{fingerprint, WebsiteSignature};
pub use models::{AnalysisDepth, CrawlResult};
pub use orchestrator::{analysis_depth, fallback_result, Acquirer};
pub use scoring::{score_with_cache, site_summary, ScoreSet, ScoredAnalysis, ScoringBackend};
pub use user_agent::user_agent_for_attempt;
