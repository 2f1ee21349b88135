//! Page acquisition tiers.
//!
//! Every way of obtaining a page's HTML implements [`PageFetcher`]:
//! - [`HttpFetcher`] - direct HTTP with browser-like headers (Tier 1, also used by the crawl)
//! - [`HeadlessFetcher`] - a headless Chromium render (Tier 2)
//! - [`ExtractionApiFetcher`] - a third-party scraping service (Tier 3)
//!
//! The orchestrator only sees the trait, which is also the seam tests use to
//! substitute scripted fetchers.

mod extraction;
mod headless;
mod http;
mod request;
mod types;

use async_trait::async_trait;

use crate::error_handling::FetchError;

pub use extraction::ExtractionApiFetcher;
pub use headless::HeadlessFetcher;
pub use http::HttpFetcher;
pub use types::{FetchAttempt, FetchRequest, FetchStatus, FetchedPage, Tier};

/// A source of rendered page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// The tier this fetcher implements.
    fn tier(&self) -> Tier;

    /// Fetches one page.
    ///
    /// Implementations honour `request.timeout` as the total budget of the
    /// call, apply `request.user_agent` when given and never retry.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why no usable page was obtained.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;
}
