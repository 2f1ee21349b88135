// Shared helpers for the acquisition tests.
//
// The direct tier is the real `HttpFetcher` talking to an `httptest` server;
// the headless and third-party tiers are scripted stand-ins.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use site_audit::fetch::{FetchRequest, FetchedPage, HttpFetcher, PageFetcher, Tier};
use site_audit::metrics::DisabledMetrics;
use site_audit::{Acquirer, Config, FetchError};

/// A tier that serves a fixed body (or fails) and counts its calls.
pub struct ScriptedTier {
    tier: Tier,
    body: Option<String>,
    calls: Mutex<usize>,
}

impl ScriptedTier {
    /// A tier that always returns `body`.
    pub fn serving(tier: Tier, body: &str) -> Arc<Self> {
        Arc::new(Self {
            tier,
            body: Some(body.to_string()),
            calls: Mutex::new(0),
        })
    }

    /// A tier that always fails the way an unconfigured tier does.
    pub fn unavailable(tier: Tier) -> Arc<Self> {
        Arc::new(Self {
            tier,
            body: None,
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PageFetcher for ScriptedTier {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        *self.calls.lock().unwrap() += 1;
        match &self.body {
            Some(body) => Ok(FetchedPage {
                final_url: request.url.clone(),
                http_status: Some(200),
                body: body.clone(),
            }),
            None if self.tier == Tier::ThirdParty => Err(FetchError::NotConfigured),
            None => Err(FetchError::EngineUnavailable("no browser in tests".to_string())),
        }
    }
}

/// Fast settings: millisecond backoff, no crawl stagger, no metrics.
pub fn test_config() -> Config {
    Config {
        retry_backoff_ms: 1,
        crawl_stagger_ms: 0,
        direct_timeout_secs: 5,
        skip_metrics: true,
        ..Default::default()
    }
}

/// An acquirer whose direct tier is real HTTP.
pub fn acquirer(headless: Arc<ScriptedTier>, extraction: Arc<ScriptedTier>) -> Acquirer {
    Acquirer::with_components(
        test_config(),
        Arc::new(HttpFetcher::new(reqwest::Client::new())),
        headless,
        extraction,
        Arc::new(DisabledMetrics),
    )
}
