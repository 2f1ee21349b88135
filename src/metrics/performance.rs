//! Performance scoring service client (PageSpeed Insights v5 response format).

use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use url::Url;

use super::types::{CategoryScores, CoreWebVitals, PerformanceMetrics};

/// Device strategy requested from the service.
const STRATEGY: &str = "mobile";

/// Categories requested from the service.
const CATEGORIES: &[&str] = &["performance", "accessibility", "best-practices", "seo"];

/// Client for a PageSpeed-style performance API.
pub struct PerformanceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PerformanceClient {
    /// Creates a client for `endpoint`.
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            timeout,
        }
    }

    /// Requests a lab run for `url`.
    ///
    /// # Returns
    ///
    /// `None` on any failure: network error, timeout, non-2xx status or a
    /// response without a Lighthouse result.
    pub async fn get_performance(&self, url: &Url) -> Option<PerformanceMetrics> {
        let mut query: Vec<(&str, &str)> = vec![("url", url.as_str()), ("strategy", STRATEGY)];
        query.extend(CATEGORIES.iter().map(|category| ("category", *category)));
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let response = match self
            .client
            .get(&self.endpoint)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Performance request for {} failed: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(
                "Performance service returned {} for {}",
                response.status(),
                url
            );
            return None;
        }
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Unreadable performance response for {}: {}", url, e);
                return None;
            }
        };

        let metrics = parse_lighthouse(&body);
        if metrics.is_none() {
            debug!("Performance response for {} has no lighthouseResult", url);
        }
        metrics
    }
}

/// Category score as 0-100; the service reports 0.0-1.0.
fn category_score(categories: &Value, key: &str) -> Option<u8> {
    categories[key]["score"]
        .as_f64()
        .map(|score| (score * 100.0).round().clamp(0.0, 100.0) as u8)
}

fn audit_value(audits: &Value, key: &str) -> Option<f64> {
    audits[key]["numericValue"].as_f64()
}

/// Extracts scores and vitals from a PageSpeed response body.
pub(crate) fn parse_lighthouse(body: &Value) -> Option<PerformanceMetrics> {
    let lighthouse = body.get("lighthouseResult")?;
    let categories = &lighthouse["categories"];
    let audits = &lighthouse["audits"];

    Some(PerformanceMetrics {
        strategy: lighthouse["configSettings"]["formFactor"]
            .as_str()
            .unwrap_or(STRATEGY)
            .to_string(),
        scores: CategoryScores {
            performance: category_score(categories, "performance"),
            accessibility: category_score(categories, "accessibility"),
            best_practices: category_score(categories, "best-practices"),
            seo: category_score(categories, "seo"),
        },
        vitals: CoreWebVitals {
            largest_contentful_paint_ms: audit_value(audits, "largest-contentful-paint"),
            first_contentful_paint_ms: audit_value(audits, "first-contentful-paint"),
            cumulative_layout_shift: audit_value(audits, "cumulative-layout-shift"),
            total_blocking_time_ms: audit_value(audits, "total-blocking-time"),
            speed_index_ms: audit_value(audits, "speed-index"),
        },
    })
}
