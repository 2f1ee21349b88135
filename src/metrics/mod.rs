//! External metrics collection.
//!
//! This module gathers the metrics that do not come from page content:
//! - Performance category scores and core web vitals from a PageSpeed-style
//!   scoring service
//! - robots.txt and sitemap presence from direct probes
//! - HTTPS availability and a certificate summary from a TLS handshake
//!
//! Every collector is bounded by its own timeout and degrades instead of
//! failing: a failed performance call yields `None`, a failed probe leaves its
//! flag `false`.

mod performance;
mod seo;
mod tls;
mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::utils::origin_of;

pub use performance::PerformanceClient;
pub use tls::get_certificate_summary;
pub use types::{CategoryScores, CertificateSummary, CoreWebVitals, PerformanceMetrics, SeoMetrics};

/// Source of performance and SEO metrics.
#[async_trait]
pub trait MetricsCollector: Send + Sync {
    /// Performance scores for `url`, `None` when unavailable.
    async fn get_performance(&self, url: &Url) -> Option<PerformanceMetrics>;

    /// Direct SEO probes for the site serving `url`.
    async fn get_seo(&self, url: &Url) -> SeoMetrics;
}

/// Collects metrics over the network.
pub struct NetworkMetrics {
    client: reqwest::Client,
    performance: PerformanceClient,
    probe_timeout: Duration,
    stats: Arc<ProcessingStats>,
}

impl NetworkMetrics {
    /// Creates a collector using the endpoints and timeouts from `config`.
    pub fn new(client: reqwest::Client, config: &Config, stats: Arc<ProcessingStats>) -> Self {
        Self {
            performance: PerformanceClient::new(
                client.clone(),
                config.pagespeed_api_url.clone(),
                config.pagespeed_api_key.clone(),
                config.performance_timeout(),
            ),
            client,
            probe_timeout: config.probe_timeout(),
            stats,
        }
    }
}

#[async_trait]
impl MetricsCollector for NetworkMetrics {
    async fn get_performance(&self, url: &Url) -> Option<PerformanceMetrics> {
        let metrics = self.performance.get_performance(url).await;
        if metrics.is_none() {
            self.stats.increment_error(ErrorType::PerformanceMetricsError);
        }
        metrics
    }

    async fn get_seo(&self, url: &Url) -> SeoMetrics {
        let Ok(origin) = Url::parse(&origin_of(url)) else {
            return SeoMetrics::unknown();
        };

        // Sites submitted as http:// often serve HTTPS too
        let tls_probe = async {
            let host = url.host_str()?;
            let port = tls_port(url);
            match get_certificate_summary(host, port).await {
                Ok(certificate) => Some(certificate),
                Err(e) => {
                    warn!("TLS probe failed: {e}");
                    self.stats.increment_error(ErrorType::TlsCertificateError);
                    None
                }
            }
        };
        let (files, certificate) = tokio::join!(
            seo::probe_crawl_files(&self.client, &origin, self.probe_timeout),
            tls_probe
        );

        debug!(
            "SEO probes for {}: robots={} sitemap={:?} tls={}",
            origin,
            files.has_robots_txt,
            files.sitemap_url,
            certificate.is_some()
        );
        SeoMetrics {
            checked: true,
            has_ssl: certificate.is_some(),
            has_robots_txt: files.has_robots_txt,
            has_sitemap: files.sitemap_url.is_some(),
            sitemap_url: files.sitemap_url,
            certificate,
        }
    }
}

/// Port to check for HTTPS: the URL's own port for `https` URLs, 443 otherwise.
fn tls_port(url: &Url) -> u16 {
    match url.scheme() {
        "https" => url.port_or_known_default().unwrap_or(443),
        _ => 443,
    }
}

/// Collector used when metrics are switched off; reports everything unknown.
pub struct DisabledMetrics;

#[async_trait]
impl MetricsCollector for DisabledMetrics {
    async fn get_performance(&self, _url: &Url) -> Option<PerformanceMetrics> {
        None
    }

    async fn get_seo(&self, _url: &Url) -> SeoMetrics {
        SeoMetrics::unknown()
    }
}
