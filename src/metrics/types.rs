//! Metric record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lighthouse category scores, 0-100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    /// Performance category.
    pub performance: Option<u8>,
    /// Accessibility category.
    pub accessibility: Option<u8>,
    /// Best practices category.
    pub best_practices: Option<u8>,
    /// SEO category.
    pub seo: Option<u8>,
}

/// Core web vitals as measured by the lab run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    /// Largest contentful paint in milliseconds.
    pub largest_contentful_paint_ms: Option<f64>,
    /// First contentful paint in milliseconds.
    pub first_contentful_paint_ms: Option<f64>,
    /// Cumulative layout shift (unitless).
    pub cumulative_layout_shift: Option<f64>,
    /// Total blocking time in milliseconds.
    pub total_blocking_time_ms: Option<f64>,
    /// Speed index in milliseconds.
    pub speed_index_ms: Option<f64>,
}

/// Result of the performance scoring service.
///
/// Absent (`None` in [`crate::CrawlResult`]) means unknown, never "bad".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Device strategy the run used.
    pub strategy: String,
    /// Category scores.
    pub scores: CategoryScores,
    /// Lab timings.
    pub vitals: CoreWebVitals,
}

/// Summary of the server certificate seen during the TLS probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSummary {
    /// Negotiated protocol version, e.g. `TLSv1_3`.
    pub tls_version: String,
    /// Subject distinguished name.
    pub subject: String,
    /// Issuer distinguished name.
    pub issuer: String,
    /// End of the validity period.
    pub valid_to: Option<DateTime<Utc>>,
}

/// Results of the direct robots.txt, sitemap and TLS probes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetrics {
    /// The probes ran; `false` means every other field is unknown.
    pub checked: bool,
    /// The site is served over HTTPS and the TLS handshake succeeded.
    pub has_ssl: bool,
    /// `/robots.txt` is served as a plain-text file.
    pub has_robots_txt: bool,
    /// A sitemap was found at `/sitemap.xml` or where robots.txt points.
    pub has_sitemap: bool,
    /// Where the sitemap was found.
    pub sitemap_url: Option<String>,
    /// Certificate details from the TLS probe.
    pub certificate: Option<CertificateSummary>,
}

impl SeoMetrics {
    /// Metrics that were never collected.
    pub fn unknown() -> Self {
        Self::default()
    }
}
