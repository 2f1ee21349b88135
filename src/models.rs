//! The acquisition result handed to the scoring stage.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consistency::ConsistencyReport;
use crate::fetch::{FetchAttempt, Tier};
use crate::metrics::{PerformanceMetrics, SeoMetrics};
use crate::parse::PageContent;
use crate::structure::SiteStructure;

/// How much of the site the result is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisDepth {
    /// Nothing could be fetched; the result is a fallback.
    Limited,
    /// Only the homepage was parsed.
    SinglePage,
    /// The homepage and at least one more page were parsed.
    MultiPage,
    /// The homepage came from the headless tier.
    Headless,
    /// The homepage came from the third-party extraction tier.
    ThirdParty,
}

impl AnalysisDepth {
    /// Caveat for readers of a report built on this depth.
    pub fn caveat(self) -> &'static str {
        match self {
            AnalysisDepth::Limited => {
                "The site could not be accessed; no page content was analyzed."
            }
            AnalysisDepth::SinglePage => "Only the homepage was analyzed.",
            AnalysisDepth::MultiPage => "The homepage and several internal pages were analyzed.",
            AnalysisDepth::Headless => {
                "The homepage was rendered in a headless browser after direct access failed."
            }
            AnalysisDepth::ThirdParty => {
                "The homepage was obtained through a third-party extraction service."
            }
        }
    }
}

/// Everything acquired about one site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// The normalized URL that was requested.
    pub url: String,
    /// The parsed homepage (or the unavailable placeholder).
    pub homepage: PageContent,
    /// The homepage followed by every crawled page.
    pub pages: Vec<PageContent>,
    /// Structure of the site as seen from the homepage.
    pub structure: SiteStructure,
    /// Cross-page consistency of `pages`.
    pub consistency: ConsistencyReport,
    /// Performance scores; `None` means unknown.
    pub performance: Option<PerformanceMetrics>,
    /// robots.txt, sitemap and TLS probes.
    pub seo: SeoMetrics,
    /// How much of the site the result is based on.
    pub analysis_depth: AnalysisDepth,
    /// No tier succeeded and content fields carry the unavailable marker.
    pub fallback_used: bool,
    /// The tier whose output was used.
    pub tier: Option<Tier>,
    /// Every homepage fetch attempt, in order.
    pub attempts: Vec<FetchAttempt>,
    /// Latency of the homepage fetch that was used, in seconds.
    pub load_time_secs: Option<f64>,
    /// When acquisition finished.
    pub fetched_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Writes the result as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_page;
    use tempfile::TempDir;
    use url::Url;

    fn sample() -> CrawlResult {
        let url = Url::parse("https://acme.example/").unwrap();
        let homepage = parse_page("<html><head><title>Acme</title></head></html>", &url);
        CrawlResult {
            url: url.to_string(),
            pages: vec![homepage.clone()],
            homepage,
            structure: SiteStructure::default(),
            consistency: ConsistencyReport::insufficient_pages(),
            performance: None,
            seo: SeoMetrics::unknown(),
            analysis_depth: AnalysisDepth::SinglePage,
            fallback_used: false,
            tier: Some(Tier::Http),
            attempts: Vec::new(),
            load_time_secs: Some(0.42),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_analysis_depth_serialization() {
        assert_eq!(
            serde_json::to_string(&AnalysisDepth::MultiPage).unwrap(),
            "\"MULTI_PAGE\""
        );
        assert_eq!(
            serde_json::to_string(&AnalysisDepth::ThirdParty).unwrap(),
            "\"THIRD_PARTY\""
        );
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");
        sample().write_json(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["analysis_depth"], "SINGLE_PAGE");
        assert_eq!(written["homepage"]["title"], "Acme");
        assert_eq!(written["tier"], "http");
        assert!(written["performance"].is_null());
    }
}
