//! The typed result used when no tier produced a page.

use chrono::Utc;

use crate::config::UNAVAILABLE_MARKER;
use crate::consistency::compare;
use crate::fetch::FetchAttempt;
use crate::metrics::SeoMetrics;
use crate::models::{AnalysisDepth, CrawlResult};
use crate::parse::{AccessibilitySummary, FormSummary, MediaSummary, PageContent, PageType};
use crate::structure::SiteStructure;

/// A homepage record whose text fields all carry [`UNAVAILABLE_MARKER`].
///
/// `url` keeps the requested address; list fields are empty and summaries are
/// zeroed.
pub fn unavailable_page(url: &str) -> PageContent {
    PageContent {
        url: url.to_string(),
        title: UNAVAILABLE_MARKER.to_string(),
        description: UNAVAILABLE_MARKER.to_string(),
        headings: Vec::new(),
        paragraphs: Vec::new(),
        image_alt_texts: Vec::new(),
        link_texts: Vec::new(),
        navigation_text: UNAVAILABLE_MARKER.to_string(),
        footer_text: UNAVAILABLE_MARKER.to_string(),
        brand_marker_text: UNAVAILABLE_MARKER.to_string(),
        forms: FormSummary::default(),
        accessibility: AccessibilitySummary::default(),
        media: MediaSummary::default(),
        is_homepage: true,
        page_type: PageType::Homepage,
    }
}

/// Builds the fallback result for `url`.
pub fn fallback_result(url: &str, attempts: Vec<FetchAttempt>) -> CrawlResult {
    CrawlResult {
        url: url.to_string(),
        homepage: unavailable_page(url),
        pages: Vec::new(),
        structure: SiteStructure::default(),
        consistency: compare(&[]),
        performance: None,
        seo: SeoMetrics::unknown(),
        analysis_depth: AnalysisDepth::Limited,
        fallback_used: true,
        tier: None,
        attempts,
        load_time_secs: None,
        fetched_at: Utc::now(),
    }
}
