//! Glue between acquisition and the external scoring stage.
//!
//! [`site_summary`] renders a [`CrawlResult`] as the plain-text site analysis
//! handed to the scoring backend. [`score_with_cache`] fingerprints the result
//! and only calls the backend when the score cache has no entry for it, so
//! unchanged content keeps its scores. Fallback results carry no content to
//! fingerprint and are never cached.

use std::fmt::Write as _;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cache::{ScoreStore, SectionScore};
use crate::config::METHODOLOGY_VERSION;
use crate::fingerprint::{fingerprint, WebsiteSignature};
use crate::models::CrawlResult;

/// Scores produced by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    /// Overall score, 0-100.
    pub overall_score: u8,
    /// Per-section scores.
    pub sections: Vec<SectionScore>,
}

/// The scoring stage, typically a text-generation service plus a parser for
/// its answer.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Scores a site from its summary text and the structured result.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce scores.
    async fn score(&self, summary: &str, result: &CrawlResult) -> Result<ScoreSet>;
}

/// Scores together with where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnalysis {
    /// Signature of the scored result.
    pub signature: WebsiteSignature,
    /// The scores.
    pub scores: ScoreSet,
    /// The scores were served from the cache.
    pub from_cache: bool,
}

/// Scores `result`, reusing cached scores for unchanged content.
///
/// # Errors
///
/// Returns the backend's error on a cache miss; nothing is cached then.
pub async fn score_with_cache(
    result: &CrawlResult,
    store: &dyn ScoreStore,
    backend: &dyn ScoringBackend,
) -> Result<ScoredAnalysis> {
    let signature = fingerprint(result);

    // Every fallback renders the same placeholder content
    if result.fallback_used {
        debug!("Scoring fallback result for {} without the cache", result.url);
        let scores = backend.score(&site_summary(result), result).await?;
        return Ok(ScoredAnalysis {
            signature,
            scores,
            from_cache: false,
        });
    }

    if let Some(entry) = store.get(&signature).await {
        info!("Reusing cached scores for {}", result.url);
        return Ok(ScoredAnalysis {
            signature,
            scores: ScoreSet {
                overall_score: entry.overall_score,
                sections: entry.section_scores,
            },
            from_cache: true,
        });
    }

    debug!("No cached scores for {}; calling the scoring backend", result.url);
    let summary = site_summary(result);
    let scores = backend.score(&summary, result).await?;
    store
        .put(
            signature.clone(),
            scores.overall_score,
            scores.sections.clone(),
            METHODOLOGY_VERSION,
        )
        .await;

    Ok(ScoredAnalysis {
        signature,
        scores,
        from_cache: false,
    })
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn score_or_unknown(score: Option<u8>) -> String {
    score.map_or_else(|| "unknown".to_string(), |s| format!("{s}/100"))
}

/// Renders the normalized site data as text for the scoring backend.
///
/// The text always starts with the analysis depth and its caveat so the
/// backend knows how much of the site it is looking at.
pub fn site_summary(result: &CrawlResult) -> String {
    let mut out = String::new();
    let home = &result.homepage;

    // Writing to a String cannot fail
    let _ = writeln!(out, "Website: {}", result.url);
    let _ = writeln!(
        out,
        "Analysis depth: {:?} ({})",
        result.analysis_depth,
        result.analysis_depth.caveat()
    );
    if result.fallback_used {
        let _ = writeln!(
            out,
            "No content could be retrieved. Do not make claims about the site's copy, design or brand."
        );
    }

    let _ = writeln!(out, "\nTitle: {}", home.title);
    let _ = writeln!(out, "Description: {}", home.description);
    let _ = writeln!(out, "Brand marker: {}", home.brand_marker_text);
    if !result.structure.navigation_menu_items.is_empty() {
        let _ = writeln!(
            out,
            "Navigation: {}",
            result.structure.navigation_menu_items.join(" | ")
        );
    }
    if !home.headings.is_empty() {
        let _ = writeln!(out, "Headings:");
        for heading in home.headings.iter().take(10) {
            let _ = writeln!(out, "  H{} {}", heading.level, heading.text);
        }
    }
    if !home.paragraphs.is_empty() {
        let _ = writeln!(out, "Key content:");
        for paragraph in home.paragraphs.iter().take(3) {
            let _ = writeln!(out, "  {paragraph}");
        }
    }

    if !result.pages.is_empty() {
        let _ = writeln!(out, "\nPages analyzed: {}", result.pages.len());
        for page in &result.pages {
            let _ = writeln!(out, "  [{}] {} - {}", page.page_type, page.url, page.title);
        }
    }

    let structure = &result.structure;
    let _ = writeln!(
        out,
        "\nFeatures: search {}, language selector {}, contact info {}, about page {}, blog {}, products {}",
        yes_no(structure.has_search),
        yes_no(structure.has_language_selector),
        yes_no(structure.has_contact_info),
        yes_no(structure.has_about_page),
        yes_no(structure.has_blog),
        yes_no(structure.has_products)
    );
    let _ = writeln!(
        out,
        "Forms: {} ({} fields, {} labeled); images without alt: {}/{}",
        home.forms.form_count,
        home.forms.input_count,
        home.forms.labeled_input_count,
        home.accessibility.images_missing_alt,
        home.accessibility.image_count
    );

    let consistency = &result.consistency;
    let _ = writeln!(
        out,
        "\nConsistency: brand {}/100, navigation {}/100, content {}/100",
        consistency.brand_score, consistency.navigation_score, consistency.content_score
    );
    for issue in &consistency.issues {
        let _ = writeln!(out, "  - {issue}");
    }

    match &result.performance {
        Some(performance) => {
            let _ = writeln!(
                out,
                "\nPerformance ({}): performance {}, accessibility {}, best practices {}, SEO {}",
                performance.strategy,
                score_or_unknown(performance.scores.performance),
                score_or_unknown(performance.scores.accessibility),
                score_or_unknown(performance.scores.best_practices),
                score_or_unknown(performance.scores.seo)
            );
            if let Some(lcp) = performance.vitals.largest_contentful_paint_ms {
                let _ = writeln!(out, "  LCP {:.0} ms", lcp);
            }
        }
        None => {
            let _ = writeln!(out, "\nPerformance: unknown");
        }
    }

    if result.seo.checked {
        let _ = writeln!(
            out,
            "SEO: HTTPS {}, robots.txt {}, sitemap {}",
            yes_no(result.seo.has_ssl),
            yes_no(result.seo.has_robots_txt),
            yes_no(result.seo.has_sitemap)
        );
    } else {
        let _ = writeln!(out, "SEO: not checked");
    }
    out
}
