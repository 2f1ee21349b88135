//! Cross-page consistency analysis.
//!
//! Compares the parsed pages of one site along three dimensions:
//! - brand: share of pages that show a logo or brand marker
//! - navigation: number of distinct navigation renderings
//! - content: title formatting pattern and the one-`<h1>` rule
//!
//! Every score starts at 100 and loses a fixed penalty per failed check. With
//! fewer than two pages nothing can be compared and all scores are neutral.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::{
    BRAND_PRESENCE_THRESHOLD, DEVIATION_TOLERANCE, MAJOR_CONSISTENCY_PENALTY,
    MAX_NAVIGATION_VARIANTS, MINOR_CONSISTENCY_PENALTY, NEUTRAL_CONSISTENCY_SCORE,
};
use crate::parse::PageContent;
use crate::utils::normalize_whitespace;

/// Separators that split a page name from the site name in titles.
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " :: ", " : ", " · ", " » "];

/// Issue text for fewer than two pages.
pub const INSUFFICIENT_PAGES_ISSUE: &str =
    "Insufficient pages: at least two pages are needed to compare consistency";

/// Issue text when navigation differs between pages.
pub const NAVIGATION_VARIES_ISSUE: &str = "Navigation varies across pages";

/// Result of comparing the pages of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Brand presence score, 0-100.
    pub brand_score: u8,
    /// Navigation consistency score, 0-100.
    pub navigation_score: u8,
    /// Title and heading consistency score, 0-100.
    pub content_score: u8,
    /// Problems found.
    pub issues: Vec<String>,
    /// One recommendation per problem.
    pub recommendations: Vec<String>,
}

impl ConsistencyReport {
    /// The low-confidence report used when fewer than two pages are available.
    pub fn insufficient_pages() -> Self {
        Self {
            brand_score: NEUTRAL_CONSISTENCY_SCORE,
            navigation_score: NEUTRAL_CONSISTENCY_SCORE,
            content_score: NEUTRAL_CONSISTENCY_SCORE,
            issues: vec![INSUFFICIENT_PAGES_ISSUE.to_string()],
            recommendations: vec![
                "Make more pages reachable from the homepage so they can be compared".to_string(),
            ],
        }
    }

    fn flag(&mut self, issue: String, recommendation: &str) {
        self.issues.push(issue);
        self.recommendations.push(recommendation.to_string());
    }
}

/// The title formatting pattern: the first separator found, or none.
fn title_pattern(title: &str) -> Option<&'static str> {
    TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep).map(|pos| (pos, *sep)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, sep)| sep.trim())
}

/// Fraction of pages whose title pattern differs from the most common one.
fn title_deviation(pages: &[PageContent]) -> f64 {
    let mut counts: HashMap<Option<&'static str>, usize> = HashMap::new();
    for page in pages {
        *counts.entry(title_pattern(&page.title)).or_insert(0) += 1;
    }
    let dominant = counts.values().copied().max().unwrap_or(0);
    (pages.len() - dominant) as f64 / pages.len() as f64
}

fn apply_penalty(score: u8, penalty: u8) -> u8 {
    score.saturating_sub(penalty)
}

/// Compares the pages of one site.
///
/// # Arguments
///
/// * `pages` - Parsed pages, homepage included
///
/// # Returns
///
/// [`ConsistencyReport::insufficient_pages`] for fewer than two pages.
pub fn compare(pages: &[PageContent]) -> ConsistencyReport {
    if pages.len() < 2 {
        return ConsistencyReport::insufficient_pages();
    }
    let total = pages.len() as f64;
    let mut report = ConsistencyReport {
        brand_score: 100,
        navigation_score: 100,
        content_score: 100,
        issues: Vec::new(),
        recommendations: Vec::new(),
    };

    let branded = pages
        .iter()
        .filter(|page| !page.brand_marker_text.trim().is_empty())
        .count();
    let brand_presence = branded as f64 / total;
    if brand_presence < BRAND_PRESENCE_THRESHOLD {
        report.brand_score = apply_penalty(report.brand_score, MAJOR_CONSISTENCY_PENALTY);
        report.flag(
            format!(
                "Brand marker present on only {} of {} pages",
                branded,
                pages.len()
            ),
            "Show the logo or brand name in a shared header on every page",
        );
    }

    let navigation_variants: HashSet<String> = pages
        .iter()
        .map(|page| normalize_whitespace(&page.navigation_text).to_lowercase())
        .collect();
    if navigation_variants.len() > MAX_NAVIGATION_VARIANTS {
        report.navigation_score =
            apply_penalty(report.navigation_score, MAJOR_CONSISTENCY_PENALTY);
        report.flag(
            format!(
                "{}: {} different menus on {} pages",
                NAVIGATION_VARIES_ISSUE,
                navigation_variants.len(),
                pages.len()
            ),
            "Use one navigation menu across the whole site",
        );
    }

    if title_deviation(pages) > DEVIATION_TOLERANCE {
        report.content_score = apply_penalty(report.content_score, MINOR_CONSISTENCY_PENALTY);
        report.flag(
            "Page titles follow different formatting patterns".to_string(),
            "Format titles the same way, e.g. \"Page | Brand\"",
        );
    }

    let irregular_h1 = pages.iter().filter(|page| page.h1_count() != 1).count();
    if irregular_h1 as f64 / total > DEVIATION_TOLERANCE {
        report.content_score = apply_penalty(report.content_score, MINOR_CONSISTENCY_PENALTY);
        report.flag(
            format!(
                "{} of {} pages do not have exactly one <h1>",
                irregular_h1,
                pages.len()
            ),
            "Give every page exactly one <h1> heading",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_page;
    use url::Url;

    fn page(path: &str, title: &str, nav: &str, brand: bool, h1s: usize) -> PageContent {
        let logo = if brand {
            r#"<img class="logo" src="/l.png" alt="Acme">"#
        } else {
            ""
        };
        let headings: String = (0..h1s).map(|i| format!("<h1>Heading {i}</h1>")).collect();
        let html = format!(
            "<html><head><title>{title}</title></head><body>\
             <header>{logo}</header><nav>{nav}</nav>{headings}<p>Text</p></body></html>"
        );
        let url = Url::parse(&format!("https://acme.example{path}")).unwrap();
        parse_page(&html, &url)
    }

    #[test]
    fn test_single_page_is_neutral() {
        let report = compare(&[page("/", "Acme", "Home About", true, 1)]);
        assert_eq!(report.brand_score, 50);
        assert_eq!(report.navigation_score, 50);
        assert_eq!(report.content_score, 50);
        assert!(!report.issues.is_empty());
        assert_eq!(compare(&[]), ConsistencyReport::insufficient_pages());
    }

    #[test]
    fn test_identical_navigation_has_no_navigation_issue() {
        let pages = [
            page("/", "Home | Acme", "Home About Contact", true, 1),
            page("/about", "About | Acme", "Home About Contact", true, 1),
        ];
        let report = compare(&pages);
        assert_eq!(report.navigation_score, 100);
        assert!(!report
            .issues
            .iter()
            .any(|issue| issue.starts_with(NAVIGATION_VARIES_ISSUE)));
    }

    #[test]
    fn test_consistent_site_scores_full_marks() {
        let pages = [
            page("/", "Home | Acme", "Home About", true, 1),
            page("/about", "About | Acme", "Home About", true, 1),
            page("/contact", "Contact | Acme", "Home About", true, 1),
        ];
        let report = compare(&pages);
        assert_eq!(
            (report.brand_score, report.navigation_score, report.content_score),
            (100, 100, 100)
        );
        assert!(report.issues.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_navigation_variants_over_limit() {
        let pages = [
            page("/", "Home | Acme", "Home About", true, 1),
            page("/about", "About | Acme", "Home Team", true, 1),
            page("/blog", "Blog | Acme", "Posts Archive", true, 1),
        ];
        let report = compare(&pages);
        assert_eq!(report.navigation_score, 70);
        assert!(report.issues[0].starts_with(NAVIGATION_VARIES_ISSUE));
    }

    #[test]
    fn test_two_navigation_variants_are_tolerated() {
        let pages = [
            page("/", "Home | Acme", "Home About", true, 1),
            page("/about", "About | Acme", "Home About", true, 1),
            page("/blog", "Blog | Acme", "Posts Archive", true, 1),
        ];
        assert_eq!(compare(&pages).navigation_score, 100);
    }

    #[test]
    fn test_missing_brand_marker() {
        let pages = [
            page("/", "Home | Acme", "Nav", true, 1),
            page("/a", "A | Acme", "Nav", true, 1),
            page("/b", "B | Acme", "Nav", true, 1),
            page("/c", "C | Acme", "Nav", true, 1),
            page("/d", "D | Acme", "Nav", false, 1),
        ];
        // 4 of 5 is exactly the threshold
        assert_eq!(compare(&pages).brand_score, 100);

        let report = compare(&pages[3..]);
        assert_eq!(report.brand_score, 70);
        assert_eq!(report.issues.len(), report.recommendations.len());
    }

    #[test]
    fn test_content_penalties_stack() {
        let pages = [
            page("/", "Acme", "Nav", true, 0),
            page("/about", "About - Acme", "Nav", true, 2),
            page("/blog", "Blog | Acme", "Nav", true, 1),
        ];
        let report = compare(&pages);
        assert_eq!(report.content_score, 60);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_title_pattern() {
        assert_eq!(title_pattern("About | Acme"), Some("|"));
        assert_eq!(title_pattern("About - Acme | Blog"), Some("-"));
        assert_eq!(title_pattern("Acme"), None);
        assert_eq!(title_pattern("Well-known"), None);
    }
}
