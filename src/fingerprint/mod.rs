//! Website fingerprinting.
//!
//! A [`WebsiteSignature`] identifies "this analysis of this content". It is
//! made of three independent SHA-256 digests so callers can tell what changed:
//! - content: homepage title plus the leading characters of all page text
//! - structure: navigation items, page count and site feature flags
//! - metadata: SSL availability and load time rounded to 0.1 s
//!
//! Only content and structure decide whether two analyses are the same; the
//! metadata digest is informational.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::FINGERPRINT_CONTENT_CHARS;
use crate::models::CrawlResult;
use crate::parse::PageContent;

/// Hash-based identity of one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteSignature {
    /// Digest of the text content.
    pub content_hash: String,
    /// Digest of the navigation structure and feature flags.
    pub structure_hash: String,
    /// Digest of SSL and load time.
    pub metadata_hash: String,
    /// When the signature was computed.
    pub created_at: DateTime<Utc>,
}

impl WebsiteSignature {
    /// `true` when content and structure are unchanged.
    pub fn matches(&self, other: &WebsiteSignature) -> bool {
        self.content_hash == other.content_hash && self.structure_hash == other.structure_hash
    }

    /// Cache key built from the content and structure digests.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.content_hash, self.structure_hash)
    }
}

/// Equality compares the three digests; `created_at` is ignored.
impl PartialEq for WebsiteSignature {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other) && self.metadata_hash == other.metadata_hash
    }
}

impl Eq for WebsiteSignature {}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

fn page_text(page: &PageContent) -> String {
    let mut parts: Vec<&str> = vec![page.title.as_str(), page.description.as_str()];
    parts.extend(page.headings.iter().map(|heading| heading.text.as_str()));
    parts.extend(page.paragraphs.iter().map(String::as_str));
    parts.join("\n")
}

/// Title plus the first `FINGERPRINT_CONTENT_CHARS` characters of page text.
///
/// Pages are taken in URL order so crawl order cannot change the digest.
fn content_projection(result: &CrawlResult) -> String {
    let mut pages: Vec<&PageContent> = if result.pages.is_empty() {
        vec![&result.homepage]
    } else {
        result.pages.iter().collect()
    };
    pages.sort_by(|a, b| a.url.cmp(&b.url));

    let aggregated: String = pages
        .iter()
        .map(|page| page_text(page))
        .collect::<Vec<_>>()
        .join("\n\n")
        .chars()
        .take(FINGERPRINT_CONTENT_CHARS)
        .collect();
    format!("{}\n{}", result.homepage.title, aggregated)
}

fn structure_projection(result: &CrawlResult) -> String {
    let structure = &result.structure;
    let flags = [
        structure.has_search,
        structure.has_language_selector,
        structure.has_contact_info,
        structure.has_about_page,
        structure.has_blog,
        structure.has_products,
    ]
    .iter()
    .map(|flag| if *flag { '1' } else { '0' })
    .collect::<String>();

    format!(
        "nav={}\npages={}\nflags={}",
        structure.navigation_menu_items.join("|"),
        result.pages.len(),
        flags
    )
}

fn metadata_projection(result: &CrawlResult) -> String {
    let load_time = result
        .load_time_secs
        .map(|secs| format!("{secs:.1}"))
        .unwrap_or_else(|| "unknown".to_string());
    format!("ssl={}\nload={}", result.seo.has_ssl, load_time)
}

/// Computes the signature of an acquisition result.
///
/// Deterministic: results built from identical pages, structure and metadata
/// produce equal signatures.
pub fn fingerprint(result: &CrawlResult) -> WebsiteSignature {
    WebsiteSignature {
        content_hash: sha256_hex(&content_projection(result)),
        structure_hash: sha256_hex(&structure_projection(result)),
        metadata_hash: sha256_hex(&metadata_projection(result)),
        created_at: Utc::now(),
    }
}
