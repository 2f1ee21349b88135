//! Site structure analysis.
//!
//! Reads the homepage's HTML for the shape of the site: which internal pages it
//! links to (the crawl candidates), what its navigation offers and which
//! common site features are present.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::config::MAX_DISCOVERED_LINKS;
use crate::domain::same_site;
use crate::parse::{
    classify_page_type, extract_headings, extract_navigation_items, summarize_forms, PageType,
};
use crate::utils::{normalize_whitespace, page_key, parse_selector_with_fallback, resolve_link};

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href]", "structure link discovery"));
static CONTACT_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("a[href^='mailto:' i], a[href^='tel:' i], address", "contact detection")
});
static LANGUAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "link[rel='alternate'][hreflang], a[hreflang], select[name*='lang' i], \
         [class*='language' i], [class*='lang-switch' i], [id*='language' i]",
        "language selector detection",
    )
});

/// Extensions of links that are never HTML pages.
const NON_PAGE_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".json",
    ".xml", ".zip", ".gz", ".mp4", ".mp3", ".webm", ".doc", ".docx", ".xls", ".xlsx", ".ppt",
    ".pptx", ".woff", ".woff2", ".ttf",
];

/// An internal page linked from the analyzed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Absolute URL without fragment.
    pub url: String,
    /// Normalized anchor text (or `aria-label`).
    pub anchor_text: String,
    /// Role inferred from path and anchor text.
    pub page_type: PageType,
}

/// Shape of a site as seen from one page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteStructure {
    /// Same-site links, in document order, at most `MAX_DISCOVERED_LINKS`.
    pub discovered_internal_links: Vec<DiscoveredLink>,
    /// Labels of the primary navigation links.
    pub navigation_menu_items: Vec<String>,
    /// A search field or search form is present.
    pub has_search: bool,
    /// Alternate languages are offered.
    pub has_language_selector: bool,
    /// Heading levels in document order.
    pub heading_level_sequence: Vec<u8>,
    /// Email, phone or postal contact details, or a contact page link.
    pub has_contact_info: bool,
    /// A link to an about page exists.
    pub has_about_page: bool,
    /// A link to a blog or news section exists.
    pub has_blog: bool,
    /// A link to a products or shop section exists.
    pub has_products: bool,
    /// This page plus the discovered internal pages.
    pub page_count: usize,
}

impl SiteStructure {
    /// Discovered links ordered by page type priority, document order within a type.
    pub fn prioritized_links(&self) -> Vec<DiscoveredLink> {
        let mut links = self.discovered_internal_links.clone();
        links.sort_by_key(|link| link.page_type);
        links
    }
}

fn is_page_link(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    !NON_PAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Collects same-site page links, de-duplicated and capped.
fn discover_links(document: &Html, base_url: &Url) -> Vec<DiscoveredLink> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(page_key(base_url));

    let mut links = Vec::new();
    for anchor in document.select(&LINK_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(base_url, href) else {
            continue;
        };
        if !same_site(base_url, &url) || !is_page_link(&url) {
            continue;
        }
        if !seen.insert(page_key(&url)) {
            continue;
        }

        let mut anchor_text = normalize_whitespace(&anchor.text().collect::<String>());
        if anchor_text.is_empty() {
            anchor_text = anchor
                .value()
                .attr("aria-label")
                .map(normalize_whitespace)
                .unwrap_or_default();
        }
        let page_type = classify_page_type(url.path(), &anchor_text);
        links.push(DiscoveredLink {
            url: url.to_string(),
            anchor_text,
            page_type,
        });
        if links.len() == MAX_DISCOVERED_LINKS {
            break;
        }
    }
    links
}

/// Analyzes the structure of a site from one page's HTML.
///
/// # Arguments
///
/// * `base_url` - The URL the HTML was served from; links resolve against it
/// * `html` - The page HTML
pub fn analyze_structure(base_url: &Url, html: &str) -> SiteStructure {
    let document = Html::parse_document(html);
    let links = discover_links(&document, base_url);
    let forms = summarize_forms(&document);

    let has_type = |page_type: PageType| links.iter().any(|link| link.page_type == page_type);
    let has_contact_details = document.select(&CONTACT_LINK_SELECTOR).next().is_some();

    SiteStructure {
        navigation_menu_items: extract_navigation_items(&document),
        has_search: forms.has_search_form,
        has_language_selector: document.select(&LANGUAGE_SELECTOR).next().is_some(),
        heading_level_sequence: extract_headings(&document)
            .iter()
            .map(|heading| heading.level)
            .collect(),
        has_contact_info: has_contact_details || forms.has_contact_form || has_type(PageType::Contact),
        has_about_page: has_type(PageType::About),
        has_blog: has_type(PageType::Blog),
        has_products: has_type(PageType::Products),
        page_count: links.len() + 1,
        discovered_internal_links: links,
    }
}
