//! HTML parsing and content extraction.
//!
//! This module turns raw HTML into a [`PageContent`] record:
//! - Title, meta description, headings, leading paragraphs
//! - Image alt texts and link texts
//! - Navigation, footer and brand-marker text
//! - Form, accessibility and media summaries
//! - Page type classification
//!
//! Parsing never fails: missing elements yield empty values and malformed
//! markup is repaired by the HTML5 parser in `scraper`. The same input always
//! produces the same record.

mod html;
mod page_type;
mod types;

use scraper::Html;
use url::Url;

pub use html::{
    extract_brand_marker, extract_footer_text, extract_headings, extract_image_alts,
    extract_link_texts, extract_meta_description, extract_navigation_items,
    extract_navigation_text, extract_paragraphs, extract_title, is_mobile_friendly,
    summarize_accessibility, summarize_forms, summarize_media,
};
pub use page_type::{classify_page_type, is_homepage_path};
pub use types::{AccessibilitySummary, FormSummary, Heading, MediaSummary, PageContent, PageType};

/// Parses a page into normalized content.
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `page_url` - The URL the HTML was served from (after redirects)
pub fn parse_page(html: &str, page_url: &Url) -> PageContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let is_homepage = is_homepage_path(page_url.path());
    let page_type = if is_homepage {
        PageType::Homepage
    } else {
        classify_page_type(page_url.path(), &title)
    };

    PageContent {
        url: page_url.to_string(),
        description: extract_meta_description(&document),
        headings: extract_headings(&document),
        paragraphs: extract_paragraphs(&document),
        image_alt_texts: extract_image_alts(&document),
        link_texts: extract_link_texts(&document),
        navigation_text: extract_navigation_text(&document),
        footer_text: extract_footer_text(&document),
        brand_marker_text: extract_brand_marker(&document),
        forms: summarize_forms(&document),
        accessibility: summarize_accessibility(&document),
        media: summarize_media(&document),
        is_homepage,
        page_type,
        title,
    }
}
