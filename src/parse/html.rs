//! HTML element extraction.
//!
//! Each function reads one aspect of a parsed document. Text is whitespace
//! normalized; lists are capped at the limits in `config`.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::types::{AccessibilitySummary, FormSummary, Heading, MediaSummary};
use crate::config::{
    MAX_HEADINGS, MAX_IMAGE_ALTS, MAX_LINK_TEXTS, MAX_PARAGRAPHS, MAX_REGION_TEXT_CHARS,
};
use crate::utils::{normalize_whitespace, parse_selector_with_fallback, truncate_chars};

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("title", "title extraction"));
static META_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("meta[name='description' i]", "meta description extraction")
});
static OG_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("meta[property='og:description']", "meta description extraction")
});
static OG_SITE_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("meta[property='og:site_name']", "brand extraction")
});
static VIEWPORT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("meta[name='viewport' i]", "viewport detection")
});
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("h1, h2, h3, h4, h5, h6", "heading extraction"));
static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("p", "paragraph extraction"));
static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("img", "image extraction"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href]", "link extraction"));
static NAV_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("nav, [role='navigation']", "navigation extraction")
});
static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("header", "navigation extraction"));
static FOOTER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("footer, [role='contentinfo']", "footer extraction")
});
static LOGO_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "img[alt*='logo' i], img[src*='logo' i], img[class*='logo' i], img[id*='logo' i]",
        "brand extraction",
    )
});
static BRAND_CONTAINER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "a[class*='logo' i], a[class*='brand' i], div[class*='logo' i], span[class*='logo' i], \
         [id*='logo' i], [class*='site-title' i], [class*='site-name' i]",
        "brand extraction",
    )
});
static HTML_LANG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("html[lang]", "accessibility summary"));
static LANDMARK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "main, nav, header, footer, aside, [role='main'], [role='navigation'], \
         [role='banner'], [role='contentinfo'], [role='complementary']",
        "accessibility summary",
    )
});
static SKIP_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("a[href^='#']", "accessibility summary"));
static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("form", "form summary"));
static FIELD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "input:not([type='hidden' i]):not([type='submit' i]):not([type='button' i]):not([type='reset' i]):not([type='image' i]), select, textarea",
        "form summary",
    )
});
static LABEL_FOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("label[for]", "form summary"));
static CONTACT_FIELD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("input[type='email' i], textarea", "form summary")
});
static SEARCH_FIELD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback(
        "input[type='search' i], form[role='search'], [role='search'], input[name='q'], \
         input[name='s'], input[name='search' i], input[name='query' i]",
        "form summary",
    )
});
static VIDEO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("video", "media summary"));
static AUDIO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("audio", "media summary"));
static IFRAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("iframe[src]", "media summary"));

/// Hosts whose iframes count as embedded video players.
const VIDEO_EMBED_HOSTS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
    "wistia",
    "loom.com",
];

fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn attr(element: &ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(normalize_whitespace)
        .filter(|value| !value.is_empty())
}

/// Extracts the page title from an HTML document.
///
/// Returns the normalized text of the first `<title>`, or an empty string.
pub fn extract_title(document: &Html) -> String {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element_text(&element))
        .unwrap_or_default();
    log::debug!("Extracted title text: '{}'", title);
    title
}

/// Extracts the meta description, falling back to `og:description`.
pub fn extract_meta_description(document: &Html) -> String {
    document
        .select(&META_DESCRIPTION_SELECTOR)
        .chain(document.select(&OG_DESCRIPTION_SELECTOR))
        .find_map(|element| attr(&element, "content"))
        .unwrap_or_default()
}

/// Extracts non-empty headings in document order.
pub fn extract_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADING_SELECTOR)
        .filter_map(|element| {
            let level = element.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            let text = element_text(&element);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .take(MAX_HEADINGS)
        .collect()
}

/// Extracts the first non-empty paragraphs.
pub fn extract_paragraphs(document: &Html) -> Vec<String> {
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .take(MAX_PARAGRAPHS)
        .collect()
}

/// Extracts non-empty image alt texts.
pub fn extract_image_alts(document: &Html) -> Vec<String> {
    document
        .select(&IMAGE_SELECTOR)
        .filter_map(|element| attr(&element, "alt"))
        .take(MAX_IMAGE_ALTS)
        .collect()
}

/// Extracts non-empty link texts, falling back to `aria-label`.
pub fn extract_link_texts(document: &Html) -> Vec<String> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| {
            let text = element_text(&element);
            if text.is_empty() {
                attr(&element, "aria-label")
            } else {
                Some(text)
            }
        })
        .take(MAX_LINK_TEXTS)
        .collect()
}

/// The primary navigation region: the first `<nav>`, else the `<header>`.
fn navigation_region(document: &Html) -> Option<ElementRef<'_>> {
    document
        .select(&NAV_SELECTOR)
        .next()
        .or_else(|| document.select(&HEADER_SELECTOR).next())
}

/// Extracts the text of the primary navigation.
pub fn extract_navigation_text(document: &Html) -> String {
    navigation_region(document)
        .map(|nav| truncate_chars(&element_text(&nav), MAX_REGION_TEXT_CHARS))
        .unwrap_or_default()
}

/// Extracts the labels of the primary navigation links, de-duplicated in order.
pub fn extract_navigation_items(document: &Html) -> Vec<String> {
    let Some(nav) = navigation_region(document) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    nav.select(&LINK_SELECTOR)
        .map(|link| element_text(&link))
        .filter(|text| !text.is_empty() && seen.insert(text.to_lowercase()))
        .take(MAX_LINK_TEXTS)
        .collect()
}

/// Extracts the footer text.
pub fn extract_footer_text(document: &Html) -> String {
    document
        .select(&FOOTER_SELECTOR)
        .next()
        .map(|footer| truncate_chars(&element_text(&footer), MAX_REGION_TEXT_CHARS))
        .unwrap_or_default()
}

/// Extracts the site's brand marker.
///
/// In order of preference: the alt text of a logo image, the text of a
/// logo/brand container, the `og:site_name` meta tag. A logo image without
/// alt text yields `"logo"` so its presence still registers.
pub fn extract_brand_marker(document: &Html) -> String {
    if let Some(logo) = document.select(&LOGO_IMAGE_SELECTOR).next() {
        return attr(&logo, "alt").unwrap_or_else(|| "logo".to_string());
    }
    for container in document.select(&BRAND_CONTAINER_SELECTOR) {
        let text = element_text(&container);
        if !text.is_empty() {
            return truncate_chars(&text, 100);
        }
        if let Some(alt) = container
            .select(&IMAGE_SELECTOR)
            .find_map(|img| attr(&img, "alt"))
        {
            return alt;
        }
    }
    document
        .select(&OG_SITE_NAME_SELECTOR)
        .find_map(|meta| attr(&meta, "content"))
        .unwrap_or_default()
}

/// Checks if a page is mobile-friendly by looking for a viewport meta tag.
pub fn is_mobile_friendly(document: &Html) -> bool {
    document.select(&VIEWPORT_SELECTOR).next().is_some()
}

fn is_labeled(field: &ElementRef, label_targets: &HashSet<String>) -> bool {
    if attr(field, "aria-label").is_some() || attr(field, "aria-labelledby").is_some() {
        return true;
    }
    if let Some(id) = field.value().attr("id") {
        if label_targets.contains(id) {
            return true;
        }
    }
    field.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|element| element.name() == "label")
    })
}

/// Summarizes forms and their fields.
pub fn summarize_forms(document: &Html) -> FormSummary {
    let label_targets: HashSet<String> = document
        .select(&LABEL_FOR_SELECTOR)
        .filter_map(|label| label.value().attr("for").map(str::to_string))
        .collect();

    let fields: Vec<ElementRef> = document.select(&FIELD_SELECTOR).collect();
    let labeled_input_count = fields
        .iter()
        .filter(|field| is_labeled(field, &label_targets))
        .count();

    FormSummary {
        form_count: document.select(&FORM_SELECTOR).count(),
        input_count: fields.len(),
        labeled_input_count,
        has_contact_form: document
            .select(&FORM_SELECTOR)
            .any(|form| form.select(&CONTACT_FIELD_SELECTOR).next().is_some()),
        has_search_form: document.select(&SEARCH_FIELD_SELECTOR).next().is_some(),
    }
}

/// Summarizes accessibility signals.
pub fn summarize_accessibility(document: &Html) -> AccessibilitySummary {
    let images: Vec<ElementRef> = document.select(&IMAGE_SELECTOR).collect();
    AccessibilitySummary {
        has_lang_attribute: document
            .select(&HTML_LANG_SELECTOR)
            .any(|html| attr(&html, "lang").is_some()),
        has_viewport_meta: is_mobile_friendly(document),
        has_skip_link: document
            .select(&SKIP_LINK_SELECTOR)
            .any(|link| element_text(&link).to_lowercase().contains("skip")),
        landmark_count: document.select(&LANDMARK_SELECTOR).count(),
        image_count: images.len(),
        images_missing_alt: images
            .iter()
            .filter(|img| img.value().attr("alt").is_none())
            .count(),
    }
}

/// Summarizes embedded media.
pub fn summarize_media(document: &Html) -> MediaSummary {
    let embedded_videos = document
        .select(&IFRAME_SELECTOR)
        .filter(|iframe| {
            iframe.value().attr("src").is_some_and(|src| {
                let src = src.to_lowercase();
                VIDEO_EMBED_HOSTS.iter().any(|host| src.contains(host))
            })
        })
        .count();

    MediaSummary {
        image_count: document.select(&IMAGE_SELECTOR).count(),
        video_count: document.select(&VIDEO_SELECTOR).count() + embedded_videos,
        audio_count: document.select(&AUDIO_SELECTOR).count(),
    }
}
