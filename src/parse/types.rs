//! Parsed page data types.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Role of a page within a site.
///
/// Variants are declared in classification priority order: when a URL or
/// label matches several types, the earliest wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PageType {
    /// Company, team or story pages.
    About,
    /// Contact details or contact forms.
    Contact,
    /// Service offerings.
    Services,
    /// Product catalog or shop.
    Products,
    /// Plans and prices.
    Pricing,
    /// Blog, news and articles.
    Blog,
    /// The site root.
    Homepage,
    /// Anything else.
    Other,
}

/// A heading and its level (1-6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 for `<h1>`.
    pub level: u8,
    /// Normalized heading text.
    pub text: String,
}

/// Forms found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSummary {
    /// Number of `<form>` elements.
    pub form_count: usize,
    /// User-editable fields (text-like inputs, selects, textareas).
    pub input_count: usize,
    /// Fields with an associated label or ARIA name.
    pub labeled_input_count: usize,
    /// A form asks for an email address or free text.
    pub has_contact_form: bool,
    /// A search field or search form is present.
    pub has_search_form: bool,
}

/// Accessibility signals of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilitySummary {
    /// `<html lang="...">` is set.
    pub has_lang_attribute: bool,
    /// A viewport meta tag is present (mobile friendly layout).
    pub has_viewport_meta: bool,
    /// A skip-to-content link is present.
    pub has_skip_link: bool,
    /// Landmark elements and roles (main, nav, header, footer, aside).
    pub landmark_count: usize,
    /// `<img>` elements.
    pub image_count: usize,
    /// `<img>` elements without an `alt` attribute.
    pub images_missing_alt: usize,
}

/// Media embedded in a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSummary {
    /// `<img>` elements.
    pub image_count: usize,
    /// `<video>` elements and embedded video players.
    pub video_count: usize,
    /// `<audio>` elements.
    pub audio_count: usize,
}

/// Normalized content of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// URL the content was served from.
    pub url: String,
    /// `<title>` text; empty when absent.
    pub title: String,
    /// Meta description (or Open Graph description); empty when absent.
    pub description: String,
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Leading non-empty paragraphs.
    pub paragraphs: Vec<String>,
    /// Non-empty image alt texts.
    pub image_alt_texts: Vec<String>,
    /// Non-empty link texts.
    pub link_texts: Vec<String>,
    /// Text of the primary navigation.
    pub navigation_text: String,
    /// Text of the footer.
    pub footer_text: String,
    /// Logo or brand text; empty when none is found.
    pub brand_marker_text: String,
    /// Form summary.
    pub forms: FormSummary,
    /// Accessibility summary.
    pub accessibility: AccessibilitySummary,
    /// Media summary.
    pub media: MediaSummary,
    /// The page is the site root.
    pub is_homepage: bool,
    /// Page role.
    pub page_type: PageType,
}

impl PageContent {
    /// Number of `<h1>` headings.
    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.level == 1).count()
    }
}
