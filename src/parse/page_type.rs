//! Page type classification from URL paths and link labels.

use strum::IntoEnumIterator;

use super::types::PageType;

/// Keywords per page type, matched against the lowercase path and label.
///
/// Tunable defaults; a hit on an earlier type in [`PageType`] order wins.
fn keywords(page_type: PageType) -> &'static [&'static str] {
    match page_type {
        PageType::About => &[
            "about",
            "who-we-are",
            "who we are",
            "our-story",
            "our story",
            "our-team",
            "our team",
            "company",
        ],
        PageType::Contact => &[
            "contact",
            "get-in-touch",
            "get in touch",
            "reach-us",
            "locations",
        ],
        PageType::Services => &["services", "service", "solutions", "what-we-do", "what we do"],
        PageType::Products => &["products", "product", "shop", "store", "catalog", "collections"],
        PageType::Pricing => &["pricing", "plans", "prices", "price"],
        PageType::Blog => &["blog", "news", "articles", "insights", "posts", "journal"],
        PageType::Homepage => &["home"],
        PageType::Other => &[],
    }
}

/// Returns `true` for root paths (`/`, empty, `/index.html` and friends).
pub fn is_homepage_path(path: &str) -> bool {
    let trimmed = path.trim_matches('/').to_ascii_lowercase();
    trimmed.is_empty()
        || matches!(
            trimmed.as_str(),
            "index.html" | "index.htm" | "index.php" | "home" | "default.aspx"
        )
}

/// Classifies a page by URL path and a human label (title or anchor text).
///
/// The label only counts for [`PageType::Homepage`] when it is exactly "home",
/// so a title like "Home of the best widgets" does not make a page the root.
pub fn classify_page_type(path: &str, label: &str) -> PageType {
    if is_homepage_path(path) {
        return PageType::Homepage;
    }
    let path = path.to_lowercase();
    let label = label.trim().to_lowercase();

    PageType::iter()
        .find(|page_type| match page_type {
            PageType::Homepage => label == "home",
            other => keywords(*other)
                .iter()
                .any(|keyword| path.contains(keyword) || label.contains(keyword)),
        })
        .unwrap_or(PageType::Other)
}
