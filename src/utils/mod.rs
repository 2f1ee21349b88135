//! Shared helpers: CSS selectors, text normalization and URL handling.

mod selector;
mod text;
mod url;

pub use selector::parse_selector_with_fallback;
pub use text::{normalize_whitespace, truncate_chars};
pub use url::{origin_of, page_key, resolve_link, validate_and_normalize_url};
