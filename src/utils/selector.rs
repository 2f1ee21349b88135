//! CSS selector parsing utilities.

use scraper::Selector;

/// Selector that can never match; used when a selector fails to parse.
const MATCH_NOTHING: &str = "*:not(*)";

/// Parses a CSS selector with a safe fallback.
///
/// If parsing fails, logs an error and returns a selector that matches nothing
/// (`*:not(*)`). Extraction then yields empty data instead of panicking.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `context` - Context description for error logging (e.g., "navigation text")
pub fn parse_selector_with_fallback(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse CSS selector '{}' in {}: {}. Using fallback selector.",
            selector_str,
            context,
            e
        );
        Selector::parse(MATCH_NOTHING)
            .expect("'*:not(*)' is a valid selector; failing here is a programming error")
    })
}
