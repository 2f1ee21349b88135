//! Bot-protection detection.
//!
//! Classifies a fetched body as a protection interstitial, a JavaScript-only
//! application shell, or a normal page. Matching is case-insensitive substring
//! search over the raw HTML and errs towards flagging.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::utils::{normalize_whitespace, parse_selector_with_fallback};

/// Signatures of challenge and interstitial pages served instead of content.
///
/// Cloudflare, Akamai, DataDome, PerimeterX, Imperva/Incapsula and Sucuri.
/// Embedded CAPTCHA widgets alone are not signatures; contact forms use them.
pub static CHALLENGE_SIGNATURES: &[&str] = &[
    "cf-browser-verification",
    "cf-challenge",
    "cf-chl-bypass",
    "cloudflare ray id",
    "attention required! | cloudflare",
    "checking your browser",
    "checking if the site connection is secure",
    "just a moment...",
    "please wait while we verify",
    "enable javascript and cookies to continue",
    "verify you are human",
    "are you a robot",
    "access denied | ",
    "reference #18.",
    "captcha-delivery.com",
    "px-captcha",
    "incapsula incident id",
    "_incapsula_resource",
    "sucuri website firewall",
    "ddos protection by",
];

/// Markers of protection widgets that also appear embedded in ordinary pages:
/// Turnstile on contact forms, Cloudflare's injected `/cdn-cgi/challenge-platform/`
/// scripts. They only count on interstitial-sized pages.
pub static EMBEDDED_WIDGET_SIGNATURES: &[&str] = &["cf-turnstile", "challenge-platform"];

/// Visible text below which a page carrying an embedded widget is an interstitial.
const INTERSTITIAL_MAX_TEXT_CHARS: usize = 200;

/// Root element markers of client-rendered application shells.
static SCRIPT_SHELL_MARKERS: &[&str] = &[
    "id=\"root\"",
    "id=\"app\"",
    "id=\"__next\"",
    "id=\"__nuxt\"",
    "id=\"___gatsby\"",
    "ng-version",
    "data-reactroot",
];

/// Visible text below which a page with a shell marker counts as unrendered.
const SCRIPT_SHELL_MAX_TEXT_CHARS: usize = 200;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("body", "script shell detection"));
static NON_VISIBLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_with_fallback("script, style, noscript, template", "script shell detection")
});

/// Classification of a fetched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Ordinary content.
    Clear,
    /// A protection interstitial; carries the signature that matched.
    Challenge(String),
    /// A client-rendered shell with almost no server-rendered text.
    ScriptShell,
}

impl Verdict {
    /// Returns `true` for protection interstitials.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Challenge(_))
    }
}

/// Classifies a response body.
///
/// Empty bodies are [`Verdict::Clear`]; emptiness is the parser's concern.
pub fn classify(body: &str) -> Verdict {
    if body.is_empty() {
        return Verdict::Clear;
    }
    let lower = body.to_lowercase();
    if let Some(signature) = CHALLENGE_SIGNATURES
        .iter()
        .find(|signature| lower.contains(*signature))
    {
        return Verdict::Challenge((*signature).to_string());
    }

    let widget = EMBEDDED_WIDGET_SIGNATURES
        .iter()
        .find(|signature| lower.contains(*signature));
    let has_shell_marker = SCRIPT_SHELL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker));
    if widget.is_none() && !has_shell_marker {
        return Verdict::Clear;
    }

    let visible = visible_text_len(body);
    if let Some(signature) = widget {
        if visible < INTERSTITIAL_MAX_TEXT_CHARS {
            return Verdict::Challenge((*signature).to_string());
        }
    }
    if has_shell_marker && visible < SCRIPT_SHELL_MAX_TEXT_CHARS {
        return Verdict::ScriptShell;
    }
    Verdict::Clear
}

/// Returns `true` if `signature` is an embedded-widget marker rather than a
/// full interstitial signature.
///
/// A page flagged only by such a marker may still be the site's real content.
pub fn is_embedded_widget(signature: &str) -> bool {
    EMBEDDED_WIDGET_SIGNATURES.contains(&signature)
}

/// Character count of the text a reader would see in `<body>`.
fn visible_text_len(body: &str) -> usize {
    let document = Html::parse_document(body);
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return 0;
    };
    let hidden: usize = body
        .select(&NON_VISIBLE_SELECTOR)
        .map(|element| normalize_whitespace(&element.text().collect::<String>()).chars().count())
        .sum();
    let total = normalize_whitespace(&body.text().collect::<String>())
        .chars()
        .count();
    total.saturating_sub(hidden)
}
