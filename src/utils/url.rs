//! URL validation and normalization utilities.

use log::warn;
use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::FetchError;

/// Validates and normalizes a target URL.
///
/// Adds an `https://` prefix if no scheme is given, then requires a
/// syntactically valid http/https URL with a host that fits in
/// `MAX_URL_LENGTH`.
///
/// # Errors
///
/// Returns `FetchError::InvalidUrl` if the URL is too long, unparsable, uses
/// another scheme or has no host.
pub fn validate_and_normalize_url(url: &str) -> Result<Url, FetchError> {
    let trimmed = url.trim();
    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Rejecting URL exceeding maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        );
        return Err(FetchError::InvalidUrl(trimmed.chars().take(50).collect()));
    }

    match Url::parse(&normalized) {
        Ok(parsed)
            if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() =>
        {
            Ok(parsed)
        }
        _ => {
            warn!("Rejecting invalid URL: {trimmed}");
            Err(FetchError::InvalidUrl(trimmed.to_string()))
        }
    }
}

/// Resolves an `href` against the page it appeared on.
///
/// Returns `None` for empty or fragment-only references, `javascript:`,
/// `mailto:` and `tel:` links and anything that does not resolve to http(s).
/// The fragment is stripped from the result.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Comparison key for "is this the same page": scheme-less, lowercase host,
/// no fragment, no trailing slash.
pub fn page_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = url.path().trim_end_matches('/');
    match url.query() {
        Some(query) => format!("{host}{port}{path}?{query}"),
        None => format!("{host}{port}{path}"),
    }
}

/// `scheme://host[:port]` of a URL, without a trailing slash.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
