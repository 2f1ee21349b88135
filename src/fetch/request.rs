//! Browser-like request headers.

/// Realistic browser request headers to reduce bot detection.
///
/// These headers mimic a modern desktop browser navigating to a page, so header
/// analysis alone does not flag the request. The User-Agent is set separately
/// because it rotates per attempt.
///
/// `Accept-Encoding` is deliberately absent: reqwest negotiates compression
/// itself and only decodes bodies when it set that header.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    /// Applies the standard request headers to a `reqwest::RequestBuilder`.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        builder
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::REFERER, "https://www.google.com/")
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-dest"),
                "document",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-mode"),
                "navigate",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-site"),
                "cross-site",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-user"),
                "?1",
            )
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
            .header(reqwest::header::CACHE_CONTROL, "max-age=0")
    }
}
