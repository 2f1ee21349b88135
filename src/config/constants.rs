//! Configuration constants.
//!
//! This module defines the fixed operational parameters of the acquisition
//! pipeline: timeouts, size limits, caps and heuristic thresholds. Values that
//! callers are expected to tune live in [`Config`](super::Config) instead and
//! use the constants below as their defaults.

use std::time::Duration;

// Tier 1: direct HTTP fetch
/// Attempts made by the direct HTTP tier before escalating.
pub const DIRECT_MAX_ATTEMPTS: usize = 3;
/// Per-attempt timeout for the direct HTTP tier.
pub const DIRECT_TIMEOUT_SECS: u64 = 8;
/// Backoff unit between direct attempts. The delay before retry `k` is `k` units.
pub const RETRY_BACKOFF_UNIT_MS: u64 = 1000;
/// Maximum redirects followed by the HTTP client.
pub const MAX_REDIRECT_HOPS: usize = 10;

// Tier 2: headless render
/// Total budget for launching the engine, navigating and capturing the DOM.
pub const HEADLESS_TIMEOUT_SECS: u64 = 30;
/// Delay after the load event so late network activity can settle.
///
/// The headless tier has no network-idle wait; this delay replaces it and must
/// be at least the usual 500 ms idle window.
pub const RENDER_SETTLE_MS: u64 = 1500;

// Tier 3: third-party extraction API
/// Single-attempt timeout for the extraction service.
pub const EXTRACTION_TIMEOUT_SECS: u64 = 60;
/// How long the extraction service is asked to wait for client-side rendering.
pub const EXTRACTION_WAIT_FOR_MS: u64 = 2000;
/// Default endpoint of the extraction service.
pub const DEFAULT_EXTRACTION_API_URL: &str = "https://api.firecrawl.dev/v1/scrape";

// Multi-page crawl
/// Default number of pages crawled beyond the homepage.
pub const DEFAULT_MAX_PAGES: usize = 5;
/// Upper bound on concurrent crawl workers.
pub const MAX_CRAWL_WORKERS: usize = 3;
/// Per-page fetch timeout during the crawl. Pages are never retried.
pub const CRAWL_PAGE_TIMEOUT_SECS: u64 = 5;
/// Start offset between consecutive crawl workers.
pub const CRAWL_STAGGER_MS: u64 = 250;

// Site structure and parsing caps
/// Discovered internal links kept per page.
pub const MAX_DISCOVERED_LINKS: usize = 10;
/// Paragraphs kept per page.
pub const MAX_PARAGRAPHS: usize = 10;
/// Headings kept per page.
pub const MAX_HEADINGS: usize = 50;
/// Image alt texts kept per page.
pub const MAX_IMAGE_ALTS: usize = 20;
/// Link texts kept per page.
pub const MAX_LINK_TEXTS: usize = 50;
/// Navigation and footer text are truncated to this many characters.
pub const MAX_REGION_TEXT_CHARS: usize = 500;

// Response and body size limits
/// Maximum response body size in bytes (2MB)
/// Larger bodies are truncated at a character boundary.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// External metrics
/// Timeout for the performance service. Its failure is non-fatal.
pub const PERFORMANCE_TIMEOUT_SECS: u64 = 45;
/// Default endpoint of the performance service.
pub const DEFAULT_PAGESPEED_API_URL: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
/// Timeout for robots.txt and sitemap.xml probes.
pub const PROBE_TIMEOUT_SECS: u64 = 5;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

// Consistency heuristics
/// Minimum fraction of pages that must carry the brand marker.
pub const BRAND_PRESENCE_THRESHOLD: f64 = 0.8;
/// Distinct navigation renderings tolerated before penalizing.
pub const MAX_NAVIGATION_VARIANTS: usize = 2;
/// Fraction of deviating pages tolerated before penalizing.
pub const DEVIATION_TOLERANCE: f64 = 0.2;
/// Score used for every consistency dimension when there is too little to compare.
pub const NEUTRAL_CONSISTENCY_SCORE: u8 = 50;
/// Penalty applied to brand and navigation scores.
pub const MAJOR_CONSISTENCY_PENALTY: u8 = 30;
/// Penalty applied to title pattern and heading structure scores.
pub const MINOR_CONSISTENCY_PENALTY: u8 = 20;

// Fingerprint and score cache
/// Characters of aggregated page content hashed into the content signature.
pub const FINGERPRINT_CONTENT_CHARS: usize = 5000;
/// Score cache time-to-live: 7 days
pub const SCORE_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Version tag of the scoring methodology stored with cache entries.
pub const METHODOLOGY_VERSION: &str = "2024.1";

/// Marker written into every text field of a result built without site access.
pub const UNAVAILABLE_MARKER: &str = "Data unavailable: site could not be accessed";

// URL validation
/// Maximum URL length accepted for acquisition.
pub const MAX_URL_LENGTH: usize = 2048;
