//! HTTP client initialization.

use std::time::Duration;

use reqwest::{redirect, ClientBuilder};

use crate::config::{MAX_REDIRECT_HOPS, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;
use crate::user_agent::default_user_agent;

/// Initializes the HTTP client shared by the direct tier, the crawl and the
/// metric probes.
///
/// Creates a `reqwest::Client` configured with:
/// - A default desktop User-Agent (overridden per request by the direct tier)
/// - Redirect following (up to `MAX_REDIRECT_HOPS`)
/// - A connect timeout; total timeouts are set per request by the caller
/// - Transparent gzip/brotli/deflate decoding
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the TLS backend cannot be
/// initialized.
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .user_agent(default_user_agent())
        .redirect(redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}
