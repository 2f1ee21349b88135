//! Third-party extraction service client.
//!
//! Speaks the common "scrape" JSON API shape: the target URL is POSTed with a
//! bearer key and the service answers with the rendered HTML plus metadata.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use super::types::{FetchRequest, FetchedPage, Tier};
use super::PageFetcher;
use crate::config::EXTRACTION_WAIT_FOR_MS;
use crate::error_handling::FetchError;
use crate::utils::truncate_chars;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    only_main_content: bool,
    wait_for: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeData {
    html: Option<String>,
    raw_html: Option<String>,
    #[serde(default)]
    metadata: ScrapeMetadata,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
    status_code: Option<u16>,
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    url: Option<String>,
}

/// Fetches pages through an external scraping service.
///
/// Without an API key the fetcher fails immediately with
/// [`FetchError::NotConfigured`] and issues no request.
#[derive(Clone)]
pub struct ExtractionApiFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ExtractionApiFetcher {
    /// Creates a client for `endpoint`, authenticated with `api_key`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl PageFetcher for ExtractionApiFetcher {
    fn tier(&self) -> Tier {
        Tier::ThirdParty
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let Some(api_key) = &self.api_key else {
            return Err(FetchError::NotConfigured);
        };

        let payload = ScrapeRequest {
            url: request.url.as_str(),
            formats: ["html"],
            only_main_content: false,
            wait_for: EXTRACTION_WAIT_FOR_MS,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(request.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| match FetchError::from(e) {
                FetchError::Timeout => FetchError::Timeout,
                other => FetchError::Api(other.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_chars(detail.trim(), 200)
            )));
        }

        let parsed: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Api(format!("malformed response: {e}")))?;
        if !parsed.success {
            return Err(FetchError::Api(
                parsed.error.unwrap_or_else(|| "request unsuccessful".to_string()),
            ));
        }
        let data = parsed
            .data
            .ok_or_else(|| FetchError::Api("response has no data".to_string()))?;

        if let Some(code) = data.metadata.status_code {
            if code >= 400 {
                return Err(FetchError::Api(format!("target answered HTTP {code}")));
            }
        }

        let body = data
            .html
            .or(data.raw_html)
            .filter(|html| !html.trim().is_empty())
            .ok_or_else(|| FetchError::Api("response has no HTML".to_string()))?;
        let final_url = data
            .metadata
            .url
            .or(data.metadata.source_url)
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| request.url.clone());
        debug!(
            "Extraction service returned {} bytes for {}",
            body.len(),
            request.url
        );

        Ok(FetchedPage {
            final_url,
            http_status: data.metadata.status_code,
            body,
        })
    }
}
