//! Direct HTTP fetcher.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use log::debug;
use reqwest::header::USER_AGENT;

use super::request::RequestHeaders;
use super::types::{FetchRequest, FetchedPage, Tier};
use super::PageFetcher;
use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::FetchError;
use crate::protection::{classify, Verdict};

/// Fetches pages with a plain HTTP GET.
///
/// Error responses are classified as they arrive:
/// - an error body carrying a bot-protection signature fails with
///   [`FetchError::BotProtection`], so it is never retried
/// - other 4xx fail with [`FetchError::AccessDenied`]
/// - other 5xx fail with [`FetchError::ServerError`]
///
/// Successful responses are returned as pages even when they look like a
/// protection page or a script shell; screening them is the caller's business.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher on top of a shared client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn tier(&self) -> Tier {
        Tier::Http
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let mut builder =
            RequestHeaders::apply_to_request_builder(self.client.get(request.url.clone()))
                .timeout(request.timeout);
        if let Some(user_agent) = &request.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }

        let response = builder.send().await?;
        let status = response.status();
        let final_url = response.url().clone();
        debug!("GET {} -> {} ({})", request.url, status, final_url);

        if let Some(length) = response.content_length() {
            if length > MAX_RESPONSE_BODY_SIZE as u64 {
                return Err(FetchError::BodyTooLarge(MAX_RESPONSE_BODY_SIZE));
            }
        }
        // Chunked responses carry no length; stop reading at the cap
        let bytes = read_capped(response.bytes_stream(), MAX_RESPONSE_BODY_SIZE).await?;
        let body = truncate_body(String::from_utf8_lossy(&bytes).into_owned());

        if status.is_client_error() || status.is_server_error() {
            if let Verdict::Challenge(signature) = classify(&body) {
                return Err(FetchError::BotProtection(signature));
            }
        }
        if status.is_client_error() {
            return Err(FetchError::AccessDenied(status.as_u16()));
        }
        if status.is_server_error() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Ok(FetchedPage {
            final_url,
            http_status: Some(status.as_u16()),
            body,
        })
    }
}

/// Collects at most `cap` bytes from a body stream and drops the rest unread.
pub(super) async fn read_capped<S, B, E>(stream: S, cap: usize) -> Result<Vec<u8>, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let mut stream = std::pin::pin!(stream);
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let room = cap - bytes.len();
        let chunk = chunk.as_ref();
        if chunk.len() >= room {
            bytes.extend_from_slice(&chunk[..room]);
            if chunk.len() > room {
                debug!("Body exceeds {cap} bytes; truncated");
            }
            break;
        }
        bytes.extend_from_slice(chunk);
    }
    Ok(bytes)
}

/// Cuts a body down to `MAX_RESPONSE_BODY_SIZE` bytes on a character boundary.
fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_RESPONSE_BODY_SIZE {
        let mut cut = MAX_RESPONSE_BODY_SIZE;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
