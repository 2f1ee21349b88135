//! Fetch data types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use url::Url;

/// Acquisition tier, in escalation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Direct HTTP fetch.
    #[strum(serialize = "http")]
    Http,
    /// Headless browser render.
    #[strum(serialize = "headless")]
    Headless,
    /// Third-party extraction service.
    #[strum(serialize = "third_party")]
    ThirdParty,
}

impl Tier {
    /// The tier tried after this one fails, if any.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Http => Some(Tier::Headless),
            Tier::Headless => Some(Tier::ThirdParty),
            Tier::ThirdParty => None,
        }
    }
}

/// Outcome class of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// A usable page was obtained.
    Ok,
    /// Access was refused or a protection page was served.
    Blocked,
    /// The attempt failed for another reason.
    Error,
}

/// Record of a single fetch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchAttempt {
    /// Tier that made the attempt.
    pub tier: Tier,
    /// Requested URL.
    pub url: String,
    /// Outcome class.
    pub status: FetchStatus,
    /// Wall-clock duration of the attempt in milliseconds.
    pub latency_ms: u64,
    /// HTTP status, when one was received.
    pub http_status: Option<u16>,
    /// Failure description for non-ok attempts.
    pub error: Option<String>,
    /// Body received, when there was one. Not serialized.
    #[serde(skip)]
    pub raw_body: Option<String>,
}

/// Parameters of one fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Page to fetch.
    pub url: Url,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Total budget for the fetch.
    pub timeout: Duration,
}

impl FetchRequest {
    /// Creates a request with the fetcher's default User-Agent.
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            user_agent: None,
            timeout,
        }
    }

    /// Sets the User-Agent override.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: Url,
    /// HTTP status of the final response, when the tier exposes one.
    pub http_status: Option<u16>,
    /// HTML of the page.
    pub body: String,
}
