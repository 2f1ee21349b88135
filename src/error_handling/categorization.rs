//! Error categorization.
//!
//! Maps fetch failures onto the counters tracked by [`ProcessingStats`] and
//! defines the direct tier's retry schedule.

use std::time::Duration;

use super::stats::ProcessingStats;
use super::types::{ErrorType, FetchError, InfoType};
use crate::fetch::Tier;

/// Categorizes a `FetchError` into an `ErrorType`.
///
/// The tier matters for errors every tier can produce (timeouts, bad statuses):
/// the headless and extraction tiers report them under their own types.
///
/// # Arguments
///
/// * `tier` - The tier whose attempt failed
/// * `error` - The failure
///
/// # Returns
///
/// The counter to increment, or `None` for bot protection (tracked as info).
pub fn categorize_fetch_error(tier: Tier, error: &FetchError) -> Option<ErrorType> {
    let error_type = match (tier, error) {
        (_, FetchError::BotProtection(_)) => return None,
        (_, FetchError::InvalidUrl(_)) => ErrorType::InvalidUrlError,
        (_, FetchError::EngineUnavailable(_)) => ErrorType::RenderEngineUnavailable,
        (_, FetchError::NotConfigured) => ErrorType::ExtractionNotConfigured,
        (Tier::Headless, _) => ErrorType::RenderError,
        (Tier::ThirdParty, _) => ErrorType::ExtractionApiError,
        (Tier::Http, FetchError::Timeout) => ErrorType::HttpTimeoutError,
        (Tier::Http, FetchError::AccessDenied(_)) => ErrorType::HttpClientStatusError,
        (Tier::Http, FetchError::ServerError(_)) => ErrorType::HttpServerStatusError,
        (Tier::Http, FetchError::BodyTooLarge(_)) => ErrorType::HttpBodyTooLarge,
        (Tier::Http, FetchError::Network(e)) if e.is_connect() => ErrorType::HttpConnectError,
        (Tier::Http, _) => ErrorType::HttpOtherError,
    };
    Some(error_type)
}

/// Records a fetch failure in the processing statistics.
pub fn update_error_stats(stats: &ProcessingStats, tier: Tier, error: &FetchError) {
    match categorize_fetch_error(tier, error) {
        Some(error_type) => stats.increment_error(error_type),
        None => stats.increment_info(InfoType::BotProtectionDetected),
    }
}

/// Creates the retry schedule for the direct tier.
///
/// The delay before retry *k* (1-based) is *k* backoff units, so three
/// attempts with a one-second unit wait 1s and then 2s.
///
/// # Arguments
///
/// * `unit` - The backoff unit
/// * `attempts` - Total attempts, including the first
///
/// # Returns
///
/// A delay iterator ready for use with `tokio_retry::RetryIf`; it yields
/// `attempts - 1` delays.
pub fn get_retry_strategy(unit: Duration, attempts: usize) -> impl Iterator<Item = Duration> {
    (1..attempts.max(1)).map(move |k| unit * k as u32)
}
