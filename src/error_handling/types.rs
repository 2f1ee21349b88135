//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::fetch::FetchStatus;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failure of a single fetch attempt, whatever the tier.
///
/// The variant decides what the orchestrator does next: transient failures are
/// retried within the direct tier, everything else ends the tier.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The target could not be parsed as an absolute http(s) URL.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The server answered with a 4xx status.
    #[error("access denied (HTTP {0})")]
    AccessDenied(u16),

    /// The response is a bot-protection interstitial.
    #[error("bot protection detected ({0})")]
    BotProtection(String),

    /// The server answered with a 5xx status.
    #[error("server error (HTTP {0})")]
    ServerError(u16),

    /// The attempt exceeded its time budget.
    #[error("timed out")]
    Timeout,

    /// Connection, TLS, redirect or body read failure.
    #[error("network error: {0}")]
    Network(#[source] ReqwestError),

    /// The response body exceeded the size limit.
    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// No rendering engine could be started.
    #[error("render engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The rendering engine started but navigation or capture failed.
    #[error("render failed: {0}")]
    Render(String),

    /// The extraction service has no credentials configured.
    #[error("extraction service not configured")]
    NotConfigured,

    /// The extraction service answered with an error.
    #[error("extraction service error: {0}")]
    Api(String),
}

impl From<ReqwestError> for FetchError {
    fn from(error: ReqwestError) -> Self {
        if error.is_timeout() {
            return FetchError::Timeout;
        }
        if let Some(status) = error.status() {
            let code = status.as_u16();
            if status.is_client_error() {
                return FetchError::AccessDenied(code);
            }
            if status.is_server_error() {
                return FetchError::ServerError(code);
            }
        }
        FetchError::Network(error)
    }
}

impl FetchError {
    /// Returns `true` if repeating the same request might succeed.
    ///
    /// Server errors, timeouts and connection failures are transient. Access
    /// denial and protection pages are policy driven and retrying them only
    /// hardens the block, so they are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::ServerError(_) | FetchError::Timeout => true,
            FetchError::Network(e) => e.is_connect() || e.is_request() || e.is_body(),
            _ => false,
        }
    }

    /// Outcome class recorded in the attempt log.
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchError::AccessDenied(_) | FetchError::BotProtection(_) => FetchStatus::Blocked,
            _ => FetchStatus::Error,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::AccessDenied(code) | FetchError::ServerError(code) => Some(*code),
            FetchError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Types of errors that can occur while acquiring a site.
///
/// This enum categorizes actual error conditions - failures that prevent a tier
/// or a collector from producing its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Direct HTTP tier
    HttpTimeoutError,
    HttpConnectError,
    HttpClientStatusError, // 4xx - escalated without retry
    HttpServerStatusError, // 5xx - retried
    HttpBodyTooLarge,
    HttpOtherError,
    InvalidUrlError,
    // Headless tier
    RenderEngineUnavailable,
    RenderError,
    // Extraction tier
    ExtractionNotConfigured,
    ExtractionApiError,
    // Crawl and collectors
    CrawlPageError,
    PerformanceMetricsError,
    TlsCertificateError,
}

/// Types of warnings that can occur while parsing acquired pages.
///
/// Warnings indicate missing optional data that doesn't prevent analysis
/// but is worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)] // All variants start with "Missing" by design
pub enum WarningType {
    MissingTitle,
    MissingMetaDescription,
    MissingNavigation,
}

/// Types of informational metrics recorded during acquisition.
///
/// Info metrics track notable events that aren't errors or warnings, such as
/// bot protection, tier escalations or fallback results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    BotProtectionDetected,
    ScriptShellDetected,
    EscalatedToHeadless,
    EscalatedToThirdParty,
    WidgetPageDetected,
    DirectPageReused,
    FallbackResult,
    ChallengePageDropped,
}
