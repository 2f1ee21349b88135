//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Processing statistics tracking (errors, warnings, info metrics)
//!
//! Error types are categorized into:
//! - **Errors**: Failures that prevent a tier or collector from producing data
//! - **Warnings**: Missing optional data that doesn't prevent analysis
//! - **Info**: Informational metrics (bot protection, escalations, fallbacks)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_fetch_error, get_retry_strategy, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{ErrorType, FetchError, InfoType, InitializationError, WarningType};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchStatus, Tier};
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::HttpTimeoutError);
        assert_eq!(stats.get_error_count(ErrorType::HttpTimeoutError), 1);

        stats.increment_warning(WarningType::MissingTitle);
        assert_eq!(stats.get_warning_count(WarningType::MissingTitle), 1);

        stats.increment_info(InfoType::EscalatedToHeadless);
        stats.increment_info(InfoType::EscalatedToHeadless);
        assert_eq!(stats.get_info_count(InfoType::EscalatedToHeadless), 2);
        assert_eq!(stats.total_info(), 2);
    }

    #[test]
    fn test_transient_errors() {
        assert!(FetchError::ServerError(503).is_transient());
        assert!(FetchError::Timeout.is_transient());
        assert!(!FetchError::AccessDenied(403).is_transient());
        assert!(!FetchError::AccessDenied(404).is_transient());
        assert!(!FetchError::BotProtection("cf-challenge".into()).is_transient());
        assert!(!FetchError::NotConfigured.is_transient());
    }

    #[test]
    fn test_fetch_status_classes() {
        assert_eq!(FetchError::AccessDenied(403).status(), FetchStatus::Blocked);
        assert_eq!(
            FetchError::BotProtection("just a moment".into()).status(),
            FetchStatus::Blocked
        );
        assert_eq!(FetchError::ServerError(500).status(), FetchStatus::Error);
        assert_eq!(FetchError::Timeout.status(), FetchStatus::Error);
    }

    #[test]
    fn test_categorization_depends_on_tier() {
        assert_eq!(
            categorize_fetch_error(Tier::Http, &FetchError::Timeout),
            Some(ErrorType::HttpTimeoutError)
        );
        assert_eq!(
            categorize_fetch_error(Tier::Headless, &FetchError::Timeout),
            Some(ErrorType::RenderError)
        );
        assert_eq!(
            categorize_fetch_error(Tier::ThirdParty, &FetchError::ServerError(502)),
            Some(ErrorType::ExtractionApiError)
        );
        assert_eq!(
            categorize_fetch_error(Tier::Http, &FetchError::BotProtection("x".into())),
            None
        );
    }

    #[test]
    fn test_update_error_stats_counts_protection_as_info() {
        let stats = ProcessingStats::new();
        update_error_stats(&stats, Tier::Http, &FetchError::BotProtection("x".into()));
        update_error_stats(&stats, Tier::Http, &FetchError::AccessDenied(404));
        assert_eq!(stats.get_info_count(InfoType::BotProtectionDetected), 1);
        assert_eq!(stats.get_error_count(ErrorType::HttpClientStatusError), 1);
        assert_eq!(stats.total_errors(), 1);
    }
}
