//! Processing statistics tracking.
//!
//! Thread-safe counters for errors, warnings and informational events seen
//! while acquiring and analyzing a site.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// Thread-safe processing statistics tracker.
///
/// Every counter is created up front from the enum variants, so increments
/// never allocate and the struct can be shared across crawl workers behind an
/// `Arc`.
///
/// # Categories
///
/// - **Errors**: Tier or collector failures
/// - **Warnings**: Missing optional data
/// - **Info**: Notable events (protection pages, escalations, fallbacks)
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

fn counters<T: IntoEnumIterator + Eq + Hash>() -> HashMap<T, AtomicUsize> {
    T::iter().map(|key| (key, AtomicUsize::new(0))).collect()
}

fn increment<T: Eq + Hash + std::fmt::Debug>(map: &HashMap<T, AtomicUsize>, key: T) {
    match map.get(&key) {
        Some(counter) => {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        None => log::error!("No counter registered for {:?}", key),
    }
}

fn load<T: Eq + Hash>(map: &HashMap<T, AtomicUsize>, key: T) -> usize {
    map.get(&key).map(|c| c.load(Ordering::SeqCst)).unwrap_or(0)
}

impl ProcessingStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        ProcessingStats {
            errors: counters(),
            warnings: counters(),
            info: counters(),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        increment(&self.errors, error);
    }

    /// Increment a warning counter.
    pub fn increment_warning(&self, warning: WarningType) {
        increment(&self.warnings, warning);
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info_type: InfoType) {
        increment(&self.info, info_type);
    }

    /// Get the count for an error type.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        load(&self.errors, error)
    }

    /// Get the count for a warning type.
    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        load(&self.warnings, warning)
    }

    /// Get the count for an info type.
    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        load(&self.info, info_type)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total warning count across all warning types.
    pub fn total_warnings(&self) -> usize {
        WarningType::iter().map(|w| self.get_warning_count(w)).sum()
    }

    /// Get total info count across all info types.
    pub fn total_info(&self) -> usize {
        InfoType::iter().map(|i| self.get_info_count(i)).sum()
    }

    /// Logs every non-zero counter at debug level.
    pub fn log_summary(&self) {
        log::debug!(
            "{} error(s), {} warning(s), {} info event(s)",
            self.total_errors(),
            self.total_warnings(),
            self.total_info()
        );
        for error in ErrorType::iter() {
            let count = self.get_error_count(error);
            if count > 0 {
                log::debug!("error {:?}: {}", error, count);
            }
        }
        for warning in WarningType::iter() {
            let count = self.get_warning_count(warning);
            if count > 0 {
                log::debug!("warning {:?}: {}", warning, count);
            }
        }
        for info_type in InfoType::iter() {
            let count = self.get_info_count(info_type);
            if count > 0 {
                log::debug!("info {:?}: {}", info_type, count);
            }
        }
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
