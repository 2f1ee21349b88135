//! Score cache.
//!
//! Re-auditing unchanged content must yield the same section scores. The cache
//! stores the scores of each analysis under its [`WebsiteSignature`]:
//! - a hit needs equal content and structure digests, the current methodology
//!   version and an unexpired entry
//! - anything else is a miss, never a partial match
//! - expired entries are evicted when looked up and swept on every write
//!
//! [`ScoreStore`] is the seam for other backends; [`InMemoryScoreCache`] is the
//! process-wide implementation.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::WebsiteSignature;

pub use memory::{CacheStats, InMemoryScoreCache};

/// Score of one report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    /// Section name, e.g. "brand" or "seo".
    pub name: String,
    /// Score, 0-100.
    pub score: u8,
}

impl SectionScore {
    /// Creates a section score.
    pub fn new(name: impl Into<String>, score: u8) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Cached scores of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCacheEntry {
    /// Signature the scores belong to.
    pub signature: WebsiteSignature,
    /// Per-section scores.
    pub section_scores: Vec<SectionScore>,
    /// Overall score, 0-100.
    pub overall_score: u8,
    /// Scoring methodology that produced the scores.
    pub methodology_version: String,
    /// End of validity.
    pub expires_at: DateTime<Utc>,
}

/// Source of the current time, replaceable in tests.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Storage for score cache entries.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Looks up the scores of an analysis.
    ///
    /// # Returns
    ///
    /// `None` unless an unexpired entry with matching content and structure
    /// digests and the store's methodology version exists.
    async fn get(&self, signature: &WebsiteSignature) -> Option<ScoreCacheEntry>;

    /// Stores the scores of an analysis, replacing any previous entry.
    ///
    /// # Returns
    ///
    /// The stored entry.
    async fn put(
        &self,
        signature: WebsiteSignature,
        overall_score: u8,
        section_scores: Vec<SectionScore>,
        methodology_version: &str,
    ) -> ScoreCacheEntry;
}

/// A section whose fresh score differs from the cached one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDrift {
    /// Section name.
    pub name: String,
    /// Score in the cache entry, if the section was cached.
    pub cached: Option<u8>,
    /// Freshly computed score, if the section was scored.
    pub fresh: Option<u8>,
}

/// Comparison of cached and freshly computed scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyCheck {
    /// No section drifted beyond the tolerance.
    pub consistent: bool,
    /// Sections that drifted, in cached order then fresh-only sections.
    pub drifts: Vec<SectionDrift>,
}

/// Compares an entry's scores with a fresh scoring of the same content.
///
/// A section drifts when its scores differ by more than `tolerance` points
/// or when it appears on only one side.
pub fn check_consistency(
    entry: &ScoreCacheEntry,
    fresh: &[SectionScore],
    tolerance: u8,
) -> ConsistencyCheck {
    let fresh_score = |name: &str| fresh.iter().find(|s| s.name == name).map(|s| s.score);

    let mut drifts: Vec<SectionDrift> = entry
        .section_scores
        .iter()
        .filter_map(|cached| {
            let fresh = fresh_score(&cached.name);
            let drifted = match fresh {
                Some(score) => score.abs_diff(cached.score) > tolerance,
                None => true,
            };
            drifted.then(|| SectionDrift {
                name: cached.name.clone(),
                cached: Some(cached.score),
                fresh,
            })
        })
        .collect();
    drifts.extend(
        fresh
            .iter()
            .filter(|s| !entry.section_scores.iter().any(|c| c.name == s.name))
            .map(|s| SectionDrift {
                name: s.name.clone(),
                cached: None,
                fresh: Some(s.score),
            }),
    );

    ConsistencyCheck {
        consistent: drifts.is_empty(),
        drifts,
    }
}
