// Score cache tests.

use super::*;
use crate::config::METHODOLOGY_VERSION;
use chrono::TimeZone;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clock that only moves when told to.
struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn signature(content: &str, structure: &str, metadata: &str) -> WebsiteSignature {
    WebsiteSignature {
        content_hash: content.to_string(),
        structure_hash: structure.to_string(),
        metadata_hash: metadata.to_string(),
        created_at: Utc::now(),
    }
}

fn sections() -> Vec<SectionScore> {
    vec![
        SectionScore::new("brand", 80),
        SectionScore::new("seo", 65),
        SectionScore::new("performance", 72),
    ]
}

fn cache(clock: &Arc<ManualClock>) -> InMemoryScoreCache {
    InMemoryScoreCache::with_clock(Arc::clone(clock) as Arc<dyn Clock>, WEEK, "v1")
}

#[tokio::test]
async fn test_put_then_get_returns_same_scores() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    let sig = signature("c", "s", "m");

    cache.put(sig.clone(), 72, sections(), "v1").await;
    let entry = cache.get(&sig).await.expect("cache hit");

    assert_eq!(entry.section_scores, sections());
    assert_eq!(entry.overall_score, 72);
    assert_eq!(entry.expires_at, clock.now() + chrono::Duration::days(7));
    assert_eq!(cache.stats().await.hits, 1);
}

#[tokio::test]
async fn test_metadata_change_still_hits() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    cache.put(signature("c", "s", "m1"), 50, sections(), "v1").await;

    assert!(cache.get(&signature("c", "s", "m2")).await.is_some());
}

#[tokio::test]
async fn test_content_or_structure_change_misses() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    cache.put(signature("c", "s", "m"), 50, sections(), "v1").await;

    assert!(cache.get(&signature("c2", "s", "m")).await.is_none());
    assert!(cache.get(&signature("c", "s2", "m")).await.is_none());
    assert_eq!(cache.stats().await.misses, 2);
}

#[tokio::test]
async fn test_expired_entry_is_evicted_on_lookup() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    let sig = signature("c", "s", "m");
    cache.put(sig.clone(), 50, sections(), "v1").await;

    clock.advance(WEEK - Duration::from_secs(1));
    assert!(cache.get(&sig).await.is_some());

    clock.advance(Duration::from_secs(1));
    assert!(cache.get(&sig).await.is_none());

    let stats = cache.stats().await;
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.entries, 0);
}

#[tokio::test]
async fn test_expired_entries_are_swept_on_write() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    for i in 0..50 {
        cache.put(signature(&format!("c{i}"), "s", "m"), 50, sections(), "v1").await;
    }
    assert_eq!(cache.stats().await.entries, 50);

    clock.advance(WEEK);
    cache.put(signature("fresh", "s", "m"), 60, sections(), "v1").await;

    let stats = cache.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.evictions, 50);
    assert_eq!(stats.hits + stats.misses, 0);
}

#[tokio::test]
async fn test_methodology_mismatch_misses() {
    let clock = ManualClock::new();
    let cache = cache(&clock);
    let sig = signature("c", "s", "m");
    cache.put(sig.clone(), 50, sections(), "v0").await;

    assert!(cache.get(&sig).await.is_none());
    cache.put(sig.clone(), 55, sections(), "v1").await;
    assert_eq!(cache.get(&sig).await.map(|e| e.overall_score), Some(55));
}

#[tokio::test]
async fn test_concurrent_access() {
    let cache = Arc::new(InMemoryScoreCache::new());
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20u8 {
        let cache = Arc::clone(&cache);
        tasks.spawn(async move {
            let sig = signature(&format!("c{i}"), "s", "m");
            cache.put(sig.clone(), i, sections(), METHODOLOGY_VERSION).await;
            cache.get(&sig).await.map(|e| e.overall_score)
        });
    }
    let mut found = 0;
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().is_some());
        found += 1;
    }
    assert_eq!(found, 20);
    assert_eq!(cache.stats().await.entries, 20);
}

#[test]
fn test_check_consistency() {
    let entry = ScoreCacheEntry {
        signature: signature("c", "s", "m"),
        section_scores: sections(),
        overall_score: 72,
        methodology_version: "v1".to_string(),
        expires_at: Utc::now(),
    };

    let same = check_consistency(&entry, &sections(), 0);
    assert!(same.consistent);

    let fresh = vec![
        SectionScore::new("brand", 83),
        SectionScore::new("seo", 75),
        SectionScore::new("accessibility", 90),
    ];
    let check = check_consistency(&entry, &fresh, 5);
    assert!(!check.consistent);
    let names: Vec<&str> = check.drifts.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["seo", "performance", "accessibility"]);
    assert_eq!(check.drifts[1].fresh, None);
    assert_eq!(check.drifts[2].cached, None);
}
