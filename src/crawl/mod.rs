//! Multi-page crawl coordination.
//!
//! Fetches a handful of internal pages discovered on the homepage using a small
//! worker pool:
//! - at most `MAX_CRAWL_WORKERS` workers, never more than there are candidates
//! - one shared queue in page-type priority order; each URL is claimed once
//! - a per-page timeout and no retries (a failed page is simply skipped)
//! - workers start staggered and stop once `max_pages` pages are parsed
//!
//! Results are returned in claim order, which keeps output deterministic no
//! matter which worker finishes first.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinSet;
use url::Url;

use crate::config::MAX_CRAWL_WORKERS;
use crate::error_handling::{ErrorType, FetchError, InfoType, ProcessingStats};
use crate::fetch::{FetchRequest, PageFetcher};
use crate::parse::{parse_page, PageContent};
use crate::protection::{classify, Verdict};
use crate::structure::DiscoveredLink;
use crate::utils::page_key;

/// Crawl pool settings.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Requested worker count; capped at `MAX_CRAWL_WORKERS`.
    pub workers: usize,
    /// Budget per page fetch.
    pub page_timeout: Duration,
    /// Delay between consecutive worker starts.
    pub stagger: Duration,
}

/// Shared state of one crawl.
struct CrawlState {
    queue: Mutex<VecDeque<(usize, Url)>>,
    results: Mutex<Vec<(usize, PageContent)>>,
    max_pages: usize,
    homepage_key: String,
}

impl CrawlState {
    /// Claims the next URL unless enough pages have been collected.
    fn claim(&self) -> Option<(usize, Url)> {
        if self.collected() >= self.max_pages {
            return None;
        }
        self.queue.lock().ok()?.pop_front()
    }

    fn collected(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(usize::MAX)
    }

    /// Stores a parsed page; returns `false` once the cap was already reached.
    fn store(&self, index: usize, page: PageContent) -> bool {
        match self.results.lock() {
            Ok(mut results) if results.len() < self.max_pages => {
                results.push((index, page));
                true
            }
            _ => false,
        }
    }
}

/// Coordinates the multi-page crawl.
pub struct CrawlCoordinator {
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<ProcessingStats>,
    options: CrawlOptions,
}

impl CrawlCoordinator {
    /// Creates a coordinator that fetches through `fetcher`.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        stats: Arc<ProcessingStats>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            fetcher,
            stats,
            options,
        }
    }

    /// Crawls up to `max_pages` of the candidate links.
    ///
    /// Candidates are visited in page-type priority order. The homepage itself
    /// and duplicate URLs are skipped, as are pages that redirect back to the
    /// homepage.
    ///
    /// # Returns
    ///
    /// At most `max_pages` parsed pages, in claim order.
    pub async fn crawl(
        &self,
        base_url: &Url,
        candidates: &[DiscoveredLink],
        max_pages: usize,
    ) -> Vec<PageContent> {
        let queue = build_queue(base_url, candidates);
        if max_pages == 0 || queue.is_empty() {
            return Vec::new();
        }

        let worker_count = self
            .options
            .workers
            .clamp(1, MAX_CRAWL_WORKERS)
            .min(queue.len());
        info!(
            "Crawling up to {} of {} candidate pages with {} workers",
            max_pages,
            queue.len(),
            worker_count
        );

        let state = Arc::new(CrawlState {
            queue: Mutex::new(queue),
            results: Mutex::new(Vec::new()),
            max_pages,
            homepage_key: page_key(base_url),
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let state = Arc::clone(&state);
            let fetcher = Arc::clone(&self.fetcher);
            let stats = Arc::clone(&self.stats);
            let start_delay = self.options.stagger * worker_id as u32;
            let page_timeout = self.options.page_timeout;
            workers.spawn(async move {
                tokio::time::sleep(start_delay).await;
                run_worker(worker_id, state, fetcher, stats, page_timeout).await;
            });
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                log::warn!("Crawl worker ended abnormally: {e}");
            }
        }

        let mut results = match Arc::try_unwrap(state) {
            Ok(state) => state.results.into_inner().unwrap_or_default(),
            Err(shared) => shared
                .results
                .lock()
                .map(|results| results.clone())
                .unwrap_or_default(),
        };
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, page)| page).collect()
    }
}

/// Orders candidates by priority and drops the homepage and duplicates.
fn build_queue(base_url: &Url, candidates: &[DiscoveredLink]) -> VecDeque<(usize, Url)> {
    let mut ordered: Vec<&DiscoveredLink> = candidates.iter().collect();
    ordered.sort_by_key(|link| link.page_type);

    let mut seen = HashSet::new();
    seen.insert(page_key(base_url));
    ordered
        .into_iter()
        .filter_map(|link| Url::parse(&link.url).ok())
        .filter(|url| seen.insert(page_key(url)))
        .enumerate()
        .collect()
}

async fn run_worker(
    worker_id: usize,
    state: Arc<CrawlState>,
    fetcher: Arc<dyn PageFetcher>,
    stats: Arc<ProcessingStats>,
    page_timeout: Duration,
) {
    while let Some((index, url)) = state.claim() {
        debug!("Crawl worker {} fetching {}", worker_id, url);
        let request = FetchRequest::new(url.clone(), page_timeout);
        let outcome = tokio::time::timeout(page_timeout, fetcher.fetch(&request))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        let page = match outcome {
            Ok(page) => page,
            Err(FetchError::BotProtection(signature)) => {
                debug!("Dropping challenge page {} ({})", url, signature);
                stats.increment_info(InfoType::ChallengePageDropped);
                continue;
            }
            Err(e) => {
                debug!("Skipping {}: {}", url, e);
                stats.increment_error(ErrorType::CrawlPageError);
                continue;
            }
        };

        if let Verdict::Challenge(signature) = classify(&page.body) {
            debug!("Dropping challenge page {} ({})", url, signature);
            stats.increment_info(InfoType::ChallengePageDropped);
            continue;
        }
        if page_key(&page.final_url) == state.homepage_key {
            debug!("{} redirected to the homepage, skipping", url);
            continue;
        }

        let content = parse_page(&page.body, &page.final_url);
        if !state.store(index, content) {
            break;
        }
    }
    debug!("Crawl worker {} finished", worker_id);
}
