//! Site acquisition orchestration.
//!
//! [`Acquirer::acquire`] turns a URL into a [`CrawlResult`]:
//! 1. Fetch the homepage, escalating `Http -> Headless -> ThirdParty` (see
//!    [`next_step`]). The direct tier retries transient failures with a
//!    different User-Agent per attempt; a protection page or an access denial
//!    escalates immediately.
//! 2. Parse the homepage and analyze the site structure.
//! 3. Crawl a few prioritized internal pages and compare them.
//! 4. Collect performance and SEO metrics.
//!
//! When every tier fails the result is the typed fallback from
//! [`fallback_result`]; acquisition itself never returns an error.

mod fallback;
mod transition;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use tokio_retry::RetryIf;
use url::Url;

use crate::config::Config;
use crate::consistency::compare;
use crate::crawl::{CrawlCoordinator, CrawlOptions};
use crate::error_handling::{
    get_retry_strategy, update_error_stats, FetchError, InfoType, InitializationError,
    ProcessingStats, WarningType,
};
use crate::fetch::{
    ExtractionApiFetcher, FetchAttempt, FetchRequest, FetchStatus, FetchedPage, HeadlessFetcher,
    HttpFetcher, PageFetcher, Tier,
};
use crate::initialization::init_client;
use crate::metrics::{DisabledMetrics, MetricsCollector, NetworkMetrics};
use crate::models::{AnalysisDepth, CrawlResult};
use crate::parse::{parse_page, PageContent};
use crate::protection::{classify, is_embedded_widget, Verdict};
use crate::structure::analyze_structure;
use crate::user_agent::user_agent_for_attempt;
use crate::utils::validate_and_normalize_url;

pub use fallback::{fallback_result, unavailable_page};
pub use transition::{next_step, Step, TierOutcome};

/// Extra time a fetcher gets past its own budget before it is abandoned.
///
/// Fetchers enforce `request.timeout` themselves (the headless tier tears the
/// browser down on that path); this outer deadline only catches hangs.
const TIER_DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// A homepage obtained by one of the tiers.
struct Acquired {
    tier: Tier,
    page: FetchedPage,
    latency: Duration,
}

/// A fetch result, plus the page behind an embedded-widget rejection.
type Screened = (Result<(FetchedPage, Duration), FetchError>, Option<Acquired>);

/// Result of running one tier.
enum TierResult {
    Page(Acquired),
    Shell(Acquired),
    /// Escalated only because of an embedded protection widget.
    Flagged(Acquired),
    Blocked,
    Failed,
}

impl TierResult {
    fn outcome(&self) -> TierOutcome {
        match self {
            TierResult::Page(_) => TierOutcome::Success,
            TierResult::Shell(_) => TierOutcome::ScriptShell,
            TierResult::Flagged(_) | TierResult::Blocked => TierOutcome::Blocked,
            TierResult::Failed => TierOutcome::Failed,
        }
    }
}

/// Acquires sites through the fetch tiers.
pub struct Acquirer {
    config: Config,
    http: Arc<dyn PageFetcher>,
    headless: Arc<dyn PageFetcher>,
    extraction: Arc<dyn PageFetcher>,
    metrics: Arc<dyn MetricsCollector>,
    stats: Arc<ProcessingStats>,
}

impl Acquirer {
    /// Creates an acquirer with the network-backed tiers and collectors.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self, InitializationError> {
        let client = init_client()?;
        let stats = Arc::new(ProcessingStats::new());

        let metrics: Arc<dyn MetricsCollector> = if config.skip_metrics {
            Arc::new(DisabledMetrics)
        } else {
            Arc::new(NetworkMetrics::new(
                client.clone(),
                &config,
                Arc::clone(&stats),
            ))
        };
        let http = Arc::new(HttpFetcher::new(client.clone()));
        let headless = Arc::new(HeadlessFetcher::new(
            config.render_settle(),
            config.browser_executable.clone(),
        ));
        let extraction = Arc::new(ExtractionApiFetcher::new(
            client,
            config.extraction_api_url.clone(),
            config.extraction_api_key.clone(),
        ));

        Ok(Self {
            config,
            http,
            headless,
            extraction,
            metrics,
            stats,
        })
    }

    /// Creates an acquirer from explicit components.
    ///
    /// `http` serves both the direct tier and the multi-page crawl.
    pub fn with_components(
        config: Config,
        http: Arc<dyn PageFetcher>,
        headless: Arc<dyn PageFetcher>,
        extraction: Arc<dyn PageFetcher>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Self {
        Self {
            config,
            http,
            headless,
            extraction,
            metrics,
            stats: Arc::new(ProcessingStats::new()),
        }
    }

    /// Counters of everything this acquirer has seen.
    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.stats)
    }

    /// Acquires `url` and everything derived from it.
    ///
    /// # Returns
    ///
    /// Always a fully populated [`CrawlResult`]. Check `fallback_used` and
    /// `analysis_depth` to see how much of it is based on real content.
    pub async fn acquire(&self, url: &str) -> CrawlResult {
        let url = match validate_and_normalize_url(url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot acquire {url}: {e}");
                update_error_stats(&self.stats, Tier::Http, &e);
                self.stats.increment_info(InfoType::FallbackResult);
                return fallback_result(url, Vec::new());
            }
        };
        info!("Acquiring {url}");

        let mut attempts = Vec::new();
        match self.acquire_homepage(&url, &mut attempts).await {
            Some(acquired) => self.analyze(&url, acquired, attempts).await,
            None => {
                warn!("Every tier failed for {url}; returning the fallback result");
                self.stats.increment_info(InfoType::FallbackResult);
                fallback_result(url.as_str(), attempts)
            }
        }
    }

    /// Runs the tiers until one produces a usable homepage.
    ///
    /// A script shell from the direct tier, or a direct page flagged only by
    /// an embedded protection widget, escalates like a block but is kept and
    /// used when no later tier succeeds.
    async fn acquire_homepage(
        &self,
        url: &Url,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Option<Acquired> {
        let mut tier = Tier::Http;
        let mut retained: Option<Acquired> = None;

        loop {
            let result = self.run_tier(tier, url, attempts).await;
            let step = next_step(tier, result.outcome());
            match (step, result) {
                (Step::Accept, TierResult::Page(acquired)) => {
                    info!("Acquired {} via the {} tier", url, tier);
                    return Some(acquired);
                }
                (_, TierResult::Shell(acquired)) => {
                    self.stats.increment_info(InfoType::ScriptShellDetected);
                    retained.get_or_insert(acquired);
                }
                (_, TierResult::Flagged(acquired)) => {
                    self.stats.increment_info(InfoType::WidgetPageDetected);
                    retained.get_or_insert(acquired);
                }
                _ => {}
            }

            match step {
                Step::Escalate(next) => {
                    info!("Escalating {} from the {} tier to the {} tier", url, tier, next);
                    self.stats.increment_info(match next {
                        Tier::ThirdParty => InfoType::EscalatedToThirdParty,
                        _ => InfoType::EscalatedToHeadless,
                    });
                    tier = next;
                }
                Step::Accept | Step::GiveUp => {
                    if retained.is_some() {
                        info!("Using the direct page of {} as a last resort", url);
                        self.stats.increment_info(InfoType::DirectPageReused);
                    }
                    return retained;
                }
            }
        }
    }

    /// Runs one tier and classifies its outcome.
    async fn run_tier(&self, tier: Tier, url: &Url, attempts: &mut Vec<FetchAttempt>) -> TierResult {
        let (result, flagged) = match tier {
            Tier::Http => self.fetch_direct(url, attempts).await,
            Tier::Headless => {
                self.fetch_once(&self.headless, tier, url, self.config.headless_timeout(), attempts)
                    .await
            }
            Tier::ThirdParty => {
                self.fetch_once(
                    &self.extraction,
                    tier,
                    url,
                    self.config.extraction_timeout(),
                    attempts,
                )
                .await
            }
        };

        match result {
            Ok((page, latency)) => {
                let acquired = Acquired {
                    tier,
                    page,
                    latency,
                };
                // Later tiers have already rendered; only raw HTML can be a shell
                if tier == Tier::Http && classify(&acquired.page.body) == Verdict::ScriptShell {
                    info!("{} looks like an unrendered script shell", url);
                    TierResult::Shell(acquired)
                } else {
                    TierResult::Page(acquired)
                }
            }
            Err(e) => {
                warn!("The {} tier failed for {}: {}", tier, url, e);
                match (tier, flagged) {
                    (Tier::Http, Some(acquired)) => TierResult::Flagged(acquired),
                    _ if e.status() == FetchStatus::Blocked => TierResult::Blocked,
                    _ => TierResult::Failed,
                }
            }
        }
    }

    /// The direct tier: retries transient failures with rotating User-Agents.
    async fn fetch_direct(&self, url: &Url, attempts: &mut Vec<FetchAttempt>) -> Screened {
        let max_attempts = self.config.direct_attempts.max(1);
        let timeout = self.config.direct_timeout();
        let attempt_index = AtomicUsize::new(0);
        let log: Mutex<Vec<FetchAttempt>> = Mutex::new(Vec::new());
        let flagged: Mutex<Option<Acquired>> = Mutex::new(None);

        let action = || {
            let attempt = attempt_index.fetch_add(1, Ordering::SeqCst);
            let request = FetchRequest::new(url.clone(), timeout)
                .with_user_agent(user_agent_for_attempt(attempt));
            let log = &log;
            let flagged = &flagged;
            async move {
                debug!("Direct attempt {}/{} for {}", attempt + 1, max_attempts, url);
                let (result, widget_page) = self
                    .timed_fetch(&self.http, Tier::Http, &request, log)
                    .await;
                if let (Some(page), Ok(mut slot)) = (widget_page, flagged.lock()) {
                    *slot = Some(page);
                }
                if let Err(e) = &result {
                    update_error_stats(&self.stats, Tier::Http, e);
                    if e.is_transient() && attempt + 1 < max_attempts {
                        info!("Retrying {} after transient failure: {}", url, e);
                    }
                }
                result
            }
        };
        let result = RetryIf::spawn(
            get_retry_strategy(self.config.retry_backoff(), max_attempts),
            action,
            |e: &FetchError| e.is_transient(),
        )
        .await;

        if let Ok(mut log) = log.lock() {
            attempts.append(&mut log);
        }
        let flagged = flagged.into_inner().ok().flatten();
        (result, flagged)
    }

    /// Headless and third-party tiers: a single attempt.
    async fn fetch_once(
        &self,
        fetcher: &Arc<dyn PageFetcher>,
        tier: Tier,
        url: &Url,
        timeout: Duration,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Screened {
        let request = FetchRequest::new(url.clone(), timeout);
        let log = Mutex::new(Vec::new());
        let (result, _) = self.timed_fetch(fetcher, tier, &request, &log).await;
        if let Ok(mut log) = log.lock() {
            attempts.append(&mut log);
        }
        if let Err(e) = &result {
            update_error_stats(&self.stats, tier, e);
        }
        (result, None)
    }

    /// Runs one fetch under a hard deadline, screening the body for
    /// protection pages, and records the attempt in `log`.
    ///
    /// A page rejected only because of an embedded widget is handed back
    /// next to the error.
    async fn timed_fetch(
        &self,
        fetcher: &Arc<dyn PageFetcher>,
        tier: Tier,
        request: &FetchRequest,
        log: &Mutex<Vec<FetchAttempt>>,
    ) -> Screened {
        let started = Instant::now();
        let fetched = tokio::time::timeout(request.timeout + TIER_DEADLINE_GRACE, fetcher.fetch(request))
            .await
            .unwrap_or(Err(FetchError::Timeout));
        let latency = started.elapsed();

        let (result, withheld) = match fetched {
            Ok(page) => match classify(&page.body) {
                Verdict::Challenge(signature) => {
                    let widget = is_embedded_widget(&signature);
                    let error = FetchError::BotProtection(signature);
                    (Err(error), widget.then_some(page))
                }
                _ => (Ok(page), None),
            },
            Err(e) => (Err(e), None),
        };

        let record = FetchAttempt {
            tier,
            url: request.url.to_string(),
            status: match &result {
                Ok(_) => FetchStatus::Ok,
                Err(e) => e.status(),
            },
            latency_ms: latency.as_millis() as u64,
            http_status: match (&result, &withheld) {
                (Ok(page), _) | (Err(_), Some(page)) => page.http_status,
                (Err(e), None) => e.http_status(),
            },
            error: result.as_ref().err().map(|e| e.to_string()),
            raw_body: result
                .as_ref()
                .ok()
                .or(withheld.as_ref())
                .map(|page| page.body.clone()),
        };
        if let Ok(mut log) = log.lock() {
            log.push(record);
        }

        let flagged = withheld.map(|page| Acquired {
            tier,
            page,
            latency,
        });
        (result.map(|page| (page, latency)), flagged)
    }

    /// Parses, crawls and measures an acquired homepage.
    async fn analyze(
        &self,
        url: &Url,
        acquired: Acquired,
        attempts: Vec<FetchAttempt>,
    ) -> CrawlResult {
        let Acquired {
            tier,
            page,
            latency,
        } = acquired;
        let homepage = parse_page(&page.body, &page.final_url);
        self.record_content_warnings(&homepage);
        let structure = analyze_structure(&page.final_url, &page.body);

        let crawler = CrawlCoordinator::new(
            Arc::clone(&self.http),
            Arc::clone(&self.stats),
            CrawlOptions {
                workers: self.config.effective_crawl_workers(),
                page_timeout: self.config.crawl_timeout(),
                stagger: self.config.crawl_stagger(),
            },
        );
        let crawled = crawler
            .crawl(
                &page.final_url,
                &structure.prioritized_links(),
                self.config.max_pages,
            )
            .await;
        let analysis_depth = analysis_depth(tier, crawled.len());

        let mut pages = Vec::with_capacity(crawled.len() + 1);
        pages.push(homepage.clone());
        pages.extend(crawled);
        let consistency = compare(&pages);

        let (performance, seo) = tokio::join!(
            self.metrics.get_performance(&page.final_url),
            self.metrics.get_seo(&page.final_url)
        );

        info!(
            "Analyzed {}: {} page(s), depth {:?}",
            url,
            pages.len(),
            analysis_depth
        );
        CrawlResult {
            url: url.to_string(),
            homepage,
            pages,
            structure,
            consistency,
            performance,
            seo,
            analysis_depth,
            fallback_used: false,
            tier: Some(tier),
            attempts,
            load_time_secs: Some(latency.as_secs_f64()),
            fetched_at: Utc::now(),
        }
    }

    fn record_content_warnings(&self, homepage: &PageContent) {
        if homepage.title.is_empty() {
            self.stats.increment_warning(WarningType::MissingTitle);
        }
        if homepage.description.is_empty() {
            self.stats.increment_warning(WarningType::MissingMetaDescription);
        }
        if homepage.navigation_text.is_empty() {
            self.stats.increment_warning(WarningType::MissingNavigation);
        }
    }
}

/// Depth reported for a homepage from `tier` plus `crawled_pages` more pages.
pub fn analysis_depth(tier: Tier, crawled_pages: usize) -> AnalysisDepth {
    match tier {
        Tier::Http if crawled_pages > 0 => AnalysisDepth::MultiPage,
        Tier::Http => AnalysisDepth::SinglePage,
        Tier::Headless => AnalysisDepth::Headless,
        Tier::ThirdParty => AnalysisDepth::ThirdParty,
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
