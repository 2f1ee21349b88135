// Orchestrator tests with scripted tiers.

use super::*;
use crate::config::UNAVAILABLE_MARKER;
use crate::metrics::DisabledMetrics;
use async_trait::async_trait;

type Responder = Box<dyn Fn(&FetchRequest) -> Result<String, FetchError> + Send + Sync>;

/// A tier that answers from a closure and remembers every request.
struct MockTier {
    tier: Tier,
    respond: Responder,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockTier {
    fn new(
        tier: Tier,
        respond: impl Fn(&FetchRequest) -> Result<String, FetchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            tier,
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn unavailable(tier: Tier) -> Arc<Self> {
        Self::new(tier, move |_| match tier {
            Tier::ThirdParty => Err(FetchError::NotConfigured),
            _ => Err(FetchError::EngineUnavailable("no browser".to_string())),
        })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

#[async_trait]
impl PageFetcher for MockTier {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        let body = (self.respond)(request)?;
        Ok(FetchedPage {
            final_url: request.url.clone(),
            http_status: Some(200),
            body,
        })
    }
}

const HOME: &str = r#"<html><head><title>Home | Acme</title>
    <meta name="description" content="Widgets for everyone"></head>
    <body><header><img class="logo" src="/logo.png" alt="Acme"></header>
    <nav><a href="/">Home</a><a href="/about">About</a></nav>
    <h1>Acme widgets</h1><p>We make widgets.</p></body></html>"#;

const ABOUT: &str = r#"<html><head><title>About | Acme</title></head>
    <body><header><img class="logo" src="/logo.png" alt="Acme"></header>
    <nav><a href="/">Home</a><a href="/about">About</a></nav>
    <h1>About us</h1><p>Since 1999.</p></body></html>"#;

const CHALLENGE: &str =
    "<html><head><title>Just a moment...</title></head><body>Checking your browser</body></html>";

const SHELL: &str = r#"<html><head><title>Acme</title><script src="/app.js"></script></head>
    <body><div id="root"></div></body></html>"#;

const TURNSTILE_CONTACT: &str = r#"<html><head><title>Contact | Acme</title>
    <script src="https://challenges.cloudflare.com/turnstile/v0/api.js"></script></head>
    <body><h1>Contact</h1><form><input name="email">
    <div class="cf-turnstile" data-sitekey="0x4AAA"></div><button>Send</button></form></body></html>"#;

fn site(request: &FetchRequest) -> Result<String, FetchError> {
    match request.url.path() {
        "/" => Ok(HOME.to_string()),
        "/about" => Ok(ABOUT.to_string()),
        _ => Err(FetchError::AccessDenied(404)),
    }
}

fn test_config() -> Config {
    Config {
        retry_backoff_ms: 1,
        crawl_stagger_ms: 0,
        ..Default::default()
    }
}

fn acquirer(
    http: Arc<MockTier>,
    headless: Arc<MockTier>,
    extraction: Arc<MockTier>,
) -> Acquirer {
    Acquirer::with_components(
        test_config(),
        http,
        headless,
        extraction,
        Arc::new(DisabledMetrics),
    )
}

#[tokio::test]
async fn test_plain_site_is_crawled() {
    let http = MockTier::new(Tier::Http, site);
    let acquirer = acquirer(
        Arc::clone(&http),
        MockTier::unavailable(Tier::Headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example").await;

    assert!(!result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::MultiPage);
    assert_eq!(result.tier, Some(Tier::Http));
    assert_eq!(result.homepage.title, "Home | Acme");
    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[0], result.homepage);
    assert_eq!(result.pages[1].title, "About | Acme");
    assert_eq!(result.consistency.navigation_score, 100);
    assert_eq!(result.attempts.len(), 1);
    assert_eq!(result.attempts[0].status, FetchStatus::Ok);
    assert!(result.load_time_secs.is_some());
    assert_eq!(http.paths(), vec!["/", "/about"]);
}

#[tokio::test]
async fn test_challenge_escalates_without_retrying() {
    let http = MockTier::new(Tier::Http, |_| Ok(CHALLENGE.to_string()));
    let headless = MockTier::new(Tier::Headless, site);
    let extraction = MockTier::unavailable(Tier::ThirdParty);
    let acquirer = acquirer(Arc::clone(&http), Arc::clone(&headless), Arc::clone(&extraction));

    let result = acquirer.acquire("https://acme.example/").await;

    assert_eq!(result.analysis_depth, AnalysisDepth::Headless);
    assert_eq!(result.tier, Some(Tier::Headless));
    assert!(!result.fallback_used);
    assert_eq!(result.homepage.title, "Home | Acme");
    // One homepage attempt plus the crawl of /about, which is also challenged
    assert_eq!(http.paths(), vec!["/", "/about"]);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(headless.calls(), 1);
    assert_eq!(extraction.calls(), 0);

    let tiers: Vec<(Tier, FetchStatus)> =
        result.attempts.iter().map(|a| (a.tier, a.status)).collect();
    assert_eq!(
        tiers,
        vec![(Tier::Http, FetchStatus::Blocked), (Tier::Headless, FetchStatus::Ok)]
    );
    let stats = acquirer.stats();
    assert_eq!(stats.get_info_count(InfoType::BotProtectionDetected), 1);
    assert_eq!(stats.get_info_count(InfoType::EscalatedToHeadless), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_with_rotating_agents() {
    let http = MockTier::new(Tier::Http, |_| Err(FetchError::ServerError(503)));
    let acquirer = acquirer(
        Arc::clone(&http),
        MockTier::unavailable(Tier::Headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert!(result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::Limited);
    assert_eq!(http.calls(), 3);
    let agents: Vec<Option<String>> = http
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.user_agent.clone())
        .collect();
    assert_eq!(agents[0].as_deref(), Some(user_agent_for_attempt(0).as_str()));
    assert_ne!(agents[0], agents[1]);
    assert_ne!(agents[1], agents[2]);
    assert_eq!(result.attempts.len(), 5);
    assert_eq!(result.attempts[2].http_status, Some(503));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let http = MockTier::new(Tier::Http, |_| Err(FetchError::AccessDenied(403)));
    let headless = MockTier::unavailable(Tier::Headless);
    let extraction = MockTier::unavailable(Tier::ThirdParty);
    let acquirer = acquirer(Arc::clone(&http), Arc::clone(&headless), Arc::clone(&extraction));

    let result = acquirer.acquire("https://acme.example/").await;

    assert_eq!(http.calls(), 1);
    assert_eq!(headless.calls(), 1);
    assert_eq!(extraction.calls(), 1);
    assert_eq!(result.attempts[0].status, FetchStatus::Blocked);
    assert!(result.fallback_used);
}

#[tokio::test]
async fn test_fallback_marks_every_text_field() {
    let acquirer = acquirer(
        MockTier::new(Tier::Http, |_| Err(FetchError::Timeout)),
        MockTier::unavailable(Tier::Headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example/").await;
    let home = &result.homepage;

    assert!(result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::Limited);
    for field in [
        &home.title,
        &home.description,
        &home.navigation_text,
        &home.footer_text,
        &home.brand_marker_text,
    ] {
        assert_eq!(field, UNAVAILABLE_MARKER);
    }
    assert!(home.headings.is_empty() && home.paragraphs.is_empty());
    assert!(result.pages.is_empty());
    assert!(result.performance.is_none());
    assert!(!result.seo.checked);
    assert_eq!(result.consistency.brand_score, 50);
    assert_eq!(result.tier, None);
    assert_eq!(acquirer.stats().get_info_count(InfoType::FallbackResult), 1);
}

#[tokio::test]
async fn test_third_party_tier_is_last_resort() {
    let extraction = MockTier::new(Tier::ThirdParty, |_| Ok(HOME.to_string()));
    let acquirer = acquirer(
        MockTier::new(Tier::Http, |_| Err(FetchError::AccessDenied(403))),
        MockTier::unavailable(Tier::Headless),
        Arc::clone(&extraction),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert_eq!(result.analysis_depth, AnalysisDepth::ThirdParty);
    assert_eq!(result.tier, Some(Tier::ThirdParty));
    assert_eq!(extraction.calls(), 1);
    assert_eq!(
        acquirer.stats().get_info_count(InfoType::EscalatedToThirdParty),
        1
    );
}

#[tokio::test]
async fn test_challenge_from_later_tier_counts_as_failure() {
    let extraction = MockTier::new(Tier::ThirdParty, |_| Ok(HOME.to_string()));
    let acquirer = acquirer(
        MockTier::new(Tier::Http, |_| Ok(CHALLENGE.to_string())),
        MockTier::new(Tier::Headless, |_| Ok(CHALLENGE.to_string())),
        Arc::clone(&extraction),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert_eq!(result.tier, Some(Tier::ThirdParty));
    assert_eq!(result.attempts[1].status, FetchStatus::Blocked);
    assert!(result.attempts[1].error.is_some());
}

#[tokio::test]
async fn test_script_shell_is_kept_as_last_resort() {
    let http = MockTier::new(Tier::Http, |request| match request.url.path() {
        "/" => Ok(SHELL.to_string()),
        _ => Err(FetchError::AccessDenied(404)),
    });
    let headless = MockTier::unavailable(Tier::Headless);
    let acquirer = acquirer(
        Arc::clone(&http),
        Arc::clone(&headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert!(!result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::SinglePage);
    assert_eq!(result.tier, Some(Tier::Http));
    assert_eq!(result.homepage.title, "Acme");
    assert_eq!(headless.calls(), 1);
    let stats = acquirer.stats();
    assert_eq!(stats.get_info_count(InfoType::ScriptShellDetected), 1);
    assert_eq!(stats.get_info_count(InfoType::DirectPageReused), 1);
}

#[tokio::test]
async fn test_script_shell_prefers_rendered_page() {
    let headless = MockTier::new(Tier::Headless, |_| Ok(HOME.to_string()));
    let acquirer = acquirer(
        MockTier::new(Tier::Http, |_| Ok(SHELL.to_string())),
        Arc::clone(&headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert_eq!(result.analysis_depth, AnalysisDepth::Headless);
    assert_eq!(result.homepage.title, "Home | Acme");
    assert_eq!(acquirer.stats().get_info_count(InfoType::DirectPageReused), 0);
}

#[tokio::test]
async fn test_widget_page_is_kept_when_later_tiers_see_it_too() {
    let http = MockTier::new(Tier::Http, |request| match request.url.path() {
        "/" => Ok(TURNSTILE_CONTACT.to_string()),
        _ => Err(FetchError::AccessDenied(404)),
    });
    let headless = MockTier::new(Tier::Headless, |_| Ok(TURNSTILE_CONTACT.to_string()));
    let extraction = MockTier::new(Tier::ThirdParty, |_| Ok(TURNSTILE_CONTACT.to_string()));
    let acquirer = acquirer(
        Arc::clone(&http),
        Arc::clone(&headless),
        Arc::clone(&extraction),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert!(!result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::SinglePage);
    assert_eq!(result.tier, Some(Tier::Http));
    assert_eq!(result.homepage.title, "Contact | Acme");
    assert_eq!(headless.calls(), 1);
    assert_eq!(extraction.calls(), 1);
    assert_eq!(result.attempts[0].status, FetchStatus::Blocked);
    assert!(result.attempts[0].raw_body.is_some());
    let stats = acquirer.stats();
    assert_eq!(stats.get_info_count(InfoType::WidgetPageDetected), 1);
    assert_eq!(stats.get_info_count(InfoType::DirectPageReused), 1);
}

#[tokio::test]
async fn test_interstitial_on_success_status_is_not_kept() {
    let acquirer = acquirer(
        MockTier::new(Tier::Http, |_| Ok(CHALLENGE.to_string())),
        MockTier::unavailable(Tier::Headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("https://acme.example/").await;

    assert!(result.fallback_used);
    assert_eq!(result.analysis_depth, AnalysisDepth::Limited);
    assert_eq!(acquirer.stats().get_info_count(InfoType::DirectPageReused), 0);
}

#[tokio::test]
async fn test_invalid_url_returns_fallback() {
    let http = MockTier::new(Tier::Http, site);
    let acquirer = acquirer(
        Arc::clone(&http),
        MockTier::unavailable(Tier::Headless),
        MockTier::unavailable(Tier::ThirdParty),
    );

    let result = acquirer.acquire("not a url at all").await;

    assert!(result.fallback_used);
    assert_eq!(http.calls(), 0);
    assert!(result.attempts.is_empty());
}

#[test]
fn test_analysis_depth_by_tier() {
    assert_eq!(analysis_depth(Tier::Http, 0), AnalysisDepth::SinglePage);
    assert_eq!(analysis_depth(Tier::Http, 2), AnalysisDepth::MultiPage);
    assert_eq!(analysis_depth(Tier::Headless, 3), AnalysisDepth::Headless);
    assert_eq!(analysis_depth(Tier::ThirdParty, 0), AnalysisDepth::ThirdParty);
}
