//! Headless browser fetcher.
//!
//! Launches a fresh Chromium per fetch, navigates, waits for the page to
//! settle and captures the serialized DOM. The browser process is torn down on
//! every path, including timeouts and navigation failures.
//!
//! Navigation completes on the load event. The engine exposes no network-idle
//! wait, so the fixed settle delay that follows stands in for one: requests
//! started by scripts after `load` get that long to land in the DOM.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{FetchRequest, FetchedPage, Tier};
use super::PageFetcher;
use crate::error_handling::FetchError;

/// Renders pages in a headless Chromium.
///
/// Built without the `headless` feature, every fetch fails with
/// [`FetchError::EngineUnavailable`].
#[derive(Debug, Clone)]
pub struct HeadlessFetcher {
    settle: Duration,
    executable: Option<PathBuf>,
}

impl HeadlessFetcher {
    /// Creates a fetcher that waits `settle` after navigation before capturing.
    pub fn new(settle: Duration, executable: Option<PathBuf>) -> Self {
        Self { settle, executable }
    }
}

#[async_trait]
impl PageFetcher for HeadlessFetcher {
    fn tier(&self) -> Tier {
        Tier::Headless
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        #[cfg(feature = "headless")]
        {
            chromium::render(request, self.settle, self.executable.as_deref()).await
        }
        #[cfg(not(feature = "headless"))]
        {
            let _ = (request, self.settle, &self.executable);
            Err(FetchError::EngineUnavailable(
                "built without the `headless` feature".to_string(),
            ))
        }
    }
}

#[cfg(feature = "headless")]
mod chromium {
    use std::path::Path;
    use std::time::Duration;

    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use log::debug;
    use url::Url;

    use crate::error_handling::FetchError;
    use crate::fetch::types::{FetchRequest, FetchedPage};
    use crate::user_agent::default_user_agent;

    fn render_error(error: impl std::fmt::Display) -> FetchError {
        FetchError::Render(error.to_string())
    }

    fn browser_config(
        request: &FetchRequest,
        executable: Option<&Path>,
    ) -> Result<BrowserConfig, FetchError> {
        let user_agent = request
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--window-size=1366,900")
            .arg(format!("--user-agent={user_agent}"));
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        // build() fails when no Chromium binary can be located
        builder.build().map_err(FetchError::EngineUnavailable)
    }

    pub(super) async fn render(
        request: &FetchRequest,
        settle: Duration,
        executable: Option<&Path>,
    ) -> Result<FetchedPage, FetchError> {
        let config = browser_config(request, executable)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::EngineUnavailable(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        let result = tokio::time::timeout(request.timeout, capture(&browser, request, settle))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        if let Err(e) = browser.close().await {
            debug!("Closing browser failed: {e}");
        }
        if let Err(e) = browser.wait().await {
            debug!("Waiting for browser exit failed: {e}");
        }
        handler_task.abort();

        result
    }

    async fn capture(
        browser: &Browser,
        request: &FetchRequest,
        settle: Duration,
    ) -> Result<FetchedPage, FetchError> {
        let page = browser.new_page("about:blank").await.map_err(render_error)?;
        let outcome = navigate(&page, request, settle).await;
        if let Err(e) = page.close().await {
            debug!("Closing page failed: {e}");
        }
        outcome
    }

    async fn navigate(
        page: &Page,
        request: &FetchRequest,
        settle: Duration,
    ) -> Result<FetchedPage, FetchError> {
        page.goto(request.url.as_str())
            .await
            .map_err(render_error)?
            .wait_for_navigation()
            .await
            .map_err(render_error)?;
        // Stand-in for network idle: late XHR and lazy content
        tokio::time::sleep(settle).await;

        let body = page.content().await.map_err(render_error)?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| request.url.clone());
        debug!("Rendered {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage {
            final_url,
            http_status: None,
            body,
        })
    }
}
