//! robots.txt and sitemap probes.

use std::time::Duration;

use log::debug;
use url::Url;

/// Outcome of the robots.txt and sitemap probes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CrawlFileProbe {
    pub has_robots_txt: bool,
    pub sitemap_url: Option<String>,
}

/// Fetches a probe URL, returning the body of a 2xx response.
async fn fetch_text(client: &reqwest::Client, url: &Url, timeout: Duration) -> Option<String> {
    let response = match client.get(url.as_str()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("Probe {} failed: {}", url, e);
            return None;
        }
    };
    if !response.status().is_success() {
        debug!("Probe {} returned {}", url, response.status());
        return None;
    }
    response.text().await.ok()
}

/// `true` when a body looks like an HTML page (soft 404s, catch-all routes).
fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(256).collect::<String>().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<head")
}

/// Sitemap URLs named by `Sitemap:` lines in robots.txt.
pub(crate) fn sitemaps_from_robots(robots: &str) -> Vec<String> {
    robots
        .lines()
        .filter_map(|line| {
            let (field, value) = line.split_once(':')?;
            field
                .trim()
                .eq_ignore_ascii_case("sitemap")
                .then(|| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .collect()
}

/// `true` when a body is an XML sitemap or sitemap index.
fn is_sitemap(body: &str) -> bool {
    body.contains("<urlset") || body.contains("<sitemapindex")
}

/// Probes `{origin}/robots.txt` and the sitemap.
///
/// Sitemaps named in robots.txt are tried before `{origin}/sitemap.xml`. Any
/// network error leaves the corresponding flag `false`.
pub(crate) async fn probe_crawl_files(
    client: &reqwest::Client,
    origin: &Url,
    timeout: Duration,
) -> CrawlFileProbe {
    let mut probe = CrawlFileProbe::default();
    let mut sitemap_candidates: Vec<Url> = Vec::new();

    if let Ok(robots_url) = origin.join("/robots.txt") {
        if let Some(body) = fetch_text(client, &robots_url, timeout).await {
            if !looks_like_html(&body) {
                probe.has_robots_txt = true;
                sitemap_candidates.extend(
                    sitemaps_from_robots(&body)
                        .iter()
                        .filter_map(|href| origin.join(href).ok()),
                );
            }
        }
    }
    if let Ok(default_sitemap) = origin.join("/sitemap.xml") {
        if !sitemap_candidates.contains(&default_sitemap) {
            sitemap_candidates.push(default_sitemap);
        }
    }

    for candidate in sitemap_candidates {
        if let Some(body) = fetch_text(client, &candidate, timeout).await {
            if is_sitemap(&body) {
                probe.sitemap_url = Some(candidate.to_string());
                break;
            }
        }
    }
    probe
}
