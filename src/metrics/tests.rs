// Metrics collector tests.

use super::*;
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;

fn lighthouse_body() -> serde_json::Value {
    json!({
        "id": "https://acme.example/",
        "lighthouseResult": {
            "configSettings": { "formFactor": "mobile" },
            "categories": {
                "performance": { "score": 0.87 },
                "accessibility": { "score": 0.91 },
                "best-practices": { "score": 1.0 },
                "seo": { "score": 0.755 }
            },
            "audits": {
                "largest-contentful-paint": { "numericValue": 2450.5 },
                "first-contentful-paint": { "numericValue": 1200.0 },
                "cumulative-layout-shift": { "numericValue": 0.02 },
                "total-blocking-time": { "numericValue": 150.0 },
                "speed-index": { "numericValue": 3100.0 }
            }
        }
    })
}

fn probe_config(server: &Server) -> Config {
    Config {
        pagespeed_api_url: server.url_str("/runPagespeed"),
        probe_timeout_secs: 2,
        performance_timeout_secs: 2,
        ..Default::default()
    }
}

fn site_url(server: &Server) -> Url {
    Url::parse(&server.url_str("/")).unwrap()
}

#[test]
fn test_parse_lighthouse_scores_and_vitals() {
    let metrics = performance::parse_lighthouse(&lighthouse_body()).unwrap();
    assert_eq!(metrics.strategy, "mobile");
    assert_eq!(metrics.scores.performance, Some(87));
    assert_eq!(metrics.scores.accessibility, Some(91));
    assert_eq!(metrics.scores.best_practices, Some(100));
    assert_eq!(metrics.scores.seo, Some(76));
    assert_eq!(metrics.vitals.largest_contentful_paint_ms, Some(2450.5));
    assert_eq!(metrics.vitals.cumulative_layout_shift, Some(0.02));
}

#[test]
fn test_parse_lighthouse_missing_parts() {
    assert!(performance::parse_lighthouse(&json!({ "error": "quota" })).is_none());

    let partial = json!({ "lighthouseResult": { "categories": {} } });
    let metrics = performance::parse_lighthouse(&partial).unwrap();
    assert_eq!(metrics.scores, CategoryScores::default());
    assert_eq!(metrics.vitals.speed_index_ms, None);
}

#[tokio::test]
async fn test_performance_request() {
    let server = Server::run();
    server.expect(
        Expectation::matching(httptest::all_of![
            request::method_path("GET", "/runPagespeed"),
            request::query(url_decoded(contains(("strategy", "mobile")))),
            request::query(url_decoded(contains(("category", "best-practices")))),
            request::query(url_decoded(contains(("url", "https://acme.example/")))),
        ])
        .respond_with(json_encoded(lighthouse_body())),
    );

    let stats = Arc::new(ProcessingStats::new());
    let metrics = NetworkMetrics::new(reqwest::Client::new(), &probe_config(&server), stats);
    let url = Url::parse("https://acme.example/").unwrap();
    let performance = metrics.get_performance(&url).await.unwrap();
    assert_eq!(performance.scores.performance, Some(87));
}

#[tokio::test]
async fn test_performance_failure_is_none() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/runPagespeed"))
            .respond_with(status_code(429).body("quota exceeded")),
    );

    let stats = Arc::new(ProcessingStats::new());
    let metrics = NetworkMetrics::new(
        reqwest::Client::new(),
        &probe_config(&server),
        Arc::clone(&stats),
    );
    let url = Url::parse("https://acme.example/").unwrap();
    assert!(metrics.get_performance(&url).await.is_none());
    assert_eq!(stats.get_error_count(ErrorType::PerformanceMetricsError), 1);
}

#[tokio::test]
async fn test_seo_probes_follow_robots_sitemap() {
    let server = Server::run();
    let sitemap = server.url_str("/sitemaps/main.xml");
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt")).respond_with(
            status_code(200).body(format!("User-agent: *\nDisallow: /admin\nSitemap: {sitemap}\n")),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/sitemaps/main.xml")).respond_with(
            status_code(200).body(r#"<?xml version="1.0"?><sitemapindex></sitemapindex>"#),
        ),
    );

    let stats = Arc::new(ProcessingStats::new());
    let metrics = NetworkMetrics::new(reqwest::Client::new(), &probe_config(&server), stats);
    let seo = metrics.get_seo(&site_url(&server)).await;

    assert!(seo.checked);
    assert!(seo.has_robots_txt);
    assert!(seo.has_sitemap);
    assert_eq!(seo.sitemap_url.as_deref(), Some(sitemap.as_str()));
    // Nothing serves TLS on 127.0.0.1:443
    assert!(!seo.has_ssl);
    assert!(seo.certificate.is_none());
}

#[tokio::test]
async fn test_seo_probes_reject_soft_404_pages() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt")).respond_with(
            status_code(200).body("<!DOCTYPE html><html><head><title>Not found</title></head></html>"),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/sitemap.xml"))
            .respond_with(status_code(404)),
    );

    let stats = Arc::new(ProcessingStats::new());
    let metrics = NetworkMetrics::new(reqwest::Client::new(), &probe_config(&server), stats);
    let seo = metrics.get_seo(&site_url(&server)).await;

    assert!(seo.checked);
    assert!(!seo.has_robots_txt);
    assert!(!seo.has_sitemap);
}

#[tokio::test]
async fn test_default_sitemap_location() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/robots.txt"))
            .respond_with(status_code(404)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/sitemap.xml")).respond_with(
            status_code(200).body(r#"<urlset><url><loc>https://acme.example/</loc></url></urlset>"#),
        ),
    );

    let stats = Arc::new(ProcessingStats::new());
    let metrics = NetworkMetrics::new(reqwest::Client::new(), &probe_config(&server), stats);
    let seo = metrics.get_seo(&site_url(&server)).await;

    assert!(!seo.has_robots_txt);
    assert!(seo.has_sitemap);
}

#[tokio::test]
async fn test_tls_probe_against_plain_http_fails() {
    let server = Server::run();
    let port = server.addr().port();
    assert!(get_certificate_summary("127.0.0.1", port).await.is_err());
}

#[test]
fn test_tls_port_for_http_urls_is_443() {
    let port = |url: &str| tls_port(&Url::parse(url).unwrap());
    assert_eq!(port("http://acme.example/"), 443);
    assert_eq!(port("http://acme.example:8080/"), 443);
    assert_eq!(port("https://acme.example/"), 443);
    assert_eq!(port("https://acme.example:8443/"), 8443);
}

#[tokio::test]
async fn test_disabled_metrics_are_unknown() {
    let url = Url::parse("https://acme.example/").unwrap();
    assert!(DisabledMetrics.get_performance(&url).await.is_none());
    let seo = DisabledMetrics.get_seo(&url).await;
    assert!(!seo.checked);
    assert_eq!(seo, SeoMetrics::unknown());
}

#[test]
fn test_sitemaps_from_robots() {
    let robots = "User-agent: *\nsitemap: https://acme.example/a.xml\nSITEMAP:/b.xml\nSitemap:\n";
    assert_eq!(
        seo::sitemaps_from_robots(robots),
        vec!["https://acme.example/a.xml", "/b.xml"]
    );
}
