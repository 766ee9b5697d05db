// End-to-end tests for crawl orchestration: crawler, registry and file
// sinks wired together against a mock server.

use sark_core::crawl::{CrawlOptions, execute_crawl};
use sark_core::report::{OutputTargets, ReportFile, Reporter};
use sark_scanner::{AssetRegistry, CrawlMode, KeyStyle, UserAgentPolicy};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(body: &str) -> ResponseTemplate {
    // set_body_string would reset the content type to text/plain, so the
    // body and mime type must be set in one call.
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn crawl_options(target: &str, mode: CrawlMode, ignore: HashSet<u16>) -> CrawlOptions {
    CrawlOptions {
        target: target.to_string(),
        scheme: "http".to_string(),
        mode,
        ignore,
        agent: UserAgentPolicy::Fixed("sark-test/1.0".to_string()),
        workers: 2,
    }
}

#[tokio::test]
async fn test_crawl_writes_discoveries_to_every_sink() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/admin">panel</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html_page("<p>nothing further</p>"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let txt = dir.path().join("report.txt");
    let reporter = Arc::new(Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: Some(txt.clone()),
        plain: true,
    }));
    reporter.init_files("example.com").unwrap();
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Url));

    let target = format!("127.0.0.1:{}", server.address().port());
    execute_crawl(
        crawl_options(&target, CrawlMode::Directory, HashSet::new()),
        Arc::clone(&registry),
        Arc::clone(&reporter),
    )
    .await
    .unwrap();
    reporter.finish_files().unwrap();

    let root = format!("http://{}", target);
    let admin = format!("http://{}/admin", target);

    let parsed: ReportFile = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    let mut reported = parsed.dir.clone();
    reported.sort();
    let mut expected = vec![root.clone(), admin.clone()];
    expected.sort();
    assert_eq!(reported, expected);

    let txt_out = fs::read_to_string(&txt).unwrap();
    assert!(txt_out.contains(&root));
    assert!(txt_out.contains(&admin));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_crawl_ignore_list_keeps_status_out_of_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/gone">stale</a>"#))
        .mount(&server)
        .await;
    // "/gone" is unmatched and answers 404.

    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let reporter = Arc::new(Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: None,
        plain: true,
    }));
    reporter.init_files("example.com").unwrap();
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Url));

    let target = format!("127.0.0.1:{}", server.address().port());
    execute_crawl(
        crawl_options(&target, CrawlMode::Directory, HashSet::from([404])),
        Arc::clone(&registry),
        Arc::clone(&reporter),
    )
    .await
    .unwrap();

    let parsed: ReportFile = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed.dir, vec![format!("http://{}", target)]);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_crawl_fails_when_the_json_sink_is_corrupt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("<p>hello</p>"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let reporter = Arc::new(Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: None,
        plain: true,
    }));
    reporter.init_files("example.com").unwrap();
    fs::write(&json, "{ broken").unwrap();
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Url));

    let target = format!("127.0.0.1:{}", server.address().port());
    let result = execute_crawl(
        crawl_options(&target, CrawlMode::Directory, HashSet::new()),
        Arc::clone(&registry),
        Arc::clone(&reporter),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_crawl_of_unreachable_target_ends_quietly() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let target = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let dir = tempdir().unwrap();
    let json = dir.path().join("report.json");
    let reporter = Arc::new(Reporter::new(OutputTargets {
        json: Some(json.clone()),
        html: None,
        txt: None,
        plain: true,
    }));
    reporter.init_files("example.com").unwrap();
    let registry = Arc::new(AssetRegistry::new(KeyStyle::Url));

    execute_crawl(
        crawl_options(&target, CrawlMode::Directory, HashSet::new()),
        Arc::clone(&registry),
        Arc::clone(&reporter),
    )
    .await
    .unwrap();

    assert!(registry.is_empty());
    assert_eq!(fs::read_to_string(&json).unwrap(), "");
}
