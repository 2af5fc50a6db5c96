//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end.

use ripple_mirror::crawler::{Crawler, Fetcher};
use ripple_mirror::storage::{FsStore, LocalStore, MemoryStore};
use ripple_mirror::url::extract_authority;
use ripple_mirror::{ConfigError, MirrorError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a crawler writing into `dir`
fn fs_crawler(dir: &Path) -> Crawler {
    let fetcher = Fetcher::with_timeout(Some(Duration::from_secs(5))).expect("Failed to build client");
    Crawler::new(Arc::new(FsStore::new(dir)), fetcher)
}

/// Directory name the mock server's pages are mirrored under
fn authority(server: &MockServer) -> String {
    let url = url::Url::parse(&server.uri()).expect("Failed to parse base URL");
    extract_authority(&url).expect("Failed to extract authority")
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(body))
        .expect(expected)
        .mount(server)
        .await;
}

/// Every file under `root` with its content, keyed by relative path
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).expect("Failed to read dir") {
            let entry = entry.expect("Failed to read entry");
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, std::fs::read(&path).unwrap());
            }
        }
    }

    let mut files = BTreeMap::new();
    walk(root, root, &mut files);
    files
}

#[tokio::test]
async fn test_only_in_scope_links_are_mirrored() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="/docs/a.html">A</a>
           <a href="http://other.com/x">Other</a>
           <a href="mailto:a@b.com">Mail</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/a.html", r#"<a href="/docs/b.html">B</a>"#, 1).await;
    mount_page(&server, "/docs/b.html", "too deep", 0).await;

    let seed = format!("{}/docs/", server.uri());
    let summary = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 1)
        .await
        .expect("Crawl failed");

    let host = authority(&server);
    let files = snapshot(dir.path());
    let expected: Vec<PathBuf> = vec![
        Path::new(&host).join("docs/a.html"),
        Path::new(&host).join("docs/index.html"),
    ];
    assert_eq!(files.keys().cloned().collect::<Vec<_>>(), expected);

    assert_eq!(summary.pages_downloaded, 2);
    assert_eq!(summary.skipped_out_of_scope, 1);
    assert_eq!(summary.skipped_unsupported, 1);
    assert_eq!(summary.skipped_depth, 1);

    server.verify().await;
}

#[tokio::test]
async fn test_shared_resource_downloaded_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="/docs/p1.html">1</a><a href="/docs/p2.html">2</a>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/docs/p1.html",
        r#"<a href="/docs/shared.html">S</a><a href="/docs/">Home</a>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/docs/p2.html",
        r#"<a href="/docs/shared.html">S</a><a href="/docs/">Home</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/shared.html", "shared", 1).await;

    let seed = format!("{}/docs/", server.uri());
    let summary = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 3)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_downloaded, 4);
    // shared.html once, the index page twice
    assert_eq!(summary.skipped_claimed, 3);

    let shared = dir
        .path()
        .join(authority(&server))
        .join("docs/shared.html");
    assert!(shared.is_file());

    server.verify().await;
}

#[tokio::test]
async fn test_cached_page_is_not_fetched_but_still_followed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let host = authority(&server);

    let cached = dir.path().join(&host).join("docs/index.html");
    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(
        &cached,
        r#"<html><body><a href="/docs/a.html">A</a></body></html>"#,
    )
    .unwrap();

    mount_page(&server, "/docs/", "network copy", 0).await;
    mount_page(&server, "/docs/a.html", "child", 1).await;

    let seed = format!("{}/docs/", server.uri());
    let summary = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 2)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.cache_hits, 1);
    assert_eq!(summary.pages_downloaded, 1);
    assert!(dir.path().join(&host).join("docs/a.html").is_file());

    server.verify().await;
}

#[tokio::test]
async fn test_failing_descendant_aborts_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="/docs/broken.html">Broken</a><a href="/docs/slow.html">Slow</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/slow.html"))
        .respond_with(html_page(r#"<a href="/docs/deeper.html">D</a>"#).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    mount_page(&server, "/docs/deeper.html", "never reached", 0).await;

    let seed = format!("{}/docs/", server.uri());
    let err = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 5)
        .await
        .expect_err("Crawl should fail");

    assert!(matches!(err.root_cause(), MirrorError::Fetch { .. }));
    assert!(err.to_string().contains("broken.html"));
    assert!(!dir
        .path()
        .join(authority(&server))
        .join("docs/slow.html")
        .exists());

    server.verify().await;
}

#[tokio::test]
async fn test_invalid_seed_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();

    for seed in ["not a url", "", "/docs/", "ftp://example.com/"] {
        let err = fs_crawler(dir.path())
            .crawl(&CancellationToken::new(), seed, 3)
            .await
            .expect_err("Crawl should fail");
        assert!(
            matches!(err, MirrorError::Config(ConfigError::Seed(_))),
            "seed {:?} gave {:?}",
            seed,
            err
        );
    }

    assert!(snapshot(dir.path()).is_empty());
}

#[tokio::test]
async fn test_depth_zero_fetches_only_the_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/docs/", r#"<a href="/docs/a.html">A</a>"#, 1).await;
    mount_page(&server, "/docs/a.html", "child", 0).await;

    let seed = format!("{}/docs/", server.uri());
    let summary = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 0)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_processed(), 1);
    assert_eq!(summary.skipped_depth, 1);

    server.verify().await;
}

#[tokio::test]
async fn test_rerun_against_full_mirror_is_offline_and_identical() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="/docs/guide">Guide</a><a href="/docs/file.txt">File</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/guide", r#"<a href="/docs/">Home</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/docs/file.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("plain text")
                .insert_header("content-type", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/docs/", server.uri());
    let first = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 3)
        .await
        .expect("First crawl failed");
    server.verify().await;

    let host = authority(&server);
    let before = snapshot(dir.path());
    assert!(before.contains_key(&Path::new(&host).join("docs/guide.html")));
    assert!(before.contains_key(&Path::new(&host).join("docs/file.txt")));
    assert_eq!(first.pages_downloaded, 3);

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let second = fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 3)
        .await
        .expect("Second crawl failed");

    assert_eq!(second.pages_downloaded, 0);
    assert_eq!(second.cache_hits, 3);
    assert_eq!(snapshot(dir.path()), before);

    server.verify().await;
}

#[tokio::test]
async fn test_external_cancellation_ends_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_page("slow").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let seed = format!("{}/docs/", server.uri());
    let err = fs_crawler(dir.path())
        .crawl(&token, &seed, 3)
        .await
        .expect_err("Crawl should be cancelled");

    assert!(matches!(err, MirrorError::Cancelled));
    assert!(snapshot(dir.path()).is_empty());
}

#[tokio::test]
async fn test_non_html_content_is_stored_but_not_parsed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/docs/", r#"<a href="/docs/report.pdf">PDF</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/docs/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(br#"<a href="/docs/hidden.html">x</a>"#.to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/docs/hidden.html", "hidden", 0).await;

    let seed = format!("{}/docs/", server.uri());
    fs_crawler(dir.path())
        .crawl(&CancellationToken::new(), &seed, 3)
        .await
        .expect("Crawl failed");

    let host = authority(&server);
    assert!(dir.path().join(&host).join("docs/report.pdf").is_file());
    assert!(!dir.path().join(&host).join("docs/report.pdf.html").exists());

    server.verify().await;
}

#[tokio::test]
async fn test_path_collision_is_skipped_not_failed() {
    let server = MockServer::start().await;
    let host = authority(&server);

    // "docs/sub" is already a file, so nothing can live below it
    let store = Arc::new(MemoryStore::with_files([(
        format!("{}/docs/sub", host),
        "a file",
    )]));
    let dyn_store: Arc<dyn LocalStore> = store.clone();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="/docs/sub/page.html">Below</a><a href="/docs/ok.html">Ok</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/docs/sub/page.html", "unreachable", 0).await;
    mount_page(&server, "/docs/ok.html", "fine", 1).await;

    let fetcher = Fetcher::with_timeout(Some(Duration::from_secs(5))).unwrap();
    let seed = format!("{}/docs/", server.uri());
    let summary = Crawler::new(dyn_store, fetcher)
        .crawl(&CancellationToken::new(), &seed, 2)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.skipped_collision, 1);
    assert_eq!(summary.pages_downloaded, 2);
    assert_eq!(
        store.paths(),
        vec![
            format!("{}/docs/index.html", host),
            format!("{}/docs/ok.html", host),
            format!("{}/docs/sub", host),
        ]
    );

    server.verify().await;
}

#[tokio::test]
async fn test_fetch_limit_still_mirrors_everything() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn LocalStore> = store.clone();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/docs/p{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/docs/", &links, 1).await;
    for i in 0..10 {
        mount_page(&server, &format!("/docs/p{}.html", i), "leaf", 1).await;
    }

    let fetcher = Fetcher::with_timeout(Some(Duration::from_secs(5))).unwrap();
    let seed = format!("{}/docs/", server.uri());
    let summary = Crawler::new(dyn_store, fetcher)
        .with_fetch_limit(2)
        .crawl(&CancellationToken::new(), &seed, 1)
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_downloaded, 11);
    assert_eq!(store.writes(), 11);

    server.verify().await;
}
