//! End-to-end pipeline tests
//!
//! These tests use wiremock to serve listing pages and archives, and run the
//! full discovery and retrieval cycle into a temporary directory.

use koradi_archiver::config::Config;
use koradi_archiver::events::{event_channel, ProgressAggregator};
use koradi_archiver::{run_pipeline, EventSender, Language, Pipeline, PipelineReport};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a listing page containing one anchor per href
fn listing(hrefs: &[&str]) -> String {
    let anchors: Vec<String> = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        "<html><head><title>Downloads</title></head><body><ul>{}</ul></body></html>",
        anchors.join("\n")
    )
}

async fn mount_page(server: &MockServer, route: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(hrefs))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .insert_header("content-type", "application/zip"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn language(server: &MockServer, code: &str) -> Language {
    Language::new(code, format!("{}/{}/downloads/", server.uri(), code))
}

async fn run(languages: Vec<Language>, root: &Path) -> PipelineReport {
    run_pipeline(&Config::default(), languages, root, EventSender::detached())
        .await
        .unwrap()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[tokio::test]
async fn test_full_run_two_languages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/", "/en/authors/bob/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip", "talk2.zip", "notes.pdf"]).await;
    mount_page(&server, "/en/authors/bob/", &["talk3.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;
    mount_archive(&server, "/en/authors/alice/talk2.zip", b"alice two").await;
    mount_archive(&server, "/en/authors/bob/talk3.zip", b"bob three").await;

    mount_page(&server, "/es/downloads/", &["/es/autores/carmen/"]).await;
    mount_page(&server, "/es/autores/carmen/", &["charla1.zip"]).await;
    mount_archive(&server, "/es/autores/carmen/charla1.zip", b"carmen uno").await;

    let report = run(
        vec![language(&server, "en"), language(&server, "es")],
        dir.path(),
    )
    .await;

    assert!(!report.cancelled);
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(
        sorted(report.new_downloads.clone()),
        vec!["charla1.zip", "talk1.zip", "talk2.zip", "talk3.zip"]
    );

    let en = report.language("en").unwrap();
    assert_eq!(en.author_links, 2);
    assert_eq!(en.archive_links, 3);
    assert_eq!(en.downloaded, 3);

    let es = report.language("es").unwrap();
    assert_eq!(es.archive_links, 1);
    assert_eq!(es.downloaded, 1);

    assert_eq!(std::fs::read(dir.path().join("en/talk1.zip")).unwrap(), b"alice one");
    assert_eq!(std::fs::read(dir.path().join("en/talk3.zip")).unwrap(), b"bob three");
    assert_eq!(std::fs::read(dir.path().join("es/charla1.zip")).unwrap(), b"carmen uno");
    assert!(!dir.path().join("en/notes.pdf").exists());
}

#[tokio::test]
async fn test_failed_seed_drops_only_that_language() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_status(&server, "/fr/downloads/", 500).await;

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;

    let fr = language(&server, "fr");
    let report = run(vec![fr.clone(), language(&server, "en")], dir.path()).await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].context, fr.seed_url);
    assert!(report.errors[0].message.contains("500"));

    let fr_report = report.language("fr").unwrap();
    assert!(fr_report.discovery_failed);
    assert_eq!(fr_report.attempted(), 0);
    assert!(!dir.path().join("fr").exists());

    assert_eq!(report.new_downloads, vec!["talk1.zip"]);
    assert!(dir.path().join("en/talk1.zip").exists());
}

#[tokio::test]
async fn test_non_utf8_listing_is_decoded_lossily() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Latin-1 "é" in a comment
    let seed = b"<html><body><!-- caf\xE9 --><a href=\"/fr/auteurs/marie/\">Marie</a></body></html>";
    Mock::given(method("GET"))
        .and(path("/fr/downloads/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(seed.to_vec())
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/fr/auteurs/marie/", &["conference.zip"]).await;
    mount_archive(&server, "/fr/auteurs/marie/conference.zip", b"marie").await;

    let report = run(vec![language(&server, "fr")], dir.path()).await;

    assert!(!report.language("fr").unwrap().discovery_failed);
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.new_downloads, vec!["conference.zip"]);
}

#[tokio::test]
async fn test_corrupt_encoded_listing_is_a_parse_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/de/downloads/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"this is not a gzip stream".to_vec())
                .insert_header("content-type", "text/html")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&server)
        .await;

    let report = run(vec![language(&server, "de")], dir.path()).await;

    assert!(report.language("de").unwrap().discovery_failed);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.contains("Failed to parse markup"));
}

#[tokio::test]
async fn test_archive_without_response_headers_times_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["slow.zip", "talk1.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;
    Mock::given(method("GET"))
        .and(path("/en/authors/alice/slow.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.http.connect_timeout_secs = 1;
    config.http.request_timeout_secs = 1;
    config.http.read_timeout_secs = 1;

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        run_pipeline(
            &config,
            vec![language(&server, "en")],
            dir.path(),
            EventSender::detached(),
        ),
    )
    .await
    .expect("run should not wait for the delayed archive")
    .unwrap();

    let en = report.language("en").unwrap();
    assert_eq!(en.failed, 1);
    assert_eq!(en.downloaded, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].context.ends_with("slow.zip"));
    assert!(report.errors[0].message.contains("No response received"));
    assert!(!dir.path().join("en/slow.zip").exists());
}

#[tokio::test]
async fn test_failed_author_page_is_not_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/carol/", "/en/authors/alice/"]).await;
    mount_status(&server, "/en/authors/carol/", 500).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].context,
        format!("{}/en/authors/carol/", server.uri())
    );
    assert_eq!(report.new_downloads, vec!["talk1.zip"]);
}

#[tokio::test]
async fn test_other_language_author_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/", "/es/autores/carmen/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;

    Mock::given(method("GET"))
        .and(path("/es/autores/carmen/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["charla1.zip"])))
        .expect(0)
        .mount(&server)
        .await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    let en = report.language("en").unwrap();
    assert_eq!(en.author_links, 2);
    assert_eq!(en.archive_links, 1);
    assert!(report.errors.is_empty());
    assert_eq!(report.new_downloads, vec!["talk1.zip"]);
}

#[tokio::test]
async fn test_duplicate_archive_links_downloaded_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let shared = format!("{}/en/shared/common.zip", server.uri());

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/", "/en/authors/bob/"]).await;
    mount_page(&server, "/en/authors/alice/", &[shared.as_str(), "talk1.zip", "talk1.zip"]).await;
    mount_page(&server, "/en/authors/bob/", &[shared.as_str()]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;

    Mock::given(method("GET"))
        .and(path("/en/shared/common.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"shared".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    let en = report.language("en").unwrap();
    assert_eq!(en.archive_links, 2);
    assert_eq!(en.downloaded, 2);
    assert_eq!(sorted(report.new_downloads), vec!["common.zip", "talk1.zip"]);
}

#[tokio::test]
async fn test_rerun_skips_existing_files() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip", "talk2.zip"]).await;

    for name in ["talk1.zip", "talk2.zip"] {
        Mock::given(method("GET"))
            .and(path(format!("/en/authors/alice/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let first = run(vec![language(&server, "en")], dir.path()).await;
    assert_eq!(first.new_downloads.len(), 2);

    let second = run(vec![language(&server, "en")], dir.path()).await;
    let en = second.language("en").unwrap();
    assert!(second.new_downloads.is_empty());
    assert_eq!(en.downloaded, 0);
    assert_eq!(en.skipped, en.archive_links);
    assert_eq!(en.skipped, 2);
}

#[tokio::test]
async fn test_missing_archive_fails_without_leaving_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["gone.zip", "talk1.zip"]).await;
    mount_status(&server, "/en/authors/alice/gone.zip", 404).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"alice one").await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    let en = report.language("en").unwrap();
    assert_eq!(en.failed, 1);
    assert_eq!(en.downloaded, 1);
    assert!(!en.aborted);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].context.ends_with("gone.zip"));
    assert!(report.errors[0].message.contains("404"));
    assert!(!dir.path().join("en/gone.zip").exists());
    assert!(dir.path().join("en/talk1.zip").exists());
}

#[tokio::test]
async fn test_legacy_zip_suffix_is_archived() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["old-talk-zip", "readme.txt"]).await;
    mount_archive(&server, "/en/authors/alice/old-talk-zip", b"legacy").await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    assert_eq!(report.new_downloads, vec!["old-talk-zip"]);
    assert_eq!(std::fs::read(dir.path().join("en/old-talk-zip")).unwrap(), b"legacy");
}

#[tokio::test]
async fn test_progress_reaches_total_for_every_language() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip", "talk2.zip", "gone.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk1.zip", b"one").await;
    mount_archive(&server, "/en/authors/alice/talk2.zip", b"two").await;
    mount_status(&server, "/en/authors/alice/gone.zip", 404).await;

    mount_page(&server, "/it/downloads/", &["/it/autori/paolo/"]).await;
    mount_page(&server, "/it/autori/paolo/", &[]).await;

    let languages = vec![language(&server, "en"), language(&server, "it")];
    let (events, rx) = event_channel(2);
    let pipeline = Pipeline::new(&Config::default(), languages.clone(), dir.path(), events).unwrap();

    let consumer = tokio::spawn(ProgressAggregator::new(&languages).run(rx, |_, _| {}));
    let report = pipeline.run().await;
    drop(pipeline);
    let aggregator = consumer.await.unwrap();

    let en = aggregator.progress_for(0).unwrap();
    assert_eq!(en.total, 3);
    assert_eq!(en.completed, en.total);

    let it = aggregator.progress_for(1).unwrap();
    assert_eq!(it.total, 0);
    assert_eq!(it.completed, 0);

    let summary = aggregator.summary().unwrap();
    assert_eq!(summary.new_downloads.len(), report.new_downloads.len());
    assert!(aggregator
        .logs()
        .iter()
        .any(|log| log.message.contains("Checking 1 en links for .zip files")));
}

#[tokio::test]
async fn test_all_languages_concurrently() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let codes = ["en", "es", "fr", "po", "it", "de"];
    let mut expected = Vec::new();

    for code in codes {
        let author = format!("/{}/authors/speaker/", code);
        mount_page(&server, &format!("/{}/downloads/", code), &[author.as_str()]).await;

        let names: Vec<String> = (1..=3).map(|n| format!("{}-talk{}.zip", code, n)).collect();
        let hrefs: Vec<&str> = names.iter().map(String::as_str).collect();
        mount_page(&server, &author, &hrefs).await;

        for name in &names {
            mount_archive(&server, &format!("{}{}", author, name), name.as_bytes()).await;
            expected.push(name.clone());
        }
    }

    let languages = codes.iter().map(|code| language(&server, code)).collect();
    let report = run(languages, dir.path()).await;

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.new_downloads.len(), 18);
    assert_eq!(sorted(report.new_downloads.clone()), sorted(expected));

    let codes_in_order: Vec<&str> = report.languages.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes_in_order, codes);

    for code in codes {
        let entry = report.language(code).unwrap();
        assert_eq!(entry.downloaded, 3);
        assert_eq!(entry.attempted(), 3);
        let dir_entries = std::fs::read_dir(dir.path().join(code)).unwrap().count();
        assert_eq!(dir_entries, 3);
    }
    assert_eq!(report.total_downloaded(), 18);
}

#[tokio::test]
async fn test_existing_file_is_kept_and_new_one_fetched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("en")).unwrap();
    std::fs::write(dir.path().join("en/talk1.zip"), b"kept").unwrap();

    mount_page(&server, "/en/downloads/", &["/en/authors/alice/"]).await;
    mount_page(&server, "/en/authors/alice/", &["talk1.zip", "talk2.zip"]).await;
    mount_archive(&server, "/en/authors/alice/talk2.zip", b"two").await;

    let report = run(vec![language(&server, "en")], dir.path()).await;

    let en = report.language("en").unwrap();
    assert_eq!(en.skipped, 1);
    assert_eq!(en.downloaded, 1);
    assert_eq!(report.new_downloads, vec!["talk2.zip"]);
    assert_eq!(std::fs::read(dir.path().join("en/talk1.zip")).unwrap(), b"kept");
}
