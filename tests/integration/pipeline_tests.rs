//! Integration tests for the pipeline
//!
//! These tests use wiremock to serve a small ten-page listing and run the
//! full fetch, extract, enrich and write cycle against it.

use douban_top250::config::{Config, HeaderStyle};
use douban_top250::crawler::{spawn_pipeline, Pipeline};
use douban_top250::output::{NullProgress, ProgressEvent, ProgressObserver, RunOutcome, UTF8_BOM};
use douban_top250::record::{CHINESE_HEADER, ENGLISH_HEADER};
use douban_top250::state::{PAGE_COUNT, PAGE_SIZE};
use douban_top250::Top250Error;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS_PER_PAGE: u32 = 3;

/// Renders one catalog entry in the listing's markup
fn catalog_entry(server: &str, page: u32, index: u32) -> String {
    let id = page * 100 + index;
    format!(
        r#"<li><div class="item">
            <div class="pic"><em>{index}</em></div>
            <div class="info">
                <div class="hd"><a href="{server}/subject/{id}/"><span class="title">电影{id}</span><span class="title">&nbsp;/&nbsp;Movie {id}</span></a></div>
                <div class="bd">
                    <p class="">导演: 导演{id}&nbsp;&nbsp;&nbsp;主演: 演员{id} /...<br>
                    19{page:02}&nbsp;/&nbsp;美国&nbsp;/&nbsp;剧情</p>
                    <div class="star">
                        <span class="rating5-t"></span>
                        <span class="rating_num">9.{index}</span>
                        <span property="v:best" content="10.0"></span>
                        <span>{id}人评价</span>
                    </div>
                    <p class="quote"><span class="inq">引言{id}</span></p>
                </div>
            </div>
        </div></li>"#
    )
}

fn catalog_page(server: &str, page: u32) -> String {
    let entries: String = (0..ITEMS_PER_PAGE)
        .map(|index| catalog_entry(server, page, index))
        .collect();
    format!(
        r#"<html><body><ol class="grid_view">{}</ol></body></html>"#,
        entries
    )
}

fn detail_page(director: &str, cast: Option<&str>) -> String {
    let cast = cast
        .map(|c| format!(r#"<span class="actor">主演: <span class="attrs">{}</span></span><br/>"#, c))
        .unwrap_or_default();
    format!(
        r#"<html><body><div id="info">
            <span>导演: <span class="attrs">{director}</span></span><br/>
            <span>编剧: <span class="attrs">编剧</span></span><br/>
            {cast}
        </div></body></html>"#
    )
}

async fn mount_page(server: &MockServer, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/top250"))
        .and(query_param("start", ((page - 1) * PAGE_SIZE).to_string()))
        .and(query_param("filter", ""))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Serves all ten catalog pages
async fn listing_server() -> MockServer {
    let server = MockServer::start().await;
    for page in 1..=PAGE_COUNT {
        let body = catalog_page(&server.uri(), page);
        mount_page(&server, page, ResponseTemplate::new(200).set_body_string(body)).await;
    }
    server
}

fn test_config(server: &MockServer, csv_path: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = format!("{}/top250", server.uri());
    config.crawler.pause_millis = 1;
    config.crawler.fast_mode = true;
    config.output.csv_path = csv_path.display().to_string();
    config
}

/// Reads the output file as rows, checking for the byte-order mark
fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(UTF8_BOM), "file must start with a BOM");

    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[UTF8_BOM.len()..])
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}

/// Cancels the run once a given page has been written
struct CancelAfterPage {
    page: u32,
    token: CancellationToken,
}

impl ProgressObserver for CancelAfterPage {
    fn on_event(&self, event: &ProgressEvent) {
        if let ProgressEvent::PageFinished { page, .. } = event {
            if *page == self.page {
                self.token.cancel();
            }
        }
    }
}

#[tokio::test]
async fn test_full_fast_run() {
    let server = listing_server().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");

    let summary = Pipeline::new(test_config(&server, &csv_path), Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.pages_completed, PAGE_COUNT);
    assert_eq!(summary.records_written, (PAGE_COUNT * ITEMS_PER_PAGE) as u64);
    assert_eq!(summary.pauses, PAGE_COUNT as u64);
    assert!(summary.is_complete());

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 1 + (PAGE_COUNT * ITEMS_PER_PAGE) as usize);
    assert_eq!(rows[0], ENGLISH_HEADER);
    assert_eq!(rows.iter().filter(|row| row[0] == "title").count(), 1);

    let first = &rows[1];
    assert_eq!(first[0], "电影100");
    assert_eq!(first[1], format!("{}/subject/100/", server.uri()));
    assert_eq!(first[2], "导演100");
    assert_eq!(first[3], "演员100 /...");
    assert_eq!(first[4], "1901");
    assert_eq!(first[5], "美国");
    assert_eq!(first[6], "剧情");
    assert_eq!(first[7], "9.0");
    assert_eq!(first[8], "100");
    assert_eq!(first[9], "引言100");

    let last = rows.last().unwrap();
    assert_eq!(last[0], "电影1002");
}

#[tokio::test]
async fn test_resume_after_cancel_matches_uninterrupted_run() {
    let server = listing_server().await;
    let dir = TempDir::new().unwrap();

    let reference = dir.path().join("reference.csv");
    Pipeline::new(test_config(&server, &reference), Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();

    let resumed = dir.path().join("resumed.csv");
    let token = CancellationToken::new();
    let observer = Arc::new(CancelAfterPage {
        page: 3,
        token: token.clone(),
    });
    let first = Pipeline::new(test_config(&server, &resumed), observer)
        .unwrap()
        .with_cancellation(token)
        .run()
        .await
        .unwrap();

    assert_eq!(first.outcome, RunOutcome::Cancelled);
    assert_eq!(first.pages_completed, 3);
    assert_eq!(first.resume_page(), Some(4));
    assert_eq!(read_rows(&resumed).len(), 1 + (3 * ITEMS_PER_PAGE) as usize);

    let mut config = test_config(&server, &resumed);
    config.crawler.resume_page = 4;
    let second = Pipeline::new(config, Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(second.outcome, RunOutcome::Completed);
    assert_eq!(second.start_page, 4);
    assert_eq!(second.pages_completed, 7);

    assert_eq!(
        std::fs::read(&resumed).unwrap(),
        std::fs::read(&reference).unwrap()
    );
}

#[tokio::test]
async fn test_cancel_cuts_page_pause_short() {
    let server = listing_server().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");

    let token = CancellationToken::new();
    let observer = Arc::new(CancelAfterPage {
        page: 1,
        token: token.clone(),
    });
    let mut config = test_config(&server, &csv_path);
    config.crawler.pause_millis = 60_000;

    let started = Instant::now();
    let summary = Pipeline::new(config, observer)
        .unwrap()
        .with_cancellation(token)
        .run()
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.pages_completed, 1);
    assert_eq!(summary.pauses, 1);
    assert_eq!(summary.resume_page(), Some(2));
    assert_eq!(read_rows(&csv_path).len(), 1 + ITEMS_PER_PAGE as usize);
}

#[tokio::test]
async fn test_enrichment_with_fallback_and_pause_accounting() {
    let server = MockServer::start().await;
    let body = catalog_page(&server.uri(), 10);
    mount_page(&server, 10, ResponseTemplate::new(200).set_body_string(body)).await;

    Mock::given(method("GET"))
        .and(path("/subject/1000/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page("完整导演", Some("甲 / 乙 / 丙 / 丁"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subject/1001/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subject/1002/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("独立导演", None)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");
    let mut config = test_config(&server, &csv_path);
    config.crawler.fast_mode = false;
    config.crawler.resume_page = 10;
    config.crawler.pause_millis = 20;

    let started = Instant::now();
    let summary = Pipeline::new(config, Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // One pause for the page plus one before each detail fetch
    assert_eq!(summary.pauses, 1 + ITEMS_PER_PAGE as u64);
    assert!(elapsed >= Duration::from_millis(20 * (1 + ITEMS_PER_PAGE as u64)));
    assert!(summary.time_paused >= Duration::from_millis(20 * (1 + ITEMS_PER_PAGE as u64)));
    assert_eq!(summary.records_enriched, 2);
    assert_eq!(summary.enrichment_failures, 1);
    assert_eq!(summary.records_written, 3);

    // Appending to a new file writes no header
    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0][2], "完整导演");
    assert_eq!(rows[0][3], "甲 / 乙 / 丙 / 丁");
    assert_eq!(rows[0][9], "引言1000");

    // 404 keeps the catalog credits
    assert_eq!(rows[1][2], "导演1001");
    assert_eq!(rows[1][3], "演员1001 /...");

    assert_eq!(rows[2][2], "独立导演");
    assert_eq!(rows[2][3], "");
}

#[tokio::test]
async fn test_page_fetch_failure_aborts_and_keeps_earlier_rows() {
    let server = MockServer::start().await;
    for page in 1..=2 {
        let body = catalog_page(&server.uri(), page);
        mount_page(&server, page, ResponseTemplate::new(200).set_body_string(body)).await;
    }
    mount_page(&server, 3, ResponseTemplate::new(500)).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");

    let result = Pipeline::new(test_config(&server, &csv_path), Arc::new(NullProgress))
        .unwrap()
        .run()
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.failed_page(), Some(3));
    assert!(matches!(err, Top250Error::PageFetch { page: 3, .. }));

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 1 + (2 * ITEMS_PER_PAGE) as usize);
    assert_eq!(rows.last().unwrap()[0], "电影202");
}

#[tokio::test]
async fn test_retry_recovers_catalog_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top250"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let body = catalog_page(&server.uri(), 10);
    mount_page(&server, 10, ResponseTemplate::new(200).set_body_string(body)).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");
    let mut config = test_config(&server, &csv_path);
    config.crawler.resume_page = 10;
    config.crawler.max_retries = 2;
    config.crawler.retry_backoff_millis = 1;

    let summary = Pipeline::new(config, Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.pauses, 1);
}

#[tokio::test]
async fn test_chinese_header() {
    let server = listing_server().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");
    let mut config = test_config(&server, &csv_path);
    config.output.header = HeaderStyle::Chinese;

    Pipeline::new(config, Arc::new(NullProgress))
        .unwrap()
        .run()
        .await
        .unwrap();

    let rows = read_rows(&csv_path);
    assert_eq!(rows[0], CHINESE_HEADER);
}

#[tokio::test]
async fn test_worker_streams_events() {
    let server = listing_server().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("douban_movie.csv");
    let mut config = test_config(&server, &csv_path);
    config.crawler.resume_page = 9;

    let mut handle = spawn_pipeline(config).unwrap();
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    let summary = tokio::task::spawn_blocking(move || handle.join())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.records_written, (2 * ITEMS_PER_PAGE) as u64);

    let ranks: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::RecordWritten { rank, .. } => Some(*rank),
            _ => None,
        })
        .collect();
    assert_eq!(ranks, vec![201, 202, 203, 226, 227, 228]);

    assert!(matches!(
        events.first(),
        Some(ProgressEvent::RunStarted { start_page: 9, .. })
    ));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::RunFinished { .. })
    ));
}
