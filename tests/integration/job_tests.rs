//! Integration tests for batch jobs
//!
//! These tests serve listing pages from a wiremock server and run whole
//! batches through the job manager into a temporary output directory.

use listing_harvester::config::Config;
use listing_harvester::{JobManager, JobStatus, ResultPoll};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MINIMAL_HEADER: &str = "title,price,description,tags,Photo 1,Photo 2,Photo 3,Photo 4,Photo 5,Photo 6,Photo 7,Photo 8,Photo 9,Photo 10";

/// Creates a test configuration with no pacing and a single attempt per URL
fn create_test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.fetch.min_delay_ms = 0;
    config.fetch.max_delay_ms = 0;
    config.fetch.max_attempts = 1;
    config.fetch.timeout_secs = 5;
    config.output.directory = output_dir.to_path_buf();
    config.output.file_prefix = "etsy_products".to_string();
    config
}

/// Renders a listing page in the marketplace's buy-box markup
fn listing_page(title: &str, price: &str, images: &[&str]) -> String {
    let image_tags: String = images
        .iter()
        .map(|src| format!(r#"<img class="carousel-image" data-src-zoom-image="{}">"#, src))
        .collect();

    format!(
        r#"<html><head>
        <script type="application/ld+json">{{"@type":"Product","description":"About {title}"}}</script>
        </head><body>
        <h1 data-buy-box-listing-title="true"> {title} </h1>
        <p class="wt-text-title-larger">Price: {price}</p>
        <ul class="wt-action-group">
            <li class="wt-action-group__item-container">handmade</li>
            <li class="wt-action-group__item-container">gift</li>
        </ul>
        <div>{image_tags}</div>
        </body></html>"#,
        title = title,
        price = price,
        image_tags = image_tags
    )
}

async fn mount_listing(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_failure(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_batch_writes_csv() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_listing(
        &mock_server,
        "/listing/1",
        listing_page(
            "Oak Door Sign",
            "CA$ 24.50",
            &["https://img.example.com/a.jpg", "https://img.example.com/b.jpg"],
        ),
    )
    .await;
    mount_listing(
        &mock_server,
        "/listing/2",
        listing_page("Brass Number", "$5", &["https://img.example.com/c.jpg"]),
    )
    .await;

    let manager = JobManager::from_config(&create_test_config(output_dir.path())).unwrap();
    let accepted = manager
        .submit(vec![
            format!("{}/listing/1", mock_server.uri()),
            format!("{}/listing/2", mock_server.uri()),
        ])
        .await
        .unwrap();
    assert_eq!(accepted.total, 2);
    assert_eq!(accepted.message, "Starting to parse 2 URLs");

    let envelope = manager.wait(accepted.job_id).await.unwrap();
    assert!(envelope.success, "unexpected failure: {:?}", envelope);
    assert_eq!(envelope.count, 2);
    assert_eq!(envelope.total_processed, 2);

    let state = manager.progress(accepted.job_id).await.unwrap();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.current, 2);

    let filename = envelope.filename().unwrap();
    assert!(Path::new(filename).starts_with(output_dir.path()));

    let content = std::fs::read_to_string(filename).unwrap();
    let lines: Vec<&str> = content.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], MINIMAL_HEADER);
    assert_eq!(
        lines[1],
        "Oak Door Sign,24.50,About Oak Door Sign,\"handmade, gift\",https://img.example.com/a.jpg,https://img.example.com/b.jpg,,,,,,,,"
    );
    assert_eq!(
        lines[2],
        "Brass Number,5,About Brass Number,\"handmade, gift\",https://img.example.com/c.jpg,,,,,,,,,"
    );
}

#[tokio::test]
async fn test_failed_urls_are_skipped() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_failure(&mock_server, "/listing/broken").await;
    mount_listing(
        &mock_server,
        "/listing/ok",
        listing_page("Survivor", "$12.00", &[]),
    )
    .await;

    let manager = JobManager::from_config(&create_test_config(output_dir.path())).unwrap();
    let accepted = manager
        .submit(vec![
            format!("{}/listing/broken", mock_server.uri()),
            format!("{}/listing/ok", mock_server.uri()),
        ])
        .await
        .unwrap();

    let envelope = manager.wait(accepted.job_id).await.unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.count, 1);
    assert_eq!(envelope.total_processed, 2);

    let content = std::fs::read_to_string(envelope.filename().unwrap()).unwrap();
    assert!(content.contains("Survivor,12.00"));
}

#[tokio::test]
async fn test_all_failures_end_in_error() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    mount_failure(&mock_server, "/listing/a").await;
    mount_failure(&mock_server, "/listing/b").await;

    let manager = JobManager::from_config(&create_test_config(output_dir.path())).unwrap();
    let accepted = manager
        .submit(vec![
            format!("{}/listing/a", mock_server.uri()),
            format!("{}/listing/b", mock_server.uri()),
        ])
        .await
        .unwrap();

    let envelope = manager.wait(accepted.job_id).await.unwrap();
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        serde_json::json!({
            "success": false,
            "error": "No products were successfully parsed"
        })
    );

    let state = manager.progress(accepted.job_id).await.unwrap();
    assert_eq!(state.status, JobStatus::Error);
    assert_eq!(state.current, state.total);

    // No output file is created for an empty batch
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_sink_failure_ends_in_error() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        "/listing/1",
        listing_page("Unwritable", "$1", &[]),
    )
    .await;

    // A regular file cannot act as the output directory
    let not_a_dir = NamedTempFile::new().unwrap();
    let manager = JobManager::from_config(&create_test_config(not_a_dir.path())).unwrap();
    let accepted = manager
        .submit(vec![format!("{}/listing/1", mock_server.uri())])
        .await
        .unwrap();

    let envelope = manager.wait(accepted.job_id).await.unwrap();
    assert!(!envelope.success);
    assert!(envelope.error().unwrap().starts_with("Failed to write output"));

    let state = manager.progress(accepted.job_id).await.unwrap();
    assert_eq!(state.status, JobStatus::Error);
}

#[tokio::test]
async fn test_template_column_order() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();
    mount_listing(
        &mock_server,
        "/listing/1",
        listing_page("Template Sign", "$30", &["https://img.example.com/t.jpg"]),
    )
    .await;

    let mut template = NamedTempFile::new().unwrap();
    writeln!(template, "title,who_made,price,Photo 1,source_url").unwrap();
    template.flush().unwrap();

    let mut config = create_test_config(output_dir.path());
    config.output.template_path = Some(template.path().to_path_buf());

    let url = format!("{}/listing/1", mock_server.uri());
    let manager = JobManager::from_config(&config).unwrap();
    let accepted = manager.submit(vec![url.clone()]).await.unwrap();

    let envelope = manager.wait(accepted.job_id).await.unwrap();
    let content = std::fs::read_to_string(envelope.filename().unwrap()).unwrap();
    let lines: Vec<&str> = content.split("\r\n").collect();

    assert_eq!(lines[0], "title,who_made,price,Photo 1,source_url");
    assert_eq!(
        lines[1],
        format!("Template Sign,,30,https://img.example.com/t.jpg,{}", url)
    );
}

#[tokio::test]
async fn test_progress_and_repeated_result_reads() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    let mut urls = Vec::new();
    for i in 0..4 {
        let route = format!("/listing/{}", i);
        mount_listing(
            &mock_server,
            &route,
            listing_page(&format!("Item {}", i), "$2", &[]),
        )
        .await;
        urls.push(format!("{}{}", mock_server.uri(), route));
    }

    let manager = JobManager::from_config(&create_test_config(output_dir.path())).unwrap();
    let accepted = manager.submit(urls).await.unwrap();

    let mut last_current = 0;
    loop {
        let state = manager.progress(accepted.job_id).await.unwrap();
        assert!(state.current <= state.total);
        assert!(state.current >= last_current);
        last_current = state.current;

        if state.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let first = manager.result(accepted.job_id).await.unwrap();
    let second = manager.result(accepted.job_id).await.unwrap();
    assert!(first.is_ready());
    assert_eq!(first, second);

    // Rows keep submission order
    let ResultPoll::Ready(envelope) = first else {
        panic!("result should be ready");
    };
    let content = std::fs::read_to_string(envelope.filename().unwrap()).unwrap();
    let titles: Vec<&str> = content
        .split("\r\n")
        .skip(1)
        .filter(|l| !l.is_empty())
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(titles, vec!["Item 0", "Item 1", "Item 2", "Item 3"]);
}

#[tokio::test]
async fn test_queued_job_waits_for_active_job() {
    let mock_server = MockServer::start().await;
    let output_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/listing/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("Slow", "$1", &[]))
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    mount_listing(&mock_server, "/listing/fast", listing_page("Fast", "$1", &[])).await;

    let manager = JobManager::from_config(&create_test_config(output_dir.path())).unwrap();
    let first = manager
        .submit(vec![format!("{}/listing/slow", mock_server.uri())])
        .await
        .unwrap();
    let second = manager
        .submit(vec![format!("{}/listing/fast", mock_server.uri())])
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let queued = manager.progress(second.job_id).await.unwrap();
    assert_eq!(queued.status, JobStatus::Starting);
    assert_eq!(queued.current, 0);
    assert_eq!(queued.total, 1);

    assert!(manager.wait(first.job_id).await.unwrap().success);
    assert!(manager.wait(second.job_id).await.unwrap().success);
}
