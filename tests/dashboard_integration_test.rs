use finance_client::config::TomlConfig;
use finance_client::utils::validation::Validate;
use finance_client::{
    Dashboard, FileSink, FinanceClientError, MemorySink, OutputSink, Resource, ResourceFetcher,
};
use httpmock::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_end_to_end_refresh_into_files() {
    let temp_dir = TempDir::new().unwrap();

    let server = MockServer::start();
    let corporate = server.mock(|when, then| {
        when.method(GET).path("/corporate");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(r#"{"company":"ACME","revenue":[100,120]}"#);
    });
    let personal = server.mock(|when, then| {
        when.method(GET).path("/personal");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(r#"{"a":1}"#);
    });

    let dashboard = Dashboard::new(
        ResourceFetcher::new(server.base_url()),
        FileSink::new(temp_dir.path()),
        Resource::defaults(),
    );
    let report = dashboard.refresh_all().await;

    corporate.assert();
    personal.assert();
    assert!(report.is_success());

    let personal_text =
        std::fs::read_to_string(temp_dir.path().join("personal-output.json")).unwrap();
    assert_eq!(personal_text, "{\n  \"a\": 1\n}");

    let corporate_text =
        std::fs::read_to_string(temp_dir.path().join("corporate-output.json")).unwrap();
    assert_eq!(
        corporate_text,
        "{\n  \"company\": \"ACME\",\n  \"revenue\": [\n    100,\n    120\n  ]\n}"
    );
}

#[tokio::test]
async fn test_unreachable_service_keeps_previous_text() {
    let sink = MemorySink::with_text("corporate-output", "last good value");
    // nothing listens on port 9 on the loopback interface
    let fetcher = ResourceFetcher::new("http://127.0.0.1:9");

    let err = fetcher
        .fetch_and_render(&Resource::corporate(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, FinanceClientError::Request(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(
        sink.text("corporate-output").await.as_deref(),
        Some("last good value")
    );
}

#[tokio::test]
async fn test_dashboard_from_toml_config() {
    let server = MockServer::start();
    let savings = server.mock(|when, then| {
        when.method(GET).path("/personal/savings");
        then.status(200).json_body(serde_json::json!({"balance": 42.5}));
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[service]
base_url = "{}"
timeout_seconds = 5
concurrent_requests = 1

[[resources]]
name = "savings"
path = "/personal/savings"
"#,
        server.base_url()
    ))
    .unwrap();
    config.validate().unwrap();

    let fetcher = ResourceFetcher::from_config(&config).unwrap();
    assert_eq!(fetcher.base_url(), server.base_url());
    let dashboard = Dashboard::from_config(&config, fetcher, MemorySink::new());
    assert_eq!(dashboard.resources().len(), 1);
    let rendered = dashboard.refresh("savings").await.unwrap();

    savings.assert();
    assert_eq!(rendered.target, "savings-output");
    assert_eq!(rendered.text, "{\n  \"balance\": 42.5\n}");
    assert_eq!(dashboard.sink().targets().await, vec!["savings-output".to_string()]);
}

#[tokio::test]
async fn test_boxed_sink_is_usable_by_dashboard() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/personal");
        then.status(200).json_body(serde_json::json!({"ok": true}));
    });

    let memory = MemorySink::new();
    let boxed: Box<dyn OutputSink> = Box::new(memory.clone());
    let dashboard = Dashboard::new(
        ResourceFetcher::new(server.base_url()),
        boxed,
        vec![Resource::personal()],
    );

    let report = dashboard
        .refresh_selected(&["personal".to_string()])
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        memory.text("personal-output").await.as_deref(),
        Some("{\n  \"ok\": true\n}")
    );
}
