use cache_seeder::query::{self, QueryParameters};
use cache_seeder::{QueryExecutor, QueryRunner, SeedConfig};
use serde_json::json;
use std::net::TcpListener;
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

const KEY: &str = "MONDO:0005148";

fn test_config() -> SeedConfig {
    SeedConfig {
        user_agent: "Cache-Seeder-Test/1.0".to_string(),
        timeout_seconds: 0,
        kp_timeout: 0,
        client_margin: Duration::from_secs(5),
        response_dir: None,
    }
}

fn endpoint(server: &MockServer) -> Url {
    Url::parse(&format!("{}/aragorn/query", server.uri())).unwrap()
}

async fn execute_against(server: &MockServer, config: SeedConfig) -> cache_seeder::ResultRecord {
    let parameters = QueryParameters::from(&config);
    let runner = QueryRunner::new(config).unwrap();
    let payload = query::build(&KEY.to_string(), parameters);
    runner.execute(&endpoint(server), &payload, KEY).await
}

#[tokio::test]
async fn test_success_counts_results() {
    init_tracing();
    let server = MockServer::start().await;
    let payload = query::build(&KEY.to_string(), QueryParameters::from(&test_config()));

    Mock::given(method("POST"))
        .and(path("/aragorn/query"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"results": [{"score": 0.9}, {"score": 0.5}, {"score": 0.1}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 200);
    assert_eq!(record.num_results, Some(3));
    assert!(record.time > 0.0);
}

#[tokio::test]
async fn test_empty_result_list_is_a_success() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {"results": []}})))
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 200);
    assert_eq!(record.num_results, Some(0));
}

#[tokio::test]
async fn test_remote_error_status_is_recorded_verbatim() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("kaboom"))
        .expect(1)
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 500);
    assert_eq!(record.num_results, None);
}

#[tokio::test]
async fn test_non_ok_success_code_is_not_counted() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 202);
    assert_eq!(record.num_results, None);
}

#[tokio::test]
async fn test_local_deadline_yields_408() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": {"results": []}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = SeedConfig {
        client_margin: Duration::from_millis(300),
        ..test_config()
    };
    let record = execute_against(&server, config).await;

    assert_eq!(record.status, 408);
    assert_eq!(record.num_results, None);
    assert!(record.time >= 0.3);
    assert!(record.time < 3.0);
}

#[tokio::test]
async fn test_undecodable_body_yields_418() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 418);
    assert_eq!(record.num_results, None);
}

#[tokio::test]
async fn test_body_without_result_list_yields_418() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Error", "description": "no message"})),
        )
        .mount(&server)
        .await;

    let record = execute_against(&server, test_config()).await;

    assert_eq!(record.status, 418);
    assert_eq!(record.num_results, None);
}

#[tokio::test]
async fn test_connection_failure_yields_418() {
    init_tracing();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{}/aragorn/query", port)).unwrap();

    let config = test_config();
    let parameters = QueryParameters::from(&config);
    let runner = QueryRunner::new(config).unwrap();
    let payload = query::build(&KEY.to_string(), parameters);
    let record = runner.execute(&url, &payload, KEY).await;

    assert_eq!(record.status, 418);
    assert_eq!(record.num_results, None);
}

#[tokio::test]
async fn test_successful_responses_are_archived() {
    init_tracing();
    let server = MockServer::start().await;
    let body = json!({"message": {"results": [{"id": 1}]}});
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let response_dir = dir.path().join("responses");
    let config = SeedConfig {
        response_dir: Some(response_dir.clone()),
        ..test_config()
    };
    let record = execute_against(&server, config).await;

    assert_eq!(record.num_results, Some(1));
    let saved = std::fs::read(response_dir.join("MONDO_0005148_response.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_slice(&saved).unwrap();
    assert_eq!(saved, body);
}

#[tokio::test]
async fn test_archive_failure_does_not_change_outcome() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {"results": [{}]}})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    let config = SeedConfig {
        response_dir: Some(blocker.join("responses")),
        ..test_config()
    };
    let record = execute_against(&server, config).await;

    assert_eq!(record.status, 200);
    assert_eq!(record.num_results, Some(1));
}
