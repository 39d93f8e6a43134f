use crate::query::QueryPayload;
use crate::traits::QueryExecutor;
use crate::types::{QueryOutcome, ResultRecord, Result, SeedConfig, STATUS_OK};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// Only the result list is inspected; its entries are counted, not parsed.
/// A body without `message.results` is malformed, not an empty answer.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    results: Vec<IgnoredAny>,
}

impl QueryResponse {
    fn result_count(&self) -> usize {
        self.message.results.len()
    }
}

/// Sends one query at a time over a shared HTTP client.
pub struct QueryRunner {
    client: Client,
    config: SeedConfig,
}

impl QueryRunner {
    pub fn new(config: SeedConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    async fn send(&self, endpoint: &Url, payload: &QueryPayload, key: &str) -> QueryOutcome {
        let deadline = self.config.client_deadline(payload.parameters.timeout_seconds);
        debug!("Querying {} for {} (deadline {:?})", endpoint, key, deadline);

        // The per-request timeout covers connecting, waiting and reading the body.
        let response = match self
            .client
            .post(endpoint.clone())
            .json(payload)
            .timeout(deadline)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status().as_u16();
        if status != STATUS_OK {
            return QueryOutcome::RemoteError { code: status };
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return classify_error(e),
        };

        if let Some(dir) = &self.config.response_dir {
            save_response(dir, key, &body).await;
        }

        match serde_json::from_slice::<QueryResponse>(&body) {
            Ok(parsed) => QueryOutcome::Success {
                code: status,
                count: parsed.result_count(),
            },
            Err(e) => QueryOutcome::TransportError {
                detail: format!("failed to decode response: {}", e),
            },
        }
    }
}

#[async_trait]
impl QueryExecutor for QueryRunner {
    async fn execute(&self, endpoint: &Url, payload: &QueryPayload, key: &str) -> ResultRecord {
        let start_time = Instant::now();
        let outcome = self.send(endpoint, payload, key).await;
        let elapsed = start_time.elapsed();

        log_outcome(key, &outcome, elapsed);
        outcome.into_record(elapsed)
    }
}

fn classify_error(e: reqwest::Error) -> QueryOutcome {
    if e.is_timeout() {
        QueryOutcome::Timeout
    } else {
        QueryOutcome::TransportError {
            detail: format!("{:?}", e),
        }
    }
}

fn log_outcome(key: &str, outcome: &QueryOutcome, elapsed: Duration) {
    match outcome {
        QueryOutcome::Success { count: 0, .. } => warn!("{} had no results", key),
        QueryOutcome::Success { count, .. } => info!("{} had {} results", key, count),
        QueryOutcome::Timeout => error!("{} timed out", key),
        QueryOutcome::RemoteError { code } => {
            error!("{} failed with status code {}", key, code)
        }
        QueryOutcome::TransportError { detail } => {
            error!("Unhandled error for {}: {}", key, detail)
        }
    }
    info!("Took {:.3}s", elapsed.as_secs_f64());
}

/// File name for a key's archived response. Keys are CURIEs, so the prefix
/// separator is replaced to keep names portable.
pub fn response_file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if matches!(c, ':' | '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}_response.json", stem)
}

async fn save_response(dir: &Path, key: &str, body: &[u8]) {
    let path = dir.join(response_file_name(key));
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!("Could not create response directory {}: {}", dir.display(), e);
        return;
    }
    if let Err(e) = tokio::fs::write(&path, body).await {
        warn!("Could not save response for {} to {}: {}", key, path.display(), e);
    }
}
