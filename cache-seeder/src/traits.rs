use crate::query::QueryPayload;
use crate::types::ResultRecord;
use async_trait::async_trait;
use url::Url;

/// Runs one query against the service and reports what happened.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Never fails: timeouts, transport problems and error statuses are all
    /// folded into the returned record, along with the elapsed time.
    async fn execute(&self, endpoint: &Url, payload: &QueryPayload, key: &str) -> ResultRecord;
}
