use crate::fetcher::QueryRunner;
use crate::query::{self, QueryParameters};
use crate::state::ResultStore;
use crate::traits::QueryExecutor;
use crate::types::{
    InputKey, Result, ResultRecord, ResultSet, SeedConfig, STATUS_CLIENT_ERROR, STATUS_OK, STATUS_TIMEOUT,
};
use std::fmt;
use std::path::PathBuf;
use tracing::info;
use url::Url;

/// Walks the key list once, querying every key that has no recorded outcome
/// yet and persisting the whole result set after each attempt.
///
/// Any key already in the result set is skipped, including keys whose last
/// attempt failed. Retrying failures means deleting them from the file by hand.
pub struct CacheSeeder<E: QueryExecutor> {
    executor: E,
    store: ResultStore,
    parameters: QueryParameters,
}

/// Everything a run produced: the full result set and what this run did.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    pub results: ResultSet,
    pub summary: RunSummary,
}

impl CacheSeeder<QueryRunner> {
    /// Validates `config` and builds the HTTP client before the results file is
    /// created, so a bad configuration leaves nothing on disk.
    pub fn open(config: SeedConfig, results_path: impl Into<PathBuf>, prior: &ResultSet) -> Result<Self> {
        let parameters = QueryParameters::from(&config);
        let runner = QueryRunner::new(config)?;
        let store = ResultStore::open(results_path, prior)?;
        Ok(Self::new(runner, store, parameters))
    }
}

impl<E: QueryExecutor> CacheSeeder<E> {
    pub fn new(executor: E, store: ResultStore, parameters: QueryParameters) -> Self {
        Self {
            executor,
            store,
            parameters,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub async fn run(&self, endpoint: &Url, keys: &[InputKey], prior: ResultSet) -> Result<SeedReport> {
        let mut results = prior;
        let mut summary = RunSummary::default();
        let total = keys.len();
        info!("Seeding {} keys against {} ({} already recorded)", total, endpoint, results.len());

        for (index, key) in keys.iter().enumerate() {
            if results.contains(key) {
                info!("[{}/{}] Already got response for {}", index + 1, total, key);
                summary.skipped += 1;
                continue;
            }

            info!("[{}/{}] Querying {}", index + 1, total, key);
            let payload = query::build(key, self.parameters);
            let record = self.executor.execute(endpoint, &payload, key).await;
            summary.tally(&record);
            results.record(key.clone(), record);

            self.store.save(&results)?;
            info!("===================");
        }

        summary.recorded = results.len();
        Ok(SeedReport { results, summary })
    }
}

/// What one run did. Outcome classes count only the keys attempted in this
/// run; `recorded` is the size of the result set when the run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub recorded: usize,
    pub attempted: usize,
    pub skipped: usize,
    pub with_results: usize,
    pub empty: usize,
    pub timeouts: usize,
    pub client_errors: usize,
    pub remote_errors: usize,
}

impl RunSummary {
    pub fn tally(&mut self, record: &ResultRecord) {
        self.attempted += 1;
        match (record.status, record.num_results) {
            (STATUS_OK, Some(0)) => self.empty += 1,
            (STATUS_OK, Some(_)) => self.with_results += 1,
            (STATUS_OK, None) => self.client_errors += 1,
            (STATUS_TIMEOUT, _) => self.timeouts += 1,
            (STATUS_CLIENT_ERROR, _) => self.client_errors += 1,
            _ => self.remote_errors += 1,
        }
    }

    pub fn successes(&self) -> usize {
        self.with_results + self.empty
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} skipped, {} recorded: {} successes ({} empty), {} timed out, {} remote errors, {} client errors",
            self.attempted,
            self.skipped,
            self.recorded,
            self.successes(),
            self.empty,
            self.timeouts,
            self.remote_errors,
            self.client_errors
        )
    }
}
