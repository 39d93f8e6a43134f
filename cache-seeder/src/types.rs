use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub use interfaces::defs::{InputKey, QueryOutcome, ResultRecord, ResultSet};
pub use interfaces::defs::{STATUS_CLIENT_ERROR, STATUS_OK, STATUS_TIMEOUT};

/// Deployments of the inference service that can be warmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Environment {
    Dev,
    Ci,
    Test,
    Prod,
}

impl Environment {
    pub fn name(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Ci => "ci",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }

    pub fn query_url(&self) -> &'static str {
        match self {
            Environment::Dev => "https://aragorn.renci.org/aragorn/query",
            Environment::Ci => "https://aragorn.ci.transltr.io/aragorn/query",
            Environment::Test => "https://aragorn.test.transltr.io/aragorn/query",
            Environment::Prod => "https://aragorn.transltr.io/aragorn/query",
        }
    }

    pub fn endpoint(&self) -> Result<Url> {
        Ok(Url::parse(self.query_url())?)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub user_agent: String,
    /// Overall budget the service is asked to respect, in seconds.
    pub timeout_seconds: u64,
    /// Budget for each knowledge provider the service calls, in seconds.
    pub kp_timeout: u64,
    /// Added to `timeout_seconds` to form the local deadline. Never zero.
    pub client_margin: Duration,
    pub response_dir: Option<PathBuf>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            user_agent: "Cache-Seeder/1.0".to_string(),
            timeout_seconds: 3600,
            kp_timeout: 300,
            client_margin: Duration::from_secs(300),
            response_dir: None,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.client_margin.is_zero() {
            return Err(SeederError::Config(
                "client margin must be greater than zero".to_string(),
            ));
        }
        if Duration::from_secs(self.timeout_seconds)
            .checked_add(self.client_margin)
            .is_none()
        {
            return Err(SeederError::Config(format!(
                "timeout of {}s plus client margin {:?} is too large",
                self.timeout_seconds, self.client_margin
            )));
        }
        Ok(())
    }

    /// Local deadline for a request whose payload declares `timeout_seconds`.
    /// Saturates instead of overflowing.
    pub fn client_deadline(&self, timeout_seconds: u64) -> Duration {
        Duration::from_secs(timeout_seconds).saturating_add(self.client_margin)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeederError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to read input keys from {path}: {reason}")]
    InputKeys { path: PathBuf, reason: String },

    #[error("Failed to persist results to {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SeederError>;
