pub mod types;
pub mod query;
pub mod traits;
pub mod fetcher;
pub mod state;
pub mod seeder;
pub mod utils;

pub use types::*;
pub use query::{QueryParameters, QueryPayload};
pub use traits::QueryExecutor;
pub use fetcher::QueryRunner;
pub use state::ResultStore;
pub use seeder::{CacheSeeder, RunSummary, SeedReport};
