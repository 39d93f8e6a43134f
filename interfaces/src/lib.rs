pub mod defs;

pub use defs::{InputKey, QueryOutcome, ResultRecord, ResultSet};
pub use defs::{STATUS_CLIENT_ERROR, STATUS_OK, STATUS_TIMEOUT};
