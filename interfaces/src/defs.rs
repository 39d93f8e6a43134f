use std::time::Duration;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Deserialize;
use serde::Serialize;

/// Identifier naming one unit of batch work, e.g. `MONDO:0005148`.
pub type InputKey = String;

/// Recorded when the local deadline elapsed before the service answered.
pub const STATUS_TIMEOUT: u16 = 408;

/// Recorded for any client-side failure that is not a timeout.
pub const STATUS_CLIENT_ERROR: u16 = 418;

pub const STATUS_OK: u16 = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<usize>,
    #[serde(default)]
    pub time: f64,
}

/// How a single query attempt ended. Produced once per attempted key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    Success { code: u16, count: usize },
    Timeout,
    TransportError { detail: String },
    RemoteError { code: u16 },
}

impl QueryOutcome {
    pub fn status(&self) -> u16 {
        match self {
            QueryOutcome::Success { code, .. } => *code,
            QueryOutcome::Timeout => STATUS_TIMEOUT,
            QueryOutcome::TransportError { .. } => STATUS_CLIENT_ERROR,
            QueryOutcome::RemoteError { code } => *code,
        }
    }

    pub fn num_results(&self) -> Option<usize> {
        match self {
            QueryOutcome::Success { count, .. } => Some(*count),
            QueryOutcome::Timeout
            | QueryOutcome::TransportError { .. }
            | QueryOutcome::RemoteError { .. } => None,
        }
    }

    pub fn into_record(self, elapsed: Duration) -> ResultRecord {
        ResultRecord {
            status: self.status(),
            num_results: self.num_results(),
            time: elapsed.as_secs_f64(),
        }
    }
}

/// Outcomes keyed by input, in first-attempt order.
///
/// A key's presence means it has been attempted at least once. Records are
/// only ever added: `record` refuses to replace an existing entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: IndexMap<InputKey, ResultRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ResultRecord> {
        self.records.get(key)
    }

    /// Adds the record for `key`. Returns `false` and leaves the set untouched
    /// if the key was already present.
    pub fn record(&mut self, key: InputKey, record: ResultRecord) -> bool {
        match self.records.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &InputKey> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InputKey, &ResultRecord)> {
        self.records.iter()
    }
}

impl FromIterator<(InputKey, ResultRecord)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (InputKey, ResultRecord)>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for (key, record) in iter {
            set.record(key, record);
        }
        set
    }
}
