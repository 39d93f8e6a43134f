use crate::types::{InputKey, SeedConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DISEASE_CATEGORY: &str = "biolink:Disease";
pub const CHEMICAL_CATEGORY: &str = "biolink:ChemicalEntity";
pub const TREATS_PREDICATE: &str = "biolink:treats";
pub const INFERRED: &str = "inferred";

const DISEASE_NODE: &str = "on";
const CHEMICAL_NODE: &str = "sn";
const TREATS_EDGE: &str = "t_edge";

/// Request body for one lookup: "which chemicals treat this disease".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub message: QueryMessage,
    pub parameters: QueryParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMessage {
    pub query_graph: QueryGraph,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGraph {
    pub nodes: BTreeMap<String, QueryNode>,
    pub edges: BTreeMap<String, QueryEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEdge {
    pub subject: String,
    pub object: String,
    pub predicates: Vec<String>,
    pub knowledge_type: String,
}

/// Execution budgets the service is asked to respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub timeout_seconds: u64,
    pub kp_timeout: u64,
}

impl From<&SeedConfig> for QueryParameters {
    fn from(config: &SeedConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
            kp_timeout: config.kp_timeout,
        }
    }
}

pub fn build(key: &InputKey, parameters: QueryParameters) -> QueryPayload {
    let mut nodes = BTreeMap::new();
    nodes.insert(
        DISEASE_NODE.to_string(),
        QueryNode {
            ids: Some(vec![key.clone()]),
            categories: vec![DISEASE_CATEGORY.to_string()],
        },
    );
    nodes.insert(
        CHEMICAL_NODE.to_string(),
        QueryNode {
            ids: None,
            categories: vec![CHEMICAL_CATEGORY.to_string()],
        },
    );

    let mut edges = BTreeMap::new();
    edges.insert(
        TREATS_EDGE.to_string(),
        QueryEdge {
            subject: CHEMICAL_NODE.to_string(),
            object: DISEASE_NODE.to_string(),
            predicates: vec![TREATS_PREDICATE.to_string()],
            knowledge_type: INFERRED.to_string(),
        },
    );

    QueryPayload {
        message: QueryMessage {
            query_graph: QueryGraph { nodes, edges },
        },
        parameters,
    }
}
