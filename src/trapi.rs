//! Permissive TRAPI document model.
//!
//! Only the parts of a TRAPI query this service actually touches are typed:
//! the query graph's nodes and their `ids`. Everything else — edges,
//! workflow, knowledge_graph, results, qualifiers — is carried in flattened
//! extras maps so a document round-trips unmodified through
//! deserialize/serialize, whatever TRAPI version the caller speaks. The one
//! normalization: a typed optional field given an explicit `null` (e.g.
//! `"ids": null`) is forwarded as absent, which TRAPI treats the same.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A TRAPI query as posted to `/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub message: Message,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_graph: Option<QueryGraph>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryGraph {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<HashMap<String, QNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A query-graph node. `ids` is the only field this service rewrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    /// Collect every CURIE pinned on a query node, deduplicated in first
    /// occurrence order. Nodes without `ids` (or with an empty list)
    /// contribute nothing.
    pub fn node_ids(&self) -> Vec<String> {
        let mut curies = Vec::new();
        if let Some(query_graph) = self.message.query_graph.as_ref() {
            for node in query_graph.nodes.iter().flat_map(|nodes| nodes.values()) {
                for curie in node.ids.iter().flatten() {
                    if !curies.contains(curie) {
                        curies.push(curie.clone());
                    }
                }
            }
        }
        curies
    }
}

impl QNode {
    /// The node's pinned CURIEs, treating an empty list like a missing one.
    pub fn pinned_ids(&self) -> Option<&Vec<String>> {
        self.ids.as_ref().filter(|ids| !ids.is_empty())
    }
}
