//! Identifier normalization: synonym resolution, preferred-prefix caching,
//! and the query rewrite that maps every pinned CURIE to the knowledge
//! graph's preferred form.
//!
//! The rewrite is all-or-nothing: it builds the mapped document from a
//! clone and returns it only when every identifier resolved, so a failure
//! leaves the caller's query untouched.

use std::collections::HashMap;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::MappingError;
use crate::trapi::Query;

/// Category → acceptable identifier prefixes, as declared by the knowledge
/// graph's meta description.
pub type PrefixTable = HashMap<String, Vec<String>>;

/// Synonyms and asserted categories for one input CURIE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymSet {
    /// Equivalent identifiers, in the order the normalization service
    /// returned them. Order matters: the mapper takes the first acceptable.
    pub synonyms: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NormalizedNode {
    #[serde(default)]
    equivalent_identifiers: Vec<EquivalentIdentifier>,
    #[serde(rename = "type", default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EquivalentIdentifier {
    identifier: String,
}

/// Fetch synonym sets for a batch of CURIEs from the node-normalization
/// service. One request per batch; no partial results on failure. CURIEs
/// the service does not know (returned as `null`) are omitted from the map.
pub async fn get_synonyms(
    client: &reqwest::Client,
    node_norm: &str,
    curies: &[String],
) -> Result<HashMap<String, SynonymSet>, MappingError> {
    debug!(count = curies.len(), "resolving synonyms");
    let response = client
        .post(format!("{node_norm}/get_normalized_nodes"))
        .json(&serde_json::json!({ "curies": curies }))
        .send()
        .await
        .map_err(|err| MappingError::SynonymService { detail: err.to_string() })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MappingError::SynonymService {
            detail: format!("{status}: {body}"),
        });
    }

    let normalized: HashMap<String, Option<NormalizedNode>> = response
        .json()
        .await
        .map_err(|err| MappingError::SynonymService { detail: err.to_string() })?;
    Ok(synonym_map(normalized))
}

fn synonym_map(normalized: HashMap<String, Option<NormalizedNode>>) -> HashMap<String, SynonymSet> {
    normalized
        .into_iter()
        .filter_map(|(curie, node)| {
            let node = node?;
            Some((
                curie,
                SynonymSet {
                    synonyms: node
                        .equivalent_identifiers
                        .into_iter()
                        .map(|eq_id| eq_id.identifier)
                        .collect(),
                    categories: node.categories,
                },
            ))
        })
        .collect()
}

/// Lazily-populated, process-wide preferred-prefix table.
///
/// Populated at most once per process: concurrent first users share a single
/// in-flight fetch, and a failed fetch leaves the cell empty so a later
/// request retries. Once populated the table is immutable.
#[derive(Debug, Default)]
pub struct PrefixCache {
    table: OnceCell<PrefixTable>,
}

impl PrefixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The preferred-prefix table, fetching it on first use.
    pub async fn preferred_prefixes(
        &self,
        client: &reqwest::Client,
        robokop_kg: &str,
    ) -> Result<&PrefixTable, MappingError> {
        self.table
            .get_or_try_init(|| fetch_preferred_prefixes(client, robokop_kg))
            .await
    }
}

async fn fetch_preferred_prefixes(
    client: &reqwest::Client,
    robokop_kg: &str,
) -> Result<PrefixTable, MappingError> {
    debug!("fetching meta knowledge graph from {robokop_kg}");
    let response = client
        .get(format!("{robokop_kg}/meta_knowledge_graph"))
        .send()
        .await
        .map_err(|err| MappingError::PrefixService { detail: err.to_string() })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MappingError::PrefixService {
            detail: format!("{status}: {body}"),
        });
    }

    #[derive(Deserialize)]
    struct MetaKnowledgeGraph {
        #[serde(default)]
        nodes: HashMap<String, MetaNode>,
    }
    #[derive(Deserialize)]
    struct MetaNode {
        #[serde(default)]
        id_prefixes: Vec<String>,
    }

    let meta: MetaKnowledgeGraph = response
        .json()
        .await
        .map_err(|err| MappingError::PrefixService { detail: err.to_string() })?;
    let table: PrefixTable = meta
        .nodes
        .into_iter()
        .map(|(category, node)| (category, node.id_prefixes))
        .collect();
    info!(categories = table.len(), "cached preferred prefixes");
    Ok(table)
}

/// Rewrite every pinned CURIE in the query to its preferred-prefix synonym.
///
/// Returns a mapped copy of the query, or an error if any identifier could
/// not be resolved; the input is never partially rewritten. A query with no
/// pinned identifiers is returned as-is without any external call.
pub async fn map_identifiers(
    query: &Query,
    client: &reqwest::Client,
    settings: &Settings,
    cache: &PrefixCache,
) -> Result<Query, MappingError> {
    let curies = query.node_ids();
    if curies.is_empty() {
        return Ok(query.clone());
    }

    let preferred = cache
        .preferred_prefixes(client, &settings.robokop_kg)
        .await?;
    let synonyms = get_synonyms(client, &settings.node_norm, &curies).await?;

    let mut mapped = query.clone();
    if let Some(query_graph) = mapped.message.query_graph.as_mut() {
        for node in query_graph.nodes.iter_mut().flat_map(|nodes| nodes.values_mut()) {
            let Some(ids) = node.pinned_ids() else {
                continue;
            };
            let rewritten = ids
                .iter()
                .map(|curie| {
                    let entry = synonyms.get(curie).ok_or_else(|| {
                        MappingError::UnknownIdentifier { curie: curie.clone() }
                    })?;
                    pick_preferred(&entry.synonyms, &entry.categories, preferred)
                        .map(str::to_string)
                        .ok_or_else(|| MappingError::NoPreferredSynonym { curie: curie.clone() })
                })
                .collect::<Result<Vec<_>, MappingError>>()?;
            debug!(before = ?ids, after = ?rewritten, "mapped node ids");
            node.ids = Some(rewritten);
        }
    }
    Ok(mapped)
}

/// Pick the first synonym, in resolver order, whose prefix is acceptable for
/// any of the asserted categories. Categories missing from the table simply
/// contribute no prefixes. Deliberately "first acceptable", not "best".
fn pick_preferred<'a>(
    synonyms: &'a [String],
    categories: &[String],
    preferred: &PrefixTable,
) -> Option<&'a str> {
    synonyms.iter().map(String::as_str).find(|synonym| {
        categories
            .iter()
            .filter_map(|category| preferred.get(category))
            .flatten()
            .any(|prefix| synonym.starts_with(prefix.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(entries: &[(&str, &[&str])]) -> PrefixTable {
        entries
            .iter()
            .map(|(category, prefixes)| {
                (
                    category.to_string(),
                    prefixes.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pick_preferred_first_match() {
        let preferred = table(&[("biolink:Disease", &["DOID"])]);
        let curies = strings(&["MONDO:1", "DOID:9"]);
        let picked = pick_preferred(&curies, &strings(&["biolink:Disease"]), &preferred);
        assert_eq!(picked, Some("DOID:9"));
    }

    #[test]
    fn test_pick_preferred_tie_break_is_resolver_order() {
        // s1 and s3 both qualify; s1 wins because it comes first.
        let preferred = table(&[("biolink:Disease", &["DOID"])]);
        let curies = strings(&["DOID:1", "MONDO:2", "DOID:3"]);
        let picked = pick_preferred(&curies, &strings(&["biolink:Disease"]), &preferred);
        assert_eq!(picked, Some("DOID:1"));
    }

    #[test]
    fn test_pick_preferred_unions_category_prefixes() {
        let preferred = table(&[
            ("biolink:Disease", &["DOID"]),
            ("biolink:PhenotypicFeature", &["HP"]),
        ]);
        let curies = strings(&["MONDO:1", "HP:2"]);
        let picked = pick_preferred(
            &curies,
            &strings(&["biolink:Disease", "biolink:PhenotypicFeature"]),
            &preferred,
        );
        assert_eq!(picked, Some("HP:2"));
    }

    #[test]
    fn test_pick_preferred_no_match() {
        let preferred = table(&[("biolink:Disease", &["HP"])]);
        let curies = strings(&["MONDO:1", "DOID:9"]);
        let picked = pick_preferred(&curies, &strings(&["biolink:Disease"]), &preferred);
        assert_eq!(picked, None);
    }

    #[test]
    fn test_pick_preferred_unknown_category_contributes_nothing() {
        let preferred = table(&[("biolink:Disease", &["DOID"])]);
        let curies = strings(&["DOID:9"]);
        let picked = pick_preferred(
            &curies,
            &strings(&["biolink:NamedThing", "biolink:Disease"]),
            &preferred,
        );
        assert_eq!(picked, Some("DOID:9"));
        // All categories unknown: nothing qualifies.
        let picked = pick_preferred(&curies, &strings(&["biolink:NamedThing"]), &preferred);
        assert_eq!(picked, None);
    }

    #[test]
    fn test_synonym_map_drops_null_entries() {
        let normalized: HashMap<String, Option<NormalizedNode>> = serde_json::from_value(json!({
            "MONDO:1": {
                "equivalent_identifiers": [
                    {"identifier": "MONDO:1", "label": "a disease"},
                    {"identifier": "DOID:9"}
                ],
                "type": ["biolink:Disease"]
            },
            "FAKE:0": null
        }))
        .unwrap();
        let map = synonym_map(normalized);
        assert_eq!(
            map.get("MONDO:1"),
            Some(&SynonymSet {
                synonyms: strings(&["MONDO:1", "DOID:9"]),
                categories: strings(&["biolink:Disease"]),
            })
        );
        assert!(!map.contains_key("FAKE:0"));
    }

    #[tokio::test]
    async fn test_map_identifiers_passthrough_without_pinned_ids() {
        // No pinned ids means no external call: the unroutable settings
        // below would fail any request that was actually issued.
        let query: Query = serde_json::from_value(json!({
            "message": {
                "query_graph": {
                    "nodes": {"n0": {"categories": ["biolink:Disease"]}}
                }
            }
        }))
        .unwrap();
        let settings = Settings {
            robokop_kg: "http://127.0.0.1:1".to_string(),
            node_norm: "http://127.0.0.1:1".to_string(),
            ..Settings::default()
        };
        let cache = PrefixCache::new();
        let mapped = map_identifiers(&query, &reqwest::Client::new(), &settings, &cache)
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            serde_json::to_value(&query).unwrap()
        );
    }
}
