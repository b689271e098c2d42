//! The query pipeline: best-effort identifier mapping, knowledge-graph
//! lookup, then the configured ranker stages in order.
//!
//! Stages are strictly sequential and single-attempt; the first non-2xx
//! downstream response aborts the pipeline. No timeout is imposed — the
//! scoring services may legitimately run long.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::PipelineError;
use crate::identifiers::{map_identifiers, PrefixCache};
use crate::trapi::Query;

/// Run a query through the full pipeline and return the final ranked
/// response payload.
pub async fn answer_query(
    query: Query,
    client: &reqwest::Client,
    settings: &Settings,
    cache: &PrefixCache,
) -> Result<Value, PipelineError> {
    let query = if settings.map_identifiers {
        match map_identifiers(&query, client, settings, cache).await {
            Ok(mapped) => mapped,
            // Best-effort: an identifier we cannot map is not fatal, the
            // lookup just runs against the caller's original CURIEs.
            Err(err) if err.is_recoverable() => {
                warn!("proceeding with unmapped query: {err}");
                query
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        query
    };

    let mut payload = post_stage(client, &format!("{}/query", settings.robokop_kg), &query)
        .await
        .map_err(|detail| PipelineError::Lookup { detail })?;
    debug!("lookup complete");

    for stage in &settings.ranker_stages {
        payload = post_stage(client, &format!("{}/{stage}", settings.aragorn_ranker), &payload)
            .await
            .map_err(|detail| PipelineError::Stage {
                stage: stage.clone(),
                detail,
            })?;
        debug!(stage, "ranker stage complete");
    }

    Ok(payload)
}

/// POST a JSON body and return the JSON response, or the downstream
/// status/body as the error detail.
async fn post_stage<T: serde::Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<Value, String> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| err.to_string())?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("{status}: {body}"));
    }

    response.json().await.map_err(|err| err.to_string())
}
