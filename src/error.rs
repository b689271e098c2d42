//! Error types for the query pipeline.
//!
//! Two layers: [`MappingError`] covers the identifier-mapping path, where
//! some kinds are recoverable (the pipeline falls back to the caller's
//! original query), and [`PipelineError`] covers everything the caller can
//! observe as a failed request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures raised while rewriting query identifiers.
#[derive(Error, Debug)]
pub enum MappingError {
    /// The node-normalization service was unreachable or returned non-2xx.
    #[error("Failed synonymizing node ids: {detail}")]
    SynonymService { detail: String },

    /// The meta-knowledge-graph fetch was unreachable or returned non-2xx.
    #[error("Failed finding preferred prefixes: {detail}")]
    PrefixService { detail: String },

    /// The normalization service returned no entry for this CURIE.
    #[error("No synonyms known for {curie}")]
    UnknownIdentifier { curie: String },

    /// No synonym carried a preferred prefix for any asserted category.
    #[error("No preferred synonym for {curie}")]
    NoPreferredSynonym { curie: String },
}

impl MappingError {
    /// Whether the pipeline may proceed with the original, unmapped query.
    /// Service failures are not recoverable; per-identifier lookup misses are.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MappingError::UnknownIdentifier { .. } | MappingError::NoPreferredSynonym { .. }
        )
    }
}

/// Failures that abort the request pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The knowledge-graph lookup returned non-2xx or was unreachable.
    #[error("Failed doing lookup: {detail}")]
    Lookup { detail: String },

    /// A ranker stage returned non-2xx or was unreachable.
    #[error("Failed doing {stage}: {detail}")]
    Stage { stage: String, detail: String },

    /// A non-recoverable identifier-mapping failure.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error!("query pipeline failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(MappingError::UnknownIdentifier { curie: "MONDO:1".into() }.is_recoverable());
        assert!(MappingError::NoPreferredSynonym { curie: "MONDO:1".into() }.is_recoverable());
        assert!(!MappingError::SynonymService { detail: "503".into() }.is_recoverable());
        assert!(!MappingError::PrefixService { detail: "503".into() }.is_recoverable());
    }

    #[test]
    fn test_display_identifies_stage() {
        let err = PipelineError::Stage {
            stage: "omnicorp_overlay".into(),
            detail: "502 Bad Gateway".into(),
        };
        let message = err.to_string();
        assert!(message.contains("omnicorp_overlay"));
        assert!(message.contains("502"));

        let err = PipelineError::Lookup { detail: "502".into() };
        assert!(err.to_string().contains("lookup"));
    }

    #[test]
    fn test_mapping_error_passes_through_pipeline_display() {
        let err = PipelineError::from(MappingError::PrefixService { detail: "oops".into() });
        assert_eq!(err.to_string(), "Failed finding preferred prefixes: oops");
    }
}
