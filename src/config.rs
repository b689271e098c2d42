//! Service configuration.
//!
//! Everything is environment-driven with defaults matching the production
//! deployment. Base URLs are validated at startup so a typo fails fast
//! instead of surfacing as a mid-request connect error.

use anyhow::{Context, Result};
use url::Url;

/// Default ranker stage chain, applied in order.
const DEFAULT_RANKER_STAGES: &str = "omnicorp_overlay,weight_correctness,score";

/// Runtime settings for the ARA service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen port for the HTTP server.
    pub port: u16,
    /// Base URL of the ROBOKOP knowledge-graph service (lookup + meta KG).
    pub robokop_kg: String,
    /// Base URL of the ARAGORN ranker service.
    pub aragorn_ranker: String,
    /// Base URL of the node-normalization service.
    pub node_norm: String,
    /// Ranker stages to run after lookup, in order.
    pub ranker_stages: Vec<String>,
    /// Whether to rewrite query node ids to preferred CURIEs before lookup.
    pub map_identifiers: bool,
    /// Metadata served in the OpenAPI document; does not affect behavior.
    pub openapi: OpenApiInfo,
}

/// Deployment metadata for the OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiInfo {
    pub title: String,
    pub version: String,
    pub terms_of_service: String,
    pub translator_component: String,
    pub translator_teams: Vec<String>,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_id: String,
    pub server_url: Option<String>,
    pub server_maturity: String,
    pub server_location: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3000,
            robokop_kg: "https://automat.renci.org/robokopkg/1.2".to_string(),
            aragorn_ranker: "https://aragorn-ranker.renci.org/1.2".to_string(),
            node_norm: "https://nodenormalization-sri.renci.org/1.2".to_string(),
            ranker_stages: parse_stages(DEFAULT_RANKER_STAGES),
            map_identifiers: true,
            openapi: OpenApiInfo::default(),
        }
    }
}

impl Default for OpenApiInfo {
    fn default() -> Self {
        Self {
            title: "ROBOKOP ARA".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            terms_of_service: "N/A".to_string(),
            translator_component: "ARA".to_string(),
            translator_teams: vec!["SRI".to_string()],
            contact_name: "Patrick Wang".to_string(),
            contact_email: "patrick@covar.com".to_string(),
            contact_id: "patrickkwang".to_string(),
            server_url: None,
            server_maturity: "development".to_string(),
            server_location: "RENCI".to_string(),
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        let port = std::env::var("PORT")
            .ok()
            .map(|raw| raw.parse::<u16>().context("PORT must be a port number"))
            .transpose()?
            .unwrap_or(defaults.port);

        let openapi = OpenApiInfo {
            server_url: std::env::var("OPENAPI_SERVER_URL").ok(),
            server_maturity: env_or("OPENAPI_SERVER_MATURITY", &defaults.openapi.server_maturity),
            server_location: env_or("OPENAPI_SERVER_LOCATION", &defaults.openapi.server_location),
            ..defaults.openapi
        };

        Ok(Self {
            port,
            robokop_kg: base_url("ROBOKOP_KG", &defaults.robokop_kg)?,
            aragorn_ranker: base_url("ARAGORN_RANKER", &defaults.aragorn_ranker)?,
            node_norm: base_url("NODE_NORM", &defaults.node_norm)?,
            ranker_stages: parse_stages(&env_or("RANKER_STAGES", DEFAULT_RANKER_STAGES)),
            map_identifiers: parse_bool(&env_or("MAP_IDENTIFIERS", "true")),
            openapi,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Read a base URL from the environment, validate it, and strip any
/// trailing slash so endpoint paths can be appended with `format!`.
fn base_url(var: &str, default: &str) -> Result<String> {
    let raw = env_or(var, default);
    Url::parse(&raw).with_context(|| format!("{var} is not a valid URL: {raw}"))?;
    Ok(raw.trim_end_matches('/').to_string())
}

fn parse_stages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|stage| !stage.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
