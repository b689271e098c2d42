//! OpenAPI document with the federation's `x-translator` extensions.
//!
//! Assembled once from settings; the metadata describes the deployment and
//! never affects query behavior.

use serde_json::{json, Value};

use crate::config::Settings;

pub fn document(settings: &Settings) -> Value {
    let info = &settings.openapi;
    let mut doc = json!({
        "openapi": "3.0.2",
        "info": {
            "title": info.title,
            "version": info.version,
            "termsOfService": info.terms_of_service,
            "contact": {
                "name": info.contact_name,
                "email": info.contact_email,
                "x-id": info.contact_id,
                "x-role": "responsible developer",
            },
            "x-translator": {
                "component": info.translator_component,
                "team": info.translator_teams,
            },
        },
        "tags": [
            {"name": "translator"},
            {"name": "reasoner"},
            {"name": "robokop"},
        ],
        "paths": {
            "/query": {
                "post": {
                    "tags": ["reasoner"],
                    "summary": "Look up answers to the question",
                    "requestBody": {
                        "content": {"application/json": {"schema": {"type": "object"}}},
                        "required": true,
                    },
                    "responses": {
                        "200": {
                            "description": "Ranked TRAPI response",
                            "content": {"application/json": {"schema": {"type": "object"}}},
                        },
                        "500": {"description": "Pipeline failure"},
                    },
                },
            },
            "/health": {
                "get": {
                    "summary": "Liveness probe",
                    "responses": {"200": {"description": "Service is up"}},
                },
            },
        },
    });

    if let Some(server_url) = &info.server_url {
        doc["servers"] = json!([{
            "url": server_url,
            "x-maturity": info.server_maturity,
            "x-location": info.server_location,
        }]);
    }

    doc
}
