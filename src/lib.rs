//! ROBOKOP ARA: a TRAPI mediator service.
//!
//! Accepts a TRAPI query, rewrites pinned node identifiers to the knowledge
//! graph's preferred CURIE form, forwards the query to the ROBOKOP lookup
//! service, and pipes the result through the ARAGORN ranker stages before
//! returning it to the caller.

pub mod config;
pub mod error;
pub mod identifiers;
pub mod openapi;
pub mod pipeline;
pub mod server;
pub mod trapi;
