//! Leads API Library
//!
//! Lead-capture web service: accepts lead submissions, enriches them with a
//! birth date from an external HTTP source on a best-effort basis, persists
//! them to MongoDB and exposes read endpoints.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `db`: Database connection management.
//! - `db_storage`: Lead record store (repository trait + MongoDB implementation).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and routes.
//! - `models`: Core data models and input validation.
//! - `services`: Birth date enrichment client and lead orchestration.

use utoipa::OpenApi;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

/// OpenAPI documentation for the Leads API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_lead,
        handlers::list_leads,
        handlers::get_lead,
        handlers::health,
        handlers::ping,
    ),
    components(schemas(
        models::Lead,
        models::LeadCreate,
        errors::FieldViolation,
    )),
    tags(
        (name = "leads", description = "Lead capture and retrieval"),
        (name = "health", description = "Liveness and store reachability probes")
    )
)]
pub struct ApiDoc;
