use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rust_leads_api::config::Config;
use rust_leads_api::db::Database;
use rust_leads_api::db_storage::MongoLeadRepository;
use rust_leads_api::handlers::{self, AppState};
use rust_leads_api::services::{BirthDateService, LeadService};
use rust_leads_api::ApiDoc;

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, establishes and verifies the
/// database connection (the process refuses to serve if the store is
/// unreachable), then assembles the router and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Establish the database connection and verify the deployment is actually
    // reachable before accepting traffic.
    let db = Database::connect(&config.mongo_url, &config.database_name).await?;
    db.ping()
        .await
        .map_err(|e| anyhow::anyhow!("Startup connection failed: {}", e))?;
    tracing::info!("Database connection established");

    // Wire the store and services together explicitly; no globals.
    let repository = Arc::new(MongoLeadRepository::new(db.database()));
    let birth_date_service = BirthDateService::new(config.birth_date_api_url.clone());
    let service = LeadService::new(repository, birth_date_service);

    let app_state = Arc::new(AppState {
        service,
        db: db.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Lead routes get the security layers; health probes stay outside them
    let protected_routes = handlers::lead_routes().layer(
        ServiceBuilder::new()
            // Request size limit: 1MB max payload
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    let app = Router::new()
        .route("/", get(handlers::health))
        .route("/pinga", get(handlers::ping))
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
