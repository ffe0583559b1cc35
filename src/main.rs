//! Rewards Dashboard Backend
//!
//! Serves the dashboard store (user profile, reward points, claimable benefits)
//! over a JSON API, backed by a simulated or SQLite data gateway.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod gateway;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, GatewayKind, LogFormat};
use db::Repository;
use gateway::{DataGateway, MockGateway, SqliteGateway};
use store::DashboardStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DashboardStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_tracing(&config);

    tracing::info!("Starting Rewards Dashboard Backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (DASHBOARD_API_PSK). Authentication is disabled!");
    }

    let gateway = build_gateway(&config).await?;
    let store = DashboardStore::create(gateway);
    tracing::info!(gateway = store.gateway_name(), "Dashboard store ready");

    // Load on start, like the view does on mount
    tokio::spawn({
        let store = store.clone();
        async move {
            if !store.load().await.succeeded() {
                tracing::warn!("Initial dashboard load failed; waiting for a manual reload");
            }
        }
    });

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.dispose();
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Construct the configured data gateway.
async fn build_gateway(
    config: &Config,
) -> Result<Arc<dyn DataGateway>, Box<dyn std::error::Error>> {
    match config.gateway {
        GatewayKind::Mock => {
            let gateway = MockGateway::new(config.mock);
            let settings = gateway.settings();
            tracing::info!(
                fetch_delay_ms = settings.fetch_delay.as_millis() as u64,
                claim_delay_ms = settings.claim_delay.as_millis() as u64,
                claim_success_rate = settings.claim_success_rate,
                "Using mock gateway"
            );
            Ok(Arc::new(gateway))
        }
        GatewayKind::Sqlite => {
            tracing::info!("Using SQLite gateway at {:?}", config.db_path);
            let pool = db::init_database(&config.db_path).await?;
            let gateway = SqliteGateway::open_seeded(Repository::new(pool)).await?;
            Ok(Arc::new(gateway))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();
    let auth_store = state.store.clone();

    let api_routes = Router::new()
        // Dashboard
        .route("/dashboard", get(api::get_dashboard))
        .route("/dashboard/reload", post(api::reload_dashboard))
        .route("/dashboard/loading", put(api::set_loading))
        .route("/dashboard/summary", get(api::get_summary))
        // Benefits
        .route("/benefits", get(api::list_benefits))
        .route("/benefits/{id}/claim", post(api::claim_benefit))
        .route("/benefits/{id}/claims", get(api::get_claim_history))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), auth_store.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
