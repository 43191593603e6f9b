use axum::http::HeaderValue;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod models;
mod services;
mod utils;
mod validation;

use config::Config;
use constants::API_VERSION;
use db::Database;
use services::RedisCacheStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goal_vault=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Goal Vault backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    // Pool is lazy; the first query opens the connection
    let db = Database::new(&config)?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        db.run_migrations().await?;
    }

    // Redis connects on the first cache call
    let cache_store = Arc::new(RedisCacheStore::new(config.redis_url.clone()));

    let app_state = api::AppState::new(db, cache_store, config.clone());
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/health/ready", get(api::health::readiness))
        // Chains & address checks
        .route("/api/v1/chains", get(api::chain::list_chains))
        .route(
            "/api/v1/chains/validate-address",
            post(api::chain::validate_address_handler),
        )
        // Users
        .route("/api/v1/users", post(api::user::create_user))
        .route("/api/v1/users/{id}", get(api::user::get_user))
        .route(
            "/api/v1/users/{id}/wallets",
            get(api::user::list_user_wallets),
        )
        .route("/api/v1/users/{id}/goals", get(api::user::list_user_goals))
        // Wallets
        .route("/api/v1/wallets", post(api::wallet::create_wallet))
        .route(
            "/api/v1/wallets/{id}",
            get(api::wallet::get_wallet)
                .put(api::wallet::update_wallet)
                .delete(api::wallet::delete_wallet),
        )
        // Goals
        .route("/api/v1/goals", post(api::goal::create_goal))
        .route(
            "/api/v1/goals/{id}",
            get(api::goal::get_goal)
                .put(api::goal::update_goal)
                .delete(api::goal::delete_goal),
        )
        .route(
            "/api/v1/goals/{id}/progress",
            patch(api::goal::update_progress),
        )
        .route(
            "/api/v1/goals/{id}/subgoals",
            get(api::goal::list_subgoals),
        )
        // Cache
        .route(
            "/api/v1/cache/wallets/{wallet_id}/{data_type}",
            get(api::cache::get_wallet_data)
                .put(api::cache::set_wallet_data)
                .delete(api::cache::invalidate_wallet_data),
        )
        .route(
            "/api/v1/cache/wallets/{wallet_id}",
            delete(api::cache::invalidate_wallet),
        )
        .route(
            "/api/v1/cache/metadata/batch",
            post(api::cache::set_batch_metadata),
        )
        .route(
            "/api/v1/cache/metadata/{coin_type}",
            get(api::cache::get_metadata).put(api::cache::set_metadata),
        )
        .route("/api/v1/cache/stats", get(api::cache::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
