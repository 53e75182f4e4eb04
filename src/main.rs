//! Bunte Liga Freiburg
//!
//! League service for a recreational football league: teams claim open pitch
//! slots, confirm or cancel games, report scores and follow the table.
//!
//! ## Features
//!
//! - **Bookings**: Bulk slot generation, requests, confirmations, cancellations
//! - **Results**: Reporting, confirmation by the opponent, admin corrections
//! - **Standings**: Configurable points and tie-breakers, frozen final tables

mod config;
mod db;
mod engine;
mod error;
mod handlers;
mod models;
mod notify;
mod validation;

use axum::{middleware::from_fn_with_state, Router};
use handlers::AppState;
use notify::Notifier;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bunte_liga=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting Bunte Liga service");
    tracing::info!("Environment: {:?}", config.environment);
    tracing::info!(
        "League timezone: {}, result edits: {:?}",
        config.league_timezone,
        config.result_edit_policy
    );

    // Create database pool
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    if let Some(token) = &config.admin_bootstrap_token {
        handlers::auth::seed_bootstrap_token(&pool, token).await?;
    }

    if config.mail_webhook_url.is_none() {
        tracing::warn!("MAIL_WEBHOOK_URL not set, notifications are only logged");
    }

    // Create application state
    let state = AppState {
        pool: pool.clone(),
        notifier: Notifier::new(
            config.mail_webhook_url.clone(),
            config.mail_from.clone(),
            config.league_timezone,
        ),
        timezone: config.league_timezone,
        default_slot_minutes: config.default_slot_minutes,
        result_edit_policy: config.result_edit_policy,
        is_production: config.is_production(),
    };

    // Build CORS layer
    let cors = if config.is_production() {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Build main router
    let app = Router::new()
        .nest("/api", handlers::api_router(state.clone()))
        .layer(from_fn_with_state(
            state.clone(),
            handlers::middleware::security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
