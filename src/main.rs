//! Pickup Hoops Backend
//!
//! REST backend for the Miami pickup basketball game listing, with SQLite
//! persistence, email/password accounts and a local blob store.

mod api;
mod auth;
mod blob;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod ownership;
mod roster;
mod share;
mod status;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionManager;
use blob::{BlobStore, BLOB_ROUTE};
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub sessions: Arc<SessionManager>,
    pub blobs: Arc<BlobStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Pickup Hoops Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Blob directory: {:?}", config.blob_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if the app key is not configured
    if config.api_key.is_none() {
        tracing::warn!("No app key configured (PICKUP_API_KEY). API key check is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    tokio::fs::create_dir_all(&config.blob_dir).await?;
    let blobs = Arc::new(BlobStore::new(&config.blob_dir, &config.public_url));

    let sessions = Arc::new(SessionManager::new(
        repo.clone(),
        config.session_ttl,
        config.scrypt_params()?,
    ));
    tokio::spawn(auth::log_auth_events(sessions.subscribe()));

    // Create application state
    let state = AppState {
        repo,
        sessions,
        blobs,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the key for the auth layer
    let api_key = state.config.api_key.clone();

    // API routes
    let api_routes = Router::new()
        // Accounts
        .route("/auth/signup", post(api::sign_up))
        .route("/auth/signin", post(api::sign_in))
        .route("/auth/signout", post(api::sign_out))
        .route("/auth/me", get(api::current_identity))
        // Games
        .route("/games", get(api::list_games).post(api::create_game))
        .route(
            "/games/{id}",
            get(api::get_game)
                .put(api::update_game)
                .delete(api::delete_game),
        )
        .route("/games/{id}/notes", put(api::update_notes))
        .route("/games/{id}/join", post(api::join_game))
        .route("/games/{id}/leave", post(api::leave_game))
        // Share and export
        .route("/games/{id}/share", get(api::get_share_links))
        .route("/games/{id}/share/{platform}", get(api::get_share_intent))
        .route("/games/{id}/ics", get(api::download_ics))
        // Profile
        .route("/profile", get(api::get_profile).put(api::save_profile))
        .route("/profile/avatar", put(api::upload_avatar))
        // Metadata
        .route("/datastore/revision", get(api::get_revision))
        .route("/contact", get(api::get_contact))
        // Apply app key middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::app_key_layer(api_key.clone(), req, next)
        }));

    // Health check and public blobs (no key required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .nest_service(BLOB_ROUTE, ServeDir::new(state.blobs.root()));

    Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
