//! UniUnity Content Management Backend
//!
//! A REST backend for blog posts and site configuration with password-based
//! admin authentication, SQLite persistence, and a client-side admin state
//! store that mirrors server state.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(state.config.allowed_origin.as_deref());

    // Clone for the session layer
    let repo = state.repo.clone();

    // Public routes: login, published content, site configuration
    let public_routes = Router::new()
        .route("/auth", post(api::login))
        .route("/blogs", get(api::list_posts))
        .route("/config", get(api::get_config));

    // Privileged routes require a live session token
    let protected_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/blogs", post(api::create_post))
        .route("/blogs/{id}", put(api::update_post))
        .route("/blogs/{id}", delete(api::delete_post))
        .route("/config", post(api::update_config))
        .route("/send-notification", post(api::send_notification))
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(repo.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: a configured origin is allowed with credentials; no configured
/// origin means permissive dev mode.
fn build_cors(allowed_origin: Option<&str>) -> CorsLayer {
    match allowed_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => {
            tracing::warn!("No allowed origin configured, CORS is permissive");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Health check endpoint.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}
