//! HTTP surface - an axum `Router` over the core operations.
//!
//! Handlers are thin: decode the request, call into [`crate::core`], encode the result.
//! Everything except health, login and register requires a bearer token, enforced by taking an
//! [`Actor`](crate::core::Actor) argument.

use crate::auth::JwtService;
use crate::errors::Error;
use axum::{
    Router,
    extract::FromRequest,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

mod admin;
mod auth;
mod health;
mod ingredients;
mod products;
mod users;

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle, shared across handlers
    pub db: Arc<DatabaseConnection>,
    /// Token signer and verifier
    pub jwt: Arc<JwtService>,
    /// Seed catalog used by `POST /api/admin/seed`
    pub catalog_path: Arc<PathBuf>,
}

/// JSON request body whose decoding failures are reported as `{ "error": ... }` with status 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Builds a CORS layer allowing the given origins. Origins that are not valid header values are
/// dropped with a warning.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Assembles every route under `/api`.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route(
            "/ingredients",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/ingredients/{id}",
            get(ingredients::get)
                .put(ingredients::update)
                .delete(ingredients::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/user/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/user/change-password", post(users::change_password))
        .route("/admin/seed", post(admin::seed));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
