//! Public sign-in and registration routes. Both answer with a fresh bearer token.

use super::{ApiJson, AppState};
use crate::core::user::{self, Registration};
use crate::entities::user as user_entity;
use crate::errors::Result;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    token: String,
    #[serde(rename = "type")]
    token_type: &'static str,
    username: String,
}

fn issue(state: &AppState, account: &user_entity::Model) -> Result<Json<AuthResponse>> {
    Ok(Json(AuthResponse {
        token: state.jwt.generate_token(account)?,
        token_type: "Bearer",
        username: account.username.clone(),
    }))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let account = user::authenticate(state.db.as_ref(), &request.username, &request.password).await?;
    info!(user_id = account.id, "User signed in");
    issue(&state, &account)
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<Registration>,
) -> Result<Json<AuthResponse>> {
    let account = user::register(state.db.as_ref(), request).await?;
    issue(&state, &account)
}
