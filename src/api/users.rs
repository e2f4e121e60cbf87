//! Self-service profile routes under `/api/user` for the authenticated caller.

use super::{ApiJson, AppState};
use crate::core::{
    Actor,
    user::{self, ProfilePatch},
};
use crate::entities::user::Model;
use crate::errors::{Error, Result};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

/// `GET /api/user/profile`
pub async fn profile(State(state): State<AppState>, actor: Actor) -> Result<Json<Model>> {
    user::find_by_id(state.db.as_ref(), actor.user_id)
        .await?
        .map(Json)
        .ok_or(Error::UserNotFound { id: actor.user_id })
}

/// `PUT /api/user/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> Result<Json<Model>> {
    Ok(Json(
        user::update_profile(state.db.as_ref(), actor.user_id, patch).await?,
    ))
}

/// `POST /api/user/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    user::change_password(
        state.db.as_ref(),
        actor.user_id,
        &request.current_password,
        &request.new_password,
    )
    .await?;
    Ok(Json(json!({ "message": "Password updated" })))
}
