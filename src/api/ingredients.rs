//! Ingredient routes under `/api/ingredients`.

use super::{ApiJson, AppState};
use crate::core::{
    Actor,
    ingredient::{self, IngredientDraft},
};
use crate::entities::ingredient::Model;
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

/// `GET /api/ingredients`
pub async fn list(State(state): State<AppState>, _actor: Actor) -> Result<Json<Vec<Model>>> {
    Ok(Json(ingredient::get_all_ingredients(state.db.as_ref()).await?))
}

/// `GET /api/ingredients/{id}`
pub async fn get(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<Model>> {
    ingredient::get_ingredient_by_id(state.db.as_ref(), id)
        .await?
        .map(Json)
        .ok_or(Error::IngredientNotFound { id })
}

/// `POST /api/ingredients`
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(mut draft): ApiJson<IngredientDraft>,
) -> Result<(StatusCode, Json<Model>)> {
    draft.id = None;
    let saved = ingredient::save_ingredient(state.db.as_ref(), draft).await?;
    debug!(actor = %actor.username, ingredient_id = saved.id, "Ingredient created over HTTP");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// `PUT /api/ingredients/{id}`
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ApiJson(mut draft): ApiJson<IngredientDraft>,
) -> Result<Json<Model>> {
    draft.id = Some(id);
    let saved = ingredient::save_ingredient(state.db.as_ref(), draft).await?;
    debug!(actor = %actor.username, ingredient_id = id, "Ingredient replaced over HTTP");
    Ok(Json(saved))
}

/// `DELETE /api/ingredients/{id}`
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    ingredient::delete_ingredient(state.db.as_ref(), id).await?;
    debug!(actor = %actor.username, ingredient_id = id, "Ingredient deleted over HTTP");
    Ok(StatusCode::NO_CONTENT)
}
