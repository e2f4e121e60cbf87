//! Product routes under `/api/products`.
//!
//! Every response carries the live recipe and computed cost, see
//! [`CostedProduct`](crate::core::product::CostedProduct).

use super::{ApiJson, AppState};
use crate::core::{
    Actor,
    product::{self, CostedProduct, ProductDraft},
};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// `GET /api/products`
pub async fn list(State(state): State<AppState>, _actor: Actor) -> Result<Json<Vec<CostedProduct>>> {
    Ok(Json(product::list_products(state.db.as_ref()).await?))
}

/// `GET /api/products/{id}`
pub async fn get(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<CostedProduct>> {
    product::get_product(state.db.as_ref(), id)
        .await?
        .map(Json)
        .ok_or(Error::ProductNotFound { id })
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    ApiJson(mut draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<CostedProduct>)> {
    draft.id = None;
    draft.version = None;
    let saved = product::save_product(state.db.as_ref(), &actor, draft).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    ApiJson(mut draft): ApiJson<ProductDraft>,
) -> Result<Json<CostedProduct>> {
    draft.id = Some(id);
    Ok(Json(product::save_product(state.db.as_ref(), &actor, draft).await?))
}

/// `DELETE /api/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    product::delete_product(state.db.as_ref(), &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
