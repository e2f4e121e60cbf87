//! Admin routes - catalog seeding on demand.

use super::AppState;
use crate::config::catalog;
use crate::core::{
    Actor,
    seed::{self, SeedReport},
};
use crate::errors::Result;
use axum::{Json, extract::State};
use tracing::info;

/// `POST /api/admin/seed` - seeds whichever catalog tables are still empty.
pub async fn seed(State(state): State<AppState>, actor: Actor) -> Result<Json<SeedReport>> {
    info!(actor = %actor.username, "Seed requested");
    let catalog = catalog::load_config(state.catalog_path.as_path())?;
    Ok(Json(seed::seed_catalog(state.db.as_ref(), &catalog).await?))
}
