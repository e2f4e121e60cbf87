//! Ingredient business logic - the ingredient store.
//!
//! Ingredients are plain records: list, fetch, save (insert or full replace) and delete.
//! Names are not required to be unique. Deleting an ingredient that recipes still use is
//! allowed; the recipe lines lose their ingredient link and stop contributing to cost.

use crate::{
    entities::{Ingredient, ProductRecipe, ingredient, product_recipe},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, warn};

/// Incoming ingredient data. With an `id` the save is a full replace of that record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDraft {
    /// Existing ingredient to replace, or `None` to insert
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    pub name: String,
    /// Cost per unit, finite and non-negative
    pub cost_price: f64,
    /// Units in stock
    pub current_stock: i32,
    /// Unit label
    pub unit: String,
}

impl IngredientDraft {
    /// Checks the required fields before anything touches the database.
    ///
    /// # Errors
    /// Returns `Error::Validation` for a blank name or unit and `Error::InvalidAmount` for a
    /// negative or non-finite cost price.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Ingredient name cannot be empty".to_string(),
            });
        }
        if self.unit.trim().is_empty() {
            return Err(Error::Validation {
                message: "Ingredient unit cannot be empty".to_string(),
            });
        }
        if !self.cost_price.is_finite() || self.cost_price < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.cost_price,
            });
        }
        Ok(())
    }
}

/// Retrieves all ingredients in insertion order.
pub async fn get_all_ingredients<C>(db: &C) -> Result<Vec<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find()
        .order_by_asc(ingredient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific ingredient by its unique ID.
pub async fn get_ingredient_by_id<C>(db: &C, ingredient_id: i64) -> Result<Option<ingredient::Model>>
where
    C: ConnectionTrait,
{
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a new ingredient, or replaces every mutable field of an existing one.
///
/// # Errors
/// Returns an error if:
/// - The draft fails validation
/// - The draft names an id that does not exist
/// - The database write fails
pub async fn save_ingredient<C>(db: &C, draft: IngredientDraft) -> Result<ingredient::Model>
where
    C: ConnectionTrait,
{
    draft.validate()?;

    let mut active: ingredient::ActiveModel = match draft.id {
        Some(id) => Ingredient::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::IngredientNotFound { id })?
            .into(),
        None => ingredient::ActiveModel {
            ..Default::default()
        },
    };

    active.name = Set(draft.name.trim().to_string());
    active.cost_price = Set(draft.cost_price);
    active.current_stock = Set(draft.current_stock);
    active.unit = Set(draft.unit.trim().to_string());

    let saved = if draft.id.is_some() {
        active.update(db).await?
    } else {
        active.insert(db).await?
    };

    info!(
        ingredient_id = saved.id,
        name = %saved.name,
        cost_price = saved.cost_price,
        "Saved ingredient"
    );
    Ok(saved)
}

/// Deletes an ingredient. Recipe lines that referenced it are kept as orphans.
///
/// # Errors
/// Returns an error if the ingredient does not exist or the delete fails.
pub async fn delete_ingredient<C>(db: &C, ingredient_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let ingredient = Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })?;

    let referencing_lines = ProductRecipe::find()
        .filter(product_recipe::Column::IngredientId.eq(ingredient_id))
        .count(db)
        .await?;
    if referencing_lines > 0 {
        warn!(
            ingredient_id,
            referencing_lines, "Deleting ingredient still used by recipes; lines become orphaned"
        );
    }

    ingredient.delete(db).await?;
    info!(ingredient_id, "Deleted ingredient");
    Ok(())
}
