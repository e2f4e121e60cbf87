//! Recipe business logic - the store for product recipe line items.
//!
//! Line items are always addressed through the product that owns them. They are never edited
//! in place: a product's recipe is replaced as a whole by [`replace_for_product`], which deletes
//! every existing line and inserts the new ones as fresh rows inside one transaction.
//!
//! Foreign keys do the referential checking. Inserting a line for an ingredient that does not
//! exist fails with `Error::ReferentialIntegrity`; nothing here looks the ingredient up first.

use crate::{
    core::cost::ResolvedLine,
    entities::{Ingredient, ProductRecipe, product_recipe},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One desired recipe line as submitted by a client: an ingredient and how much of it.
///
/// Any identity the line had before is irrelevant; every submitted line becomes a new row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    /// Ingredient consumed
    pub ingredient_id: i64,
    /// Units of the ingredient per unit of product
    pub quantity: f64,
}

impl RecipeLine {
    /// Checks that the quantity is a finite, strictly positive number.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` otherwise.
    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.quantity,
            });
        }
        Ok(())
    }
}

/// Retrieves the line items of a product in insertion order.
pub async fn find_by_product<C>(db: &C, product_id: i64) -> Result<Vec<product_recipe::Model>>
where
    C: ConnectionTrait,
{
    ProductRecipe::find()
        .filter(product_recipe::Column::ProductId.eq(product_id))
        .order_by_asc(product_recipe::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the line items of a product, each joined with its ingredient.
///
/// The join is a left join: lines whose ingredient has been deleted come back with `None`.
pub async fn find_resolved_by_product<C>(db: &C, product_id: i64) -> Result<Vec<ResolvedLine>>
where
    C: ConnectionTrait,
{
    ProductRecipe::find()
        .filter(product_recipe::Column::ProductId.eq(product_id))
        .order_by_asc(product_recipe::Column::Id)
        .find_also_related(Ingredient)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Resolved line items for several products at once, grouped by product id.
///
/// Products without lines are absent from the map. Lines within a product keep insertion order.
pub async fn find_resolved_by_products<C>(
    db: &C,
    product_ids: &[i64],
) -> Result<HashMap<i64, Vec<ResolvedLine>>>
where
    C: ConnectionTrait,
{
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ProductRecipe::find()
        .filter(product_recipe::Column::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(product_recipe::Column::Id)
        .find_also_related(Ingredient)
        .all(db)
        .await?;

    let mut grouped: HashMap<i64, Vec<ResolvedLine>> = HashMap::new();
    for (line, ingredient) in rows {
        grouped
            .entry(line.product_id)
            .or_default()
            .push((line, ingredient));
    }
    Ok(grouped)
}

/// Inserts one new line item for `product_id`.
///
/// # Errors
/// Returns `Error::InvalidAmount` for a bad quantity and `Error::ReferentialIntegrity` when the
/// product or ingredient does not exist.
pub async fn save<C>(db: &C, product_id: i64, line: RecipeLine) -> Result<product_recipe::Model>
where
    C: ConnectionTrait,
{
    line.validate()?;

    let active = product_recipe::ActiveModel {
        product_id: Set(product_id),
        ingredient_id: Set(Some(line.ingredient_id)),
        quantity: Set(line.quantity),
        ..Default::default()
    };
    active.insert(db).await.map_err(Into::into)
}

/// Inserts every line in order, returning the stored rows in the same order.
pub async fn save_all<C>(
    db: &C,
    product_id: i64,
    lines: &[RecipeLine],
) -> Result<Vec<product_recipe::Model>>
where
    C: ConnectionTrait,
{
    let mut saved = Vec::with_capacity(lines.len());
    for line in lines {
        saved.push(save(db, product_id, *line).await?);
    }
    Ok(saved)
}

/// Deletes a single line item.
pub async fn delete<C>(db: &C, line: product_recipe::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    line.delete(db).await?;
    Ok(())
}

/// Deletes every line item of a product, returning how many were removed.
pub async fn delete_for_product<C>(db: &C, product_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = ProductRecipe::delete_many()
        .filter(product_recipe::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Replaces a product's whole recipe: delete all existing lines, then insert `lines` as new rows.
///
/// Runs in its own transaction (a savepoint when `db` is already a transaction), so a failing
/// insert leaves the previous recipe in place.
///
/// # Errors
/// Returns the first validation or database error; nothing is committed in that case.
pub async fn replace_for_product<C>(
    db: &C,
    product_id: i64,
    lines: &[RecipeLine],
) -> Result<Vec<product_recipe::Model>>
where
    C: TransactionTrait,
{
    for line in lines {
        line.validate()?;
    }

    let txn = db.begin().await?;
    let removed = delete_for_product(&txn, product_id).await?;
    let saved = save_all(&txn, product_id, lines).await?;
    txn.commit().await?;

    debug!(
        product_id,
        removed,
        inserted = saved.len(),
        "Replaced product recipe"
    );
    Ok(saved)
}
