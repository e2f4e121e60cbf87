//! Product business logic - the product store and the save-and-recalculate orchestrator.
//!
//! Every product handed back to a caller is a [`CostedProduct`]: the stored row, its recipe
//! lines as they are in the database right now, and the cost and margin computed from those
//! lines by [`crate::core::cost`]. Nothing derived is ever read from storage.
//!
//! Saving a product is a full replace of its recipe. The product row, the deletion of the old
//! lines and the insertion of the new ones all commit together or not at all. Concurrent
//! updates of one product are caught by the `version` column when the caller supplies the
//! version it last read; callers that omit it get last-writer-wins.

use crate::{
    core::{
        Actor,
        cost::{self, ResolvedLine},
        recipe::{self, RecipeLine},
    },
    entities::{Product, ingredient, product},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// A product as submitted for saving, with the full recipe it should end up with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Existing product to update, or `None` to create one
    #[serde(default)]
    pub id: Option<i64>,
    /// Product name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// List price, finite and non-negative
    pub price: f64,
    /// Units in stock
    pub stock: i32,
    /// Version the caller last saw; when present an update only applies if it still matches
    #[serde(default)]
    pub version: Option<i32>,
    /// Desired recipe; replaces whatever the product had
    #[serde(default)]
    pub recipes: Vec<RecipeLine>,
}

impl ProductDraft {
    /// Checks product fields and every recipe line before anything touches the database.
    ///
    /// # Errors
    /// Returns `Error::Validation` for a blank name and `Error::InvalidAmount` for a negative or
    /// non-finite price or a non-positive quantity.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Product name cannot be empty".to_string(),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidAmount { amount: self.price });
        }
        self.recipes.iter().try_for_each(RecipeLine::validate)
    }
}

/// One recipe line as returned to callers, with its ingredient embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineView {
    /// Line item id
    pub id: i64,
    /// Ingredient this line consumes; `None` if it has been deleted
    pub ingredient: Option<ingredient::Model>,
    /// Units of the ingredient per unit of product
    pub quantity: f64,
}

/// A product with its live recipe and freshly computed cost figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostedProduct {
    /// The stored product row
    #[serde(flatten)]
    pub product: product::Model,
    /// Recipe lines in insertion order
    pub recipes: Vec<RecipeLineView>,
    /// Sum of ingredient costs over resolvable lines
    pub calculated_cost: f64,
    /// `price - calculated_cost`
    pub profit_margin: f64,
}

impl CostedProduct {
    /// Builds the costed view of `product` from its resolved recipe lines.
    #[must_use]
    pub fn project(product: product::Model, lines: Vec<ResolvedLine>) -> Self {
        let breakdown = cost::calculate(product.price, &lines);

        let recipes = lines
            .into_iter()
            .map(|(line, ingredient)| {
                if ingredient.is_none() {
                    warn!(
                        product_id = product.id,
                        line_id = line.id,
                        "Recipe line has no ingredient; costing it at zero"
                    );
                }
                RecipeLineView {
                    id: line.id,
                    ingredient,
                    quantity: line.quantity,
                }
            })
            .collect();

        Self {
            product,
            recipes,
            calculated_cost: breakdown.calculated_cost,
            profit_margin: breakdown.profit_margin,
        }
    }
}

/// Saves a product together with its complete recipe and returns it costed.
///
/// For an update, every existing recipe line is deleted and the submitted lines are inserted as
/// new rows; no line identity survives. The whole operation is one transaction.
///
/// # Errors
/// Returns an error if:
/// - The draft fails validation
/// - The draft names a product that does not exist
/// - The supplied `version` no longer matches the stored one
/// - A recipe line references an ingredient that does not exist
/// - Any database operation fails
#[instrument(skip(db, draft), fields(actor = %actor.username, product_id = ?draft.id))]
pub async fn save_product(
    db: &DatabaseConnection,
    actor: &Actor,
    draft: ProductDraft,
) -> Result<CostedProduct> {
    draft.validate()?;

    let txn = db.begin().await?;

    let saved = match draft.id {
        Some(product_id) => update_product_row(&txn, product_id, &draft).await?,
        None => insert_product_row(&txn, &draft).await?,
    };

    recipe::replace_for_product(&txn, saved.id, &draft.recipes).await?;
    let lines = recipe::find_resolved_by_product(&txn, saved.id).await?;

    txn.commit().await?;

    let costed = CostedProduct::project(saved, lines);
    info!(
        product_id = costed.product.id,
        version = costed.product.version,
        lines = costed.recipes.len(),
        calculated_cost = costed.calculated_cost,
        "Saved product"
    );
    Ok(costed)
}

async fn insert_product_row<C>(db: &C, draft: &ProductDraft) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let product = product::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        description: Set(draft.description.clone()),
        price: Set(draft.price),
        stock: Set(draft.stock),
        version: Set(1),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

async fn update_product_row<C>(
    db: &C,
    product_id: i64,
    draft: &ProductDraft,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let expected_version = draft.version.unwrap_or(existing.version);
    if expected_version != existing.version {
        return Err(Error::Conflict {
            message: format!(
                "Product {product_id} is at version {}, update was based on version {expected_version}",
                existing.version
            ),
        });
    }

    // Compare-and-set on the version so an interleaved writer cannot be overwritten silently.
    let result = Product::update_many()
        .col_expr(product::Column::Name, Expr::value(draft.name.trim()))
        .col_expr(
            product::Column::Description,
            Expr::value(draft.description.clone()),
        )
        .col_expr(product::Column::Price, Expr::value(draft.price))
        .col_expr(product::Column::Stock, Expr::value(draft.stock))
        .col_expr(product::Column::Version, Expr::value(expected_version + 1))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Version.eq(expected_version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::Conflict {
            message: format!("Product {product_id} was modified concurrently"),
        });
    }

    Ok(product::Model {
        id: product_id,
        name: draft.name.trim().to_string(),
        description: draft.description.clone(),
        price: draft.price,
        stock: draft.stock,
        version: expected_version + 1,
    })
}

/// Retrieves one product with its live recipe and computed cost, or `None` if it does not exist.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<Option<CostedProduct>> {
    let Some(product) = Product::find_by_id(product_id).one(db).await? else {
        debug!(product_id, "Product not found");
        return Ok(None);
    };

    let lines = recipe::find_resolved_by_product(db, product_id).await?;
    Ok(Some(CostedProduct::project(product, lines)))
}

/// Retrieves all products in insertion order, each with live recipe and computed cost.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<CostedProduct>> {
    let products = Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?;

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let mut lines_by_product = recipe::find_resolved_by_products(db, &ids).await?;

    Ok(products
        .into_iter()
        .map(|product| {
            let lines = lines_by_product.remove(&product.id).unwrap_or_default();
            CostedProduct::project(product, lines)
        })
        .collect())
}

/// Deletes a product and all of its recipe lines.
///
/// # Errors
/// Returns `Error::ProductNotFound` if the product does not exist, or a database error.
#[instrument(skip(db), fields(actor = %actor.username))]
pub async fn delete_product(db: &DatabaseConnection, actor: &Actor, product_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let product = Product::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let removed_lines = recipe::delete_for_product(&txn, product_id).await?;
    product.delete(&txn).await?;

    txn.commit().await?;
    info!(product_id, removed_lines, "Deleted product");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::ingredient;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn draft(name: &str, price: f64, recipes: Vec<RecipeLine>) -> ProductDraft {
        ProductDraft {
            id: None,
            name: name.to_string(),
            description: None,
            price,
            stock: 10,
            version: None,
            recipes,
        }
    }

    fn line(ingredient_id: i64, quantity: f64) -> RecipeLine {
        RecipeLine {
            ingredient_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_save_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let actor = test_actor();

        let result = save_product(&db, &actor, draft("  ", 1.0, vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = save_product(&db, &actor, draft("Tortilla", -1.0, vec![])).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let result = save_product(&db, &actor, draft("Tortilla", f64::NAN, vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = save_product(&db, &actor, draft("Tortilla", 8.5, vec![line(1, 0.0)])).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_tortilla_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let huevos = create_test_ingredient(&db, "Huevos", 0.33).await?;

        let tortilla = save_product(
            &db,
            &test_actor(),
            draft("Tortilla", 8.50, vec![line(huevos.id, 4.0)]),
        )
        .await?;

        assert!(approx(tortilla.calculated_cost, 1.32));
        assert!(approx(tortilla.profit_margin, 7.18));
        assert_eq!(tortilla.recipes.len(), 1);
        assert_eq!(tortilla.recipes[0].ingredient.as_ref().unwrap().id, huevos.id);
        assert_eq!(tortilla.product.version, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_two_ingredient_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_ingredient(&db, "A", 1.0).await?;
        let b = create_test_ingredient(&db, "B", 3.0).await?;

        let product = save_product(
            &db,
            &test_actor(),
            draft("Combo", 10.0, vec![line(a.id, 2.0), line(b.id, 1.0)]),
        )
        .await?;

        assert_eq!(product.calculated_cost, 5.0);
        assert_eq!(product.profit_margin, 5.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_recipe() -> Result<()> {
        let db = setup_test_db().await?;

        let product = save_product(&db, &test_actor(), draft("Agua", 1.5, vec![])).await?;
        assert_eq!(product.calculated_cost, 0.0);
        assert_eq!(product.profit_margin, 1.5);
        assert!(product.recipes.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_resave_replaces_recipe() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let a = create_test_ingredient(&db, "A", 1.0).await?;
        let b = create_test_ingredient(&db, "B", 2.0).await?;

        let first = save_product(&db, &actor, draft("Plato", 10.0, vec![line(a.id, 1.0)])).await?;
        let old_line_id = first.recipes[0].id;

        let mut update = draft("Plato", 10.0, vec![line(b.id, 2.0)]);
        update.id = Some(first.product.id);
        let second = save_product(&db, &actor, update).await?;

        let stored = recipe::find_by_product(&db, first.product.id).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].ingredient_id, Some(b.id));
        assert_eq!(stored[0].quantity, 2.0);
        assert_ne!(stored[0].id, old_line_id);
        assert_eq!(second.calculated_cost, 4.0);
        assert_eq!(second.product.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_resave_same_recipe_is_stable() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let a = create_test_ingredient(&db, "A", 0.37).await?;
        let b = create_test_ingredient(&db, "B", 1.91).await?;
        let lines = vec![line(a.id, 0.3), line(b.id, 0.7)];

        let first = save_product(&db, &actor, draft("Plato", 10.0, lines.clone())).await?;
        let mut again = draft("Plato", 10.0, lines);
        again.id = Some(first.product.id);
        let second = save_product(&db, &actor, again).await?;

        assert_eq!(
            first.calculated_cost.to_bits(),
            second.calculated_cost.to_bits()
        );
        assert_eq!(recipe::find_by_product(&db, first.product.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_ingredient_rolls_back_everything() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let a = create_test_ingredient(&db, "A", 1.0).await?;

        let original = save_product(&db, &actor, draft("Plato", 10.0, vec![line(a.id, 1.0)])).await?;

        let mut broken = draft("Renamed", 99.0, vec![line(a.id, 3.0), line(404, 1.0)]);
        broken.id = Some(original.product.id);
        let result = save_product(&db, &actor, broken).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ReferentialIntegrity { .. }
        ));

        let reloaded = get_product(&db, original.product.id).await?.unwrap();
        assert_eq!(reloaded, original);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_product() -> Result<()> {
        let db = setup_test_db().await?;

        let result = save_product(&db, &test_actor(), draft("Ghost", 1.0, vec![line(7, 1.0)])).await;
        assert!(result.is_err());
        assert!(list_products(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product() -> Result<()> {
        let db = setup_test_db().await?;
        let mut missing = draft("Ghost", 1.0, vec![]);
        missing.id = Some(77);

        let result = save_product(&db, &test_actor(), missing).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id: 77 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let created = save_product(&db, &actor, draft("Plato", 5.0, vec![])).await?;

        let mut first_writer = draft("Plato A", 5.0, vec![]);
        first_writer.id = Some(created.product.id);
        first_writer.version = Some(created.product.version);
        save_product(&db, &actor, first_writer).await?;

        let mut second_writer = draft("Plato B", 6.0, vec![]);
        second_writer.id = Some(created.product.id);
        second_writer.version = Some(created.product.version);
        let result = save_product(&db, &actor, second_writer).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        let stored = get_product(&db, created.product.id).await?.unwrap();
        assert_eq!(stored.product.name, "Plato A");
        assert_eq!(stored.product.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_orphaned_line_is_costed_at_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_ingredient(&db, "A", 1.0).await?;
        let b = create_test_ingredient(&db, "B", 3.0).await?;
        let product = save_product(
            &db,
            &test_actor(),
            draft("Plato", 10.0, vec![line(a.id, 2.0), line(b.id, 1.0)]),
        )
        .await?;
        assert_eq!(product.calculated_cost, 5.0);

        ingredient::delete_ingredient(&db, b.id).await?;

        let reloaded = get_product(&db, product.product.id).await?.unwrap();
        assert_eq!(reloaded.calculated_cost, 2.0);
        assert_eq!(reloaded.profit_margin, 8.0);
        assert_eq!(reloaded.recipes.len(), 2);
        assert!(reloaded.recipes[1].ingredient.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_cost_follows_ingredient_price() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_ingredient(&db, "A", 1.0).await?;
        let product = save_product(&db, &test_actor(), draft("Plato", 10.0, vec![line(a.id, 2.0)])).await?;

        ingredient::save_ingredient(
            &db,
            ingredient::IngredientDraft {
                id: Some(a.id),
                name: "A".to_string(),
                cost_price: 4.0,
                current_stock: 1,
                unit: "kg".to_string(),
            },
        )
        .await?;

        let reloaded = get_product(&db, product.product.id).await?.unwrap();
        assert_eq!(reloaded.calculated_cost, 8.0);
        assert_eq!(reloaded.profit_margin, 2.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let a = create_test_ingredient(&db, "A", 2.0).await?;
        save_product(&db, &actor, draft("Uno", 10.0, vec![line(a.id, 1.0)])).await?;
        save_product(&db, &actor, draft("Dos", 1.0, vec![line(a.id, 3.0)])).await?;
        save_product(&db, &actor, draft("Tres", 4.0, vec![])).await?;

        let products = list_products(&db).await?;
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].product.name, "Uno");
        assert_eq!(products[0].calculated_cost, 2.0);
        assert_eq!(products[1].profit_margin, -5.0);
        assert_eq!(products[2].calculated_cost, 0.0);
        assert_eq!(products[2].profit_margin, 4.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let actor = test_actor();
        let a = create_test_ingredient(&db, "A", 2.0).await?;
        let product = save_product(&db, &actor, draft("Uno", 10.0, vec![line(a.id, 1.0)])).await?;

        delete_product(&db, &actor, product.product.id).await?;

        assert!(get_product(&db, product.product.id).await?.is_none());
        assert!(recipe::find_by_product(&db, product.product.id).await?.is_empty());
        assert!(ingredient::get_ingredient_by_id(&db, a.id).await?.is_some());

        let result = delete_product(&db, &actor, product.product.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_costed_product_serializes_camel_case() {
        let costed = CostedProduct::project(
            product::Model {
                id: 1,
                name: "Plato".to_string(),
                description: None,
                price: 3.0,
                stock: 2,
                version: 1,
            },
            vec![],
        );

        let json = serde_json::to_value(&costed).unwrap();
        assert_eq!(json["name"], "Plato");
        assert_eq!(json["calculatedCost"], 0.0);
        assert_eq!(json["profitMargin"], 3.0);
        assert!(json["recipes"].as_array().unwrap().is_empty());
    }
}
