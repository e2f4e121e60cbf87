//! Catalog seeding - populates empty tables from the catalog in `config.toml`.
//!
//! Each table is seeded only when it is empty, so running this against a database that
//! already has data is a no-op. Product recipes name their ingredients; a name that matches no
//! stored ingredient drops that line and logs a warning rather than failing the seed.
//!
//! Catalog entries go through the same validation as API input. One invalid entry fails the
//! whole seed and nothing is written.

use crate::{
    config::catalog::{Catalog, ProductSeed},
    core::{
        ingredient::{self, IngredientDraft},
        product::ProductDraft,
        recipe::{self, RecipeLine},
    },
    entities::{Ingredient, Product, product},
    errors::Result,
};
use sea_orm::{DatabaseTransaction, PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// What a seeding run inserted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// Ingredients inserted
    pub ingredients: usize,
    /// Products inserted
    pub products: usize,
    /// Recipe lines inserted
    pub recipe_lines: usize,
    /// Recipe lines dropped because their ingredient name was unknown
    pub skipped_lines: usize,
}

impl SeedReport {
    /// Whether anything at all was inserted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ingredients == 0 && self.products == 0
    }
}

/// Seeds empty ingredient and product tables from `catalog`, all in one transaction.
#[instrument(skip_all)]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &Catalog) -> Result<SeedReport> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    if Ingredient::find().count(&txn).await? == 0 {
        for seed in &catalog.ingredients {
            let draft = IngredientDraft {
                id: None,
                name: seed.name.clone(),
                cost_price: seed.cost_price,
                current_stock: seed.current_stock,
                unit: seed.unit.clone(),
            };
            ingredient::save_ingredient(&txn, draft).await?;
            report.ingredients += 1;
        }
    }

    if Product::find().count(&txn).await? == 0 {
        // First match wins when names repeat
        let mut by_name: HashMap<String, i64> = HashMap::new();
        for stored in Ingredient::find().all(&txn).await? {
            by_name.entry(stored.name).or_insert(stored.id);
        }

        for seed in &catalog.products {
            seed_product(&txn, seed, &by_name, &mut report).await?;
        }
    }

    txn.commit().await?;

    if report.is_empty() {
        info!("Catalog already present, nothing seeded");
    } else {
        info!(
            ingredients = report.ingredients,
            products = report.products,
            recipe_lines = report.recipe_lines,
            skipped_lines = report.skipped_lines,
            "Seeded catalog"
        );
    }
    Ok(report)
}

async fn seed_product(
    txn: &DatabaseTransaction,
    seed: &ProductSeed,
    by_name: &HashMap<String, i64>,
    report: &mut SeedReport,
) -> Result<()> {
    let mut lines = Vec::with_capacity(seed.recipes.len());
    for line in &seed.recipes {
        match by_name.get(&line.ingredient) {
            Some(&ingredient_id) => lines.push(RecipeLine {
                ingredient_id,
                quantity: line.quantity,
            }),
            None => {
                warn!(
                    product = %seed.name,
                    ingredient = %line.ingredient,
                    "Unknown ingredient in seed recipe, skipping line"
                );
                report.skipped_lines += 1;
            }
        }
    }

    let draft = ProductDraft {
        id: None,
        name: seed.name.clone(),
        description: seed.description.clone(),
        price: seed.price,
        stock: seed.stock,
        version: None,
        recipes: lines,
    };
    draft.validate()?;

    let saved = product::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        description: Set(draft.description.clone()),
        price: Set(draft.price),
        stock: Set(draft.stock),
        version: Set(1),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    report.recipe_lines += recipe::save_all(txn, saved.id, &draft.recipes).await?.len();
    report.products += 1;
    Ok(())
}
