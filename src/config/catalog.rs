//! Seed catalog loading from config.toml
//!
//! The catalog lists the ingredients and products (with their recipes) that an empty database
//! is populated with on first run. Recipe lines refer to ingredients by name; names are
//! resolved against the stored ingredients at seeding time, see [`crate::core::seed`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    /// Ingredients to seed
    #[serde(default)]
    pub ingredients: Vec<IngredientSeed>,
    /// Products to seed, each with its recipe
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// Configuration for a single ingredient
#[derive(Debug, Deserialize, Clone)]
pub struct IngredientSeed {
    /// Name of the ingredient
    pub name: String,
    /// Cost per unit
    pub cost_price: f64,
    /// Units in stock
    pub current_stock: i32,
    /// Unit label (e.g., "kg")
    pub unit: String,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Name of the product
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// List price
    pub price: f64,
    /// Units in stock
    pub stock: i32,
    /// Recipe lines, by ingredient name
    #[serde(default)]
    pub recipes: Vec<RecipeSeed>,
}

/// One recipe line in the seed catalog
#[derive(Debug, Deserialize, Clone)]
pub struct RecipeSeed {
    /// Ingredient name, matched exactly
    pub ingredient: String,
    /// Units of the ingredient per unit of product
    pub quantity: f64,
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading seed catalog from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}
