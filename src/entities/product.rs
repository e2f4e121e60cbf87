//! Product entity - Represents sellable items composed from ingredients.
//!
//! A product owns its recipe line items: deleting the product deletes them, and saving a
//! product replaces them wholesale. Cost and margin are never stored here; see
//! [`crate::core::cost`] for how they are derived on every read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Tortilla de Patatas")
    pub name: String,
    /// Optional free-text description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// List price per unit
    pub price: f64,
    /// Units currently in stock
    pub stock: i32,
    /// Optimistic concurrency counter, bumped on every save
    pub version: i32,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many recipe line items
    #[sea_orm(has_many = "super::product_recipe::Entity")]
    ProductRecipes,
}

impl Related<super::product_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
