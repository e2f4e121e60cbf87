//! Ingredient entity - Raw inputs with a unit cost and a stock count.
//!
//! Ingredients are shared leaf data: any number of recipe line items, across any number of
//! products, may point at the same ingredient. Deleting an ingredient never cascades into
//! recipes; the referencing line items keep existing with their ingredient link cleared.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Huevos"); duplicates are allowed
    pub name: String,
    /// Cost of one `unit` of this ingredient
    pub cost_price: f64,
    /// Units currently in stock
    pub current_stock: i32,
    /// Free-text unit label (e.g., "kg", "L", "unidad")
    pub unit: String,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One ingredient is used by many recipe line items
    #[sea_orm(has_many = "super::product_recipe::Entity")]
    ProductRecipes,
}

impl Related<super::product_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
