//! Product recipe entity - The join between a product and the ingredients it consumes.
//!
//! Each row says "one unit of `product_id` needs `quantity` units of `ingredient_id`".
//! Rows have no lifecycle of their own; they are written only by a product's recipe
//! replacement and removed by cascade when the product goes away.
//!
//! `ingredient_id` is required on write (the foreign key rejects unknown ingredients) but is
//! nullable in storage so that deleting an ingredient leaves an orphaned line instead of
//! failing. Orphaned lines cost nothing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_recipes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_id: i64,
    /// Consumed ingredient, `None` once that ingredient has been deleted
    pub ingredient_id: Option<i64>,
    /// Units of the ingredient per unit of product
    pub quantity: f64,
}

/// Defines relationships between recipe line items and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one product and dies with it
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each line item points at one ingredient; the link is cleared if the ingredient is deleted
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "SetNull"
    )]
    Ingredient,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
