//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod ingredient;
pub mod product;
pub mod product_recipe;
pub mod user;

// Re-export specific types to avoid conflicts
pub use ingredient::{Column as IngredientColumn, Entity as Ingredient, Model as IngredientModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_recipe::{
    Column as ProductRecipeColumn, Entity as ProductRecipe, Model as ProductRecipeModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
