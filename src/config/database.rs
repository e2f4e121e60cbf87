//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so foreign keys (including the cascade from products to their recipe lines and the
//! set-null from ingredients) come straight from the `Relation` attributes.

use crate::entities::{Ingredient, Product, ProductRecipe, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default database location used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/recipe_costing.sqlite?mode=rwc";

/// Creates the directory holding a file-backed `SQLite` database, if any.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url`.
///
/// For `SQLite` the connection also switches foreign-key enforcement on, which the recipe
/// tables rely on to reject unknown ingredients and to cascade product deletes.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Opening database connection");
    ensure_sqlite_dir(database_url)?;
    let db = Database::connect(database_url).await?;

    if db.get_database_backend() == DatabaseBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    info!("Database connection opened");
    Ok(db)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Parent tables are created before `product_recipes` so its foreign keys resolve. Existing
/// tables are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = [
        schema.create_table_from_entity(Ingredient),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(ProductRecipe),
        schema.create_table_from_entity(User),
    ];

    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    debug!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{IngredientModel, ProductModel, ProductRecipeModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<IngredientModel> = Ingredient::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<ProductRecipeModel> = ProductRecipe::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
