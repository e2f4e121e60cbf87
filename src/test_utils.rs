//! Shared test utilities for the recipe costing backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        Actor,
        ingredient::{self, IngredientDraft},
        user::{self, Registration},
    },
    entities,
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Password used by every account created through [`create_test_user`]
pub const TEST_PASSWORD: &str = "correct-horse";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Actor used for writes in tests
pub fn test_actor() -> Actor {
    Actor {
        user_id: 1,
        username: "tester".to_string(),
    }
}

/// Creates a test ingredient with sensible defaults.
///
/// # Defaults
/// * `current_stock`: 10
/// * `unit`: "kg"
pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    name: &str,
    cost_price: f64,
) -> Result<entities::ingredient::Model> {
    ingredient::save_ingredient(
        db,
        IngredientDraft {
            id: None,
            name: name.to_string(),
            cost_price,
            current_stock: 10,
            unit: "kg".to_string(),
        },
    )
    .await
}

/// Inserts a product row directly, without going through the orchestrator.
/// Use this for recipe-store tests that need an owning product and nothing else.
pub async fn create_bare_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::product::Model> {
    let product = entities::product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        stock: Set(0),
        version: Set(1),
        ..Default::default()
    };
    Ok(product.insert(db).await?)
}

/// Sets up a test database with one bare product.
/// Returns (db, product) for recipe-related tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, entities::product::Model)> {
    let db = setup_test_db().await?;
    let product = create_bare_product(&db, "Test Product", 10.0).await?;
    Ok((db, product))
}

/// Registers a user named `username` with email `{username}@example.com` and [`TEST_PASSWORD`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::register(
        db,
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
}
