//! Core business logic - framework-agnostic ingredient, recipe, product and user operations.
//!
//! Everything in here talks to the database through `SeaORM` and knows nothing about HTTP.
//! Operations that change data on behalf of somebody take an explicit [`Actor`] rather than
//! looking the caller up from ambient state.

/// Pure recipe cost and margin calculation
pub mod cost;
/// Ingredient store
pub mod ingredient;
/// Product store and the save-and-recalculate orchestrator
pub mod product;
/// Recipe line item store
pub mod recipe;
/// Catalog seeding for empty databases
pub mod seed;
/// User accounts and profiles
pub mod user;

/// The authenticated caller an operation runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// User id from the token subject
    pub user_id: i64,
    /// Username, used for audit logging
    pub username: String,
}

impl Actor {
    /// Identity used for work the server does on its own account (start-up seeding).
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: 0,
            username: "system".to_string(),
        }
    }
}
