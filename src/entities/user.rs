//! User entity - Accounts that can sign in and manage their own profile.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Contact email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Contact phone number, free-form
    pub phone: Option<String>,
    /// Short self-description
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    /// Avatar, stored as a URL or data URI
    #[sea_orm(column_type = "Text", nullable)]
    pub profile_picture: Option<String>,
    /// Role name (e.g., `"ROLE_USER"`)
    pub role: String,
    /// When the account was registered
    pub created_at: DateTime,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
