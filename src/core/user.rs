//! User business logic - registration, sign-in and self-service profile management.
//!
//! Users only ever act on their own record; there is no admin surface for managing other
//! accounts. Passwords are stored as Argon2 hashes and never leave this module in any other
//! form.

use crate::{
    auth::password,
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Role given to every self-registered account
pub const DEFAULT_ROLE: &str = "ROLE_USER";

const MIN_PASSWORD_LEN: usize = 6;

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    /// Login name, unique
    pub username: String,
    /// Contact email, unique
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Profile fields a user may change. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// New email; must not belong to another user
    pub email: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New self-description
    pub bio: Option<String>,
    /// New avatar URL or data URI
    pub profile_picture: Option<String>,
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(Error::Validation {
            message: format!("Invalid email address: {email}"),
        })
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation {
            message: format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        });
    }
    Ok(())
}

async fn email_taken<C>(db: &C, email: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = User::find()
        .filter(user::Column::Email.eq(email))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Creates a new account with the default role.
///
/// # Errors
/// Returns `Error::Validation` for a blank username, malformed email or short password, and
/// `Error::Conflict` when the username or email is already registered.
#[instrument(skip(db, registration), fields(username = %registration.username))]
pub async fn register(db: &DatabaseConnection, registration: Registration) -> Result<user::Model> {
    let username = registration.username.trim().to_string();
    let email = registration.email.trim().to_string();
    if username.is_empty() {
        return Err(Error::Validation {
            message: "Username cannot be empty".to_string(),
        });
    }
    validate_email(&email)?;
    validate_password(&registration.password)?;

    let txn = db.begin().await?;

    if find_by_username(&txn, &username).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Username '{username}' is already taken"),
        });
    }
    if email_taken(&txn, &email).await? {
        return Err(Error::Conflict {
            message: format!("Email '{email}' is already registered"),
        });
    }

    let created = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(password::hash_password(&registration.password)?),
        role: Set(DEFAULT_ROLE.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(user_id = created.id, "Registered user");
    Ok(created)
}

/// Checks a username and password pair.
///
/// Unknown users and wrong passwords fail identically.
pub async fn authenticate(db: &DatabaseConnection, username: &str, password: &str) -> Result<user::Model> {
    let rejected = || Error::Unauthorized {
        message: "Invalid username or password".to_string(),
    };

    let Some(found) = find_by_username(db, username.trim()).await? else {
        warn!(username, "Login attempt for unknown user");
        return Err(rejected());
    };

    if !password::verify_password(password, &found.password_hash)? {
        warn!(user_id = found.id, "Login attempt with wrong password");
        return Err(rejected());
    }

    Ok(found)
}

/// Looks a user up by login name.
pub async fn find_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks a user up by id.
pub async fn find_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Applies the supplied profile fields to a user.
///
/// # Errors
/// Returns `Error::UserNotFound` for an unknown id and `Error::Conflict` when the new email
/// belongs to somebody else.
#[instrument(skip(db, patch))]
pub async fn update_profile(db: &DatabaseConnection, user_id: i64, patch: ProfilePatch) -> Result<user::Model> {
    let txn = db.begin().await?;

    let existing = find_by_id(&txn, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let email = patch.email.map(|e| e.trim().to_string());
    if let Some(email) = &email {
        validate_email(email)?;
        if *email != existing.email && email_taken(&txn, email).await? {
            return Err(Error::Conflict {
                message: format!("Email '{email}' is already in use"),
            });
        }
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(first_name) = patch.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = patch.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(phone) = patch.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(bio) = patch.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(profile_picture) = patch.profile_picture {
        active.profile_picture = Set(Some(profile_picture));
    }

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    info!(user_id, "Updated user profile");
    Ok(updated)
}

/// Replaces a user's password after checking the current one.
///
/// # Errors
/// Returns `Error::Unauthorized` if `current` does not match and `Error::Validation` if the new
/// password is too short.
#[instrument(skip(db, current, new))]
pub async fn change_password(db: &DatabaseConnection, user_id: i64, current: &str, new: &str) -> Result<()> {
    validate_password(new)?;

    let existing = find_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    if !password::verify_password(current, &existing.password_hash)? {
        warn!(user_id, "Password change with wrong current password");
        return Err(Error::Unauthorized {
            message: "Current password is incorrect".to_string(),
        });
    }

    let mut active: user::ActiveModel = existing.into();
    active.password_hash = Set(password::hash_password(new)?);
    active.update(db).await?;

    info!(user_id, "Changed password");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_register_and_authenticate() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_user(&db, "chef").await?;
        assert_eq!(created.role, DEFAULT_ROLE);
        assert_ne!(created.password_hash, TEST_PASSWORD);

        let signed_in = authenticate(&db, "chef", TEST_PASSWORD).await?;
        assert_eq!(signed_in.id, created.id);

        let wrong = authenticate(&db, "chef", "nope-nope").await;
        let unknown = authenticate(&db, "ghost", TEST_PASSWORD).await;
        assert_eq!(
            wrong.unwrap_err().to_string(),
            unknown.unwrap_err().to_string()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "chef").await?;

        let same_name = register(
            &db,
            Registration {
                username: "chef".to_string(),
                email: "other@example.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await;
        assert!(matches!(same_name.unwrap_err(), Error::Conflict { .. }));

        let same_email = register(
            &db,
            Registration {
                username: "other".to_string(),
                email: "chef@example.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await;
        assert!(matches!(same_email.unwrap_err(), Error::Conflict { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let bad_email = register(
            &db,
            Registration {
                username: "chef".to_string(),
                email: "not-an-email".to_string(),
                password: TEST_PASSWORD.to_string(),
            },
        )
        .await;
        assert!(matches!(bad_email.unwrap_err(), Error::Validation { .. }));

        let short = register(
            &db,
            Registration {
                username: "chef".to_string(),
                email: "chef@example.com".to_string(),
                password: "123".to_string(),
            },
        )
        .await;
        assert!(matches!(short.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_only_changes_supplied_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_user(&db, "chef").await?;

        update_profile(
            &db,
            created.id,
            ProfilePatch {
                first_name: Some("Paloma".to_string()),
                phone: Some("600000000".to_string()),
                ..Default::default()
            },
        )
        .await?;
        let updated = update_profile(
            &db,
            created.id,
            ProfilePatch {
                bio: Some("Cocina casera".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.first_name.as_deref(), Some("Paloma"));
        assert_eq!(updated.phone.as_deref(), Some("600000000"));
        assert_eq!(updated.bio.as_deref(), Some("Cocina casera"));
        assert_eq!(updated.email, created.email);
        assert!(updated.last_name.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_email_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let chef = create_test_user(&db, "chef").await?;
        create_test_user(&db, "baker").await?;

        let taken = update_profile(
            &db,
            chef.id,
            ProfilePatch {
                email: Some("baker@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(taken.unwrap_err(), Error::Conflict { .. }));

        // Re-submitting one's own email is fine
        let same = update_profile(
            &db,
            chef.id,
            ProfilePatch {
                email: Some(chef.email.clone()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(same.email, chef.email);

        let missing = update_profile(&db, 999, ProfilePatch::default()).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::UserNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_change_password() -> Result<()> {
        let db = setup_test_db().await?;
        let chef = create_test_user(&db, "chef").await?;

        let wrong = change_password(&db, chef.id, "not-it", "brand-new-pass").await;
        assert!(matches!(wrong.unwrap_err(), Error::Unauthorized { .. }));

        change_password(&db, chef.id, TEST_PASSWORD, "brand-new-pass").await?;
        assert!(authenticate(&db, "chef", TEST_PASSWORD).await.is_err());
        authenticate(&db, "chef", "brand-new-pass").await?;
        Ok(())
    }
}
