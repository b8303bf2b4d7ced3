//! Profile repository.

use sqlx::PgPool;

use ivylane_core::UserId;

use super::RepositoryError;
use crate::models::Profile;

const PROFILE_SELECT: &str = r"
    SELECT id, user_id, full_name, email, phone, avatar_src, avatar_alt
    FROM storefront.profile";

/// Fetch a user's profile.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_user(pool: &PgPool, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
    let sql = format!("{PROFILE_SELECT} WHERE user_id = $1");
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id.as_i32())
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}

/// Create or update a user's contact fields.
///
/// Sign-up creates the profile row, but users created out-of-band (seeding,
/// older data) may not have one, so this upserts.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn upsert_contact(
    pool: &PgPool,
    user_id: UserId,
    full_name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Profile, RepositoryError> {
    let profile = sqlx::query_as::<_, Profile>(
        r"
        INSERT INTO storefront.profile (user_id, full_name, email, phone)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id)
        DO UPDATE SET full_name = EXCLUDED.full_name,
                      email = EXCLUDED.email,
                      phone = EXCLUDED.phone
        RETURNING id, user_id, full_name, email, phone, avatar_src, avatar_alt
        ",
    )
    .bind(user_id.as_i32())
    .bind(full_name)
    .bind(email)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    Ok(profile)
}

/// Point a user's avatar at a new uploaded file.
///
/// Returns the previous `avatar_src` so the caller can delete the old file.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user has no profile row.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn set_avatar(
    pool: &PgPool,
    user_id: UserId,
    src: &str,
    alt: &str,
) -> Result<Option<String>, RepositoryError> {
    // Self-join so RETURNING can hand back the pre-update avatar_src
    let previous: Option<Option<String>> = sqlx::query_scalar(
        r"
        UPDATE storefront.profile p
        SET avatar_src = $2, avatar_alt = $3
        FROM storefront.profile old
        WHERE p.user_id = $1 AND old.id = p.id
        RETURNING old.avatar_src
        ",
    )
    .bind(user_id.as_i32())
    .bind(src)
    .bind(alt)
    .fetch_optional(pool)
    .await?;

    match previous {
        Some(previous) => Ok(previous),
        None => Err(RepositoryError::NotFound),
    }
}
