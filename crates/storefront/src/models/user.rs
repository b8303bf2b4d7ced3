//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ivylane_core::UserId;

/// A storefront user (domain type).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Sign-in name, unique.
    pub username: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The signed-in user as stored in the session.
///
/// Kept deliberately small: handlers that need more re-read from the
/// database so a stale session never serves stale profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
