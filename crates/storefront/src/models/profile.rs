//! Profile domain type.

use ivylane_core::{ProfileId, UserId};

/// A user profile row (one-to-one with `user`).
///
/// The avatar is stored inline; `avatar_src` is a path under `/media`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_src: Option<String>,
    pub avatar_alt: String,
}
