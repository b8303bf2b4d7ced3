//! Category repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Category;

/// List all active (not soft-deleted) categories, roots and children alike.
///
/// Tree assembly happens in the route layer; this returns flat rows ordered
/// by title so siblings come back in a stable order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
    let categories = sqlx::query_as::<_, Category>(
        r"
        SELECT id, title, image_src, image_alt, parent_id
        FROM storefront.category
        WHERE NOT is_deleted
        ORDER BY title, id
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}
