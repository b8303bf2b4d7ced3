//! Category domain type.

use ivylane_core::CategoryId;

/// A catalog category row.
///
/// Categories form a tree through `parent_id`; soft-deleted rows are
/// excluded by every repository query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display title.
    pub title: String,
    /// Image path under `/media`, if one is set.
    pub image_src: Option<String>,
    /// Image alt text.
    pub image_alt: String,
    /// Parent category, `None` for roots.
    pub parent_id: Option<CategoryId>,
}
