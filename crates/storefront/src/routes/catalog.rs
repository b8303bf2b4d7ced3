//! Catalog route handlers: categories, search, curated lists, tags.

use std::sync::Arc;

use axum::{
    Json,
    extract::{RawQuery, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use ivylane_core::{CategoryId, ProductId, TagId};

use crate::db::products::{CatalogFilter, CatalogSort, SortDirection};
use crate::db::{categories, products};
use crate::error::{AppError, Result};
use crate::models::{Category, ProductCard, ProductImage, Tag};
use crate::state::{AppState, CatalogCacheKey};

// =============================================================================
// Payload Types
// =============================================================================

/// Category image payload.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryImage {
    pub src: Option<String>,
    pub alt: String,
}

/// One node of the nested category tree.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub title: String,
    pub image: CategoryImage,
    pub subcategories: Vec<CategoryNode>,
}

/// A product in a list payload (catalog, popular, limited, banners, basket).
///
/// `reviews` is the review count; the full review list only appears on the
/// product detail payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ProductId,
    pub category: Option<CategoryId>,
    pub price: Decimal,
    pub count: i32,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub free_delivery: bool,
    pub images: Vec<ProductImage>,
    pub tags: Vec<Tag>,
    pub reviews: i64,
    pub rating: f64,
}

impl From<ProductCard> for CatalogItem {
    fn from(card: ProductCard) -> Self {
        Self {
            id: card.id,
            category: card.category_id,
            price: card.price,
            count: card.count,
            date: card.created_at,
            title: card.title,
            description: card.description,
            full_description: card.full_description,
            free_delivery: card.free_delivery,
            images: card.images,
            tags: card.tags,
            reviews: card.reviews_count,
            rating: card.rating,
        }
    }
}

/// Catalog search response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub current_page: i64,
    pub last_page: i64,
}

// =============================================================================
// Query Parsing
// =============================================================================

/// Parsed catalog query string.
///
/// The frontend sends bracketed keys (`filter[name]`, `tags[]`) that
/// `serde_urlencoded` cannot map onto a struct, so the raw query string is
/// parsed by hand with `form_urlencoded`.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub sort: CatalogSort,
    pub direction: SortDirection,
    pub page: i64,
}

impl CatalogQuery {
    /// Parse a raw query string. Unknown keys and unparsable values are
    /// ignored; the page defaults to 1.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self {
            page: 1,
            ..Self::default()
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "filter[name]" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        parsed.filter.name = Some(trimmed.to_owned());
                    }
                }
                "filter[minPrice]" => {
                    parsed.filter.min_price = value.parse::<Decimal>().ok();
                }
                "filter[maxPrice]" => {
                    parsed.filter.max_price = value.parse::<Decimal>().ok();
                }
                "filter[freeDelivery]" => {
                    parsed.filter.free_delivery = value == "true";
                }
                "filter[available]" => {
                    parsed.filter.available = value == "true";
                }
                "category" => {
                    parsed.filter.category = value.parse::<i32>().ok().map(CategoryId::new);
                }
                "tags[]" | "tags" => {
                    if let Ok(id) = value.parse::<i32>() {
                        parsed.filter.tags.push(TagId::new(id));
                    }
                }
                "sort" => {
                    parsed.sort = match value.as_ref() {
                        "reviews" => CatalogSort::Reviews,
                        "rating" => CatalogSort::Rating,
                        "price" => CatalogSort::Price,
                        "date" => CatalogSort::Date,
                        _ => CatalogSort::Id,
                    };
                }
                "sortType" => {
                    parsed.direction = if value == "dec" {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    };
                }
                "page" => {
                    parsed.page = value.parse::<i64>().ok().filter(|p| *p >= 1).unwrap_or(1);
                }
                _ => {}
            }
        }

        parsed
    }
}

// =============================================================================
// Tree Assembly
// =============================================================================

/// Assemble the nested category tree from flat rows.
///
/// Rows keep their incoming (title) order among siblings. Rows whose parent
/// is missing from the set (soft-deleted) are dropped rather than promoted
/// to roots.
#[must_use]
pub fn build_tree(rows: Vec<Category>) -> Vec<CategoryNode> {
    let mut children: std::collections::HashMap<Option<i32>, Vec<Category>> =
        std::collections::HashMap::new();
    for row in rows {
        children
            .entry(row.parent_id.map(|id| id.as_i32()))
            .or_default()
            .push(row);
    }

    fn build(
        parent: Option<i32>,
        children: &mut std::collections::HashMap<Option<i32>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let Some(rows) = children.remove(&parent) else {
            return Vec::new();
        };
        rows.into_iter()
            .map(|row| {
                let id = row.id;
                CategoryNode {
                    id,
                    title: row.title,
                    image: CategoryImage {
                        src: row.image_src,
                        alt: row.image_alt,
                    },
                    subcategories: build(Some(id.as_i32()), children),
                }
            })
            .collect()
    }

    build(None, &mut children)
}

// =============================================================================
// Handlers
// =============================================================================

/// List root categories with their nested subcategories.
///
/// The tree is read-mostly, so the serialized payload is cached briefly.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    if let Some(cached) = state.catalog_cache().get(&CatalogCacheKey::CategoryTree).await {
        return Ok(Json((*cached).clone()));
    }

    let rows = categories::list_active(state.pool()).await?;
    let tree = build_tree(rows);
    let payload = serde_json::to_value(&tree)
        .map_err(|e| AppError::Internal(format!("serialize category tree: {e}")))?;

    state
        .catalog_cache()
        .insert(CatalogCacheKey::CategoryTree, Arc::new(payload.clone()))
        .await;

    Ok(Json(payload))
}

/// Catalog search with filters, sorting, and pagination.
#[instrument(skip(state))]
pub async fn catalog(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<CatalogPage>> {
    let query = CatalogQuery::parse(query.as_deref().unwrap_or(""));

    let page = products::catalog(
        state.pool(),
        &query.filter,
        query.sort,
        query.direction,
        query.page,
    )
    .await?;

    Ok(Json(CatalogPage {
        items: page.items.into_iter().map(CatalogItem::from).collect(),
        current_page: page.current_page,
        last_page: page.last_page,
    }))
}

/// Top products by curation index and sales count.
#[instrument(skip(state))]
pub async fn popular(State(state): State<AppState>) -> Result<Json<Vec<CatalogItem>>> {
    let cards = products::popular(state.pool()).await?;
    Ok(Json(cards.into_iter().map(CatalogItem::from).collect()))
}

/// Limited-edition products.
#[instrument(skip(state))]
pub async fn limited(State(state): State<AppState>) -> Result<Json<Vec<CatalogItem>>> {
    let cards = products::limited(state.pool()).await?;
    Ok(Json(cards.into_iter().map(CatalogItem::from).collect()))
}

/// Newest products for the home page banners (cached briefly).
#[instrument(skip(state))]
pub async fn banners(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    if let Some(cached) = state.catalog_cache().get(&CatalogCacheKey::Banners).await {
        return Ok(Json((*cached).clone()));
    }

    let cards = products::banners(state.pool()).await?;
    let items: Vec<CatalogItem> = cards.into_iter().map(CatalogItem::from).collect();
    let payload = serde_json::to_value(&items)
        .map_err(|e| AppError::Internal(format!("serialize banners: {e}")))?;

    state
        .catalog_cache()
        .insert(CatalogCacheKey::Banners, Arc::new(payload.clone()))
        .await;

    Ok(Json(payload))
}

/// All tags.
#[instrument(skip(state))]
pub async fn tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    let tags = products::list_tags(state.pool()).await?;
    Ok(Json(tags))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let query = CatalogQuery::parse(
            "filter%5Bname%5D=sofa&filter%5BminPrice%5D=100&filter%5BmaxPrice%5D=5000\
             &filter%5BfreeDelivery%5D=true&filter%5Bavailable%5D=true\
             &category=3&tags%5B%5D=1&tags%5B%5D=2&sort=price&sortType=dec&page=4",
        );

        assert_eq!(query.filter.name.as_deref(), Some("sofa"));
        assert_eq!(query.filter.min_price, Some(Decimal::from(100)));
        assert_eq!(query.filter.max_price, Some(Decimal::from(5000)));
        assert!(query.filter.free_delivery);
        assert!(query.filter.available);
        assert_eq!(query.filter.category, Some(CategoryId::new(3)));
        assert_eq!(query.filter.tags, vec![TagId::new(1), TagId::new(2)]);
        assert_eq!(query.sort, CatalogSort::Price);
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.page, 4);
    }

    #[test]
    fn test_parse_defaults() {
        let query = CatalogQuery::parse("");
        assert_eq!(query.page, 1);
        assert_eq!(query.sort, CatalogSort::Id);
        assert_eq!(query.direction, SortDirection::Asc);
        assert!(query.filter.name.is_none());
        assert!(!query.filter.free_delivery);
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let query = CatalogQuery::parse("page=abc&filter%5BminPrice%5D=cheap&category=x&sort=bogus");
        assert_eq!(query.page, 1);
        assert!(query.filter.min_price.is_none());
        assert!(query.filter.category.is_none());
        assert_eq!(query.sort, CatalogSort::Id);
    }

    #[test]
    fn test_parse_blank_name_is_no_filter() {
        let query = CatalogQuery::parse("filter%5Bname%5D=%20%20");
        assert!(query.filter.name.is_none());
    }

    fn category(id: i32, title: &str, parent: Option<i32>) -> Category {
        Category {
            id: CategoryId::new(id),
            title: title.to_string(),
            image_src: None,
            image_alt: "Category image".to_string(),
            parent_id: parent.map(CategoryId::new),
        }
    }

    #[test]
    fn test_build_tree_nests_children() {
        let rows = vec![
            category(1, "Furniture", None),
            category(2, "Chairs", Some(1)),
            category(3, "Tables", Some(1)),
            category(4, "Lighting", None),
        ];

        let tree = build_tree(rows);
        assert_eq!(tree.len(), 2);

        let furniture = tree.iter().find(|n| n.title == "Furniture").unwrap();
        assert_eq!(furniture.subcategories.len(), 2);
        let lighting = tree.iter().find(|n| n.title == "Lighting").unwrap();
        assert!(lighting.subcategories.is_empty());
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        // Parent 9 is not in the set (soft-deleted): child must not surface
        let rows = vec![category(1, "Roots", None), category(2, "Orphan", Some(9))];
        let tree = build_tree(rows);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.first().unwrap().title, "Roots");
    }
}
