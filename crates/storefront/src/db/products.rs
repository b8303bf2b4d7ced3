//! Product repository: catalog search, curated lists, detail, reviews, tags.
//!
//! List queries share one base select that joins per-product review
//! aggregates; images and tags are batch-loaded afterwards with `ANY($1)`
//! instead of a query per product.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use ivylane_core::{CategoryId, Email, ProductId, TagId};

use super::RepositoryError;
use crate::models::{ProductCard, ProductDetail, ProductImage, Review, Specification, Tag};

/// Fixed catalog page size.
pub const CATALOG_PAGE_SIZE: i64 = 10;

/// Base select for list payloads: product columns plus review aggregates.
const CARD_SELECT: &str = r"
    SELECT p.id, p.category_id, p.price, p.count, p.created_at, p.title,
           p.description, p.full_description, p.free_delivery, p.sales_count,
           COALESCE(r.rating, 0)::float8 AS rating,
           COALESCE(r.reviews_count, 0) AS reviews_count
    FROM storefront.product p
    LEFT JOIN (
        SELECT product_id, AVG(rate)::float8 AS rating, COUNT(*) AS reviews_count
        FROM storefront.review
        GROUP BY product_id
    ) r ON r.product_id = p.id
    WHERE NOT p.is_deleted";

/// Catalog filters, all optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring match on the title.
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Only filters when set; `false` means "don't care", not "paid delivery".
    pub free_delivery: bool,
    /// Restrict to products with stock.
    pub available: bool,
    pub category: Option<CategoryId>,
    /// Products carrying ANY of these tags.
    pub tags: Vec<TagId>,
}

/// Catalog sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogSort {
    /// Review count.
    Reviews,
    /// Sales count ("rating" on the wire, kept for frontend compatibility).
    Rating,
    Price,
    Date,
    /// Stable default when the client sends no sort key.
    #[default]
    Id,
}

/// Sort direction; the wire value `dec` maps to `Desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl CatalogSort {
    /// The ORDER BY clause for this sort key and direction.
    ///
    /// Static strings only; nothing client-controlled is spliced into SQL.
    #[must_use]
    pub const fn order_clause(self, direction: SortDirection) -> &'static str {
        match (self, direction) {
            (Self::Reviews, SortDirection::Asc) => "reviews_count ASC, p.id ASC",
            (Self::Reviews, SortDirection::Desc) => "reviews_count DESC, p.id ASC",
            (Self::Rating, SortDirection::Asc) => "p.sales_count ASC, p.id ASC",
            (Self::Rating, SortDirection::Desc) => "p.sales_count DESC, p.id ASC",
            (Self::Price, SortDirection::Asc) => "p.price ASC, p.id ASC",
            (Self::Price, SortDirection::Desc) => "p.price DESC, p.id ASC",
            (Self::Date, SortDirection::Asc) => "p.created_at ASC, p.id ASC",
            (Self::Date, SortDirection::Desc) => "p.created_at DESC, p.id ASC",
            (Self::Id, SortDirection::Asc) => "p.id ASC",
            (Self::Id, SortDirection::Desc) => "p.id DESC",
        }
    }
}

/// One catalog result page.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<ProductCard>,
    pub current_page: i64,
    pub last_page: i64,
}

/// A new review to attach to a product.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub author: String,
    pub email: Email,
    pub text: String,
    pub rate: i32,
}

/// Base row for list payloads, before images/tags are attached.
#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: ProductId,
    category_id: Option<CategoryId>,
    price: Decimal,
    count: i32,
    created_at: DateTime<Utc>,
    title: String,
    description: Option<String>,
    full_description: Option<String>,
    free_delivery: bool,
    sales_count: i32,
    rating: f64,
    reviews_count: i64,
}

/// Run the catalog search.
///
/// The requested page is clamped into `1..=last_page` so out-of-range pages
/// return the last page instead of an empty list.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn catalog(
    pool: &PgPool,
    filter: &CatalogFilter,
    sort: CatalogSort,
    direction: SortDirection,
    page: i64,
) -> Result<CatalogPage, RepositoryError> {
    let mut count_query =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM storefront.product p WHERE NOT p.is_deleted");
    push_filters(&mut count_query, filter);
    let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

    let last_page = last_page_for(total);
    let current_page = page.clamp(1, last_page);
    let offset = (current_page - 1) * CATALOG_PAGE_SIZE;

    let mut query = QueryBuilder::<Postgres>::new(CARD_SELECT);
    push_filters(&mut query, filter);
    query.push(" ORDER BY ");
    query.push(sort.order_clause(direction));
    query.push(" LIMIT ");
    query.push_bind(CATALOG_PAGE_SIZE);
    query.push(" OFFSET ");
    query.push_bind(offset);

    let rows: Vec<CardRow> = query.build_query_as().fetch_all(pool).await?;
    let items = attach_relations(pool, rows).await?;

    Ok(CatalogPage {
        items,
        current_page,
        last_page,
    })
}

/// Top 8 products by curation index, then sales count.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn popular(pool: &PgPool) -> Result<Vec<ProductCard>, RepositoryError> {
    let sql = format!("{CARD_SELECT} ORDER BY p.sort_index DESC, p.sales_count DESC, p.id ASC LIMIT 8");
    let rows: Vec<CardRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    attach_relations(pool, rows).await
}

/// Up to 16 limited-edition products, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn limited(pool: &PgPool) -> Result<Vec<ProductCard>, RepositoryError> {
    let sql = format!("{CARD_SELECT} AND p.limited_edition ORDER BY p.created_at DESC, p.id ASC LIMIT 16");
    let rows: Vec<CardRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    attach_relations(pool, rows).await
}

/// The 3 newest products, for the home page banners.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn banners(pool: &PgPool) -> Result<Vec<ProductCard>, RepositoryError> {
    let sql = format!("{CARD_SELECT} ORDER BY p.created_at DESC, p.id ASC LIMIT 3");
    let rows: Vec<CardRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    attach_relations(pool, rows).await
}

/// Full detail for one active product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn get_detail(
    pool: &PgPool,
    id: ProductId,
) -> Result<Option<ProductDetail>, RepositoryError> {
    let sql = format!("{CARD_SELECT} AND p.id = $1");
    let row: Option<CardRow> = sqlx::query_as(&sql)
        .bind(id.as_i32())
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut cards = attach_relations(pool, vec![row]).await?;
    let Some(card) = cards.pop() else {
        return Ok(None);
    };

    let reviews = sqlx::query_as::<_, Review>(
        r"
        SELECT author, email, text, rate, created_at AS date
        FROM storefront.review
        WHERE product_id = $1
        ORDER BY created_at, id
        ",
    )
    .bind(id.as_i32())
    .fetch_all(pool)
    .await?;

    let specifications = sqlx::query_as::<_, Specification>(
        r"
        SELECT name, value
        FROM storefront.specification
        WHERE product_id = $1
        ORDER BY id
        ",
    )
    .bind(id.as_i32())
    .fetch_all(pool)
    .await?;

    Ok(Some(ProductDetail {
        card,
        reviews,
        specifications,
    }))
}

/// Attach a review to a product.
///
/// Returns `None` if the product does not exist or is soft-deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn add_review(
    pool: &PgPool,
    product_id: ProductId,
    review: &NewReview,
) -> Result<Option<Review>, RepositoryError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM storefront.product WHERE id = $1 AND NOT is_deleted)",
    )
    .bind(product_id.as_i32())
    .fetch_one(pool)
    .await?;

    if !exists {
        return Ok(None);
    }

    let created = sqlx::query_as::<_, Review>(
        r"
        INSERT INTO storefront.review (product_id, author, email, text, rate)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING author, email, text, rate, created_at AS date
        ",
    )
    .bind(product_id.as_i32())
    .bind(&review.author)
    .bind(review.email.as_str())
    .bind(&review.text)
    .bind(review.rate)
    .fetch_one(pool)
    .await?;

    Ok(Some(created))
}

/// All tags.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_tags(pool: &PgPool) -> Result<Vec<Tag>, RepositoryError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM storefront.tag ORDER BY name, id")
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

/// Cards for a set of product IDs (active products only).
///
/// Used by the basket to render its lines; result order follows `ids`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub(crate) async fn cards_by_ids(
    pool: &PgPool,
    ids: &[i32],
) -> Result<Vec<ProductCard>, RepositoryError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("{CARD_SELECT} AND p.id = ANY($1)");
    let rows: Vec<CardRow> = sqlx::query_as(&sql).bind(ids).fetch_all(pool).await?;
    let mut by_id: HashMap<i32, ProductCard> = attach_relations(pool, rows)
        .await?
        .into_iter()
        .map(|card| (card.id.as_i32(), card))
        .collect();

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Append the filter conditions to a query ending in a WHERE clause.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    if let Some(name) = &filter.name {
        query.push(" AND p.title ILIKE ");
        query.push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(min_price) = filter.min_price {
        query.push(" AND p.price >= ");
        query.push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND p.price <= ");
        query.push_bind(max_price);
    }
    if filter.free_delivery {
        query.push(" AND p.free_delivery");
    }
    if filter.available {
        query.push(" AND p.count > 0");
    }
    if let Some(category) = filter.category {
        query.push(" AND p.category_id = ");
        query.push_bind(category.as_i32());
    }
    if !filter.tags.is_empty() {
        let tag_ids: Vec<i32> = filter.tags.iter().map(|tag| tag.as_i32()).collect();
        query.push(" AND p.id IN (SELECT product_id FROM storefront.product_tag WHERE tag_id = ANY(");
        query.push_bind(tag_ids);
        query.push("))");
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Number of the last page for a total row count (always at least 1).
const fn last_page_for(total: i64) -> i64 {
    let pages = (total + CATALOG_PAGE_SIZE - 1) / CATALOG_PAGE_SIZE;
    if pages < 1 { 1 } else { pages }
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    product_id: i32,
    src: String,
    alt: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    product_id: i32,
    id: TagId,
    name: String,
}

/// Batch-load images and tags for the rows and assemble cards.
async fn attach_relations(
    pool: &PgPool,
    rows: Vec<CardRow>,
) -> Result<Vec<ProductCard>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();

    let image_rows = sqlx::query_as::<_, ImageRow>(
        r"
        SELECT product_id, src, alt
        FROM storefront.product_image
        WHERE product_id = ANY($1)
        ORDER BY product_id, position, id
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let tag_rows = sqlx::query_as::<_, TagRow>(
        r"
        SELECT pt.product_id, t.id, t.name
        FROM storefront.product_tag pt
        JOIN storefront.tag t ON t.id = pt.tag_id
        WHERE pt.product_id = ANY($1)
        ORDER BY pt.product_id, t.name
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut images: HashMap<i32, Vec<ProductImage>> = HashMap::new();
    for row in image_rows {
        images.entry(row.product_id).or_default().push(ProductImage {
            src: row.src,
            alt: row.alt,
        });
    }

    let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags.entry(row.product_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id.as_i32();
            ProductCard {
                id: row.id,
                category_id: row.category_id,
                price: row.price,
                count: row.count,
                created_at: row.created_at,
                title: row.title,
                description: row.description,
                full_description: row.full_description,
                free_delivery: row.free_delivery,
                sales_count: row.sales_count,
                rating: row.rating,
                reviews_count: row.reviews_count,
                images: images.remove(&id).unwrap_or_default(),
                tags: tags.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}
