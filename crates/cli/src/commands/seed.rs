//! Catalog seeding from a YAML fixture.
//!
//! # Usage
//!
//! ```bash
//! ivy-cli seed -f fixtures/demo.yaml
//! ```
//!
//! Categories resolve parents by title, so parents must appear before their
//! children in the fixture. Tags are created on demand; re-running a seed
//! against a populated database duplicates products, so seed empty stores.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use super::{CommandError, connect};

/// Top-level fixture structure.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub sales: Vec<SeedSale>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub title: String,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub count: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub free_delivery: bool,
    #[serde(default)]
    pub limited_edition: bool,
    #[serde(default)]
    pub sort_index: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<SeedImage>,
    #[serde(default)]
    pub specifications: Vec<SeedSpecification>,
}

#[derive(Debug, Deserialize)]
pub struct SeedImage {
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedSpecification {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedSale {
    pub title: String,
    pub price: Decimal,
    pub sale_price: Decimal,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub images: Vec<SeedImage>,
}

/// Seed the catalog from a fixture file.
///
/// # Errors
///
/// Returns `CommandError` if the fixture is unreadable or a query fails.
pub async fn run(file: &str) -> Result<(), CommandError> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| CommandError::Fixture(format!("cannot read {file}: {e}")))?;
    let data: SeedData = serde_yaml::from_str(&raw)
        .map_err(|e| CommandError::Fixture(format!("cannot parse {file}: {e}")))?;

    let pool = connect().await?;

    let categories = seed_categories(&pool, &data.categories).await?;
    let products = seed_products(&pool, &data.products, &categories).await?;
    let sales = seed_sales(&pool, &data.sales).await?;

    tracing::info!(
        "seeded {} categories, {products} products, {sales} sales",
        categories.len()
    );

    Ok(())
}

/// Insert categories, returning title -> id for product resolution.
async fn seed_categories(
    pool: &PgPool,
    categories: &[SeedCategory],
) -> Result<HashMap<String, i32>, CommandError> {
    let mut ids: HashMap<String, i32> = HashMap::new();

    for category in categories {
        let parent_id = match &category.parent {
            Some(parent) => match ids.get(parent) {
                Some(id) => Some(*id),
                None => {
                    return Err(CommandError::Fixture(format!(
                        "category '{}' references unknown parent '{parent}' \
                         (parents must appear first)",
                        category.title
                    )));
                }
            },
            None => None,
        };

        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.category (title, image_src, parent_id)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&category.title)
        .bind(&category.image_src)
        .bind(parent_id)
        .fetch_one(pool)
        .await?;

        ids.insert(category.title.clone(), id);
    }

    Ok(ids)
}

async fn seed_products(
    pool: &PgPool,
    products: &[SeedProduct],
    categories: &HashMap<String, i32>,
) -> Result<usize, CommandError> {
    for product in products {
        let category_id = match &product.category {
            Some(title) => match categories.get(title) {
                Some(id) => Some(*id),
                None => {
                    return Err(CommandError::Fixture(format!(
                        "product '{}' references unknown category '{title}'",
                        product.title
                    )));
                }
            },
            None => None,
        };

        let product_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.product
                (title, price, count, category_id, description, full_description,
                 free_delivery, limited_edition, sort_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(product.price)
        .bind(product.count)
        .bind(category_id)
        .bind(&product.description)
        .bind(&product.full_description)
        .bind(product.free_delivery)
        .bind(product.limited_edition)
        .bind(product.sort_index)
        .fetch_one(pool)
        .await?;

        for tag in &product.tags {
            let tag_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO storefront.tag (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                ",
            )
            .bind(tag)
            .fetch_one(pool)
            .await?;

            sqlx::query(
                r"
                INSERT INTO storefront.product_tag (product_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(product_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
        }

        for (position, image) in product.images.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO storefront.product_image (product_id, src, alt, position)
                VALUES ($1, $2, COALESCE($3, 'Product image'), $4)
                ",
            )
            .bind(product_id)
            .bind(&image.src)
            .bind(&image.alt)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(pool)
            .await?;
        }

        for specification in &product.specifications {
            sqlx::query(
                r"
                INSERT INTO storefront.specification (product_id, name, value)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(product_id)
            .bind(&specification.name)
            .bind(&specification.value)
            .execute(pool)
            .await?;
        }
    }

    Ok(products.len())
}

async fn seed_sales(pool: &PgPool, sales: &[SeedSale]) -> Result<usize, CommandError> {
    for sale in sales {
        let sale_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO storefront.sale (title, price, sale_price, date_from, date_to)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&sale.title)
        .bind(sale.price)
        .bind(sale.sale_price)
        .bind(sale.date_from)
        .bind(sale.date_to)
        .fetch_one(pool)
        .await?;

        for image in &sale.images {
            sqlx::query(
                r"
                INSERT INTO storefront.sale_image (sale_id, src, alt)
                VALUES ($1, $2, COALESCE($3, 'Sale image'))
                ",
            )
            .bind(sale_id)
            .bind(&image.src)
            .bind(&image.alt)
            .execute(pool)
            .await?;
        }
    }

    Ok(sales.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixture() {
        let yaml = r#"
categories:
  - title: Furniture
  - title: Chairs
    parent: Furniture
products:
  - title: Oak chair
    price: "129.50"
    count: 12
    category: Chairs
    free_delivery: true
    tags: [wood, oak]
    images:
      - src: /media/products/oak-chair.jpg
    specifications:
      - name: Material
        value: Oak
sales:
  - title: Summer clearance
    price: "129.50"
    sale_price: "99.00"
    date_from: 2026-06-01
    date_to: 2026-06-30
"#;

        let data: SeedData = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(data.categories.len(), 2);
        assert_eq!(data.categories.get(1).unwrap().parent.as_deref(), Some("Furniture"));
        let product = data.products.first().unwrap();
        assert_eq!(product.price, Decimal::new(12950, 2));
        assert_eq!(product.tags, vec!["wood", "oak"]);
        assert_eq!(data.sales.first().unwrap().sale_price, Decimal::new(9900, 2));
    }

    #[test]
    fn test_parse_minimal_product() {
        let yaml = r#"
products:
  - title: Bare product
    price: "10.00"
"#;
        let data: SeedData = serde_yaml::from_str(yaml).unwrap();
        let product = data.products.first().unwrap();
        assert_eq!(product.count, 0);
        assert!(!product.free_delivery);
        assert!(product.tags.is_empty());
    }
}
