//! CSV export command.
//!
//! Soft-deleted rows are included so exports can audit what the
//! storefront hides.

use std::io::Write;

use sqlx::PgPool;

use super::{CommandError, connect};

/// Which table to export.
#[derive(Debug, Clone, Copy)]
pub enum Table {
    Products,
    Categories,
    Tags,
    Orders,
}

/// Export a table as CSV to a file, or stdout when no path is given.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or writing fails.
pub async fn run(table: Table, output: Option<&str>) -> Result<(), CommandError> {
    let pool = connect().await?;

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut csv = csv::Writer::from_writer(writer);

    let rows = match table {
        Table::Products => export_products(&pool, &mut csv).await?,
        Table::Categories => export_categories(&pool, &mut csv).await?,
        Table::Tags => export_tags(&pool, &mut csv).await?,
        Table::Orders => export_orders(&pool, &mut csv).await?,
    };

    csv.flush()?;
    tracing::info!("exported {rows} rows");

    Ok(())
}

async fn export_products<W: Write>(
    pool: &PgPool,
    csv: &mut csv::Writer<W>,
) -> Result<usize, CommandError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i32,
        category_id: Option<i32>,
        title: String,
        price: rust_decimal::Decimal,
        count: i32,
        free_delivery: bool,
        sales_count: i32,
        limited_edition: bool,
        is_deleted: bool,
    }

    let rows = sqlx::query_as::<_, Row>(
        r"
        SELECT id, category_id, title, price, count, free_delivery,
               sales_count, limited_edition, is_deleted
        FROM storefront.product
        ORDER BY id
        ",
    )
    .fetch_all(pool)
    .await?;

    csv.write_record([
        "id",
        "category_id",
        "title",
        "price",
        "count",
        "free_delivery",
        "sales_count",
        "limited_edition",
        "is_deleted",
    ])?;
    for row in &rows {
        csv.write_record([
            row.id.to_string(),
            row.category_id.map(|id| id.to_string()).unwrap_or_default(),
            row.title.clone(),
            row.price.to_string(),
            row.count.to_string(),
            row.free_delivery.to_string(),
            row.sales_count.to_string(),
            row.limited_edition.to_string(),
            row.is_deleted.to_string(),
        ])?;
    }

    Ok(rows.len())
}

async fn export_categories<W: Write>(
    pool: &PgPool,
    csv: &mut csv::Writer<W>,
) -> Result<usize, CommandError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i32,
        title: String,
        parent_id: Option<i32>,
        is_deleted: bool,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, title, parent_id, is_deleted FROM storefront.category ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    csv.write_record(["id", "title", "parent_id", "is_deleted"])?;
    for row in &rows {
        csv.write_record([
            row.id.to_string(),
            row.title.clone(),
            row.parent_id.map(|id| id.to_string()).unwrap_or_default(),
            row.is_deleted.to_string(),
        ])?;
    }

    Ok(rows.len())
}

async fn export_tags<W: Write>(
    pool: &PgPool,
    csv: &mut csv::Writer<W>,
) -> Result<usize, CommandError> {
    let rows: Vec<(i32, String)> =
        sqlx::query_as("SELECT id, name FROM storefront.tag ORDER BY id")
            .fetch_all(pool)
            .await?;

    csv.write_record(["id", "name"])?;
    for (id, name) in &rows {
        csv.write_record([id.to_string(), name.clone()])?;
    }

    Ok(rows.len())
}

async fn export_orders<W: Write>(
    pool: &PgPool,
    csv: &mut csv::Writer<W>,
) -> Result<usize, CommandError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i32,
        created_at: chrono::DateTime<chrono::Utc>,
        full_name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        delivery_type: String,
        payment_type: String,
        total_cost: Option<rust_decimal::Decimal>,
        status: String,
        city: Option<String>,
        address: Option<String>,
        user_id: Option<i32>,
        is_deleted: bool,
    }

    let rows = sqlx::query_as::<_, Row>(
        r#"
        SELECT id, created_at, full_name, email, phone,
               delivery_type::text AS delivery_type,
               payment_type::text AS payment_type,
               total_cost, status::text AS status, city, address,
               user_id, is_deleted
        FROM storefront."order"
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    csv.write_record([
        "id",
        "created_at",
        "full_name",
        "email",
        "phone",
        "delivery_type",
        "payment_type",
        "total_cost",
        "status",
        "city",
        "address",
        "user_id",
        "is_deleted",
    ])?;
    for row in &rows {
        csv.write_record([
            row.id.to_string(),
            row.created_at.to_rfc3339(),
            row.full_name.clone().unwrap_or_default(),
            row.email.clone().unwrap_or_default(),
            row.phone.clone().unwrap_or_default(),
            row.delivery_type.clone(),
            row.payment_type.clone(),
            row.total_cost.map(|c| c.to_string()).unwrap_or_default(),
            row.status.clone(),
            row.city.clone().unwrap_or_default(),
            row.address.clone().unwrap_or_default(),
            row.user_id.map(|id| id.to_string()).unwrap_or_default(),
            row.is_deleted.to_string(),
        ])?;
    }

    Ok(rows.len())
}
