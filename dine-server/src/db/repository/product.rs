//! Product Repository

use shared::models::{Product, ProductCreate};
use sqlx::{SqliteConnection, SqliteExecutor};

use super::{RepoError, RepoResult, placeholders};

/// Active products of a restaurant among `ids`
pub async fn find_by_ids(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    ids: &[i64],
) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT * FROM product WHERE restaurant_id = ? AND is_active = 1 AND id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as(&sql).bind(restaurant_id);
    for id in ids {
        query = query.bind(id);
    }
    let products = query.fetch_all(&mut *conn).await?;
    Ok(products)
}

pub async fn create<'e, E: SqliteExecutor<'e>>(
    executor: E,
    restaurant_id: i64,
    data: &ProductCreate,
) -> RepoResult<Product> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(RepoError::Validation("Product name is required".into()));
    }
    if !data.price.is_finite() || data.price < 0.0 {
        return Err(RepoError::Validation(format!(
            "Invalid price: {}",
            data.price
        )));
    }

    let product = sqlx::query_as(
        r#"
        INSERT INTO product (id, restaurant_id, name, price, image, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        RETURNING *
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(name)
    .bind(data.price)
    .bind(&data.image)
    .bind(shared::util::now_millis())
    .fetch_one(executor)
    .await?;
    Ok(product)
}
