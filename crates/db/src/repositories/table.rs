use crate::models::DbTable;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Outcome of a table insert. `table_number` is unique per hall.
#[derive(Debug)]
pub enum TableInsert {
    Created(DbTable),
    DuplicateNumber,
}

pub async fn create_table(
    pool: &Pool<Postgres>,
    table_number: i32,
    status: &str,
) -> Result<TableInsert> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating table: id={}, table_number={}", id, table_number);

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM billiard_tables WHERE table_number = $1",
    )
    .bind(table_number)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        return Ok(TableInsert::DuplicateNumber);
    }

    let table = sqlx::query_as::<_, DbTable>(
        r#"
        INSERT INTO billiard_tables (id, table_number, status, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, table_number, status, created_at
        "#,
    )
    .bind(id)
    .bind(table_number)
    .bind(status)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(TableInsert::Created(table))
}

pub async fn get_table_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbTable>> {
    let table = sqlx::query_as::<_, DbTable>(
        r#"
        SELECT id, table_number, status, created_at
        FROM billiard_tables
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(table)
}

pub async fn list_tables(pool: &Pool<Postgres>) -> Result<Vec<DbTable>> {
    let tables = sqlx::query_as::<_, DbTable>(
        r#"
        SELECT id, table_number, status, created_at
        FROM billiard_tables
        ORDER BY table_number ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tables)
}

pub async fn update_table(
    pool: &Pool<Postgres>,
    id: Uuid,
    table_number: Option<i32>,
    status: Option<&str>,
) -> Result<Option<DbTable>> {
    let Some(table) = get_table_by_id(pool, id).await? else {
        return Ok(None);
    };

    let table_number = table_number.unwrap_or(table.table_number);
    let status = status.unwrap_or(&table.status);

    let updated = sqlx::query_as::<_, DbTable>(
        r#"
        UPDATE billiard_tables
        SET table_number = $2, status = $3
        WHERE id = $1
        RETURNING id, table_number, status, created_at
        "#,
    )
    .bind(id)
    .bind(table_number)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(Some(updated))
}

pub async fn delete_table(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM billiard_tables WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
