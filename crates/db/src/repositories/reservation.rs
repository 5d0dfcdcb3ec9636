use crate::models::{DbReservation, DbReservationDetail};
use chrono::{NaiveDate, NaiveTime, Utc};
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

/// Outcome of a booking attempt.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(DbReservation),
    Conflict(DbReservation),
    TableMissing,
}

/// Outcome of a reservation update.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(DbReservation),
    Conflict(DbReservation),
    TableMissing,
    NotFound,
}

/// Finds a confirmed reservation for the same table and date whose half-open
/// interval overlaps `[time_start, time_end)`. Intervals that only touch at
/// an endpoint do not count. Returns the earliest conflict, if any.
pub async fn find_conflicting<'e, E>(
    executor: E,
    table_id: Uuid,
    date: NaiveDate,
    time_start: NaiveTime,
    time_end: NaiveTime,
    exclude: Option<Uuid>,
) -> Result<Option<DbReservation>>
where
    E: PgExecutor<'e>,
{
    let conflict = sqlx::query_as::<_, DbReservation>(
        r#"
        SELECT id, date, time_start, time_end, status, user_id, table_id, created_at
        FROM reservations
        WHERE table_id = $1
          AND date = $2
          AND status = 'confirmed'
          AND time_start < $4
          AND time_end > $3
          AND ($5::uuid IS NULL OR id <> $5)
        ORDER BY time_start ASC
        LIMIT 1
        "#,
    )
    .bind(table_id)
    .bind(date)
    .bind(time_start)
    .bind(time_end)
    .bind(exclude)
    .fetch_optional(executor)
    .await?;

    Ok(conflict)
}

/// Books a slot if it is free.
///
/// The conflict check and the insert run in one transaction that first takes
/// a row lock on the table, so two concurrent bookings for the same table
/// cannot both pass the check.
pub async fn create_reservation(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    table_id: Uuid,
    date: NaiveDate,
    time_start: NaiveTime,
    time_end: NaiveTime,
    status: &str,
) -> Result<CreateOutcome> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating reservation: id={}, user_id={}, table_id={}, date={}, slot={}-{}",
        id, user_id, table_id, date, time_start, time_end
    );

    let mut tx = pool.begin().await?;

    // Serialize bookings per table: concurrent writers queue on this row lock.
    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM billiard_tables WHERE id = $1 FOR UPDATE",
    )
    .bind(table_id)
    .fetch_optional(&mut *tx)
    .await?;

    if locked.is_none() {
        return Ok(CreateOutcome::TableMissing);
    }

    if let Some(conflict) =
        find_conflicting(&mut *tx, table_id, date, time_start, time_end, None).await?
    {
        tracing::debug!(
            "Slot conflict: reservation {} holds {}-{}",
            conflict.id, conflict.time_start, conflict.time_end
        );
        return Ok(CreateOutcome::Conflict(conflict));
    }

    let reservation = sqlx::query_as::<_, DbReservation>(
        r#"
        INSERT INTO reservations (id, date, time_start, time_end, status, user_id, table_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, date, time_start, time_end, status, user_id, table_id, created_at
        "#,
    )
    .bind(id)
    .bind(date)
    .bind(time_start)
    .bind(time_end)
    .bind(status)
    .bind(user_id)
    .bind(table_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Reservation created successfully: id={}", id);
    Ok(CreateOutcome::Created(reservation))
}

/// Overwrites a reservation with the given (already merged) field values.
///
/// When `check_conflict` is set, the slot is re-validated against other
/// confirmed reservations inside the same transactional boundary used by
/// [`create_reservation`].
#[allow(clippy::too_many_arguments)]
pub async fn update_reservation(
    pool: &Pool<Postgres>,
    id: Uuid,
    date: NaiveDate,
    time_start: NaiveTime,
    time_end: NaiveTime,
    status: &str,
    table_id: Uuid,
    check_conflict: bool,
) -> Result<UpdateOutcome> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM billiard_tables WHERE id = $1 FOR UPDATE",
    )
    .bind(table_id)
    .fetch_optional(&mut *tx)
    .await?;

    if locked.is_none() {
        return Ok(UpdateOutcome::TableMissing);
    }

    if check_conflict {
        if let Some(conflict) =
            find_conflicting(&mut *tx, table_id, date, time_start, time_end, Some(id)).await?
        {
            return Ok(UpdateOutcome::Conflict(conflict));
        }
    }

    let updated = sqlx::query_as::<_, DbReservation>(
        r#"
        UPDATE reservations
        SET date = $2, time_start = $3, time_end = $4, status = $5, table_id = $6
        WHERE id = $1
        RETURNING id, date, time_start, time_end, status, user_id, table_id, created_at
        "#,
    )
    .bind(id)
    .bind(date)
    .bind(time_start)
    .bind(time_end)
    .bind(status)
    .bind(table_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(reservation) = updated else {
        return Ok(UpdateOutcome::NotFound);
    };

    tx.commit().await?;
    Ok(UpdateOutcome::Updated(reservation))
}

pub async fn get_reservation_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbReservation>> {
    let reservation = sqlx::query_as::<_, DbReservation>(
        r#"
        SELECT id, date, time_start, time_end, status, user_id, table_id, created_at
        FROM reservations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(reservation)
}

pub async fn get_reservation_detail_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbReservationDetail>> {
    let detail = sqlx::query_as::<_, DbReservationDetail>(
        r#"
        SELECT r.id, r.date, r.time_start, r.time_end, r.status, r.user_id, r.table_id,
               r.created_at, u.name AS user_name, u.email AS user_email,
               t.table_number, t.status AS table_status
        FROM reservations r
        JOIN users u ON u.id = r.user_id
        JOIN billiard_tables t ON t.id = r.table_id
        WHERE r.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(detail)
}

pub async fn list_reservations(pool: &Pool<Postgres>) -> Result<Vec<DbReservationDetail>> {
    let reservations = sqlx::query_as::<_, DbReservationDetail>(
        r#"
        SELECT r.id, r.date, r.time_start, r.time_end, r.status, r.user_id, r.table_id,
               r.created_at, u.name AS user_name, u.email AS user_email,
               t.table_number, t.status AS table_status
        FROM reservations r
        JOIN users u ON u.id = r.user_id
        JOIN billiard_tables t ON t.id = r.table_id
        ORDER BY r.date ASC, r.time_start ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

pub async fn list_reservations_by_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<DbReservationDetail>> {
    let reservations = sqlx::query_as::<_, DbReservationDetail>(
        r#"
        SELECT r.id, r.date, r.time_start, r.time_end, r.status, r.user_id, r.table_id,
               r.created_at, u.name AS user_name, u.email AS user_email,
               t.table_number, t.status AS table_status
        FROM reservations r
        JOIN users u ON u.id = r.user_id
        JOIN billiard_tables t ON t.id = r.table_id
        WHERE r.user_id = $1
        ORDER BY r.date ASC, r.time_start ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

pub async fn set_reservation_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Option<DbReservation>> {
    let reservation = sqlx::query_as::<_, DbReservation>(
        r#"
        UPDATE reservations
        SET status = $2
        WHERE id = $1
        RETURNING id, date, time_start, time_end, status, user_id, table_id, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(reservation)
}

pub async fn delete_reservation(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
