//! # Reservation Handlers
//!
//! Handlers for booking billiards tables: availability checks, slot
//! booking, listing, updates, cancellation, and deletion.
//!
//! ## Conflict detection
//!
//! A slot is a (table, date, start, end) window. Two half-open intervals
//! `[s1, e1)` and `[s2, e2)` on the same table and date conflict iff
//! `s1 < e2 && s2 < e1`; only reservations in `confirmed` status count.
//! A booking ending at 10:00 therefore never blocks one starting at 10:00.
//!
//! The check and the insert run inside one database transaction that locks
//! the table row first, so concurrent bookings for the same table are
//! serialized and cannot both pass the check.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use cuetime_core::{
    errors::BookingError,
    models::{
        reservation::{
            AvailabilityResponse, ConflictInfo, CreateReservationRequest, MessageResponse,
            Reservation, ReservationDetail, ReservationResponse, ReservationStatus,
            TableSummary, UpdateReservationRequest,
        },
        slot::Interval,
        table::TableStatus,
    },
};
use cuetime_db::repositories::reservation::{CreateOutcome, UpdateOutcome};

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

/// Query parameters for the availability check endpoint.
///
/// All four fields are required; they arrive as strings and are validated
/// here so missing or malformed values map to a 400 validation error.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(rename = "tableId")]
    pub table_id: Option<String>,
    pub date: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value.ok_or_else(|| {
        AppError(BookingError::Validation(format!(
            "Date, start time, end time, and table ID are required (missing {name})"
        )))
    })
}

fn parse_table_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|_| AppError(BookingError::Validation("Invalid table ID".to_string())))
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError(BookingError::Validation(
            "Invalid date, expected YYYY-MM-DD".to_string(),
        ))
    })
}

fn parse_time(value: &str, name: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|_| {
        AppError(BookingError::Validation(format!(
            "Invalid {name}, expected HH:MM:SS"
        )))
    })
}

/// Checks whether a slot is free.
///
/// # Endpoint
///
/// `GET /api/reservations/check-availability?tableId&date&time_start&time_end`
///
/// Read-only: reports the first conflicting confirmed reservation, if any,
/// alongside the table. Safe to call repeatedly and concurrently.
#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let table_id = parse_table_id(require_field(query.table_id.as_deref(), "tableId")?)?;
    let date = parse_date(require_field(query.date.as_deref(), "date")?)?;
    let time_start = parse_time(
        require_field(query.time_start.as_deref(), "time_start")?,
        "time_start",
    )?;
    let time_end = parse_time(
        require_field(query.time_end.as_deref(), "time_end")?,
        "time_end",
    )?;
    let slot = Interval::new(time_start, time_end)?;

    let table = cuetime_db::repositories::table::get_table_by_id(&state.db_pool, table_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Table not found".to_string()))?;

    let conflict = cuetime_db::repositories::reservation::find_conflicting(
        &state.db_pool,
        table_id,
        date,
        slot.start,
        slot.end,
        None,
    )
    .await
    .map_err(BookingError::Database)?;

    let table_status: TableStatus = table
        .status
        .parse()
        .map_err(|e: String| BookingError::Database(eyre::eyre!(e)))?;

    Ok(Json(AvailabilityResponse {
        available: conflict.is_none(),
        table: TableSummary {
            id: table.id,
            table_number: table.table_number,
            status: table_status,
        },
        conflict: conflict.map(|c| ConflictInfo {
            date: c.date,
            time_start: c.time_start,
            time_end: c.time_end,
        }),
    }))
}

/// Books a slot for the authenticated user.
///
/// # Endpoint
///
/// `POST /api/reservations`
///
/// The conflict check always runs; the initial status comes from the
/// server's booking policy configuration. An overlapping confirmed
/// reservation yields 409, an unknown table 404.
#[axum::debug_handler]
pub async fn create_reservation(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let table_id = parse_table_id(require_field(payload.table_id.as_deref(), "tableId")?)?;
    let date = parse_date(require_field(payload.date.as_deref(), "date")?)?;
    let time_start = parse_time(
        require_field(payload.time_start.as_deref(), "time_start")?,
        "time_start",
    )?;
    let time_end = parse_time(
        require_field(payload.time_end.as_deref(), "time_end")?,
        "time_end",
    )?;
    let slot = Interval::new(time_start, time_end)?;

    let outcome = cuetime_db::repositories::reservation::create_reservation(
        &state.db_pool,
        current_user.id,
        table_id,
        date,
        slot.start,
        slot.end,
        state.default_status.as_str(),
    )
    .await
    .map_err(BookingError::Database)?;

    match outcome {
        CreateOutcome::Created(row) => {
            let reservation = Reservation::try_from(row).map_err(BookingError::Database)?;
            Ok((
                StatusCode::CREATED,
                Json(ReservationResponse {
                    message: "Reservation created successfully".to_string(),
                    reservation,
                }),
            ))
        }
        CreateOutcome::Conflict(_) => Err(AppError(BookingError::Conflict(
            "This table is already booked for the selected date and time slot".to_string(),
        ))),
        CreateOutcome::TableMissing => Err(AppError(BookingError::NotFound(
            "Table not found".to_string(),
        ))),
    }
}

/// Lists every reservation with user and table details. Admin only.
#[axum::debug_handler]
pub async fn list_reservations(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let rows = cuetime_db::repositories::reservation::list_reservations(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let details = rows
        .into_iter()
        .map(|row| row.into_detail(true))
        .collect::<eyre::Result<Vec<_>>>()
        .map_err(BookingError::Database)?;

    Ok(Json(details))
}

/// Lists the authenticated user's own reservations with table details.
#[axum::debug_handler]
pub async fn my_reservations(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    let rows = cuetime_db::repositories::reservation::list_reservations_by_user(
        &state.db_pool,
        current_user.id,
    )
    .await
    .map_err(BookingError::Database)?;

    let details = rows
        .into_iter()
        .map(|row| row.into_detail(false))
        .collect::<eyre::Result<Vec<_>>>()
        .map_err(BookingError::Database)?;

    Ok(Json(details))
}

/// Fetches a single reservation with user and table details.
#[axum::debug_handler]
pub async fn get_reservation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationDetail>, AppError> {
    let row =
        cuetime_db::repositories::reservation::get_reservation_detail_by_id(&state.db_pool, id)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    let detail = row.into_detail(true).map_err(BookingError::Database)?;

    Ok(Json(detail))
}

/// Applies a partial update to a reservation. Owner or admin only.
///
/// # Endpoint
///
/// `PUT /api/reservations/:id`
///
/// Absent fields keep their current value. Status changes must follow the
/// reservation state machine, and when the result is a confirmed booking
/// whose slot moved (or that just became confirmed) the conflict check
/// re-runs, excluding the reservation itself.
#[axum::debug_handler]
pub async fn update_reservation(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let row = cuetime_db::repositories::reservation::get_reservation_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;
    let existing = Reservation::try_from(row).map_err(BookingError::Database)?;

    if existing.user_id != current_user.id && !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Not authorized".to_string(),
        )));
    }

    if let Some(next) = payload.status {
        if !existing.status.can_transition_to(next) {
            return Err(AppError(BookingError::Validation(format!(
                "Cannot change a {} reservation to {}",
                existing.status, next
            ))));
        }
    }

    let date = payload.date.unwrap_or(existing.date);
    let time_start = payload.time_start.unwrap_or(existing.time_start);
    let time_end = payload.time_end.unwrap_or(existing.time_end);
    let table_id = payload.table_id.unwrap_or(existing.table_id);
    let status = payload.status.unwrap_or(existing.status);
    let slot = Interval::new(time_start, time_end)?;

    let check_conflict = status == ReservationStatus::Confirmed
        && (payload.changes_slot() || existing.status != ReservationStatus::Confirmed);

    let outcome = cuetime_db::repositories::reservation::update_reservation(
        &state.db_pool,
        id,
        date,
        slot.start,
        slot.end,
        status.as_str(),
        table_id,
        check_conflict,
    )
    .await
    .map_err(BookingError::Database)?;

    match outcome {
        UpdateOutcome::Updated(row) => {
            let reservation = Reservation::try_from(row).map_err(BookingError::Database)?;
            Ok(Json(ReservationResponse {
                message: "Reservation updated successfully".to_string(),
                reservation,
            }))
        }
        UpdateOutcome::Conflict(_) => Err(AppError(BookingError::Conflict(
            "This table is already booked for the selected date and time slot".to_string(),
        ))),
        UpdateOutcome::TableMissing => Err(AppError(BookingError::NotFound(
            "Table not found".to_string(),
        ))),
        UpdateOutcome::NotFound => Err(AppError(BookingError::NotFound(
            "Reservation not found".to_string(),
        ))),
    }
}

/// Cancels a reservation. Owner or admin only.
///
/// Cancellation is terminal: completed or already-cancelled reservations
/// cannot be cancelled again.
#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let row = cuetime_db::repositories::reservation::get_reservation_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;
    let existing = Reservation::try_from(row).map_err(BookingError::Database)?;

    if existing.user_id != current_user.id && !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Not authorized".to_string(),
        )));
    }

    if !existing
        .status
        .can_transition_to(ReservationStatus::Cancelled)
    {
        return Err(AppError(BookingError::Validation(format!(
            "Cannot cancel a {} reservation",
            existing.status
        ))));
    }

    let row = cuetime_db::repositories::reservation::set_reservation_status(
        &state.db_pool,
        id,
        ReservationStatus::Cancelled.as_str(),
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;
    let reservation = Reservation::try_from(row).map_err(BookingError::Database)?;

    Ok(Json(ReservationResponse {
        message: "Reservation cancelled successfully".to_string(),
        reservation,
    }))
}

/// Deletes a reservation outright. Admin only.
#[axum::debug_handler]
pub async fn delete_reservation(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing =
        cuetime_db::repositories::reservation::get_reservation_by_id(&state.db_pool, id)
            .await
            .map_err(BookingError::Database)?;
    if existing.is_none() {
        return Err(AppError(BookingError::NotFound(
            "Reservation not found".to_string(),
        )));
    }

    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let deleted =
        cuetime_db::repositories::reservation::delete_reservation(&state.db_pool, id)
            .await
            .map_err(BookingError::Database)?;
    if !deleted {
        return Err(AppError(BookingError::NotFound(
            "Reservation not found".to_string(),
        )));
    }

    Ok(Json(MessageResponse {
        message: "Reservation deleted successfully".to_string(),
    }))
}
