use chrono::{NaiveDate, NaiveTime};
use mockall::Sequence;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use cuetime_core::{
    errors::BookingError,
    models::{
        reservation::{Reservation, ReservationStatus, UpdateReservationRequest},
        slot::Interval,
    },
};
use cuetime_db::models::DbReservation;
use cuetime_db::repositories::reservation::{CreateOutcome, UpdateOutcome};
use cuetime_api::middleware::error_handling::AppError;

use crate::test_utils::{date, sample_db_reservation, time, TestContext};

struct Caller {
    id: Uuid,
    admin: bool,
}

// Mirrors the create_reservation handler: validate the slot, then hand the
// check-and-insert to the repository and map its outcome.
async fn create_reservation_wrapper(
    ctx: &mut TestContext,
    caller: &Caller,
    table_id: Uuid,
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<Reservation, AppError> {
    let slot = Interval::new(start, end)?;

    let outcome = ctx
        .reservation_repo
        .create_reservation(caller.id, table_id, day, slot.start, slot.end, "confirmed")
        .await?;

    match outcome {
        CreateOutcome::Created(row) => Ok(Reservation::try_from(row)?),
        CreateOutcome::Conflict(_) => Err(AppError(BookingError::Conflict(
            "This table is already booked for the selected date and time slot".to_string(),
        ))),
        CreateOutcome::TableMissing => Err(AppError(BookingError::NotFound(
            "Table not found".to_string(),
        ))),
    }
}

// Mirrors the cancel_reservation handler: ownership check, state machine
// check, then the status write.
async fn cancel_reservation_wrapper(
    ctx: &mut TestContext,
    caller: &Caller,
    id: Uuid,
) -> Result<Reservation, AppError> {
    let row = ctx
        .reservation_repo
        .get_reservation_by_id(id)
        .await?
        .ok_or_else(|| AppError(BookingError::NotFound("Reservation not found".to_string())))?;
    let existing = Reservation::try_from(row)?;

    if existing.user_id != caller.id && !caller.admin {
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

    let row = ctx
        .reservation_repo
        .set_reservation_status(id, "cancelled")
        .await?
        .ok_or_else(|| AppError(BookingError::NotFound("Reservation not found".to_string())))?;

    Ok(Reservation::try_from(row)?)
}

// Mirrors the delete_reservation handler: existence first, then admin check.
async fn delete_reservation_wrapper(
    ctx: &mut TestContext,
    caller: &Caller,
    id: Uuid,
) -> Result<(), AppError> {
    let existing = ctx.reservation_repo.get_reservation_by_id(id).await?;
    if existing.is_none() {
        return Err(AppError(BookingError::NotFound(
            "Reservation not found".to_string(),
        )));
    }

    if !caller.admin {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let deleted = ctx.reservation_repo.delete_reservation(id).await?;
    if !deleted {
        return Err(AppError(BookingError::NotFound(
            "Reservation not found".to_string(),
        )));
    }

    Ok(())
}

// Mirrors update_reservation: authorization, state machine validation, patch
// merge, and the conditional conflict re-check.
async fn update_reservation_wrapper(
    ctx: &mut TestContext,
    caller: &Caller,
    id: Uuid,
    payload: UpdateReservationRequest,
) -> Result<Reservation, AppError> {
    let row = ctx
        .reservation_repo
        .get_reservation_by_id(id)
        .await?
        .ok_or_else(|| AppError(BookingError::NotFound("Reservation not found".to_string())))?;
    let existing = Reservation::try_from(row)?;

    if existing.user_id != caller.id && !caller.admin {
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

    let day = payload.date.unwrap_or(existing.date);
    let start = payload.time_start.unwrap_or(existing.time_start);
    let end = payload.time_end.unwrap_or(existing.time_end);
    let table_id = payload.table_id.unwrap_or(existing.table_id);
    let status = payload.status.unwrap_or(existing.status);
    let slot = Interval::new(start, end)?;

    let check_conflict = status == ReservationStatus::Confirmed
        && (payload.changes_slot() || existing.status != ReservationStatus::Confirmed);

    let outcome = ctx
        .reservation_repo
        .update_reservation(
            id,
            day,
            slot.start,
            slot.end,
            status.as_str(),
            table_id,
            check_conflict,
        )
        .await?;

    match outcome {
        UpdateOutcome::Updated(row) => Ok(Reservation::try_from(row)?),
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

fn confirmed_booking(caller: &Caller, table_id: Uuid) -> DbReservation {
    sample_db_reservation(
        caller.id,
        table_id,
        date("2025-06-01"),
        time("14:00:00"),
        time("16:00:00"),
        "confirmed",
    )
}

#[tokio::test]
async fn test_create_reservation_success() {
    let mut ctx = TestContext::new();
    let caller = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let table_id = Uuid::new_v4();
    let row = confirmed_booking(&caller, table_id);
    let expected_id = row.id;

    ctx.reservation_repo
        .expect_create_reservation()
        .returning(move |_, _, _, _, _, _| Ok(CreateOutcome::Created(row.clone())));

    let reservation = create_reservation_wrapper(
        &mut ctx,
        &caller,
        table_id,
        date("2025-06-01"),
        time("14:00:00"),
        time("16:00:00"),
    )
    .await
    .expect("booking a free slot should succeed");

    assert_eq!(reservation.id, expected_id);
    assert_eq!(reservation.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn test_sequential_double_booking_fails_second_time() {
    let mut ctx = TestContext::new();
    let caller = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let table_id = Uuid::new_v4();
    let row = confirmed_booking(&caller, table_id);
    let winner = row.clone();

    let mut seq = Sequence::new();
    ctx.reservation_repo
        .expect_create_reservation()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _, _, _, _, _| Ok(CreateOutcome::Created(row.clone())));
    ctx.reservation_repo
        .expect_create_reservation()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_, _, _, _, _, _| Ok(CreateOutcome::Conflict(winner.clone())));

    let first = create_reservation_wrapper(
        &mut ctx,
        &caller,
        table_id,
        date("2025-06-01"),
        time("14:00:00"),
        time("16:00:00"),
    )
    .await;
    assert!(first.is_ok());

    let second = create_reservation_wrapper(
        &mut ctx,
        &caller,
        table_id,
        date("2025-06-01"),
        time("14:00:00"),
        time("16:00:00"),
    )
    .await;
    let err = second.expect_err("identical booking should conflict");
    assert!(matches!(err.0, BookingError::Conflict(_)));
}

#[tokio::test]
async fn test_create_reservation_rejects_reversed_slot() {
    let mut ctx = TestContext::new();
    let caller = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };

    // No repository expectation: validation fails before any call
    let result = create_reservation_wrapper(
        &mut ctx,
        &caller,
        Uuid::new_v4(),
        date("2025-06-01"),
        time("16:00:00"),
        time("14:00:00"),
    )
    .await;

    let err = result.expect_err("reversed slot should fail validation");
    assert!(matches!(err.0, BookingError::Validation(_)));
}

#[tokio::test]
async fn test_cancel_by_stranger_is_forbidden() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let stranger = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let table_id = Uuid::new_v4();
    let row = confirmed_booking(&owner, table_id);
    let id = row.id;

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));
    // set_reservation_status must never be called; mockall panics if it is

    let result = cancel_reservation_wrapper(&mut ctx, &stranger, id).await;

    let err = result.expect_err("stranger must not cancel");
    assert!(matches!(err.0, BookingError::Authorization(_)));
}

#[tokio::test]
async fn test_cancel_by_admin_succeeds() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let admin = Caller {
        id: Uuid::new_v4(),
        admin: true,
    };
    let table_id = Uuid::new_v4();
    let row = confirmed_booking(&owner, table_id);
    let id = row.id;

    let fetched = row.clone();
    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(fetched.clone())));
    let mut cancelled = row.clone();
    cancelled.status = "cancelled".to_string();
    ctx.reservation_repo
        .expect_set_reservation_status()
        .returning(move |_, _| Ok(Some(cancelled.clone())));

    let reservation = cancel_reservation_wrapper(&mut ctx, &admin, id)
        .await
        .expect("admin cancel should succeed");

    assert_eq!(reservation.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_of_completed_reservation_is_rejected() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let mut row = confirmed_booking(&owner, Uuid::new_v4());
    row.status = "completed".to_string();
    let id = row.id;

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));

    let result = cancel_reservation_wrapper(&mut ctx, &owner, id).await;

    let err = result.expect_err("completed reservation is terminal");
    assert!(matches!(err.0, BookingError::Validation(_)));
}

#[tokio::test]
async fn test_delete_by_non_admin_is_forbidden() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let row = confirmed_booking(&owner, Uuid::new_v4());
    let id = row.id;

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));
    // delete_reservation must never be called

    let result = delete_reservation_wrapper(&mut ctx, &owner, id).await;

    let err = result.expect_err("non-admin must not delete");
    assert!(matches!(err.0, BookingError::Authorization(_)));
}

#[tokio::test]
async fn test_delete_by_admin_removes_record() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let admin = Caller {
        id: Uuid::new_v4(),
        admin: true,
    };
    let row = confirmed_booking(&owner, Uuid::new_v4());
    let id = row.id;

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));
    ctx.reservation_repo
        .expect_delete_reservation()
        .returning(|_| Ok(true));

    delete_reservation_wrapper(&mut ctx, &admin, id)
        .await
        .expect("admin delete should succeed");
}

#[tokio::test]
async fn test_update_rejects_invalid_transition() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let mut row = confirmed_booking(&owner, Uuid::new_v4());
    row.status = "pending".to_string();
    let id = row.id;

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));

    let payload = UpdateReservationRequest {
        status: Some(ReservationStatus::Completed),
        ..Default::default()
    };
    let result = update_reservation_wrapper(&mut ctx, &owner, id, payload).await;

    let err = result.expect_err("pending cannot jump to completed");
    assert!(matches!(err.0, BookingError::Validation(_)));
}

#[tokio::test]
async fn test_update_of_confirmed_slot_rechecks_conflicts() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let row = confirmed_booking(&owner, Uuid::new_v4());
    let id = row.id;
    let other = sample_db_reservation(
        Uuid::new_v4(),
        row.table_id,
        row.date,
        time("17:00:00"),
        time("19:00:00"),
        "confirmed",
    );

    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(row.clone())));
    ctx.reservation_repo
        .expect_update_reservation()
        .withf(|_, _, _, _, _, _, check_conflict| *check_conflict)
        .returning(move |_, _, _, _, _, _, _| Ok(UpdateOutcome::Conflict(other.clone())));

    // Move the booking onto a slot someone else holds
    let payload = UpdateReservationRequest {
        time_start: Some(time("17:30:00")),
        time_end: Some(time("18:30:00")),
        ..Default::default()
    };
    let result = update_reservation_wrapper(&mut ctx, &owner, id, payload).await;

    let err = result.expect_err("moving onto a held slot should conflict");
    assert!(matches!(err.0, BookingError::Conflict(_)));
}

#[tokio::test]
async fn test_update_merges_patch_over_existing_values() {
    let mut ctx = TestContext::new();
    let owner = Caller {
        id: Uuid::new_v4(),
        admin: false,
    };
    let row = confirmed_booking(&owner, Uuid::new_v4());
    let id = row.id;
    let original_date = row.date;
    let original_end = row.time_end;
    let table_id = row.table_id;

    let fetched = row.clone();
    ctx.reservation_repo
        .expect_get_reservation_by_id()
        .returning(move |_| Ok(Some(fetched.clone())));
    let mut updated = row.clone();
    updated.time_start = time("15:00:00");
    ctx.reservation_repo
        .expect_update_reservation()
        .withf(
            move |_, day, start, end, status, table, _| {
                // Untouched fields keep their existing values
                *day == original_date
                    && *start == time("15:00:00")
                    && *end == original_end
                    && status == "confirmed"
                    && *table == table_id
            },
        )
        .returning(move |_, _, _, _, _, _, _| Ok(UpdateOutcome::Updated(updated.clone())));

    let payload = UpdateReservationRequest {
        time_start: Some(time("15:00:00")),
        ..Default::default()
    };
    let reservation = update_reservation_wrapper(&mut ctx, &owner, id, payload)
        .await
        .expect("patch update should succeed");

    assert_eq!(reservation.time_start, time("15:00:00"));
    assert_eq!(reservation.time_end, original_end);
}
