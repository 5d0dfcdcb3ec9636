use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use cuetime_core::{
    errors::BookingError,
    models::{
        reservation::{AvailabilityResponse, ConflictInfo, TableSummary},
        slot::Interval,
    },
};
use cuetime_api::middleware::error_handling::AppError;

use crate::test_utils::{date, sample_db_reservation, sample_db_table, time, TestContext};

// Mirrors the check_availability handler against mock repositories: resolve
// the table, validate the slot, then look for an overlapping confirmed
// reservation.
async fn check_availability_wrapper(
    ctx: &mut TestContext,
    table_id: Uuid,
    day: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Result<AvailabilityResponse, AppError> {
    let table = ctx
        .table_repo
        .get_table_by_id(table_id)
        .await?
        .ok_or_else(|| AppError(BookingError::NotFound("Table not found".to_string())))?;

    let slot = Interval::new(start, end)?;

    let conflict = ctx
        .reservation_repo
        .find_conflicting(table_id, day, slot.start, slot.end, None)
        .await?;

    Ok(AvailabilityResponse {
        available: conflict.is_none(),
        table: TableSummary {
            id: table.id,
            table_number: table.table_number,
            status: table.status.parse().map_err(|e: String| {
                AppError(BookingError::Database(eyre::eyre!(e)))
            })?,
        },
        conflict: conflict.map(|c| ConflictInfo {
            date: c.date,
            time_start: c.time_start,
            time_end: c.time_end,
        }),
    })
}

#[tokio::test]
async fn test_overlapping_slot_is_unavailable() {
    let mut ctx = TestContext::new();
    let table = sample_db_table(3);
    let table_id = table.id;
    let user_id = Uuid::new_v4();
    let day = date("2025-06-01");

    // Existing confirmed booking 14:00-16:00
    let existing = sample_db_reservation(
        user_id,
        table_id,
        day,
        time("14:00:00"),
        time("16:00:00"),
        "confirmed",
    );

    ctx.table_repo
        .expect_get_table_by_id()
        .returning(move |_| Ok(Some(table.clone())));
    let conflict = existing.clone();
    ctx.reservation_repo
        .expect_find_conflicting()
        .returning(move |_, _, _, _, _| Ok(Some(conflict.clone())));

    // Candidate 15:00-17:00 overlaps the tail of the existing booking
    let response =
        check_availability_wrapper(&mut ctx, table_id, day, time("15:00:00"), time("17:00:00"))
            .await
            .expect("availability check should succeed");

    assert!(!response.available);
    let conflict = response.conflict.expect("conflict should be reported");
    assert_eq!(conflict.time_start, existing.time_start);
    assert_eq!(conflict.time_end, existing.time_end);
    assert_eq!(response.table.table_number, 3);
}

#[tokio::test]
async fn test_back_to_back_slot_is_available() {
    let mut ctx = TestContext::new();
    let table = sample_db_table(3);
    let table_id = table.id;
    let day = date("2025-06-01");

    ctx.table_repo
        .expect_get_table_by_id()
        .returning(move |_| Ok(Some(table.clone())));
    // 16:00-18:00 only touches the 14:00-16:00 booking at its endpoint
    ctx.reservation_repo
        .expect_find_conflicting()
        .returning(|_, _, _, _, _| Ok(None));

    let response =
        check_availability_wrapper(&mut ctx, table_id, day, time("16:00:00"), time("18:00:00"))
            .await
            .expect("availability check should succeed");

    assert!(response.available);
    assert!(response.conflict.is_none());
}

#[tokio::test]
async fn test_unknown_table_is_not_found() {
    let mut ctx = TestContext::new();

    ctx.table_repo
        .expect_get_table_by_id()
        .returning(|_| Ok(None));

    let result = check_availability_wrapper(
        &mut ctx,
        Uuid::new_v4(),
        date("2025-06-01"),
        time("15:00:00"),
        time("17:00:00"),
    )
    .await;

    let err = result.expect_err("unknown table should fail");
    assert!(matches!(err.0, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_reversed_slot_is_rejected() {
    let mut ctx = TestContext::new();
    let table = sample_db_table(3);
    let table_id = table.id;

    ctx.table_repo
        .expect_get_table_by_id()
        .returning(move |_| Ok(Some(table.clone())));

    let result = check_availability_wrapper(
        &mut ctx,
        table_id,
        date("2025-06-01"),
        time("17:00:00"),
        time("15:00:00"),
    )
    .await;

    let err = result.expect_err("reversed slot should fail validation");
    assert!(matches!(err.0, BookingError::Validation(_)));
}
