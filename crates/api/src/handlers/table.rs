//! Handlers for billiards table management. Reads are public; mutations are
//! admin only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use cuetime_core::{
    errors::BookingError,
    models::{
        reservation::MessageResponse,
        table::{
            BilliardTable, CreateTableRequest, TableResponse, TableStatus, UpdateTableRequest,
        },
    },
};
use cuetime_db::repositories::table::TableInsert;

use crate::{
    middleware::{auth::CurrentUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn list_tables(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<BilliardTable>>, AppError> {
    let rows = cuetime_db::repositories::table::list_tables(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let tables = rows
        .into_iter()
        .map(BilliardTable::try_from)
        .collect::<eyre::Result<Vec<_>>>()
        .map_err(BookingError::Database)?;

    Ok(Json(tables))
}

#[axum::debug_handler]
pub async fn get_table(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BilliardTable>, AppError> {
    let row = cuetime_db::repositories::table::get_table_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("Table not found".to_string()))?;

    let table = BilliardTable::try_from(row).map_err(BookingError::Database)?;

    Ok(Json(table))
}

#[axum::debug_handler]
pub async fn create_table(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Json(payload): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<TableResponse>), AppError> {
    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let table_number = payload.table_number.ok_or_else(|| {
        AppError(BookingError::Validation(
            "Table number is required".to_string(),
        ))
    })?;
    let status = payload.status.unwrap_or(TableStatus::Available);

    let outcome =
        cuetime_db::repositories::table::create_table(&state.db_pool, table_number, status.as_str())
            .await
            .map_err(BookingError::Database)?;

    match outcome {
        TableInsert::Created(row) => {
            let table = BilliardTable::try_from(row).map_err(BookingError::Database)?;
            Ok((
                StatusCode::CREATED,
                Json(TableResponse {
                    message: "Table created successfully".to_string(),
                    table,
                }),
            ))
        }
        TableInsert::DuplicateNumber => Err(AppError(BookingError::Validation(
            "Table number already exists".to_string(),
        ))),
    }
}

#[axum::debug_handler]
pub async fn update_table(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTableRequest>,
) -> Result<Json<TableResponse>, AppError> {
    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let row = cuetime_db::repositories::table::update_table(
        &state.db_pool,
        id,
        payload.table_number,
        payload.status.map(|s| s.as_str()),
    )
    .await
    .map_err(BookingError::Database)?
    .ok_or_else(|| BookingError::NotFound("Table not found".to_string()))?;

    let table = BilliardTable::try_from(row).map_err(BookingError::Database)?;

    Ok(Json(TableResponse {
        message: "Table updated successfully".to_string(),
        table,
    }))
}

#[axum::debug_handler]
pub async fn delete_table(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let deleted = cuetime_db::repositories::table::delete_table(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;
    if !deleted {
        return Err(AppError(BookingError::NotFound(
            "Table not found".to_string(),
        )));
    }

    Ok(Json(MessageResponse {
        message: "Table deleted successfully".to_string(),
    }))
}
