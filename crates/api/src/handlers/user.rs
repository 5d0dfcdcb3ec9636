//! Handlers for user accounts and sessions: registration, login, the
//! current-user lookup, and the admin user listing.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use cuetime_core::{
    errors::BookingError,
    models::user::{AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest, Role, User},
};

use crate::{
    middleware::{auth, auth::CurrentUser, error_handling::AppError},
    ApiState,
};

/// Registers a new user account and issues a session token.
#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (Some(name), Some(email), Some(password)) =
        (&payload.name, &payload.email, &payload.password)
    else {
        return Err(AppError(BookingError::Validation(
            "Name, email, and password are required".to_string(),
        )));
    };

    let existing = cuetime_db::repositories::user::get_user_by_email(&state.db_pool, email)
        .await
        .map_err(BookingError::Database)?;
    if existing.is_some() {
        return Err(AppError(BookingError::Validation(
            "Email already registered".to_string(),
        )));
    }

    let password_hash = auth::hash_password(password)?;

    let row = cuetime_db::repositories::user::create_user(
        &state.db_pool,
        name,
        email,
        &password_hash,
        Role::User.as_str(),
    )
    .await
    .map_err(BookingError::Database)?;

    let token = auth::issue_session(&state.db_pool, row.id, state.session_ttl_hours).await?;
    let user = User::try_from(row).map_err(BookingError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user,
            token,
        }),
    ))
}

/// Authenticates a user by email and password and issues a session token.
#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (&payload.email, &payload.password) else {
        return Err(AppError(BookingError::Validation(
            "Email and password are required".to_string(),
        )));
    };

    let row = cuetime_db::repositories::user::verify_credentials(&state.db_pool, email, password)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::Authentication("Invalid email or password".to_string())
        })?;

    let token = auth::issue_session(&state.db_pool, row.id, state.session_ttl_hours).await?;
    let user = User::try_from(row).map_err(BookingError::Database)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        token,
    }))
}

/// Returns the account behind the presented session token.
#[axum::debug_handler]
pub async fn current_user(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let row = cuetime_db::repositories::user::get_user_by_id(&state.db_pool, current_user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;

    let user = User::try_from(row).map_err(BookingError::Database)?;

    Ok(Json(CurrentUserResponse { user }))
}

/// Lists all user accounts. Admin only.
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<ApiState>>,
    current_user: CurrentUser,
) -> Result<Json<Vec<User>>, AppError> {
    if !current_user.is_admin() {
        return Err(AppError(BookingError::Authorization(
            "Admin only".to_string(),
        )));
    }

    let rows = cuetime_db::repositories::user::list_users(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let users = rows
        .into_iter()
        .map(User::try_from)
        .collect::<eyre::Result<Vec<_>>>()
        .map_err(BookingError::Database)?;

    Ok(Json(users))
}
