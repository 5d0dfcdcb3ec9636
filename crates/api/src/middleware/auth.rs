//! # Authentication Module
//!
//! This module provides authentication-related utilities for the CueTime
//! API: Argon2 password hashing, opaque session-token minting, and the
//! [`CurrentUser`] extractor that turns a bearer token into explicit
//! per-request caller context.
//!
//! Sessions are stored server-side; the token itself carries no claims and
//! the handlers only ever see the resolved user id and role.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use cuetime_core::errors::BookingError;
use cuetime_core::models::user::Role;
use eyre::Result;
use rand::RngCore;
use std::sync::Arc;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm.
///
/// A fresh random salt is generated for each password; the result is a PHC
/// string that embeds the algorithm parameters and salt.
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Generates an opaque session token: 32 random bytes, hex-encoded.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Mints a session token for a user and persists it with an expiry.
pub async fn issue_session(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    ttl_hours: i64,
) -> Result<String> {
    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);

    cuetime_db::repositories::session::create_session(pool, &token, user_id, expires_at).await?;

    Ok(token)
}

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. Handlers take this as a parameter instead of reading any ambient
/// request state.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError(BookingError::Authentication(
                    "Missing bearer token".to_string(),
                ))
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError(BookingError::Authentication(
                "Malformed Authorization header".to_string(),
            ))
        })?;

        let user = cuetime_db::repositories::session::get_session_user(&state.db_pool, token)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| {
                AppError(BookingError::Authentication(
                    "Invalid or expired session".to_string(),
                ))
            })?;

        let role: Role = user
            .role
            .parse()
            .map_err(|e: String| BookingError::Database(eyre::eyre!(e)))?;

        Ok(CurrentUser { id: user.id, role })
    }
}
