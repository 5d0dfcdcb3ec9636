use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/users/register", post(handlers::user::register))
        .route("/api/users/login", post(handlers::user::login))
        .route("/api/users/me", get(handlers::user::current_user))
        .route("/api/users", get(handlers::user::list_users))
}
