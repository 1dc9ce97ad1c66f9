use axum::{routing::put, Router};

use crate::state::AppState;

pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/users/:id/profile",
        put(handlers::forward_profile_update),
    )
}
