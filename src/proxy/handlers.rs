use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Response,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthSession,
    error::{AppError, Result},
    state::AppState,
};

/// PUT /api/users/:id/profile
///
/// Authenticates the session, checks the caller is the target user or an
/// admin, then relays the untouched body to the user API and surfaces its
/// verdict verbatim. Field validation stays with the controller; nothing is
/// duplicated here.
#[instrument(skip(state, body))]
pub async fn forward_profile_update(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response> {
    if session.user_id != id && !session.is_admin() {
        warn!(caller = %session.user_id, target = %id, "profile update denied");
        return Err(AppError::forbidden("You can only update your own profile"));
    }

    let url = format!(
        "{}/users/{}/profile",
        state.config.user_api_base.trim_end_matches('/'),
        id
    );
    let backend = state
        .http
        .put(&url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, url = %url, "user api request failed");
            AppError::Internal(anyhow::anyhow!("user api unreachable"))
        })?;

    let status = backend.status().as_u16();
    let payload = backend.bytes().await.map_err(|e| {
        error!(error = %e, "failed to read user api response");
        AppError::Internal(anyhow::anyhow!("user api response unreadable"))
    })?;

    info!(caller = %session.user_id, target = %id, status, "profile update relayed");

    let response = Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(response)
}
