use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    error::{AppError, Result},
    state::AppState,
};

use super::{
    dto::{
        CreateUserRequest, ProfileUpdateResponse, PublicUser, UpdateProfileRequest,
        UpdateUserRequest,
    },
    repo::{Role, User},
    validation::{is_valid_email, is_valid_password},
};

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let (email, password) = match (payload.email.as_deref(), payload.password.as_deref()) {
        (Some(e), Some(p)) => (e.trim().to_lowercase(), p),
        _ => return Err(AppError::validation("Email and password are required")),
    };

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email address"));
    }
    if !is_valid_password(password) {
        warn!("password too short");
        return Err(AppError::validation(
            "Password must be at least 8 characters long",
        ));
    }

    // Ensure email is not taken
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already in use");
        return Err(AppError::validation("Email already in use"));
    }

    let hash = hash_password(password)?;
    let role = payload.role.unwrap_or(Role::User);
    let user = User::create(&state.db, &email, &hash, role).await?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<PublicUser>> {
    let email = email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Admin update: any supplied field is overwritten, including the role.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let email = match payload.email.as_deref() {
        Some(e) => {
            let e = e.trim().to_lowercase();
            if !is_valid_email(&e) {
                warn!(email = %e, "invalid email");
                return Err(AppError::validation("Invalid email address"));
            }
            Some(e)
        }
        None => None,
    };

    let hash = match payload.password.as_deref() {
        Some(p) => {
            if !is_valid_password(p) {
                return Err(AppError::validation(
                    "Password must be at least 8 characters long",
                ));
            }
            Some(hash_password(p)?)
        }
        None => None,
    };

    let user = User::update(&state.db, id, email.as_deref(), hash.as_deref(), payload.role).await?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

/// Self-service profile update. A password change requires proof of the
/// current one; an email change must not collide with a different user.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdateResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut new_hash: Option<String> = None;
    if let Some(password) = payload.password.as_deref() {
        let current = payload.current_password.as_deref().ok_or_else(|| {
            AppError::validation("Current password is required to change password")
        })?;
        // Accounts provisioned by an external identity provider have no
        // stored hash and stay credential-less
        let stored = user.password_hash.as_deref().ok_or_else(|| {
            AppError::validation("Password changes are not available for this account")
        })?;
        if !verify_password(current, stored)? {
            warn!(user_id = %user.id, "current password mismatch");
            return Err(AppError::unauthorized("Current password is incorrect"));
        }
        if !is_valid_password(password) {
            return Err(AppError::validation(
                "New password must be at least 8 characters long",
            ));
        }
        new_hash = Some(hash_password(password)?);
    }

    let mut new_email: Option<String> = None;
    if let Some(email) = payload.email.as_deref() {
        let email = email.trim().to_lowercase();
        // The user's own current address is a no-op, not a conflict
        if email != user.email {
            if !is_valid_email(&email) {
                return Err(AppError::validation("Invalid email address"));
            }
            if let Some(other) = User::find_by_email(&state.db, &email).await? {
                if other.id != user.id {
                    warn!(email = %email, "email already in use");
                    return Err(AppError::validation("Email already in use"));
                }
            }
            new_email = Some(email);
        }
    }

    if new_email.is_none() && new_hash.is_none() {
        return Ok(Json(ProfileUpdateResponse {
            message: "No changes made".to_string(),
            user: user.into(),
        }));
    }

    let updated =
        User::update(&state.db, id, new_email.as_deref(), new_hash.as_deref(), None).await?;
    info!(
        user_id = %updated.id,
        email_changed = new_email.is_some(),
        password_changed = new_hash.is_some(),
        "profile updated"
    );
    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        user: updated.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let deleted = User::delete(&state.db, id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("User not found"));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
