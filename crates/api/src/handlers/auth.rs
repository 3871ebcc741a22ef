use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use salonbook_core::{
    errors::BookingError,
    models::user::{AuthResponse, LoginRequest, RegisterRequest, User},
};

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if payload.password.len() < 6 {
        return Err(AppError(BookingError::InvalidRequest(
            "Password must be at least 6 characters".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&payload.password).map_err(BookingError::Database)?;

    let db_user = salonbook_db::repositories::user::create_user(
        &state.db_pool,
        &payload.email,
        &password_hash,
        &payload.name,
        &payload.phone,
    )
    .await
    .map_err(|e| {
        if salonbook_db::repositories::user::is_unique_violation(&e) {
            BookingError::InvalidRequest("Email already registered".to_string())
        } else {
            salonbook_db::classify_error(e)
        }
    })?;

    let token = auth::create_token(
        db_user.id,
        &db_user.role,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )
    .map_err(BookingError::Database)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: User::from(db_user),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let db_user = salonbook_db::repositories::user::get_user_by_email(&state.db_pool, &payload.email)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::Authentication("Invalid credentials".to_string()))?;

    let is_valid = auth::verify_password(&payload.password, &db_user.password_hash)
        .map_err(BookingError::Database)?;
    if !is_valid {
        return Err(AppError(BookingError::Authentication(
            "Invalid credentials".to_string(),
        )));
    }

    let token = auth::create_token(
        db_user.id,
        &db_user.role,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )
    .map_err(BookingError::Database)?;

    Ok(Json(AuthResponse {
        token,
        user: User::from(db_user),
    }))
}

#[axum::debug_handler]
pub async fn profile(
    State(state): State<Arc<ApiState>>,
    user: auth::AuthUser,
) -> Result<Json<User>, AppError> {
    let db_user = salonbook_db::repositories::user::get_user_by_id(&state.db_pool, user.user_id)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;

    Ok(Json(User::from(db_user)))
}
