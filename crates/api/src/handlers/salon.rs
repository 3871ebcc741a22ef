//! # Salon Handlers
//!
//! Public salon discovery (list, detail with staff and service menu) and
//! admin-only salon management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::{
    errors::BookingError,
    models::salon::{
        CreateSalonRequest, GetSalonResponse, ListSalonsResponse, Salon, UpdateSalonRequest,
    },
};

use crate::{
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListSalonsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[axum::debug_handler]
pub async fn list_salons(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListSalonsQuery>,
) -> Result<Json<ListSalonsResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let salons = salonbook_db::repositories::salon::list_salons(
        &state.db_pool,
        page,
        limit,
        query.search.as_deref(),
    )
    .await
    .map_err(salonbook_db::classify_error)?;

    Ok(Json(ListSalonsResponse {
        data: salons.into_iter().map(Salon::from).collect(),
        page,
        limit,
    }))
}

#[axum::debug_handler]
pub async fn get_salon(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<GetSalonResponse>, AppError> {
    let salon = salonbook_db::repositories::salon::get_salon_by_id(&state.db_pool, id)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::NotFound("Salon not found".to_string()))?;

    let staff = salonbook_db::repositories::staff::get_staff_by_salon(&state.db_pool, id)
        .await
        .map_err(salonbook_db::classify_error)?;
    let services = salonbook_db::repositories::service::get_services_by_salon(&state.db_pool, id)
        .await
        .map_err(salonbook_db::classify_error)?;

    Ok(Json(GetSalonResponse {
        salon: salon.into(),
        staff: staff.into_iter().map(Into::into).collect(),
        services: services.into_iter().map(Into::into).collect(),
    }))
}

fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError(BookingError::Authorization(
            "Admin access required".to_string(),
        )))
    }
}

#[axum::debug_handler]
pub async fn create_salon(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<CreateSalonRequest>,
) -> Result<(StatusCode, Json<Salon>), AppError> {
    require_admin(&user)?;

    if payload.name.trim().is_empty() {
        return Err(AppError(BookingError::InvalidRequest(
            "Salon name is required".to_string(),
        )));
    }

    let salon = salonbook_db::repositories::salon::create_salon(&state.db_pool, &payload)
        .await
        .map_err(salonbook_db::classify_error)?;

    Ok((StatusCode::CREATED, Json(salon.into())))
}

#[axum::debug_handler]
pub async fn update_salon(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSalonRequest>,
) -> Result<Json<Salon>, AppError> {
    require_admin(&user)?;

    let salon = salonbook_db::repositories::salon::update_salon(&state.db_pool, id, &payload)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::NotFound("Salon not found".to_string()))?;

    Ok(Json(salon.into()))
}

#[axum::debug_handler]
pub async fn delete_salon(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_admin(&user)?;

    let deleted = salonbook_db::repositories::salon::delete_salon(&state.db_pool, id)
        .await
        .map_err(salonbook_db::classify_error)?;
    if !deleted {
        return Err(AppError(BookingError::NotFound(
            "Salon not found".to_string(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
