//! # Availability Handlers
//!
//! Computes open booking slots for a staff member on a given day. The
//! handler resolves the salon, service, and staff rows, snapshots the
//! day's occupying reservations in one query, and hands everything to the
//! pure scheduling engine. A day with no working hours yields an empty
//! slot list, not an error.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::{
    errors::BookingError,
    models::reservation::AvailableSlotsResponse,
    scheduling::{self, TimeInterval},
};
use salonbook_db::models::{DbReservation, DbService, DbStaff};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub staff_id: Option<Uuid>,
}

/// Resolves the staff row for a slots or booking request, checking salon
/// membership. Without an explicit staff id the salon's first active staff
/// member is used.
pub(crate) async fn resolve_staff(
    state: &ApiState,
    salon_id: Uuid,
    staff_id: Option<Uuid>,
) -> Result<DbStaff, BookingError> {
    let staff = match staff_id {
        Some(id) => salonbook_db::repositories::staff::get_staff_by_id(&state.db_pool, id)
            .await
            .map_err(salonbook_db::classify_error)?,
        None => salonbook_db::repositories::staff::get_first_active_staff(&state.db_pool, salon_id)
            .await
            .map_err(salonbook_db::classify_error)?,
    };

    match staff {
        Some(staff) if staff.salon_id == salon_id => Ok(staff),
        _ => Err(BookingError::NotFound("Staff not found".to_string())),
    }
}

/// Resolves the service row, checking salon membership.
pub(crate) async fn resolve_service(
    state: &ApiState,
    salon_id: Uuid,
    service_id: Uuid,
) -> Result<DbService, BookingError> {
    let service =
        salonbook_db::repositories::service::get_service_by_id(&state.db_pool, service_id)
            .await
            .map_err(salonbook_db::classify_error)?;

    match service {
        Some(service) if service.salon_id == salon_id => Ok(service),
        _ => Err(BookingError::NotFound("Service not found".to_string())),
    }
}

/// Converts a day's reservation rows into the interval snapshot the engine
/// consumes. Rows from the repository are already status-filtered; rows
/// with a corrupt interval would have been rejected at insert.
pub(crate) fn occupied_intervals(
    reservations: &[DbReservation],
) -> Result<Vec<TimeInterval>, BookingError> {
    reservations
        .iter()
        .map(|r| TimeInterval::new(r.start_time, r.end_time))
        .collect()
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<ApiState>>,
    Path(salon_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    salonbook_db::repositories::salon::get_salon_by_id(&state.db_pool, salon_id)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::NotFound("Salon not found".to_string()))?;

    let staff = resolve_staff(&state, salon_id, query.staff_id).await?;
    let service = resolve_service(&state, salon_id, query.service_id).await?;

    let reservations = salonbook_db::repositories::reservation::get_reservations_for_staff_day(
        &state.db_pool,
        staff.id,
        query.date,
    )
    .await
    .map_err(salonbook_db::classify_error)?;
    let occupied = occupied_intervals(&reservations)?;

    let slots = scheduling::available_slots(
        &staff.working_hours.0,
        query.date,
        Duration::minutes(service.duration_minutes as i64),
        Duration::minutes(state.config.slot_step_minutes),
        &occupied,
    );

    Ok(Json(AvailableSlotsResponse {
        slots: slots
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect(),
    }))
}
