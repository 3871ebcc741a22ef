//! # Reservation Handlers
//!
//! Booking admission and lifecycle. `create_reservation` is the critical
//! section: it holds the per-`(staff, date)` booking lock across the
//! snapshot-check-insert sequence so concurrent requests for the same
//! staff member serialize, and it maps the database's exclusion-constraint
//! rejection to `SlotUnavailable` as the cross-process backstop.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use salonbook_core::{
    errors::BookingError,
    models::reservation::{
        CancelReservationResponse, CreateReservationRequest, Reservation, ReservationStatus,
        UpdateReservationRequest,
    },
    scheduling,
};
use salonbook_db::repositories::reservation::NewReservation;

use crate::{
    handlers::availability::{occupied_intervals, resolve_service, resolve_staff},
    middleware::{auth::AuthUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn create_reservation(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    salonbook_db::repositories::salon::get_salon_by_id(&state.db_pool, payload.salon_id)
        .await
        .map_err(salonbook_db::classify_error)?
        .ok_or_else(|| BookingError::NotFound("Salon not found".to_string()))?;

    let staff = resolve_staff(&state, payload.salon_id, Some(payload.staff_id)).await?;
    let service = resolve_service(&state, payload.salon_id, payload.service_id).await?;
    let duration = Duration::minutes(service.duration_minutes as i64);
    let start = payload.start();

    // Serialize the snapshot-check-insert against other bookings for the
    // same staff member and day.
    let lock = state.booking_locks.lock_for(staff.id, payload.date);
    let _guard = lock.lock().await;

    let reservations = salonbook_db::repositories::reservation::get_reservations_for_staff_day(
        &state.db_pool,
        staff.id,
        payload.date,
    )
    .await
    .map_err(salonbook_db::classify_error)?;
    let occupied = occupied_intervals(&reservations)?;

    let interval = scheduling::check_admission(
        &staff.working_hours.0,
        &occupied,
        start,
        duration,
        Utc::now(),
    )?;

    let new = NewReservation {
        salon_id: payload.salon_id,
        staff_id: staff.id,
        user_id: user.user_id,
        service_id: service.id,
        start_time: interval.start(),
        end_time: interval.end(),
        notes: payload.notes,
        total_price: service.price,
    };

    let created =
        salonbook_db::repositories::reservation::create_reservation(&state.db_pool, &new)
            .await
            .map_err(|e| {
                if salonbook_db::repositories::reservation::is_overlap_violation(&e) {
                    BookingError::SlotUnavailable(
                        "The selected time is no longer available".to_string(),
                    )
                } else {
                    salonbook_db::classify_error(e)
                }
            })?;

    let reservation = Reservation::try_from(created)?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[axum::debug_handler]
pub async fn list_reservations(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let rows = salonbook_db::repositories::reservation::list_reservations_for_user(
        &state.db_pool,
        user.user_id,
    )
    .await
    .map_err(salonbook_db::classify_error)?;

    let reservations = rows
        .into_iter()
        .map(Reservation::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(reservations))
}

#[axum::debug_handler]
pub async fn get_reservation(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let row = salonbook_db::repositories::reservation::get_reservation_for_user(
        &state.db_pool,
        id,
        user.user_id,
    )
    .await
    .map_err(salonbook_db::classify_error)?
    .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    Ok(Json(Reservation::try_from(row)?))
}

/// Moves a reservation to a new date and start time. The salon, staff and
/// service stay fixed; the new interval goes through the same admission
/// check as a fresh booking, under the same per-`(staff, date)` lock, with
/// the reservation's own current interval excluded from the occupied
/// snapshot so moving within or adjacent to it is allowed.
#[axum::debug_handler]
pub async fn update_reservation(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReservationRequest>,
) -> Result<Json<Reservation>, AppError> {
    let row = salonbook_db::repositories::reservation::get_reservation_for_user(
        &state.db_pool,
        id,
        user.user_id,
    )
    .await
    .map_err(salonbook_db::classify_error)?
    .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    let status = row.status.parse::<ReservationStatus>()?;
    if status == ReservationStatus::Cancelled {
        return Err(AppError(BookingError::InvalidRequest(
            "Cannot reschedule a cancelled reservation".to_string(),
        )));
    }

    let staff = resolve_staff(&state, row.salon_id, Some(row.staff_id)).await?;
    let service = resolve_service(&state, row.salon_id, row.service_id).await?;
    let duration = Duration::minutes(service.duration_minutes as i64);
    let start = payload.start();

    let lock = state.booking_locks.lock_for(staff.id, payload.date);
    let _guard = lock.lock().await;

    let reservations = salonbook_db::repositories::reservation::get_reservations_for_staff_day(
        &state.db_pool,
        staff.id,
        payload.date,
    )
    .await
    .map_err(salonbook_db::classify_error)?;
    // The reservation being moved must not block its own new interval.
    let others: Vec<_> = reservations.into_iter().filter(|r| r.id != id).collect();
    let occupied = occupied_intervals(&others)?;

    let interval = scheduling::check_admission(
        &staff.working_hours.0,
        &occupied,
        start,
        duration,
        Utc::now(),
    )?;

    let updated = salonbook_db::repositories::reservation::reschedule_reservation(
        &state.db_pool,
        id,
        user.user_id,
        interval.start(),
        interval.end(),
        payload.notes.as_deref(),
    )
    .await
    .map_err(|e| {
        if salonbook_db::repositories::reservation::is_overlap_violation(&e) {
            BookingError::SlotUnavailable("The selected time is no longer available".to_string())
        } else {
            salonbook_db::classify_error(e)
        }
    })?
    .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    Ok(Json(Reservation::try_from(updated)?))
}

/// Cancels a reservation: the status flips to `cancelled` and the record
/// is retained. Cancelling an already-cancelled reservation is a no-op
/// success.
#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelReservationResponse>, AppError> {
    let row = salonbook_db::repositories::reservation::get_reservation_for_user(
        &state.db_pool,
        id,
        user.user_id,
    )
    .await
    .map_err(salonbook_db::classify_error)?
    .ok_or_else(|| BookingError::NotFound("Reservation not found".to_string()))?;

    let status = row.status.parse::<ReservationStatus>()?;
    if status != ReservationStatus::Cancelled {
        salonbook_db::repositories::reservation::update_reservation_status(
            &state.db_pool,
            id,
            &ReservationStatus::Cancelled.to_string(),
        )
        .await
        .map_err(salonbook_db::classify_error)?;
    }

    Ok(Json(CancelReservationResponse {
        message: "Reservation cancelled".to_string(),
    }))
}
