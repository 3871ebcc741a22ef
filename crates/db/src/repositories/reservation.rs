use crate::models::DbReservation;
use chrono::{Duration, NaiveDate};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = "id, salon_id, staff_id, user_id, service_id, start_time, \
                                   end_time, status, notes, total_price, created_at, updated_at";

/// Fields for a reservation about to be inserted; the id, timestamps and
/// the initial `confirmed` status come from the database.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub salon_id: Uuid,
    pub staff_id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub notes: String,
    pub total_price: i32,
}

/// Inserts a confirmed reservation. The insert is a single atomic
/// statement; if it races another booking for the same staff interval, the
/// `no_staff_overlap` exclusion constraint rejects it and the error is
/// recognizable via [`is_overlap_violation`].
pub async fn create_reservation(
    pool: &Pool<Postgres>,
    new: &NewReservation,
) -> Result<DbReservation> {
    let reservation = sqlx::query_as::<_, DbReservation>(&format!(
        r#"
        INSERT INTO reservations
            (salon_id, staff_id, user_id, service_id, start_time, end_time, notes, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {RESERVATION_COLUMNS}
        "#,
    ))
    .bind(new.salon_id)
    .bind(new.staff_id)
    .bind(new.user_id)
    .bind(new.service_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(&new.notes)
    .bind(new.total_price)
    .fetch_one(pool)
    .await?;

    tracing::debug!(
        "Reservation created: id={} staff={} start={}",
        reservation.id,
        reservation.staff_id,
        reservation.start_time
    );
    Ok(reservation)
}

/// True when the report wraps the exclusion-constraint rejection of an
/// overlapping booking (a lost race, not a system fault).
pub fn is_overlap_violation(err: &eyre::Report) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .map(|code| code == "23P01")
        .unwrap_or(false)
}

/// All time-occupying reservations for one staff member on one UTC day,
/// ordered by start. Cancelled reservations never block and are excluded
/// here; this is the snapshot the availability engine works from.
pub async fn get_reservations_for_staff_day(
    pool: &Pool<Postgres>,
    staff_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbReservation>> {
    let day_start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);

    let reservations = sqlx::query_as::<_, DbReservation>(&format!(
        r#"
        SELECT {RESERVATION_COLUMNS}
        FROM reservations
        WHERE staff_id = $1
          AND start_time >= $2 AND start_time < $3
          AND status <> 'cancelled'
        ORDER BY start_time ASC
        "#,
    ))
    .bind(staff_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

pub async fn list_reservations_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<DbReservation>> {
    let reservations = sqlx::query_as::<_, DbReservation>(&format!(
        r#"
        SELECT {RESERVATION_COLUMNS}
        FROM reservations
        WHERE user_id = $1
        ORDER BY start_time DESC
        "#,
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reservations)
}

/// Owner-scoped lookup: returns nothing unless the reservation belongs to
/// the requesting user.
pub async fn get_reservation_for_user(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbReservation>> {
    let reservation = sqlx::query_as::<_, DbReservation>(&format!(
        r#"
        SELECT {RESERVATION_COLUMNS}
        FROM reservations
        WHERE id = $1 AND user_id = $2
        "#,
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(reservation)
}

/// Moves an owner's reservation to a new interval, optionally replacing the
/// notes. Cancelled reservations cannot be moved. The update is a single
/// atomic statement; a race with another booking for the new interval trips
/// the `no_staff_overlap` constraint, recognizable via
/// [`is_overlap_violation`].
pub async fn reschedule_reservation(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    notes: Option<&str>,
) -> Result<Option<DbReservation>> {
    let reservation = sqlx::query_as::<_, DbReservation>(&format!(
        r#"
        UPDATE reservations
        SET start_time = $3,
            end_time = $4,
            notes = COALESCE($5, notes),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND status <> 'cancelled'
        RETURNING {RESERVATION_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(user_id)
    .bind(start_time)
    .bind(end_time)
    .bind(notes)
    .fetch_optional(pool)
    .await?;

    if let Some(reservation) = &reservation {
        tracing::debug!(
            "Reservation rescheduled: id={} start={}",
            reservation.id,
            reservation.start_time
        );
    }
    Ok(reservation)
}

/// Flips a reservation's status. Returns false when no such row exists.
/// The record itself is never deleted; history is retained.
pub async fn update_reservation_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reservations
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
