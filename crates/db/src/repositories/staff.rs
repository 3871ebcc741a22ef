use crate::models::DbStaff;
use eyre::Result;
use salonbook_core::scheduling::WorkingHours;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const STAFF_COLUMNS: &str = "id, salon_id, name, description, specialties, experience_years, \
                             working_hours, is_active, created_at, updated_at";

pub async fn create_staff(
    pool: &Pool<Postgres>,
    salon_id: Uuid,
    name: &str,
    description: &str,
    specialties: &[String],
    experience_years: i32,
    working_hours: &WorkingHours,
) -> Result<DbStaff> {
    let staff = sqlx::query_as::<_, DbStaff>(&format!(
        r#"
        INSERT INTO staff (salon_id, name, description, specialties, experience_years, working_hours)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {STAFF_COLUMNS}
        "#,
    ))
    .bind(salon_id)
    .bind(name)
    .bind(description)
    .bind(specialties)
    .bind(experience_years)
    .bind(Json(working_hours))
    .fetch_one(pool)
    .await?;

    tracing::debug!("Staff created: id={} salon={}", staff.id, salon_id);
    Ok(staff)
}

pub async fn get_staff_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbStaff>> {
    let staff = sqlx::query_as::<_, DbStaff>(&format!(
        r#"
        SELECT {STAFF_COLUMNS}
        FROM staff
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(staff)
}

pub async fn get_staff_by_salon(pool: &Pool<Postgres>, salon_id: Uuid) -> Result<Vec<DbStaff>> {
    let staff = sqlx::query_as::<_, DbStaff>(&format!(
        r#"
        SELECT {STAFF_COLUMNS}
        FROM staff
        WHERE salon_id = $1 AND is_active AND deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    ))
    .bind(salon_id)
    .fetch_all(pool)
    .await?;

    Ok(staff)
}

/// Fallback used by the slots endpoint when no staff member is specified.
pub async fn get_first_active_staff(
    pool: &Pool<Postgres>,
    salon_id: Uuid,
) -> Result<Option<DbStaff>> {
    let staff = sqlx::query_as::<_, DbStaff>(&format!(
        r#"
        SELECT {STAFF_COLUMNS}
        FROM staff
        WHERE salon_id = $1 AND is_active AND deleted_at IS NULL
        ORDER BY created_at ASC
        LIMIT 1
        "#,
    ))
    .bind(salon_id)
    .fetch_optional(pool)
    .await?;

    Ok(staff)
}
