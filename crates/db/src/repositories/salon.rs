use crate::models::DbSalon;
use eyre::Result;
use salonbook_core::models::salon::{CreateSalonRequest, UpdateSalonRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_salon(pool: &Pool<Postgres>, req: &CreateSalonRequest) -> Result<DbSalon> {
    let salon = sqlx::query_as::<_, DbSalon>(
        r#"
        INSERT INTO salons (name, description, address, phone, email, website, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, description, address, phone, email, website, image_url,
                  created_at, updated_at
        "#,
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(&req.website)
    .bind(&req.image_url)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Salon created: id={}", salon.id);
    Ok(salon)
}

pub async fn get_salon_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbSalon>> {
    let salon = sqlx::query_as::<_, DbSalon>(
        r#"
        SELECT id, name, description, address, phone, email, website, image_url,
               created_at, updated_at
        FROM salons
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(salon)
}

pub async fn list_salons(
    pool: &Pool<Postgres>,
    page: i64,
    limit: i64,
    search: Option<&str>,
) -> Result<Vec<DbSalon>> {
    let offset = (page - 1).max(0) * limit;
    let pattern = search.map(|s| format!("%{}%", s));

    let salons = sqlx::query_as::<_, DbSalon>(
        r#"
        SELECT id, name, description, address, phone, email, website, image_url,
               created_at, updated_at
        FROM salons
        WHERE deleted_at IS NULL
          AND ($3::text IS NULL OR name ILIKE $3 OR address ILIKE $3)
        ORDER BY created_at ASC
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(offset)
    .bind(limit)
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(salons)
}

pub async fn update_salon(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateSalonRequest,
) -> Result<Option<DbSalon>> {
    let salon = sqlx::query_as::<_, DbSalon>(
        r#"
        UPDATE salons
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            address = COALESCE($4, address),
            phone = COALESCE($5, phone),
            email = COALESCE($6, email),
            website = COALESCE($7, website),
            image_url = COALESCE($8, image_url),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, description, address, phone, email, website, image_url,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.address)
    .bind(&req.phone)
    .bind(&req.email)
    .bind(&req.website)
    .bind(&req.image_url)
    .fetch_optional(pool)
    .await?;

    Ok(salon)
}

/// Soft delete: the record is retained with `deleted_at` set.
pub async fn delete_salon(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE salons
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
