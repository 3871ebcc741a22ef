use crate::models::DbService;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_service(
    pool: &Pool<Postgres>,
    salon_id: Uuid,
    name: &str,
    description: &str,
    price: i32,
    duration_minutes: i32,
    category: &str,
) -> Result<DbService> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (salon_id, name, description, price, duration_minutes, category)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, salon_id, name, description, price, duration_minutes, category,
                  is_active, created_at, updated_at
        "#,
    )
    .bind(salon_id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(duration_minutes)
    .bind(category)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, salon_id, name, description, price, duration_minutes, category,
               is_active, created_at, updated_at
        FROM services
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

pub async fn get_services_by_salon(
    pool: &Pool<Postgres>,
    salon_id: Uuid,
) -> Result<Vec<DbService>> {
    let services = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, salon_id, name, description, price, duration_minutes, category,
               is_active, created_at, updated_at
        FROM services
        WHERE salon_id = $1 AND is_active AND deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .bind(salon_id)
    .fetch_all(pool)
    .await?;

    Ok(services)
}
