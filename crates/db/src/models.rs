use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use salonbook_core::errors::BookingError;
use salonbook_core::models::{
    reservation::{Reservation, ReservationStatus},
    salon::Salon,
    service::Service,
    staff::Staff,
    user::User,
};
use salonbook_core::scheduling::WorkingHours;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSalon {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbSalon> for Salon {
    fn from(row: DbSalon) -> Self {
        Salon {
            id: row.id,
            name: row.name,
            description: row.description,
            address: row.address,
            phone: row.phone,
            email: row.email,
            website: row.website,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStaff {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub name: String,
    pub description: String,
    pub specialties: Vec<String>,
    pub experience_years: i32,
    /// Validated on decode: invalid JSON in this column fails the query
    /// instead of producing a silently-empty schedule.
    pub working_hours: Json<WorkingHours>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbStaff> for Staff {
    fn from(row: DbStaff) -> Self {
        Staff {
            id: row.id,
            salon_id: row.salon_id,
            name: row.name,
            description: row.description,
            specialties: row.specialties,
            experience_years: row.experience_years,
            working_hours: row.working_hours.0,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub duration_minutes: i32,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            salon_id: row.salon_id,
            name: row.name,
            description: row.description,
            price: row.price,
            duration_minutes: row.duration_minutes,
            category: row.category,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReservation {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub staff_id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: String,
    pub total_price: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbReservation> for Reservation {
    type Error = BookingError;

    fn try_from(row: DbReservation) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            salon_id: row.salon_id,
            staff_id: row.staff_id,
            user_id: row.user_id,
            service_id: row.service_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: ReservationStatus::from_str(&row.status)?,
            notes: row.notes,
            total_price: row.total_price,
            created_at: row.created_at,
        })
    }
}
