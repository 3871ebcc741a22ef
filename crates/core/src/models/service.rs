use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in the salon's currency minor-free unit (yen in the seed data).
    pub price: i32,
    pub duration_minutes: i32,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
