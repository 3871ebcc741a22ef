use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::WorkingHours;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub name: String,
    pub description: String,
    pub specialties: Vec<String>,
    pub experience_years: i32,
    pub working_hours: WorkingHours,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
