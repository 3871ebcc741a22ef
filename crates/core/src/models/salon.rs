use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{service::Service, staff::Staff};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salon {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSalonRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSalonRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSalonsResponse {
    pub data: Vec<Salon>,
    pub page: i64,
    pub limit: i64,
}

/// Salon detail including its bookable staff and service menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSalonResponse {
    #[serde(flatten)]
    pub salon: Salon,
    pub staff: Vec<Staff>,
    pub services: Vec<Service>,
}
