use crate::types::CondoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CondoDBResponse {
    pub id: CondoId,
    pub condo_name: String,
    pub city: String,
    pub door_code: Option<String>,
    pub notes: Option<String>,
    pub google_maps: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CondoCreateDBRequest {
    pub condo_name: String,
    pub city: String,
    pub door_code: Option<String>,
    pub notes: Option<String>,
    pub google_maps: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CondoUpdateDBRequest {
    pub city: Option<String>,
    pub door_code: Option<String>,
    pub notes: Option<String>,
    pub google_maps: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
}
