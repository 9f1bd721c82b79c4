use crate::types::{CondoId, UnitId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UnitDBResponse {
    pub id: UnitId,
    pub unit_name: String,
    pub listing_name: Option<String>,
    pub city: Option<String>,
    pub status: String,
    pub condo_id: Option<CondoId>,
    pub cleaning_fee: Option<Decimal>,
    pub date_started: Option<NaiveDate>,
    pub date_ended: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UnitCreateDBRequest {
    pub unit_name: String,
    pub listing_name: Option<String>,
    pub city: Option<String>,
    pub status: String,
    pub condo_id: Option<CondoId>,
    pub cleaning_fee: Option<Decimal>,
}

/// Unit statuses excluded from "active" listings.
pub const INACTIVE_STATUSES: [&str; 4] = ["inactive", "onboarding", "alor", "internal"];
