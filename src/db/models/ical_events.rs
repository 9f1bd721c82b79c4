use crate::types::{IcalEventId, UnitId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Calendar event as imported from a unit's ICS feed.
///
/// `dtend` keeps the ICS convention: exclusive end date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IcalEventDBResponse {
    pub id: IcalEventId,
    pub unit_id: UnitId,
    pub uid: Option<String>,
    pub dtstart: NaiveDate,
    pub dtend: NaiveDate,
    pub event_type: Option<String>,
    pub is_block: bool,
    pub summary: Option<String>,
    pub reservation_code: Option<String>,
    pub reservation_url: Option<String>,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IcalEventCreateDBRequest {
    pub unit_id: UnitId,
    pub uid: Option<String>,
    pub dtstart: NaiveDate,
    pub dtend: NaiveDate,
    pub event_type: Option<String>,
    pub is_block: bool,
    pub summary: Option<String>,
    pub reservation_code: Option<String>,
    pub reservation_url: Option<String>,
}
