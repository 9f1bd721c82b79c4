use crate::types::{BookingId, IcalEventId, UnitId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outcome of the last booking/iCal comparison for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DateSyncStatus {
    None,
    Matched,
    Conflict,
    SuspectedCancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingDBResponse {
    pub id: BookingId,
    pub unit_id: Option<UnitId>,
    pub unit_name: Option<String>,
    pub city: Option<String>,
    pub source: String,
    pub confirmation_code: Option<String>,
    pub reservation_code: Option<String>,
    pub guest_name: Option<String>,
    pub status: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub room_fee: Option<Decimal>,
    pub date_sync_status: DateSyncStatus,
    pub ical_event_id: Option<IcalEventId>,
    pub last_ical_sync_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_updated_via: Option<String>,
    pub overlap_warning: bool,
    pub ical_ack_signature: Option<String>,
    pub ical_ack_at: Option<DateTime<Utc>>,
    pub ical_ack_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingCreateDBRequest {
    pub unit_id: Option<UnitId>,
    pub unit_name: Option<String>,
    pub city: Option<String>,
    pub source: String,
    pub confirmation_code: Option<String>,
    pub reservation_code: Option<String>,
    pub guest_name: Option<String>,
    pub status: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub room_fee: Option<Decimal>,
}

/// Reconciliation writeback for one booking: link, status, audit stamps.
#[derive(Debug, Clone)]
pub struct BookingSyncDBRequest {
    pub booking_id: BookingId,
    pub date_sync_status: DateSyncStatus,
    pub ical_event_id: Option<IcalEventId>,
    pub overlap_warning: Option<bool>,
    pub last_updated_via: Option<String>,
}
