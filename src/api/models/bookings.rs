use crate::db::models::bookings::{BookingDBResponse, DateSyncStatus};
use crate::types::{BookingId, UnitId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of a forwarded Airbnb confirmation email.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AirbnbImportRequest {
    #[serde(default)]
    pub guest_name: String,
    #[serde(default)]
    pub body: String,
    /// When the email reached the mailbox; defaults to today
    pub received_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AirbnbImportResponse {
    pub success: bool,
    pub code: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsQuery {
    #[param(value_type = Option<Uuid>)]
    pub unit: Option<UnitId>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[schema(value_type = Uuid)]
    pub id: BookingId,
    #[schema(value_type = Option<Uuid>)]
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
    pub overlap_warning: bool,
}

impl BookingResponse {
    pub fn from_db_response(booking: &BookingDBResponse) -> Self {
        Self {
            id: booking.id,
            unit_id: booking.unit_id,
            unit_name: booking.unit_name.clone(),
            city: booking.city.clone(),
            source: booking.source.clone(),
            confirmation_code: booking.confirmation_code.clone(),
            reservation_code: booking.reservation_code.clone(),
            guest_name: booking.guest_name.clone(),
            status: booking.status.clone(),
            check_in: booking.check_in,
            check_out: booking.check_out,
            guests: booking.guests,
            payout: booking.payout,
            cleaning_fee: booking.cleaning_fee,
            room_fee: booking.room_fee,
            date_sync_status: booking.date_sync_status,
            overlap_warning: booking.overlap_warning,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    pub data: Vec<BookingResponse>,
    pub skip: i64,
    pub limit: i64,
}
