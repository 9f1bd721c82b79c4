use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One parsed Airbnb confirmation email.
///
/// Check-in/check-out stay as the raw "5 May" strings scraped from the email
/// body; resolving them against a year happens when the row is linked to a
/// booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailImportDBResponse {
    pub id: Uuid,
    pub booking_date: NaiveDate,
    pub source: String,
    pub confirmation_code: String,
    pub guest_name: String,
    pub listing_name: Option<String>,
    pub guests: i32,
    pub check_in: String,
    pub check_out: String,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub room_fee: Option<Decimal>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EmailImportCreateDBRequest {
    pub booking_date: NaiveDate,
    pub source: String,
    pub confirmation_code: String,
    pub guest_name: String,
    pub listing_name: Option<String>,
    pub guests: i32,
    pub check_in: String,
    pub check_out: String,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub room_fee: Option<Decimal>,
}
