use crate::types::{PayoutId, PayoutItemId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutDBResponse {
    pub id: PayoutId,
    pub reference_code: String,
    pub payout_date: Option<NaiveDate>,
    pub arriving_by: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payout_method: Option<String>,
    pub imported_at: DateTime<Utc>,
}

/// Payout batch joined with its item count, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutWithCountDBResponse {
    #[sqlx(flatten)]
    pub payout: PayoutDBResponse,
    pub items_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutItemDBResponse {
    pub id: PayoutItemId,
    pub payout_id: PayoutId,
    pub line_type: String,
    pub confirmation_code: Option<String>,
    pub listing: Option<String>,
    pub guest_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub amount: Option<Decimal>,
    pub gross_earnings: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub imported_at: DateTime<Utc>,
}

/// Payout item joined to the unit resolved through the booking's
/// confirmation code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutItemWithUnitDBResponse {
    #[sqlx(flatten)]
    pub item: PayoutItemDBResponse,
    pub unit_name: Option<String>,
}

/// One reservation rolled up with its host-remitted tax and adjustments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReservationSummaryDBResponse {
    pub unit_name: Option<String>,
    pub listing: Option<String>,
    pub confirmation_code: Option<String>,
    pub guest_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub gross_earnings: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub reservation_amount: Option<Decimal>,
    pub host_remitted_tax_amount: Decimal,
    pub adj_amount: Decimal,
    pub payout_total: Decimal,
    pub currency: Option<String>,
}

/// Upsert payload for a payout batch header row.
#[derive(Debug, Clone, Default)]
pub struct PayoutUpsertDBRequest {
    pub reference_code: String,
    pub payout_date: Option<NaiveDate>,
    pub arriving_by: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payout_method: Option<String>,
}

/// Upsert payload for a payout line item.
#[derive(Debug, Clone, Default)]
pub struct PayoutItemUpsertDBRequest {
    pub payout_id: PayoutId,
    pub line_type: String,
    pub confirmation_code: Option<String>,
    pub listing: Option<String>,
    pub guest_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub amount: Option<Decimal>,
    pub gross_earnings: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee: Option<Decimal>,
    pub currency: Option<String>,
}
