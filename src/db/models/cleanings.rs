use crate::types::{BookingId, CleaningId, EmployeeId, UnitId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CleaningStatus {
    Pending,
    Assigned,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CleaningType {
    Checkout,
    MidStay,
    Deep,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CleaningDBResponse {
    pub id: CleaningId,
    pub unit_id: UnitId,
    pub city: String,
    pub booking_id: Option<BookingId>,
    pub reservation_code: Option<String>,
    pub checkout_date: NaiveDate,
    pub cleaning_type: CleaningType,
    pub status: CleaningStatus,
    pub cleaning_cost: Option<Decimal>,
    pub laundry_cost: Option<Decimal>,
    pub o2_collected_fee: Option<Decimal>,
    pub bill_to: Option<String>,
    pub notes: Option<String>,
    pub done_by_employee_id: Option<EmployeeId>,
    pub done_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CleaningCreateDBRequest {
    pub unit_id: UnitId,
    pub city: String,
    pub booking_id: Option<BookingId>,
    pub reservation_code: Option<String>,
    pub checkout_date: NaiveDate,
    pub cleaning_type: CleaningType,
    pub notes: Option<String>,
}

/// Partial update applied with COALESCE; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CleaningUpdateDBRequest {
    pub status: Option<CleaningStatus>,
    pub cleaning_cost: Option<Decimal>,
    pub laundry_cost: Option<Decimal>,
    pub o2_collected_fee: Option<Decimal>,
    pub bill_to: Option<String>,
    pub notes: Option<String>,
    pub done_by_employee_id: Option<EmployeeId>,
}

/// DONE cleaning joined with its unit for the reconciliation month view.
#[derive(Debug, Clone, FromRow)]
pub struct CleaningWithUnitDBResponse {
    #[sqlx(flatten)]
    pub cleaning: CleaningDBResponse,
    pub unit_name: String,
    pub unit_cleaning_fee: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CleaningRateDBResponse {
    pub id: Uuid,
    pub unit_id: UnitId,
    pub amount: Decimal,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReconNoteDBResponse {
    pub id: Uuid,
    pub cleaning_id: Option<CleaningId>,
    pub city: String,
    pub month: String,
    pub resolution: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ReconNoteUpsertDBRequest {
    pub cleaning_id: Option<CleaningId>,
    pub city: String,
    pub month: String,
    pub resolution: Option<String>,
    pub status: Option<String>,
}
