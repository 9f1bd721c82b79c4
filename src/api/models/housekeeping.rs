use crate::db::models::cleanings::{CleaningDBResponse, CleaningStatus, CleaningType};
use crate::types::{BookingId, CleaningId, EmployeeId, UnitId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCleaningsQuery {
    pub city: Option<String>,
    #[param(value_type = Option<Uuid>)]
    pub unit: Option<UnitId>,
    pub status: Option<CleaningStatus>,
    /// YYYY-MM of the checkout date
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningCreateRequest {
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub city: Option<String>,
    #[schema(value_type = Option<Uuid>)]
    pub booking_id: Option<BookingId>,
    pub reservation_code: Option<String>,
    pub checkout_date: NaiveDate,
    pub cleaning_type: Option<CleaningType>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningUpdateRequest {
    pub status: Option<CleaningStatus>,
    pub cleaning_cost: Option<Decimal>,
    pub laundry_cost: Option<Decimal>,
    pub o2_collected_fee: Option<Decimal>,
    pub bill_to: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = Option<Uuid>)]
    pub done_by_employee_id: Option<EmployeeId>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleaningResponse {
    #[schema(value_type = Uuid)]
    pub id: CleaningId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub city: String,
    #[schema(value_type = Option<Uuid>)]
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
    #[schema(value_type = Option<Uuid>)]
    pub done_by_employee_id: Option<EmployeeId>,
    pub done_at: Option<DateTime<Utc>>,
}

impl CleaningResponse {
    pub fn from_db_response(cleaning: &CleaningDBResponse) -> Self {
        Self {
            id: cleaning.id,
            unit_id: cleaning.unit_id,
            city: cleaning.city.clone(),
            booking_id: cleaning.booking_id,
            reservation_code: cleaning.reservation_code.clone(),
            checkout_date: cleaning.checkout_date,
            cleaning_type: cleaning.cleaning_type,
            status: cleaning.status,
            cleaning_cost: cleaning.cleaning_cost,
            laundry_cost: cleaning.laundry_cost,
            o2_collected_fee: cleaning.o2_collected_fee,
            bill_to: cleaning.bill_to.clone(),
            notes: cleaning.notes.clone(),
            done_by_employee_id: cleaning.done_by_employee_id,
            done_at: cleaning.done_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReconcileMonthQuery {
    /// YYYY-MM
    pub month: String,
    pub city: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconNoteRequest {
    #[schema(value_type = Option<Uuid>)]
    pub cleaning_id: Option<CleaningId>,
    pub city: String,
    /// YYYY-MM
    pub month: String,
    pub resolution: Option<String>,
    pub status: Option<String>,
}
