use crate::db::models::cash_ledger::{CashLedgerEntryDBResponse, LedgerEntryType, LedgerStatus};
use crate::types::{CashLedgerEntryId, EmployeeId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListLedgerQuery {
    #[serde(rename = "employeeId")]
    #[param(value_type = Option<Uuid>)]
    pub employee_id: Option<EmployeeId>,
    pub status: Option<LedgerStatus>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// YYYY-MM
    pub month: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerCreateRequest {
    #[schema(value_type = Option<Uuid>)]
    pub employee_id: Option<EmployeeId>,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerUpdateRequest {
    #[serde(rename = "type")]
    pub entry_type: Option<LedgerEntryType>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub admin_comment: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<LedgerStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub allocation_type: String,
    pub allocation_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    #[schema(value_type = Uuid)]
    pub id: CashLedgerEntryId,
    pub code: String,
    #[schema(value_type = Uuid)]
    pub employee_id: EmployeeId,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub division: Option<String>,
    pub city: Option<String>,
    pub cost_centre: Option<String>,
    pub notes: Option<String>,
    pub admin_comment: Option<String>,
    pub status: LedgerStatus,
    pub date: Option<NaiveDate>,
    pub allocation_type: Option<String>,
    pub allocation_code: Option<String>,
    pub allocated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntryResponse {
    pub fn from_db_response(entry: &CashLedgerEntryDBResponse) -> Self {
        Self {
            id: entry.id,
            code: entry.code.clone(),
            employee_id: entry.employee_id,
            entry_type: entry.entry_type,
            amount: entry.amount,
            division: entry.division.clone(),
            city: entry.city.clone(),
            cost_centre: entry.cost_centre.clone(),
            notes: entry.notes.clone(),
            admin_comment: entry.admin_comment.clone(),
            status: entry.status,
            date: entry.entry_date,
            allocation_type: entry.allocation_type.clone(),
            allocation_code: entry.allocation_code.clone(),
            allocated_at: entry.allocated_at,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerRowEnvelope {
    pub success: bool,
    pub row: LedgerEntryResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerListEnvelope {
    pub success: bool,
    pub rows: Vec<LedgerEntryResponse>,
}
