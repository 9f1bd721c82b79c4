use crate::types::{CashLedgerEntryId, EmployeeId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text")]
pub enum LedgerStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text")]
pub enum LedgerEntryType {
    Expense,
    Reimbursement,
    CashAdvance,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CashLedgerEntryDBResponse {
    pub id: CashLedgerEntryId,
    pub code: String,
    pub employee_id: EmployeeId,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub division: Option<String>,
    pub city: Option<String>,
    pub cost_centre: Option<String>,
    pub notes: Option<String>,
    pub admin_comment: Option<String>,
    pub status: LedgerStatus,
    pub entry_date: Option<NaiveDate>,
    pub allocation_type: Option<String>,
    pub allocation_code: Option<String>,
    pub allocated_at: Option<DateTime<Utc>>,
    pub allocated_by: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CashLedgerEntryCreateDBRequest {
    pub code: String,
    pub employee_id: EmployeeId,
    pub entry_type: LedgerEntryType,
    pub amount: Decimal,
    pub division: Option<String>,
    pub city: Option<String>,
    pub cost_centre: Option<String>,
    pub notes: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub status: LedgerStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CashLedgerEntryUpdateDBRequest {
    pub entry_type: Option<LedgerEntryType>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub admin_comment: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub status: Option<LedgerStatus>,
}
