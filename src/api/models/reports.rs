use crate::types::UnitId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UnitMonthQuery {
    #[param(value_type = Uuid)]
    pub unit: UnitId,
    /// YYYY-MM
    pub month: String,
}

/// One booking line of the monthly report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportBookingLine {
    pub guest_name: Option<String>,
    pub source: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub payout: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
}

/// One accounting line of the monthly report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTransactionLine {
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "type")]
    pub tx_type: crate::db::models::transactions::TransactionType,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub gross_revenue: Decimal,
    pub cleaning_fees: Decimal,
    pub charges: Decimal,
    pub payments: Decimal,
    pub net: Decimal,
}

/// Monthly per-unit owner report data. Rendering is the client's concern.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitMonthReport {
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub unit_name: String,
    pub month: String,
    pub bookings: Vec<ReportBookingLine>,
    pub transactions: Vec<ReportTransactionLine>,
    pub totals: ReportTotals,
}
