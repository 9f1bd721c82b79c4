use crate::db::models::payouts::{
    PayoutDBResponse, PayoutItemWithUnitDBResponse, PayoutWithCountDBResponse, ReservationSummaryDBResponse,
};
use crate::import::payout_report::ImportOutcome;
use crate::types::{PayoutId, PayoutItemId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportReportResponse {
    pub success: bool,
    pub result: ImportOutcome,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPayoutsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutResponse {
    #[schema(value_type = Uuid)]
    pub id: PayoutId,
    pub reference_code: String,
    pub payout_date: Option<NaiveDate>,
    pub arriving_by: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub payout_method: Option<String>,
    pub items_count: i64,
}

impl PayoutResponse {
    pub fn from_db_response(row: &PayoutWithCountDBResponse) -> Self {
        Self {
            id: row.payout.id,
            reference_code: row.payout.reference_code.clone(),
            payout_date: row.payout.payout_date,
            arriving_by: row.payout.arriving_by,
            amount: row.payout.amount,
            currency: row.payout.currency.clone(),
            payout_method: row.payout.payout_method.clone(),
            items_count: row.items_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayoutListResponse {
    pub success: bool,
    pub data: Vec<PayoutResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutItemResponse {
    #[schema(value_type = Uuid)]
    pub id: PayoutItemId,
    pub line_type: String,
    pub confirmation_code: Option<String>,
    pub listing: Option<String>,
    pub unit_name: Option<String>,
    pub guest_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub nights: Option<i32>,
    pub amount: Option<Decimal>,
    /// The amount again, when the line is an adjustment
    pub adj_amount: Option<Decimal>,
    pub gross_earnings: Option<Decimal>,
    pub cleaning_fee: Option<Decimal>,
    pub service_fee: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub currency: Option<String>,
    #[schema(value_type = Uuid)]
    pub payout_id: PayoutId,
    pub reference_code: String,
}

impl PayoutItemResponse {
    pub fn from_db_response(row: &PayoutItemWithUnitDBResponse, payout: &PayoutDBResponse) -> Self {
        let is_adjustment = row.item.line_type.to_lowercase().contains("adjustment");
        Self {
            id: row.item.id,
            line_type: row.item.line_type.clone(),
            confirmation_code: row.item.confirmation_code.clone(),
            listing: row.item.listing.clone(),
            unit_name: row.unit_name.clone(),
            guest_name: row.item.guest_name.clone(),
            start_date: row.item.start_date,
            end_date: row.item.end_date,
            nights: row.item.nights,
            amount: row.item.amount,
            adj_amount: if is_adjustment { row.item.amount } else { None },
            gross_earnings: row.item.gross_earnings,
            cleaning_fee: row.item.cleaning_fee,
            service_fee: row.item.service_fee,
            tax_amount: row.item.tax_amount,
            currency: row.item.currency.clone(),
            payout_id: payout.id,
            reference_code: payout.reference_code.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutItemsEnvelope {
    pub success: bool,
    pub data: Vec<PayoutItemResponse>,
    pub payout: PayoutHeader,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutHeader {
    #[schema(value_type = Uuid)]
    pub id: PayoutId,
    pub reference_code: String,
    pub payout_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummaryResponse {
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

impl ReservationSummaryResponse {
    pub fn from_db_response(row: &ReservationSummaryDBResponse) -> Self {
        Self {
            unit_name: row.unit_name.clone(),
            listing: row.listing.clone(),
            confirmation_code: row.confirmation_code.clone(),
            guest_name: row.guest_name.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            nights: row.nights,
            gross_earnings: row.gross_earnings,
            cleaning_fee: row.cleaning_fee,
            service_fee: row.service_fee,
            tax_amount: row.tax_amount,
            reservation_amount: row.reservation_amount,
            host_remitted_tax_amount: row.host_remitted_tax_amount,
            adj_amount: row.adj_amount,
            payout_total: row.payout_total,
            currency: row.currency.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ReservationSummaryResponse>,
}
