use crate::types::{TransactionId, UnitId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, utoipa::ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Charge,
    Payment,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionDBResponse {
    pub id: TransactionId,
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub tx_type: TransactionType,
    pub cost_center: Option<String>,
    pub transaction_code: Option<String>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TransactionCreateDBRequest {
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub tx_type: TransactionType,
    pub cost_center: Option<String>,
    pub transaction_code: Option<String>,
    pub comments: Option<String>,
}
