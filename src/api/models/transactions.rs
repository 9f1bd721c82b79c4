use crate::db::models::transactions::{TransactionDBResponse, TransactionType};
use crate::types::{TransactionId, UnitId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTransactionsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreateRequest {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    pub cost_center: Option<String>,
    pub transaction_code: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[schema(value_type = Uuid)]
    pub id: TransactionId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub cost_center: Option<String>,
    pub transaction_code: Option<String>,
    pub comments: Option<String>,
}

impl TransactionResponse {
    pub fn from_db_response(tx: &TransactionDBResponse) -> Self {
        Self {
            id: tx.id,
            unit_id: tx.unit_id,
            date: tx.date,
            description: tx.description.clone(),
            amount: tx.amount,
            tx_type: tx.tx_type,
            cost_center: tx.cost_center.clone(),
            transaction_code: tx.transaction_code.clone(),
            comments: tx.comments.clone(),
        }
    }
}
