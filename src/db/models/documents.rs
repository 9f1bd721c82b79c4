use crate::types::{DocumentId, TransactionId, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentDBResponse {
    pub id: DocumentId,
    pub unit_id: UnitId,
    pub transaction_id: Option<TransactionId>,
    pub category: String,
    pub filename: String,
    pub storage_key: String,
    pub label: Option<String>,
    pub content_type: Option<String>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DocumentCreateDBRequest {
    pub unit_id: UnitId,
    pub transaction_id: Option<TransactionId>,
    pub category: String,
    pub filename: String,
    pub storage_key: String,
    pub label: Option<String>,
    pub content_type: Option<String>,
    pub uploaded_by: Option<String>,
}
