use crate::db::models::documents::DocumentDBResponse;
use crate::types::{DocumentId, TransactionId, UnitId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    #[schema(value_type = Uuid)]
    pub id: DocumentId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    #[schema(value_type = Option<Uuid>)]
    pub transaction_id: Option<TransactionId>,
    pub category: String,
    pub filename: String,
    pub label: Option<String>,
    pub content_type: Option<String>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn from_db_response(document: &DocumentDBResponse) -> Self {
        Self {
            id: document.id,
            unit_id: document.unit_id,
            transaction_id: document.transaction_id,
            category: document.category.clone(),
            filename: document.filename.clone(),
            label: document.label.clone(),
            content_type: document.content_type.clone(),
            uploaded_by: document.uploaded_by.clone(),
            uploaded_at: document.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentUploadResponse {
    pub success: bool,
    #[schema(value_type = Uuid)]
    pub id: DocumentId,
    pub filename: String,
    /// True when an existing document for the same transaction + category was
    /// replaced in place
    pub replaced: bool,
}
