//! Unit document storage: upload with replace-in-place, listing, delete.

use crate::api::models::documents::{DocumentResponse, DocumentUploadResponse};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::file_storage::FileStorageRequest;
use crate::db::handlers::{Documents, Transactions, Units};
use crate::db::models::documents::DocumentCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::{DocumentId, TransactionId, UnitId};
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate, Utc};

#[derive(Default)]
struct DocumentUploadForm {
    unit: Option<UnitId>,
    transaction: Option<TransactionId>,
    category: Option<String>,
    description: Option<String>,
    date_for_name: Option<NaiveDate>,
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Option<Vec<u8>>,
}

async fn read_upload_form(multipart: &mut Multipart, max_bytes: usize) -> Result<DocumentUploadForm> {
    let mut form = DocumentUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "document" => {
                let filename = field.file_name().unwrap_or("document.bin").to_string();
                let content_type = field
                    .content_type()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());
                let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read document: {e}"),
                })?;
                if bytes.len() > max_bytes {
                    return Err(Error::BadRequest {
                        message: format!("Document exceeds the maximum upload size of {max_bytes} bytes"),
                    });
                }
                form.filename = Some(filename);
                form.content_type = Some(content_type);
                form.bytes = Some(bytes.to_vec());
            }
            other => {
                let value = field.text().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read field {other}: {e}"),
                })?;
                match other {
                    "unit" => form.unit = value.parse().ok(),
                    "transaction" => form.transaction = value.parse().ok(),
                    "category" => form.category = Some(value),
                    "description" => form.description = Some(value),
                    "dateForName" => form.date_for_name = value.parse().ok(),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/documents",
    tag = "documents",
    summary = "Upload a unit document",
    description = "A new upload for a transaction + category that already has a document replaces it in place, keeping the row id.",
    request_body(content_type = "multipart/form-data", description = "Document file plus unit/transaction/category fields"),
    responses(
        (status = 201, description = "Document stored", body = DocumentUploadResponse),
        (status = 200, description = "Existing document replaced in place", body = DocumentUploadResponse),
        (status = 400, description = "Missing document or unit"),
        (status = 404, description = "Unit or transaction not found")
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentUploadResponse>)> {
    require_manager(&current_user)?;

    let form = read_upload_form(&mut multipart, state.config.max_upload_bytes).await?;

    let bytes = form.bytes.ok_or_else(|| Error::BadRequest {
        message: "No document provided".to_string(),
    })?;
    let unit_id = form.unit.ok_or_else(|| Error::BadRequest {
        message: "Missing unit".to_string(),
    })?;
    let category = form.category.filter(|c| !c.is_empty()).unwrap_or_else(|| "General".to_string());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;
    if let Some(transaction_id) = form.transaction {
        Transactions::new(&mut conn)
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| Error::NotFound {
                resource: "Transaction".to_string(),
                id: transaction_id.to_string(),
            })?;
    }

    // Documents are keyed into storage by the month they belong to (YYMM)
    let date_for_name = form.date_for_name.unwrap_or_else(|| Utc::now().date_naive());
    let key_prefix = format!("documents/{:02}{:02}", date_for_name.year() % 100, date_for_name.month());

    let filename = form.filename.unwrap_or_else(|| "document.bin".to_string());
    let stored = state
        .file_storage
        .store(FileStorageRequest {
            content: bytes,
            content_type: form.content_type.clone().unwrap_or_else(|| "application/octet-stream".to_string()),
            key_prefix,
            filename: filename.clone(),
        })
        .await?;

    let create_request = DocumentCreateDBRequest {
        unit_id,
        transaction_id: form.transaction,
        category: category.clone(),
        filename,
        storage_key: stored.storage_key,
        label: form.description.filter(|d| !d.is_empty()),
        content_type: form.content_type,
        uploaded_by: Some(current_user.username.clone()),
    };

    let mut repo = Documents::new(&mut conn);

    // Replace-in-place: a transaction + category pair holds at most one
    // document. The row keeps its id so references elsewhere stay valid.
    if let Some(transaction_id) = form.transaction {
        if let Some(existing) = repo.find_for_transaction_category(transaction_id, &category).await? {
            let old_key = existing.storage_key.clone();
            let replaced = repo.replace_in_place(existing.id, &create_request).await?;

            // Best effort: remove the superseded object
            if old_key != replaced.storage_key {
                if let Err(e) = state.file_storage.delete(&old_key).await {
                    tracing::warn!("Failed to delete replaced storage object {old_key}: {e}");
                }
            }

            return Ok((
                StatusCode::OK,
                Json(DocumentUploadResponse {
                    success: true,
                    id: replaced.id,
                    filename: replaced.filename,
                    replaced: true,
                }),
            ));
        }
    }

    let document = repo.create(&create_request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DocumentUploadResponse {
            success: true,
            id: document.id,
            filename: document.filename,
            replaced: false,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/units/{id}/documents",
    tag = "documents",
    summary = "List a unit's documents",
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<DocumentResponse>),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn list_documents(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
) -> Result<Json<Vec<DocumentResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let documents = Documents::new(&mut conn).list_for_unit(unit_id).await?;
    Ok(Json(documents.iter().map(DocumentResponse::from_db_response).collect()))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "documents",
    summary = "Delete a document",
    description = "Removes the stored object (best effort) and the row.",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<DocumentId>,
) -> Result<Json<serde_json::Value>> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Documents::new(&mut conn);

    let document = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Document".to_string(),
        id: id.to_string(),
    })?;

    // Storage failures should not strand the metadata row
    if let Err(e) = state.file_storage.delete(&document.storage_key).await {
        tracing::warn!("Failed to delete storage object {}: {e}", document.storage_key);
    }

    repo.delete(id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
