//! Payout report import and listings.

use crate::api::models::payouts::{
    ImportReportResponse, ListPayoutsQuery, PayoutHeader, PayoutItemResponse, PayoutItemsEnvelope, PayoutListResponse,
    PayoutResponse, ReservationSummaryResponse, SummaryQuery, SummaryResponse,
};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::handlers::Payouts;
use crate::errors::{Error, Result};
use crate::import::payout_report::import_payout_report;
use crate::types::PayoutId;
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};

/// Pull the first file field out of a multipart body.
async fn read_file_field(multipart: &mut Multipart, field_name: &str) -> Result<Vec<u8>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        if field.name() == Some(field_name) {
            let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read uploaded file: {e}"),
            })?;
            return Ok(bytes.to_vec());
        }
    }
    Err(Error::BadRequest {
        message: "No CSV file uploaded".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/payouts/import-report",
    tag = "payouts",
    summary = "Import an Airbnb payout report CSV",
    request_body(content_type = "multipart/form-data", description = "CSV file under the 'file' field"),
    responses(
        (status = 200, description = "Import counters", body = ImportReportResponse),
        (status = 400, description = "No CSV file uploaded")
    )
)]
pub async fn import_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ImportReportResponse>> {
    require_manager(&current_user)?;

    let csv_bytes = read_file_field(&mut multipart, "file").await?;

    // One transaction per import: a malformed row aborts the whole file
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let result = import_payout_report(&mut tx, &csv_bytes).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!(
        batches = result.batches,
        items = result.items,
        created = result.created,
        "Imported payout report"
    );

    Ok(Json(ImportReportResponse { success: true, result }))
}

#[utoipa::path(
    get,
    path = "/payouts",
    tag = "payouts",
    summary = "List payout batches",
    params(ListPayoutsQuery),
    responses((status = 200, description = "Payout batches, newest first", body = PayoutListResponse))
)]
pub async fn list_payouts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListPayoutsQuery>,
) -> Result<Json<PayoutListResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Payouts::new(&mut conn).list_with_counts(limit, offset).await?;

    Ok(Json(PayoutListResponse {
        success: true,
        data: rows.iter().map(PayoutResponse::from_db_response).collect(),
        limit,
        offset,
    }))
}

#[utoipa::path(
    get,
    path = "/payouts/{id}/items",
    tag = "payouts",
    summary = "List a payout batch's items",
    responses(
        (status = 200, description = "Items with resolved units", body = PayoutItemsEnvelope),
        (status = 404, description = "Payout not found")
    )
)]
pub async fn list_payout_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<PayoutId>,
) -> Result<Json<PayoutItemsEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Payouts::new(&mut conn);

    let payout = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Payout".to_string(),
        id: id.to_string(),
    })?;

    let items = repo.items_with_units(id).await?;

    Ok(Json(PayoutItemsEnvelope {
        success: true,
        data: items.iter().map(|row| PayoutItemResponse::from_db_response(row, &payout)).collect(),
        payout: PayoutHeader {
            id: payout.id,
            reference_code: payout.reference_code.clone(),
            payout_date: payout.payout_date,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/payouts/summary",
    tag = "payouts",
    summary = "Per-reservation payout summary",
    description = "Reservation amounts rolled up with host-remitted tax and adjustments.",
    params(SummaryQuery),
    responses((status = 200, description = "Reservation summary", body = SummaryResponse))
)]
pub async fn reservation_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Payouts::new(&mut conn).reservation_summary(query.from, query.to).await?;

    Ok(Json(SummaryResponse {
        success: true,
        count: rows.len(),
        data: rows.iter().map(ReservationSummaryResponse::from_db_response).collect(),
    }))
}
