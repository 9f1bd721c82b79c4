//! Housekeeping cleanings and reconciliation.

use crate::api::models::housekeeping::{
    CleaningCreateRequest, CleaningResponse, CleaningUpdateRequest, ListCleaningsQuery, ReconNoteRequest, ReconcileMonthQuery,
};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::handlers::{Cleanings, Units, cleanings::CleaningFilter};
use crate::db::models::cleanings::{CleaningCreateDBRequest, CleaningType, CleaningUpdateDBRequest, ReconNoteUpsertDBRequest};
use crate::errors::{Error, Result};
use crate::reconcile::housekeeping::{MonthView, month_bounds, month_view};
use crate::types::CleaningId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/housekeeping/cleanings",
    tag = "housekeeping",
    summary = "List cleanings",
    params(ListCleaningsQuery),
    responses(
        (status = 200, description = "Cleanings by checkout date", body = Vec<CleaningResponse>),
        (status = 400, description = "Invalid month")
    )
)]
pub async fn list_cleanings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCleaningsQuery>,
) -> Result<Json<Vec<CleaningResponse>>> {
    let month = match &query.month {
        Some(month) => Some(month_bounds(month).ok_or_else(|| Error::BadRequest {
            message: "Invalid month format. Expected YYYY-MM.".to_string(),
        })?),
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cleanings = Cleanings::new(&mut conn)
        .list(&CleaningFilter {
            city: query.city,
            unit_id: query.unit,
            status: query.status,
            month,
        })
        .await?;

    Ok(Json(cleanings.iter().map(CleaningResponse::from_db_response).collect()))
}

#[utoipa::path(
    post,
    path = "/housekeeping/cleanings",
    tag = "housekeeping",
    summary = "Schedule a cleaning",
    request_body = CleaningCreateRequest,
    responses(
        (status = 201, description = "Created cleaning", body = CleaningResponse),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn create_cleaning(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CleaningCreateRequest>,
) -> Result<(StatusCode, Json<CleaningResponse>)> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let unit = Units::new(&mut conn).get_by_id(request.unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: request.unit_id.to_string(),
    })?;

    // City falls back to the unit's city so the reconcile view finds the row
    let city = request
        .city
        .or(unit.city)
        .ok_or_else(|| Error::BadRequest {
            message: "City is required when the unit has none".to_string(),
        })?;

    let cleaning = Cleanings::new(&mut conn)
        .create(&CleaningCreateDBRequest {
            unit_id: request.unit_id,
            city,
            booking_id: request.booking_id,
            reservation_code: request.reservation_code,
            checkout_date: request.checkout_date,
            cleaning_type: request.cleaning_type.unwrap_or(CleaningType::Checkout),
            notes: request.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CleaningResponse::from_db_response(&cleaning))))
}

#[utoipa::path(
    patch,
    path = "/housekeeping/cleanings/{id}",
    tag = "housekeeping",
    summary = "Update a cleaning",
    description = "Status and cost updates; moving to done stamps completion once.",
    request_body = CleaningUpdateRequest,
    responses(
        (status = 200, description = "Updated cleaning", body = CleaningResponse),
        (status = 404, description = "Cleaning not found")
    )
)]
pub async fn update_cleaning(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CleaningId>,
    Json(request): Json<CleaningUpdateRequest>,
) -> Result<Json<CleaningResponse>> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let cleaning = Cleanings::new(&mut conn)
        .update(
            id,
            &CleaningUpdateDBRequest {
                status: request.status,
                cleaning_cost: request.cleaning_cost,
                laundry_cost: request.laundry_cost,
                o2_collected_fee: request.o2_collected_fee,
                bill_to: request.bill_to,
                notes: request.notes,
                done_by_employee_id: request.done_by_employee_id,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Cleaning".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(CleaningResponse::from_db_response(&cleaning)))
}

#[utoipa::path(
    get,
    path = "/housekeeping/reconcile",
    tag = "housekeeping",
    summary = "Housekeeping month view",
    description = "Charged vs expected vs cost for every DONE cleaning of a city and month.",
    params(ReconcileMonthQuery),
    responses(
        (status = 200, description = "Month view with totals", body = MonthView),
        (status = 400, description = "Invalid month")
    )
)]
pub async fn reconcile_month(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReconcileMonthQuery>,
) -> Result<Json<MonthView>> {
    if month_bounds(&query.month).is_none() {
        return Err(Error::BadRequest {
            message: "Invalid month (YYYY-MM)".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let view = month_view(&mut conn, &query.month, &query.city).await?;

    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/housekeeping/recon-notes",
    tag = "housekeeping",
    summary = "Upsert a reconciliation note",
    description = "One note per (cleaning, city, month); repeated saves update it.",
    request_body = ReconNoteRequest,
    responses(
        (status = 200, description = "Note saved"),
        (status = 400, description = "Invalid month")
    )
)]
pub async fn upsert_recon_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ReconNoteRequest>,
) -> Result<Json<serde_json::Value>> {
    require_manager(&current_user)?;

    if month_bounds(&request.month).is_none() {
        return Err(Error::BadRequest {
            message: "Invalid month (YYYY-MM)".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let note = Cleanings::new(&mut conn)
        .upsert_recon_note(&ReconNoteUpsertDBRequest {
            cleaning_id: request.cleaning_id,
            city: request.city,
            month: request.month,
            resolution: request.resolution,
            status: request.status,
        })
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "id": note.id })))
}
