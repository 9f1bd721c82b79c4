//! Condo CRUD.

use crate::api::models::condos::{CondoCreateRequest, CondoCreatedResponse, CondoResponse, CondoUpdateRequest};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::handlers::{Condos, Repository, condos::CondoFilter};
use crate::db::models::condos::{CondoCreateDBRequest, CondoUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::CondoId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, State},
};

#[utoipa::path(
    get,
    path = "/condos",
    tag = "condos",
    summary = "List condos with active units",
    responses((status = 200, description = "Condos sorted by name", body = Vec<CondoResponse>))
)]
pub async fn list_condos(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<Vec<CondoResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let condos = Condos::new(&mut conn).list(&CondoFilter { with_active_units: true }).await?;

    Ok(Json(condos.iter().map(CondoResponse::from_db_response).collect()))
}

#[utoipa::path(
    post,
    path = "/condos",
    tag = "condos",
    summary = "Create a condo",
    request_body = CondoCreateRequest,
    responses(
        (status = 201, description = "Condo created", body = CondoCreatedResponse),
        (status = 400, description = "Missing name or city"),
        (status = 409, description = "Condo name already exists")
    )
)]
pub async fn create_condo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CondoCreateRequest>,
) -> Result<(axum::http::StatusCode, Json<CondoCreatedResponse>)> {
    require_manager(&current_user)?;

    let condo_name = request.condo_name.filter(|n| !n.is_empty()).ok_or_else(|| Error::BadRequest {
        message: "Condo name is required".to_string(),
    })?;
    let city = request.city.filter(|c| !c.is_empty()).ok_or_else(|| Error::BadRequest {
        message: "City is required".to_string(),
    })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Condos::new(&mut conn);

    if repo.find_by_name(&condo_name).await?.is_some() {
        return Err(Error::Conflict {
            message: "Condo name already exists".to_string(),
        });
    }

    let condo = repo
        .create(&CondoCreateDBRequest {
            condo_name,
            city,
            door_code: request.door_code,
            notes: request.notes,
            google_maps: request.google_maps,
            hoa_bank: request.hoa_bank,
            hoa_account_name: request.hoa_account_name,
            hoa_account_nr: request.hoa_account_nr,
            hoa_email: request.hoa_email,
            hoa_due_day: request.hoa_due_day,
        })
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CondoCreatedResponse {
            message: "Condo created".to_string(),
            id: condo.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/condos/{id}",
    tag = "condos",
    summary = "Get a condo",
    responses(
        (status = 200, description = "The condo", body = CondoResponse),
        (status = 404, description = "Condo not found")
    )
)]
pub async fn get_condo(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<CondoId>,
) -> Result<Json<CondoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let condo = Condos::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Condo".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(CondoResponse::from_db_response(&condo)))
}

#[utoipa::path(
    put,
    path = "/condos/{id}",
    tag = "condos",
    summary = "Update a condo",
    description = "Partial update; omitted fields keep their current values.",
    request_body = CondoUpdateRequest,
    responses(
        (status = 200, description = "Updated condo", body = CondoResponse),
        (status = 404, description = "Condo not found")
    )
)]
pub async fn update_condo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CondoId>,
    Json(request): Json<CondoUpdateRequest>,
) -> Result<Json<CondoResponse>> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let condo = Condos::new(&mut conn)
        .update(
            id,
            &CondoUpdateDBRequest {
                city: request.city,
                door_code: request.door_code,
                notes: request.notes,
                google_maps: request.google_maps,
                hoa_bank: request.hoa_bank,
                hoa_account_name: request.hoa_account_name,
                hoa_account_nr: request.hoa_account_nr,
                hoa_email: request.hoa_email,
                hoa_due_day: request.hoa_due_day,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Condo".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(CondoResponse::from_db_response(&condo)))
}
