//! Unit read endpoints.

use crate::api::models::units::{ListUnitsQuery, UnitResponse};
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Units, units::UnitFilter};
use crate::errors::{Error, Result};
use crate::types::UnitId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    get,
    path = "/units",
    tag = "units",
    summary = "List units",
    params(ListUnitsQuery),
    responses((status = 200, description = "Units sorted by name", body = Vec<UnitResponse>))
)]
pub async fn list_units(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListUnitsQuery>,
) -> Result<Json<Vec<UnitResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let units = Units::new(&mut conn)
        .list(&UnitFilter {
            city: query.city,
            active_only: query.active.unwrap_or(false),
        })
        .await?;

    Ok(Json(units.iter().map(UnitResponse::from_db_response).collect()))
}

#[utoipa::path(
    get,
    path = "/units/{id}",
    tag = "units",
    summary = "Get a unit",
    responses(
        (status = 200, description = "The unit", body = UnitResponse),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn get_unit(State(state): State<AppState>, _current_user: CurrentUser, Path(id): Path<UnitId>) -> Result<Json<UnitResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let unit = Units::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UnitResponse::from_db_response(&unit)))
}
