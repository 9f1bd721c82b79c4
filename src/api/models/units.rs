use crate::db::models::units::UnitDBResponse;
use crate::types::{CondoId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUnitsQuery {
    pub city: Option<String>,
    /// Only units still under management and not in an inactive-like status
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitResponse {
    #[schema(value_type = Uuid)]
    pub id: UnitId,
    pub unit_name: String,
    pub listing_name: Option<String>,
    pub city: Option<String>,
    pub status: String,
    #[schema(value_type = Option<Uuid>)]
    pub condo_id: Option<CondoId>,
    pub cleaning_fee: Option<Decimal>,
}

impl UnitResponse {
    pub fn from_db_response(unit: &UnitDBResponse) -> Self {
        Self {
            id: unit.id,
            unit_name: unit.unit_name.clone(),
            listing_name: unit.listing_name.clone(),
            city: unit.city.clone(),
            status: unit.status.clone(),
            condo_id: unit.condo_id,
            cleaning_fee: unit.cleaning_fee,
        }
    }
}
