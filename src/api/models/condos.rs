use crate::db::models::condos::CondoDBResponse;
use crate::types::CondoId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondoCreateRequest {
    pub condo_name: Option<String>,
    pub city: Option<String>,
    pub door_code: Option<String>,
    pub notes: Option<String>,
    pub google_maps: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondoUpdateRequest {
    pub city: Option<String>,
    pub door_code: Option<String>,
    pub notes: Option<String>,
    pub google_maps: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondoResponse {
    #[schema(value_type = Uuid)]
    pub id: CondoId,
    pub condo_name: String,
    pub city: String,
    pub door_code: Option<String>,
    pub google_maps: Option<String>,
    pub notes: Option<String>,
    pub hoa_bank: Option<String>,
    pub hoa_account_name: Option<String>,
    pub hoa_account_nr: Option<String>,
    pub hoa_email: Option<String>,
    pub hoa_due_day: Option<i32>,
}

impl CondoResponse {
    pub fn from_db_response(condo: &CondoDBResponse) -> Self {
        Self {
            id: condo.id,
            condo_name: condo.condo_name.clone(),
            city: condo.city.clone(),
            door_code: condo.door_code.clone(),
            google_maps: condo.google_maps.clone(),
            notes: condo.notes.clone(),
            hoa_bank: condo.hoa_bank.clone(),
            hoa_account_name: condo.hoa_account_name.clone(),
            hoa_account_nr: condo.hoa_account_nr.clone(),
            hoa_email: condo.hoa_email.clone(),
            hoa_due_day: condo.hoa_due_day,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CondoCreatedResponse {
    pub message: String,
    #[schema(value_type = Uuid)]
    pub id: CondoId,
}
