use crate::db::models::employees::EmployeeDBResponse;
use crate::types::EmployeeId;
use serde::Serialize;
use utoipa::ToSchema;

/// Flat employee option for form dropdowns.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOption {
    #[schema(value_type = Uuid)]
    pub id: EmployeeId,
    pub short_name: Option<String>,
    pub division: String,
    pub city: String,
}

impl EmployeeOption {
    pub fn from_db_response(employee: &EmployeeDBResponse) -> Self {
        Self {
            id: employee.id,
            short_name: employee.short_name.clone(),
            division: employee.division.clone(),
            city: employee.city.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeOptionsResponse {
    pub success: bool,
    pub employees: Vec<EmployeeOption>,
}
