use crate::types::EmployeeId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeDBResponse {
    pub id: EmployeeId,
    pub employee_code: String,
    pub name: String,
    pub short_name: Option<String>,
    pub division: String,
    pub area: String,
    pub city: String,
    pub status: String,
    pub date_started: Option<NaiveDate>,
    pub date_ended: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EmployeeCreateDBRequest {
    pub employee_code: String,
    pub name: String,
    pub short_name: Option<String>,
    pub division: String,
    pub area: String,
    pub city: String,
}
