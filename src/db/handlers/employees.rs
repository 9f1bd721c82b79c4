//! Database repository for employees.

use crate::db::{
    errors::Result,
    models::employees::{EmployeeCreateDBRequest, EmployeeDBResponse},
};
use crate::types::{EmployeeId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Employees<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Employees<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(code = %request.employee_code), err)]
    pub async fn create(&mut self, request: &EmployeeCreateDBRequest) -> Result<EmployeeDBResponse> {
        let employee = sqlx::query_as::<_, EmployeeDBResponse>(
            r#"
            INSERT INTO employees (employee_code, name, short_name, division, area, city)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.employee_code)
        .bind(&request.name)
        .bind(&request.short_name)
        .bind(&request.division)
        .bind(&request.area)
        .bind(&request.city)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(employee)
    }

    #[instrument(skip(self), fields(employee_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: EmployeeId) -> Result<Option<EmployeeDBResponse>> {
        let employee = sqlx::query_as::<_, EmployeeDBResponse>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(employee)
    }

    /// All employees ordered by short name, for form option lists.
    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<EmployeeDBResponse>> {
        let employees = sqlx::query_as::<_, EmployeeDBResponse>("SELECT * FROM employees ORDER BY short_name NULLS LAST, name")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(employees)
    }
}
