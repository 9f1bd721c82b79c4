//! Database repository for the employee cash ledger.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::cash_ledger::{
        CashLedgerEntryCreateDBRequest, CashLedgerEntryDBResponse, CashLedgerEntryUpdateDBRequest, LedgerStatus,
    },
};
use crate::types::{CashLedgerEntryId, EmployeeId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing ledger entries.
#[derive(Debug, Clone, Default)]
pub struct CashLedgerFilter {
    pub employee_id: Option<EmployeeId>,
    pub status: Option<LedgerStatus>,
    pub entry_type: Option<String>,
    /// YYYY-MM of the entry date
    pub month: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
}

pub struct CashLedger<'c> {
    db: &'c mut PgConnection,
}

impl<'c> CashLedger<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn set_status(&mut self, id: CashLedgerEntryId, status: LedgerStatus) -> Result<CashLedgerEntryDBResponse> {
        let entry = sqlx::query_as::<_, CashLedgerEntryDBResponse>(
            "UPDATE cash_ledger_entries SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(entry)
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn allocate(
        &mut self,
        id: CashLedgerEntryId,
        allocation_type: &str,
        allocation_code: Option<&str>,
        allocated_by: Option<EmployeeId>,
    ) -> Result<CashLedgerEntryDBResponse> {
        let entry = sqlx::query_as::<_, CashLedgerEntryDBResponse>(
            r#"
            UPDATE cash_ledger_entries SET
                allocation_type = $2,
                allocation_code = $3,
                allocated_at = NOW(),
                allocated_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(allocation_type)
        .bind(allocation_code)
        .bind(allocated_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(entry)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for CashLedger<'c> {
    type CreateRequest = CashLedgerEntryCreateDBRequest;
    type UpdateRequest = CashLedgerEntryUpdateDBRequest;
    type Response = CashLedgerEntryDBResponse;
    type Id = CashLedgerEntryId;
    type Filter = CashLedgerFilter;

    #[instrument(skip(self, request), fields(employee_id = %abbrev_uuid(&request.employee_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let entry = sqlx::query_as::<_, CashLedgerEntryDBResponse>(
            r#"
            INSERT INTO cash_ledger_entries
                (code, employee_id, entry_type, amount, division, city, cost_centre, notes, entry_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&request.code)
        .bind(request.employee_id)
        .bind(request.entry_type)
        .bind(request.amount)
        .bind(&request.division)
        .bind(&request.city)
        .bind(&request.cost_centre)
        .bind(&request.notes)
        .bind(request.entry_date)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(entry)
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let entry = sqlx::query_as::<_, CashLedgerEntryDBResponse>("SELECT * FROM cash_ledger_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(entry)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM cash_ledger_entries WHERE 1=1");

        if let Some(employee_id) = filter.employee_id {
            query.push(" AND employee_id = ");
            query.push_bind(employee_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
        if let Some(ref entry_type) = filter.entry_type {
            query.push(" AND entry_type = ");
            query.push_bind(entry_type.clone());
        }
        if let Some(ref month) = filter.month {
            query.push(" AND to_char(COALESCE(entry_date, created_at::date), 'YYYY-MM') = ");
            query.push_bind(month.clone());
        }
        if let Some(ref division) = filter.division {
            query.push(" AND division = ");
            query.push_bind(division.clone());
        }
        if let Some(ref city) = filter.city {
            query.push(" AND city = ");
            query.push_bind(city.clone());
        }

        query.push(" ORDER BY COALESCE(entry_date, created_at::date) DESC, created_at DESC");

        let entries = query.build_query_as::<CashLedgerEntryDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(entries)
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cash_ledger_entries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(entry_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let entry = sqlx::query_as::<_, CashLedgerEntryDBResponse>(
            r#"
            UPDATE cash_ledger_entries SET
                entry_type = COALESCE($2, entry_type),
                amount = COALESCE($3, amount),
                notes = COALESCE($4, notes),
                admin_comment = COALESCE($5, admin_comment),
                entry_date = COALESCE($6, entry_date),
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.entry_type)
        .bind(request.amount)
        .bind(&request.notes)
        .bind(&request.admin_comment)
        .bind(request.entry_date)
        .bind(request.status)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::cash_ledger::LedgerEntryType;
    use crate::test_utils::create_test_employee;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    async fn seed_entry(pool: &PgPool, employee_id: EmployeeId, month_date: &str) -> CashLedgerEntryDBResponse {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = CashLedger::new(&mut conn);
        repo.create(&CashLedgerEntryCreateDBRequest {
            code: "CL-0001".to_string(),
            employee_id,
            entry_type: LedgerEntryType::Expense,
            amount: Decimal::new(15000, 2),
            division: Some("Housekeepers".to_string()),
            city: Some("Tulum".to_string()),
            cost_centre: Some("HK-TUL".to_string()),
            notes: Some("cleaning supplies".to_string()),
            entry_date: Some(month_date.parse().unwrap()),
            status: LedgerStatus::Pending,
        })
        .await
        .unwrap()
    }

    #[sqlx::test]
    async fn test_month_filter(pool: PgPool) {
        let employee = create_test_employee(&pool, "MAR").await;
        seed_entry(&pool, employee.id, "2026-03-04").await;
        seed_entry(&pool, employee.id, "2026-04-02").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = CashLedger::new(&mut conn);

        let march = repo
            .list(&CashLedgerFilter {
                month: Some("2026-03".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].entry_date, Some("2026-03-04".parse().unwrap()));
    }

    #[sqlx::test]
    async fn test_approve_and_allocate(pool: PgPool) {
        let employee = create_test_employee(&pool, "LUZ").await;
        let manager = create_test_employee(&pool, "BOSS").await;
        let entry = seed_entry(&pool, employee.id, "2026-03-10").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = CashLedger::new(&mut conn);

        let approved = repo.set_status(entry.id, LedgerStatus::Approved).await.unwrap();
        assert_eq!(approved.status, LedgerStatus::Approved);

        let allocated = repo.allocate(entry.id, "payroll", Some("PR-2026-03"), Some(manager.id)).await.unwrap();
        assert_eq!(allocated.allocation_type.as_deref(), Some("payroll"));
        assert_eq!(allocated.allocation_code.as_deref(), Some("PR-2026-03"));
        assert_eq!(allocated.allocated_by, Some(manager.id));
        assert!(allocated.allocated_at.is_some());
    }
}
