//! Database repository for unit accounting transactions.

use crate::db::{
    errors::Result,
    models::transactions::{TransactionCreateDBRequest, TransactionDBResponse, TransactionType},
};
use crate::types::{TransactionId, UnitId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::{PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing a unit's transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub tx_type: Option<TransactionType>,
}

pub struct Transactions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Transactions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    pub async fn create(&mut self, request: &TransactionCreateDBRequest) -> Result<TransactionDBResponse> {
        let tx = sqlx::query_as::<_, TransactionDBResponse>(
            r#"
            INSERT INTO unit_transactions (unit_id, date, description, amount, tx_type, cost_center, transaction_code, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(request.date)
        .bind(&request.description)
        .bind(request.amount)
        .bind(request.tx_type)
        .bind(&request.cost_center)
        .bind(&request.transaction_code)
        .bind(&request.comments)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(tx)
    }

    #[instrument(skip(self), fields(transaction_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: TransactionId) -> Result<Option<TransactionDBResponse>> {
        let tx = sqlx::query_as::<_, TransactionDBResponse>("SELECT * FROM unit_transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tx)
    }

    #[instrument(skip(self, filter), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn list_for_unit(&mut self, unit_id: UnitId, filter: &TransactionFilter) -> Result<Vec<TransactionDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM unit_transactions WHERE unit_id = ");
        query.push_bind(unit_id);

        if let Some(from) = filter.from {
            query.push(" AND date >= ");
            query.push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND date <= ");
            query.push_bind(to);
        }
        if let Some(tx_type) = filter.tx_type {
            query.push(" AND tx_type = ");
            query.push_bind(tx_type);
        }

        query.push(" ORDER BY date, created_at");

        let txs = query.build_query_as::<TransactionDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(txs)
    }

    #[instrument(skip(self), fields(transaction_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM unit_transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
