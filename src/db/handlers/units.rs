//! Database repository for units.

use crate::db::{
    errors::Result,
    models::units::{INACTIVE_STATUSES, UnitCreateDBRequest, UnitDBResponse},
};
use crate::types::{UnitId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing units.
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub city: Option<String>,
    /// Only units not ended and not in an inactive-like status
    pub active_only: bool,
}

pub struct Units<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Units<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.unit_name), err)]
    pub async fn create(&mut self, request: &UnitCreateDBRequest) -> Result<UnitDBResponse> {
        let unit = sqlx::query_as::<_, UnitDBResponse>(
            r#"
            INSERT INTO units (unit_name, listing_name, city, status, condo_id, cleaning_fee)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.unit_name)
        .bind(&request.listing_name)
        .bind(&request.city)
        .bind(&request.status)
        .bind(request.condo_id)
        .bind(request.cleaning_fee)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(unit)
    }

    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: UnitId) -> Result<Option<UnitDBResponse>> {
        let unit = sqlx::query_as::<_, UnitDBResponse>("SELECT * FROM units WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(unit)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &UnitFilter) -> Result<Vec<UnitDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM units WHERE 1=1");

        if let Some(ref city) = filter.city {
            query.push(" AND city = ");
            query.push_bind(city.clone());
        }
        if filter.active_only {
            query.push(" AND date_ended IS NULL AND LOWER(COALESCE(status, '')) != ALL(");
            query.push_bind(INACTIVE_STATUSES.map(String::from).to_vec());
            query.push(")");
        }

        query.push(" ORDER BY unit_name");

        let units = query.build_query_as::<UnitDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(units)
    }
}
