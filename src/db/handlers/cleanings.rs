//! Database repository for housekeeping cleanings, rates and recon notes.

use crate::db::{
    errors::{DbError, Result},
    models::cleanings::{
        CleaningCreateDBRequest, CleaningDBResponse, CleaningStatus, CleaningUpdateDBRequest, CleaningWithUnitDBResponse,
        ReconNoteDBResponse, ReconNoteUpsertDBRequest,
    },
};
use crate::types::{CleaningId, UnitId, abbrev_uuid};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing cleanings.
#[derive(Debug, Clone, Default)]
pub struct CleaningFilter {
    pub city: Option<String>,
    pub unit_id: Option<UnitId>,
    pub status: Option<CleaningStatus>,
    /// Calendar month of the checkout date
    pub month: Option<(NaiveDate, NaiveDate)>,
}

pub struct Cleanings<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Cleanings<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    pub async fn create(&mut self, request: &CleaningCreateDBRequest) -> Result<CleaningDBResponse> {
        let cleaning = sqlx::query_as::<_, CleaningDBResponse>(
            r#"
            INSERT INTO cleanings (unit_id, city, booking_id, reservation_code, checkout_date, cleaning_type, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(&request.city)
        .bind(request.booking_id)
        .bind(&request.reservation_code)
        .bind(request.checkout_date)
        .bind(request.cleaning_type)
        .bind(&request.notes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(cleaning)
    }

    #[instrument(skip(self), fields(cleaning_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: CleaningId) -> Result<Option<CleaningDBResponse>> {
        let cleaning = sqlx::query_as::<_, CleaningDBResponse>("SELECT * FROM cleanings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(cleaning)
    }

    /// Partial update. Moving to DONE stamps `done_at` once.
    #[instrument(skip(self, request), fields(cleaning_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: CleaningId, request: &CleaningUpdateDBRequest) -> Result<CleaningDBResponse> {
        let cleaning = sqlx::query_as::<_, CleaningDBResponse>(
            r#"
            UPDATE cleanings SET
                status = COALESCE($2, status),
                cleaning_cost = COALESCE($3, cleaning_cost),
                laundry_cost = COALESCE($4, laundry_cost),
                o2_collected_fee = COALESCE($5, o2_collected_fee),
                bill_to = COALESCE($6, bill_to),
                notes = COALESCE($7, notes),
                done_by_employee_id = COALESCE($8, done_by_employee_id),
                done_at = CASE WHEN $2 = 'done' AND done_at IS NULL THEN NOW() ELSE done_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.status)
        .bind(request.cleaning_cost)
        .bind(request.laundry_cost)
        .bind(request.o2_collected_fee)
        .bind(&request.bill_to)
        .bind(&request.notes)
        .bind(request.done_by_employee_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(cleaning)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &CleaningFilter) -> Result<Vec<CleaningDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM cleanings WHERE 1=1");

        if let Some(ref city) = filter.city {
            query.push(" AND city = ");
            query.push_bind(city.clone());
        }
        if let Some(unit_id) = filter.unit_id {
            query.push(" AND unit_id = ");
            query.push_bind(unit_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
        if let Some((start, end)) = filter.month {
            query.push(" AND checkout_date BETWEEN ");
            query.push_bind(start);
            query.push(" AND ");
            query.push_bind(end);
        }

        query.push(" ORDER BY checkout_date, created_at");

        let cleanings = query.build_query_as::<CleaningDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(cleanings)
    }

    /// DONE cleanings of a month + city joined with their unit, for the
    /// reconciliation view. The city on the unit wins over the one stamped on
    /// the cleaning.
    #[instrument(skip(self), fields(city = %city), err)]
    pub async fn done_with_units(&mut self, city: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<CleaningWithUnitDBResponse>> {
        let rows = sqlx::query_as::<_, CleaningWithUnitDBResponse>(
            r#"
            SELECT c.*, u.unit_name, u.cleaning_fee AS unit_cleaning_fee
            FROM cleanings c
            JOIN units u ON u.id = c.unit_id
            WHERE COALESCE(u.city, c.city) = $1
              AND c.checkout_date BETWEEN $2 AND $3
              AND c.status = 'done'
            ORDER BY c.checkout_date, u.unit_name
            "#,
        )
        .bind(city)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Expected cleaning cost per active unit of a city, from the rate row in
    /// effect on the given date.
    #[instrument(skip(self), fields(city = %city), err)]
    pub async fn expected_costs_by_unit(&mut self, city: &str, as_of: NaiveDate) -> Result<HashMap<UnitId, Decimal>> {
        let rows: Vec<(UnitId, Option<Decimal>)> = sqlx::query_as(
            r#"
            SELECT u.id, r.amount
            FROM units u
            LEFT JOIN cleaning_rates r
              ON r.unit_id = u.id
              AND (r.effective_from IS NULL OR r.effective_from <= $2)
              AND (r.effective_to IS NULL OR r.effective_to >= $2)
            WHERE u.status = 'Active' AND u.city = $1
            ORDER BY u.unit_name
            "#,
        )
        .bind(city)
        .bind(as_of)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().filter_map(|(id, amount)| amount.map(|a| (id, a))).collect())
    }

    /// Latest note per cleaning for a city + month scope.
    #[instrument(skip(self), fields(city = %city, month = %month), err)]
    pub async fn latest_notes_by_cleaning(&mut self, city: &str, month: &str) -> Result<HashMap<CleaningId, ReconNoteDBResponse>> {
        let rows = sqlx::query_as::<_, ReconNoteDBResponse>(
            r#"
            SELECT DISTINCT ON (cleaning_id) *
            FROM cleaning_recon_notes
            WHERE city = $1 AND month = $2 AND cleaning_id IS NOT NULL
            ORDER BY cleaning_id, COALESCE(updated_at, created_at) DESC
            "#,
        )
        .bind(city)
        .bind(month)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows.into_iter().filter_map(|n| n.cleaning_id.map(|id| (id, n))).collect())
    }

    /// Upsert the row-level recon note for (cleaning, city, month).
    #[instrument(skip(self, request), fields(city = %request.city, month = %request.month), err)]
    pub async fn upsert_recon_note(&mut self, request: &ReconNoteUpsertDBRequest) -> Result<ReconNoteDBResponse> {
        let existing_id: Option<uuid::Uuid> = sqlx::query_scalar(
            "SELECT id FROM cleaning_recon_notes
             WHERE city = $1 AND month = $2 AND cleaning_id IS NOT DISTINCT FROM $3
             ORDER BY COALESCE(updated_at, created_at) DESC
             LIMIT 1",
        )
        .bind(&request.city)
        .bind(&request.month)
        .bind(request.cleaning_id)
        .fetch_optional(&mut *self.db)
        .await?;

        let note = if let Some(id) = existing_id {
            sqlx::query_as::<_, ReconNoteDBResponse>(
                "UPDATE cleaning_recon_notes SET resolution = $2, status = $3, updated_at = NOW()
                 WHERE id = $1
                 RETURNING *",
            )
            .bind(id)
            .bind(&request.resolution)
            .bind(&request.status)
            .fetch_one(&mut *self.db)
            .await?
        } else {
            sqlx::query_as::<_, ReconNoteDBResponse>(
                "INSERT INTO cleaning_recon_notes (cleaning_id, city, month, resolution, status)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *",
            )
            .bind(request.cleaning_id)
            .bind(&request.city)
            .bind(&request.month)
            .bind(&request.resolution)
            .bind(&request.status)
            .fetch_one(&mut *self.db)
            .await?
        };

        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::cleanings::CleaningType;
    use crate::test_utils::create_test_unit;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_done_stamps_done_at_once(pool: PgPool) {
        let unit = create_test_unit(&pool, "Casa Sol", None).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cleanings::new(&mut conn);

        let cleaning = repo
            .create(&CleaningCreateDBRequest {
                unit_id: unit.id,
                city: "Tulum".to_string(),
                booking_id: None,
                reservation_code: None,
                checkout_date: "2026-04-12".parse().unwrap(),
                cleaning_type: CleaningType::Checkout,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(cleaning.status, CleaningStatus::Pending);
        assert!(cleaning.done_at.is_none());

        let done = repo
            .update(
                cleaning.id,
                &CleaningUpdateDBRequest {
                    status: Some(CleaningStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let first_done_at = done.done_at.expect("done_at should be stamped");

        // A later cost edit keeps the original completion time
        let edited = repo
            .update(
                cleaning.id,
                &CleaningUpdateDBRequest {
                    cleaning_cost: Some(Decimal::new(65000, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.done_at, Some(first_done_at));
        assert_eq!(edited.cleaning_cost, Some(Decimal::new(65000, 2)));
    }

    #[sqlx::test]
    async fn test_recon_note_upsert_keeps_single_row(pool: PgPool) {
        let unit = create_test_unit(&pool, "Casa Luna", None).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cleanings::new(&mut conn);

        let cleaning = repo
            .create(&CleaningCreateDBRequest {
                unit_id: unit.id,
                city: "Tulum".to_string(),
                booking_id: None,
                reservation_code: None,
                checkout_date: "2026-04-20".parse().unwrap(),
                cleaning_type: CleaningType::Checkout,
                notes: None,
            })
            .await
            .unwrap();

        let request = ReconNoteUpsertDBRequest {
            cleaning_id: Some(cleaning.id),
            city: "Tulum".to_string(),
            month: "2026-04".to_string(),
            resolution: Some("housekeeper double-charged".to_string()),
            status: Some("open".to_string()),
        };
        repo.upsert_recon_note(&request).await.unwrap();

        let second = ReconNoteUpsertDBRequest {
            resolution: Some("credited on next invoice".to_string()),
            status: Some("resolved".to_string()),
            ..request
        };
        repo.upsert_recon_note(&second).await.unwrap();

        let notes = repo.latest_notes_by_cleaning("Tulum", "2026-04").await.unwrap();
        assert_eq!(notes.len(), 1);
        let note = notes.get(&cleaning.id).unwrap();
        assert_eq!(note.resolution.as_deref(), Some("credited on next invoice"));
        assert_eq!(note.status.as_deref(), Some("resolved"));
    }
}
