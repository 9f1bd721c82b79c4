//! Database repository for payout batches and their line items.

use crate::db::{
    errors::Result,
    models::payouts::{
        PayoutDBResponse, PayoutItemUpsertDBRequest, PayoutItemWithUnitDBResponse, PayoutUpsertDBRequest, PayoutWithCountDBResponse,
        ReservationSummaryDBResponse,
    },
};
use crate::types::{PayoutId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;

/// Whether an upsert created a new row or touched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

pub struct Payouts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Payouts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(payout_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: PayoutId) -> Result<Option<PayoutDBResponse>> {
        let payout = sqlx::query_as::<_, PayoutDBResponse>("SELECT * FROM payouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(payout)
    }

    /// Upsert a payout batch by reference code. Repeated imports of the same
    /// CSV must land on the same row.
    #[instrument(skip(self, request), fields(reference = %request.reference_code), err)]
    pub async fn upsert_batch(&mut self, request: &PayoutUpsertDBRequest) -> Result<(PayoutDBResponse, UpsertOutcome)> {
        #[derive(sqlx::FromRow)]
        struct Upserted {
            #[sqlx(flatten)]
            payout: PayoutDBResponse,
            inserted: bool,
        }

        let row = sqlx::query_as::<_, Upserted>(
            r#"
            INSERT INTO payouts (reference_code, payout_date, arriving_by, amount, currency, payout_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference_code) DO UPDATE SET
                payout_date = COALESCE(EXCLUDED.payout_date, payouts.payout_date),
                arriving_by = COALESCE(EXCLUDED.arriving_by, payouts.arriving_by),
                amount = COALESCE(EXCLUDED.amount, payouts.amount),
                currency = COALESCE(EXCLUDED.currency, payouts.currency),
                payout_method = COALESCE(EXCLUDED.payout_method, payouts.payout_method)
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(&request.reference_code)
        .bind(request.payout_date)
        .bind(request.arriving_by)
        .bind(request.amount)
        .bind(&request.currency)
        .bind(&request.payout_method)
        .fetch_one(&mut *self.db)
        .await?;

        let outcome = if row.inserted { UpsertOutcome::Created } else { UpsertOutcome::Updated };
        Ok((row.payout, outcome))
    }

    /// Upsert a line item under a batch.
    ///
    /// Key: (payout, line_type, confirmation_code) when the row has a
    /// confirmation code, else (payout, line_type, listing, start, end).
    #[instrument(skip(self, request), fields(payout_id = %abbrev_uuid(&request.payout_id), line_type = %request.line_type), err)]
    pub async fn upsert_item(&mut self, request: &PayoutItemUpsertDBRequest) -> Result<()> {
        let existing_id: Option<uuid::Uuid> = if request.confirmation_code.is_some() {
            sqlx::query_scalar(
                "SELECT id FROM payout_items
                 WHERE payout_id = $1 AND line_type = $2 AND confirmation_code = $3
                 LIMIT 1",
            )
            .bind(request.payout_id)
            .bind(&request.line_type)
            .bind(&request.confirmation_code)
            .fetch_optional(&mut *self.db)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT id FROM payout_items
                 WHERE payout_id = $1 AND line_type = $2
                   AND listing IS NOT DISTINCT FROM $3
                   AND start_date IS NOT DISTINCT FROM $4
                   AND end_date IS NOT DISTINCT FROM $5
                 LIMIT 1",
            )
            .bind(request.payout_id)
            .bind(&request.line_type)
            .bind(&request.listing)
            .bind(request.start_date)
            .bind(request.end_date)
            .fetch_optional(&mut *self.db)
            .await?
        };

        if let Some(id) = existing_id {
            sqlx::query(
                r#"
                UPDATE payout_items SET
                    listing = COALESCE($2, listing),
                    guest_name = COALESCE($3, guest_name),
                    start_date = COALESCE($4, start_date),
                    end_date = COALESCE($5, end_date),
                    nights = COALESCE($6, nights),
                    amount = COALESCE($7, amount),
                    gross_earnings = COALESCE($8, gross_earnings),
                    cleaning_fee = COALESCE($9, cleaning_fee),
                    service_fee = COALESCE($10, service_fee),
                    currency = COALESCE($11, currency)
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(&request.listing)
            .bind(&request.guest_name)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.nights)
            .bind(request.amount)
            .bind(request.gross_earnings)
            .bind(request.cleaning_fee)
            .bind(request.service_fee)
            .bind(&request.currency)
            .execute(&mut *self.db)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO payout_items (payout_id, line_type, confirmation_code, listing, guest_name,
                                          start_date, end_date, nights, amount, gross_earnings,
                                          cleaning_fee, service_fee, currency)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(request.payout_id)
            .bind(&request.line_type)
            .bind(&request.confirmation_code)
            .bind(&request.listing)
            .bind(&request.guest_name)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.nights)
            .bind(request.amount)
            .bind(request.gross_earnings)
            .bind(request.cleaning_fee)
            .bind(request.service_fee)
            .bind(&request.currency)
            .execute(&mut *self.db)
            .await?;
        }

        Ok(())
    }

    /// Batches newest-first with their item counts.
    #[instrument(skip(self), fields(limit, offset), err)]
    pub async fn list_with_counts(&mut self, limit: i64, offset: i64) -> Result<Vec<PayoutWithCountDBResponse>> {
        let rows = sqlx::query_as::<_, PayoutWithCountDBResponse>(
            r#"
            SELECT p.*, COUNT(i.id) AS items_count
            FROM payouts p
            LEFT JOIN payout_items i ON i.payout_id = p.id
            GROUP BY p.id
            ORDER BY p.payout_date DESC NULLS LAST, p.imported_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Items of one batch, joined to units through the booking that shares the
    /// confirmation code.
    #[instrument(skip(self), fields(payout_id = %abbrev_uuid(&payout_id)), err)]
    pub async fn items_with_units(&mut self, payout_id: PayoutId) -> Result<Vec<PayoutItemWithUnitDBResponse>> {
        let rows = sqlx::query_as::<_, PayoutItemWithUnitDBResponse>(
            r#"
            SELECT i.*, u.unit_name
            FROM payout_items i
            LEFT JOIN bookings b ON LOWER(b.confirmation_code) = LOWER(i.confirmation_code)
            LEFT JOIN units u ON u.id = b.unit_id
            WHERE i.payout_id = $1
            ORDER BY i.start_date ASC NULLS LAST, i.imported_at ASC
            "#,
        )
        .bind(payout_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    /// Per-reservation rollup: reservation amount plus host-remitted tax plus
    /// adjustments, joined to units by listing name.
    #[instrument(skip(self), err)]
    pub async fn reservation_summary(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<ReservationSummaryDBResponse>> {
        let rows = sqlx::query_as::<_, ReservationSummaryDBResponse>(
            r#"
            SELECT
              u.unit_name,
              r.listing,
              r.confirmation_code,
              r.guest_name,
              r.start_date,
              r.end_date,
              r.nights,
              r.gross_earnings,
              r.cleaning_fee,
              r.service_fee,
              r.tax_amount,
              r.amount AS reservation_amount,
              COALESCE(ht.amount, 0) AS host_remitted_tax_amount,
              COALESCE(adj.sum_amount, 0) AS adj_amount,
              (COALESCE(r.amount, 0) + COALESCE(ht.amount, 0) + COALESCE(adj.sum_amount, 0)) AS payout_total,
              r.currency
            FROM payout_items r
            LEFT JOIN (
              SELECT confirmation_code, SUM(amount) AS amount
              FROM payout_items
              WHERE LOWER(line_type) = 'host remitted tax'
              GROUP BY confirmation_code
            ) ht ON ht.confirmation_code = r.confirmation_code
            LEFT JOIN (
              SELECT confirmation_code, SUM(amount) AS sum_amount
              FROM payout_items
              WHERE LOWER(line_type) = 'adjustment'
              GROUP BY confirmation_code
            ) adj ON adj.confirmation_code = r.confirmation_code
            LEFT JOIN units u ON UPPER(u.listing_name) = UPPER(r.listing)
            WHERE LOWER(r.line_type) = 'reservation'
              AND ($1::date IS NULL OR r.start_date >= $1)
              AND ($2::date IS NULL OR r.end_date <= $2)
            ORDER BY r.start_date ASC NULLS LAST, r.imported_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn batch(reference: &str) -> PayoutUpsertDBRequest {
        PayoutUpsertDBRequest {
            reference_code: reference.to_string(),
            payout_date: Some("2026-02-03".parse().unwrap()),
            arriving_by: None,
            amount: Some(Decimal::new(123450, 2)),
            currency: Some("USD".to_string()),
            payout_method: Some("Bank transfer".to_string()),
        }
    }

    #[sqlx::test]
    async fn test_batch_upsert_is_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Payouts::new(&mut conn);

        let (first, outcome) = repo.upsert_batch(&batch("P-1001")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let (second, outcome) = repo.upsert_batch(&batch("P-1001")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(first.id, second.id);

        let listed = repo.list_with_counts(50, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].items_count, 0);
    }

    #[sqlx::test]
    async fn test_item_upsert_by_confirmation_code(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Payouts::new(&mut conn);

        let (payout, _) = repo.upsert_batch(&batch("P-2002")).await.unwrap();

        let item = PayoutItemUpsertDBRequest {
            payout_id: payout.id,
            line_type: "Reservation".to_string(),
            confirmation_code: Some("HMQRST1234".to_string()),
            listing: Some("Sea View 2B".to_string()),
            amount: Some(Decimal::new(50000, 2)),
            ..Default::default()
        };
        repo.upsert_item(&item).await.unwrap();

        // Second import of the same line updates in place
        let updated = PayoutItemUpsertDBRequest {
            amount: Some(Decimal::new(51000, 2)),
            guest_name: Some("Dana".to_string()),
            ..item
        };
        repo.upsert_item(&updated).await.unwrap();

        let items = repo.items_with_units(payout.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item.amount, Some(Decimal::new(51000, 2)));
        assert_eq!(items[0].item.guest_name.as_deref(), Some("Dana"));
    }

    #[sqlx::test]
    async fn test_summary_rolls_up_tax_and_adjustments(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Payouts::new(&mut conn);

        let (payout, _) = repo.upsert_batch(&batch("P-3003")).await.unwrap();

        for (line_type, amount) in [("Reservation", 80000i64), ("Host remitted tax", 1200), ("Adjustment", -500)] {
            repo.upsert_item(&PayoutItemUpsertDBRequest {
                payout_id: payout.id,
                line_type: line_type.to_string(),
                confirmation_code: Some("HMSUMM0001".to_string()),
                start_date: Some("2026-02-01".parse().unwrap()),
                end_date: Some("2026-02-05".parse().unwrap()),
                amount: Some(Decimal::new(amount, 2)),
                ..Default::default()
            })
            .await
            .unwrap();
        }

        let summary = repo.reservation_summary(None, None).await.unwrap();
        assert_eq!(summary.len(), 1);
        let row = &summary[0];
        assert_eq!(row.reservation_amount, Some(Decimal::new(80000, 2)));
        assert_eq!(row.host_remitted_tax_amount, Decimal::new(1200, 2));
        assert_eq!(row.adj_amount, Decimal::new(-500, 2));
        assert_eq!(row.payout_total, Decimal::new(80700, 2));
    }
}
