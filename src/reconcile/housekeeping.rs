//! Housekeeping reconciliation month view.
//!
//! "Charged" is what the housekeeper collected for a cleaning (the collected
//! fee if recorded, else the unit's standard cleaning fee). "Cost" is what the
//! cleaning actually cost us (cleaning + laundry). "Expected" comes from the
//! rate card in effect that month. Reconciliation is a view over DONE
//! cleanings; `cleanings` stays the single source of truth.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::Cleanings;
use crate::db::models::cleanings::{CleaningType, CleaningStatus};
use crate::types::{BookingId, CleaningId, UnitId};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgConnection;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthViewRow {
    #[schema(value_type = Uuid)]
    pub id: CleaningId,
    #[schema(value_type = Option<Uuid>)]
    pub booking_id: Option<BookingId>,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub unit_name: String,
    pub service_date: NaiveDate,
    pub cleaning_type: CleaningType,

    // Costs as stored
    pub cleaning_cost: Option<Decimal>,
    pub laundry_cost: Option<Decimal>,
    pub total_cost: Decimal,

    pub bill_to: Option<String>,
    pub status: CleaningStatus,
    pub notes: Option<String>,

    // Latest row-level note, if any
    pub resolution: Option<String>,
    pub resolution_status: Option<String>,

    // Computed reconciliation fields
    pub expected_cost: Option<Decimal>,
    pub charged_cost: Decimal,
    pub diff: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthViewTotals {
    pub expected: Decimal,
    pub charged: Decimal,
    pub cost: Decimal,
    pub diff: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthView {
    pub month: String,
    pub city: String,
    pub rows: Vec<MonthViewRow>,
    pub totals: MonthViewTotals,
}

/// Parse "YYYY-MM" into the first and last day of that month.
pub fn month_bounds(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    // chrono's %Y accepts short years, so pin the shape first
    if month.len() != 7 || month.as_bytes()[4] != b'-' {
        return None;
    }
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// Build the reconciliation month view for one city.
#[instrument(skip(conn), fields(month = %month, city = %city), err)]
pub async fn month_view(conn: &mut PgConnection, month: &str, city: &str) -> Result<MonthView> {
    let (start, end) = month_bounds(month).ok_or_else(|| DbError::Other(anyhow::anyhow!("Invalid month (YYYY-MM)")))?;

    let mut repo = Cleanings::new(conn);
    let expected_by_unit = repo.expected_costs_by_unit(city, start).await?;
    let notes_by_cleaning = repo.latest_notes_by_cleaning(city, month).await?;
    let cleanings = repo.done_with_units(city, start, end).await?;

    let mut sum_charged = Decimal::ZERO;
    let mut sum_cost = Decimal::ZERO;
    let mut sum_expected = Decimal::ZERO;

    let mut rows = Vec::with_capacity(cleanings.len());
    for row in cleanings {
        let cleaning = row.cleaning;

        // Charged = collected fee if recorded, else the unit's standard fee
        let charged = cleaning
            .o2_collected_fee
            .or(row.unit_cleaning_fee)
            .unwrap_or(Decimal::ZERO);

        let total_cost = cleaning.cleaning_cost.unwrap_or(Decimal::ZERO) + cleaning.laundry_cost.unwrap_or(Decimal::ZERO);
        let diff = charged - total_cost;

        let expected = expected_by_unit.get(&cleaning.unit_id).copied();

        sum_charged += charged;
        sum_cost += total_cost;
        sum_expected += expected.unwrap_or(Decimal::ZERO);

        let note = notes_by_cleaning.get(&cleaning.id);

        rows.push(MonthViewRow {
            id: cleaning.id,
            booking_id: cleaning.booking_id,
            unit_id: cleaning.unit_id,
            unit_name: row.unit_name,
            service_date: cleaning.checkout_date,
            cleaning_type: cleaning.cleaning_type,
            cleaning_cost: cleaning.cleaning_cost,
            laundry_cost: cleaning.laundry_cost,
            total_cost,
            bill_to: cleaning.bill_to,
            status: cleaning.status,
            notes: cleaning.notes,
            resolution: note.and_then(|n| n.resolution.clone()),
            resolution_status: note.and_then(|n| n.status.clone()),
            expected_cost: expected,
            charged_cost: charged,
            diff,
        });
    }

    Ok(MonthView {
        month: month.to_string(),
        city: city.to_string(),
        rows,
        totals: MonthViewTotals {
            expected: sum_expected,
            charged: sum_charged,
            cost: sum_cost,
            diff: sum_charged - sum_cost,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::cleanings::{CleaningCreateDBRequest, CleaningUpdateDBRequest};
    use crate::test_utils::create_test_unit;
    use sqlx::PgPool;

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds("2026-02"),
            Some(("2026-02-01".parse().unwrap(), "2026-02-28".parse().unwrap()))
        );
        assert_eq!(
            month_bounds("2026-12"),
            Some(("2026-12-01".parse().unwrap(), "2026-12-31".parse().unwrap()))
        );
        assert_eq!(month_bounds("2026-13"), None);
        assert_eq!(month_bounds("26-03"), None);
        assert_eq!(month_bounds("garbage"), None);
    }

    #[sqlx::test]
    async fn test_month_view_arithmetic(pool: PgPool) {
        let unit = create_test_unit(&pool, "HK Casa", None).await;
        sqlx::query("UPDATE units SET city = 'Tulum', cleaning_fee = 800 WHERE id = $1")
            .bind(unit.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO cleaning_rates (unit_id, amount, effective_from) VALUES ($1, 600, '2026-01-01')")
            .bind(unit.id)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cleanings::new(&mut conn);

        let cleaning = repo
            .create(&CleaningCreateDBRequest {
                unit_id: unit.id,
                city: "Tulum".to_string(),
                booking_id: None,
                reservation_code: None,
                checkout_date: "2026-03-14".parse().unwrap(),
                cleaning_type: CleaningType::Checkout,
                notes: None,
            })
            .await
            .unwrap();
        repo.update(
            cleaning.id,
            &CleaningUpdateDBRequest {
                status: Some(CleaningStatus::Done),
                cleaning_cost: Some(Decimal::new(50000, 2)),
                laundry_cost: Some(Decimal::new(10000, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Pending cleanings stay out of the view
        repo.create(&CleaningCreateDBRequest {
            unit_id: unit.id,
            city: "Tulum".to_string(),
            booking_id: None,
            reservation_code: None,
            checkout_date: "2026-03-20".parse().unwrap(),
            cleaning_type: CleaningType::Checkout,
            notes: None,
        })
        .await
        .unwrap();

        let view = month_view(&mut conn, "2026-03", "Tulum").await.unwrap();
        assert_eq!(view.rows.len(), 1);

        let row = &view.rows[0];
        // No collected fee recorded, so charged falls back to the unit fee
        assert_eq!(row.charged_cost, Decimal::new(800, 0));
        assert_eq!(row.total_cost, Decimal::new(60000, 2));
        assert_eq!(row.diff, Decimal::new(20000, 2));
        assert_eq!(row.expected_cost, Some(Decimal::new(600, 0)));

        assert_eq!(view.totals.charged, Decimal::new(800, 0));
        assert_eq!(view.totals.cost, Decimal::new(60000, 2));
        assert_eq!(view.totals.diff, Decimal::new(20000, 2));
        assert_eq!(view.totals.expected, Decimal::new(600, 0));
    }

    #[sqlx::test]
    async fn test_collected_fee_wins_over_unit_fee(pool: PgPool) {
        let unit = create_test_unit(&pool, "HK Casa 2", None).await;
        sqlx::query("UPDATE units SET city = 'Tulum', cleaning_fee = 800 WHERE id = $1")
            .bind(unit.id)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Cleanings::new(&mut conn);
        let cleaning = repo
            .create(&CleaningCreateDBRequest {
                unit_id: unit.id,
                city: "Tulum".to_string(),
                booking_id: None,
                reservation_code: None,
                checkout_date: "2026-03-02".parse().unwrap(),
                cleaning_type: CleaningType::Checkout,
                notes: None,
            })
            .await
            .unwrap();
        repo.update(
            cleaning.id,
            &CleaningUpdateDBRequest {
                status: Some(CleaningStatus::Done),
                o2_collected_fee: Some(Decimal::new(65000, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let view = month_view(&mut conn, "2026-03", "Tulum").await.unwrap();
        assert_eq!(view.rows[0].charged_cost, Decimal::new(65000, 2));
    }
}
