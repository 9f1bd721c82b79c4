//! Monthly per-unit report data.

use crate::api::models::reports::{ReportBookingLine, ReportTotals, ReportTransactionLine, UnitMonthQuery, UnitMonthReport};
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Bookings, Transactions, Units, transactions::TransactionFilter};
use crate::db::models::transactions::TransactionType;
use crate::errors::{Error, Result};
use crate::reconcile::housekeeping::month_bounds;
use crate::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;

#[utoipa::path(
    get,
    path = "/reports/unit-month",
    tag = "reports",
    summary = "Monthly unit report data",
    description = "Booking revenue and accounting lines for one unit and month. Rendering is a client concern.",
    params(UnitMonthQuery),
    responses(
        (status = 200, description = "Report data", body = UnitMonthReport),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn unit_month_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<UnitMonthQuery>,
) -> Result<Json<UnitMonthReport>> {
    let (start, end) = month_bounds(&query.month).ok_or_else(|| Error::BadRequest {
        message: "Invalid month (YYYY-MM)".to_string(),
    })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let unit = Units::new(&mut conn).get_by_id(query.unit).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: query.unit.to_string(),
    })?;

    // Bookings overlapping the month; the exclusive upper bound is the first
    // day of the next month
    let bookings = Bookings::new(&mut conn)
        .list_for_unit_in_range(query.unit, start, end + chrono::Duration::days(1))
        .await?;

    let transactions = Transactions::new(&mut conn)
        .list_for_unit(
            query.unit,
            &TransactionFilter {
                from: Some(start),
                to: Some(end),
                tx_type: None,
            },
        )
        .await?;

    let mut gross_revenue = Decimal::ZERO;
    let mut cleaning_fees = Decimal::ZERO;
    let booking_lines: Vec<ReportBookingLine> = bookings
        .iter()
        .filter_map(|b| {
            let (check_in, check_out) = (b.check_in?, b.check_out?);
            gross_revenue += b.payout.unwrap_or(Decimal::ZERO);
            cleaning_fees += b.cleaning_fee.unwrap_or(Decimal::ZERO);
            Some(ReportBookingLine {
                guest_name: b.guest_name.clone(),
                source: b.source.clone(),
                check_in,
                check_out,
                nights: (check_out - check_in).num_days(),
                payout: b.payout,
                cleaning_fee: b.cleaning_fee,
            })
        })
        .collect();

    let mut charges = Decimal::ZERO;
    let mut payments = Decimal::ZERO;
    let transaction_lines: Vec<ReportTransactionLine> = transactions
        .iter()
        .map(|t| {
            match t.tx_type {
                TransactionType::Charge => charges += t.amount,
                TransactionType::Payment => payments += t.amount,
            }
            ReportTransactionLine {
                date: t.date,
                description: t.description.clone(),
                tx_type: t.tx_type,
                amount: t.amount,
            }
        })
        .collect();

    let totals = ReportTotals {
        gross_revenue,
        cleaning_fees,
        charges,
        payments,
        net: gross_revenue - charges + payments,
    };

    Ok(Json(UnitMonthReport {
        unit_id: unit.id,
        unit_name: unit.unit_name,
        month: query.month,
        bookings: booking_lines,
        transactions: transaction_lines,
        totals,
    }))
}
