//! iCal reconciliation endpoints: reconcile view, notifications, acknowledgements.

use crate::api::models::ical::{
    AckRequest, AckResponse, Notification, NotificationKind, NotificationList, NotificationListResponse, ReconcileMeta,
    ReconcileParamsEcho, ReconcileQuery, ReconcileResponse, NotificationsQuery,
};
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Bookings, IcalEvents};
use crate::db::models::bookings::DateSyncStatus;
use crate::errors::{Error, Result};
use crate::reconcile::ical::{ReconcileParams, loose_fingerprint, reconcile};
use crate::types::BookingId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/ical/reconcile",
    tag = "ical",
    summary = "Reconcile bookings against iCal events",
    params(ReconcileQuery),
    responses((status = 200, description = "Reconciliation outcome", body = ReconcileResponse))
)]
pub async fn reconcile_bookings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReconcileQuery>,
) -> Result<Json<ReconcileResponse>> {
    let hide_ack = query.hide_ack.unwrap_or(true);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let mut outcome = reconcile(
        &mut conn,
        &ReconcileParams {
            unit_id: query.unit,
            from: query.from,
            to: query.to,
            persist: !query.dry,
            grace_days: state.config.reconcile_grace_days,
        },
    )
    .await?;

    if hide_ack {
        // Hide acknowledged rows and recompute the view counters; raw
        // processed/linked totals stay untouched.
        outcome.items.retain(|item| !item.acknowledged);
        outcome.conflicts = outcome.items.iter().filter(|i| i.status == DateSyncStatus::Conflict).count();
        outcome.suspected_cancelled = outcome
            .items
            .iter()
            .filter(|i| i.status == DateSyncStatus::SuspectedCancelled)
            .count();
    }

    let ical_last_seen = IcalEvents::new(&mut conn).latest_seen_at(query.unit).await?;

    Ok(Json(ReconcileResponse {
        ok: true,
        params: ReconcileParamsEcho {
            unit: query.unit,
            from: query.from,
            to: query.to,
            dry: query.dry,
            hide_ack,
        },
        data: outcome,
        meta: ReconcileMeta {
            ical_last_seen,
            filtered_by_ack: hide_ack,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/ical/notifications",
    tag = "ical",
    summary = "Actionable iCal notifications",
    description = "Conflicts and suspected cancellations over the default window (60 days back, 180 forward).",
    params(NotificationsQuery),
    responses((status = 200, description = "Notifications", body = NotificationListResponse))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<NotificationListResponse>> {
    let today = Utc::now().date_naive();
    let from = query.from.unwrap_or(today - chrono::Duration::days(60));
    let to = query.to.unwrap_or(today + chrono::Duration::days(180));

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let outcome = reconcile(
        &mut conn,
        &ReconcileParams {
            unit_id: query.unit,
            from: Some(from),
            to: Some(to),
            persist: true,
            grace_days: state.config.reconcile_grace_days,
        },
    )
    .await?;

    let items: Vec<Notification> = outcome
        .items
        .into_iter()
        .filter_map(|item| {
            let kind = match item.status {
                DateSyncStatus::Conflict => NotificationKind::IcalConflict,
                DateSyncStatus::SuspectedCancelled => NotificationKind::IcalSuspectedCancelled,
                _ => return None,
            };
            Some(Notification {
                id: format!("issue|{}|{}", item.booking_id, serde_json::to_value(item.status).ok()?.as_str()?.to_owned()),
                kind,
                booking_id: item.booking_id,
                unit_id: item.unit_id,
                unit_name: item.unit_name,
                guest_name: item.guest_name,
                reservation_code: item.reservation_code.or(item.confirmation_code),
                status: item.status,
                diffs: item.diffs,
                check_in: item.check_in,
                check_out: item.check_out,
                proposed_check_in: item.proposed_check_in,
                proposed_check_out: item.proposed_check_out,
                reservation_url: item.reservation_url,
                booking_reservation_url: item.booking_reservation_url,
                last_ical_sync_at: item.last_ical_sync_at,
                summary: item.summary,
                fingerprint: item.fingerprint,
            })
        })
        .collect();

    Ok(Json(NotificationListResponse {
        ok: true,
        data: NotificationList {
            count: items.len(),
            items,
        },
    }))
}

#[utoipa::path(
    post,
    path = "/ical/ack/{booking_id}",
    tag = "ical",
    summary = "Acknowledge a reconcile outcome",
    description = "Stores the outcome fingerprint on the booking; the row stays hidden until the outcome changes.",
    request_body = AckRequest,
    responses(
        (status = 200, description = "Acknowledged", body = AckResponse),
        (status = 400, description = "Missing or invalid fingerprint"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn acknowledge(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(booking_id): Path<BookingId>,
    Json(request): Json<AckRequest>,
) -> Result<Json<AckResponse>> {
    if request.fingerprint.is_empty() {
        return Err(Error::BadRequest {
            message: "Missing or invalid fingerprint".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut bookings = Bookings::new(&mut conn);

    let booking = bookings.get_by_id(booking_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Booking".to_string(),
        id: booking_id.to_string(),
    })?;

    // A loose acknowledgement survives harmless re-syncs: it hashes only the
    // booking, the kind of issue, and the code.
    let fingerprint = if request.loose {
        let code = booking.reservation_code.as_deref().or(booking.confirmation_code.as_deref());
        loose_fingerprint(booking.id, booking.date_sync_status, code)
    } else {
        request.fingerprint
    };

    bookings.acknowledge_ical(booking_id, &fingerprint, Some(current_user.id)).await?;

    Ok(Json(AckResponse {
        ok: true,
        booking_id,
        acked_at: Utc::now(),
        user_id: Some(current_user.id),
    }))
}
