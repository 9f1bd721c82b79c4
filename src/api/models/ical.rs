use crate::db::models::bookings::DateSyncStatus;
use crate::reconcile::ical::{DateDiffs, ReconcileOutcome};
use crate::types::{BookingId, UnitId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReconcileQuery {
    /// Limit to one unit
    #[param(value_type = Option<Uuid>)]
    pub unit: Option<UnitId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Compute only, write nothing back
    #[serde(default)]
    pub dry: bool,
    /// Hide rows whose outcome was already acknowledged (default true)
    #[serde(rename = "hideAck")]
    pub hide_ack: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileParamsEcho {
    #[schema(value_type = Option<Uuid>)]
    pub unit: Option<UnitId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub dry: bool,
    pub hide_ack: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileMeta {
    /// Most recent feed observation for the scope, from the events table
    pub ical_last_seen: Option<DateTime<Utc>>,
    pub filtered_by_ack: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileResponse {
    pub ok: bool,
    pub params: ReconcileParamsEcho,
    pub data: ReconcileOutcome,
    pub meta: ReconcileMeta,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationsQuery {
    #[param(value_type = Option<Uuid>)]
    pub unit: Option<UnitId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Notification type, derived from the reconcile status.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    IcalConflict,
    IcalSuspectedCancelled,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[schema(value_type = Uuid)]
    pub booking_id: BookingId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub unit_name: Option<String>,
    pub guest_name: Option<String>,
    pub reservation_code: Option<String>,
    pub status: DateSyncStatus,
    pub diffs: DateDiffs,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub proposed_check_in: Option<NaiveDate>,
    pub proposed_check_out: Option<NaiveDate>,
    pub reservation_url: Option<String>,
    pub booking_reservation_url: Option<String>,
    pub last_ical_sync_at: Option<DateTime<Utc>>,
    pub summary: Vec<String>,
    pub fingerprint: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub ok: bool,
    pub data: NotificationList,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationList {
    pub count: usize,
    pub items: Vec<Notification>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AckRequest {
    pub fingerprint: String,
    /// Derive a coarse signature that survives harmless re-syncs
    #[serde(default)]
    pub loose: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub ok: bool,
    #[schema(value_type = Uuid)]
    pub booking_id: BookingId,
    pub acked_at: DateTime<Utc>,
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<UserId>,
}
