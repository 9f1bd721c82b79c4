//! Non-destructive reconciler between bookings and iCal events.
//!
//! It does NOT change booking dates. It only links the matched iCal event,
//! stamps the last sync time, and labels the record as matched, conflict, or
//! suspected_cancelled.
//!
//! Matching order:
//!   1. already-linked event, validated for overlap and unit
//!   2. reservation code (best)
//!   3. (unit, overlapping date range) as a fallback, private bookings only

use crate::db::errors::Result;
use crate::db::handlers::{Bookings, IcalEvents};
use crate::db::models::{
    bookings::{BookingDBResponse, BookingSyncDBRequest, DateSyncStatus},
    ical_events::IcalEventDBResponse,
};
use crate::types::{BookingId, IcalEventId, UnitId};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgConnection;
use std::sync::LazyLock;
use tracing::instrument;
use utoipa::ToSchema;

static HM_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^HM[0-9A-Z]{7,}$").unwrap());

/// Event types treated as owner blocks for overlap matching.
const BLOCK_TYPES: [&str; 8] = ["block", "blocked", "owner_block", "owner-block", "maintenance", "busy", "o2_private", "o2-private"];

/// How a booking found its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Linked,
    Code,
    Overlap,
    None,
}

#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateDiffs {
    pub check_in: bool,
    pub check_out: bool,
}

/// One reconciled booking, as shown to the operator.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileItem {
    #[schema(value_type = Uuid)]
    pub booking_id: BookingId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
    pub reservation_code: Option<String>,
    pub confirmation_code: Option<String>,

    // Baseline booking dates
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    // Linked iCal event and its proposed dates
    #[schema(value_type = Option<Uuid>)]
    pub linked_event_id: Option<IcalEventId>,
    pub proposed_check_in: Option<NaiveDate>,
    pub proposed_check_out: Option<NaiveDate>,
    pub diffs: DateDiffs,

    pub status: DateSyncStatus,
    pub summary: Vec<String>,
    pub match_method: MatchMethod,
    pub warnings: Vec<String>,

    // Diagnostics for overlap candidates and double bookings
    pub overlap_count: Option<usize>,
    pub overlap_warning: bool,

    pub unit_name: Option<String>,
    pub city: Option<String>,
    pub guest_name: Option<String>,
    pub payout: Option<Decimal>,
    pub source: String,
    pub reservation_url: Option<String>,
    pub booking_reservation_url: Option<String>,
    pub last_ical_sync_at: Option<DateTime<Utc>>,

    /// Deterministic signature of this outcome; acknowledging it hides the
    /// row until the outcome changes.
    pub fingerprint: String,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub processed: usize,
    pub matched: usize,
    pub conflicts: usize,
    pub suspected_cancelled: usize,
    pub linked: usize,
    pub items: Vec<ReconcileItem>,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileParams {
    pub unit_id: Option<UnitId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// When false, compute only - nothing is written back
    pub persist: bool,
    /// Past checkouts older than this many days are never suspected cancelled
    pub grace_days: i64,
}

/// Reconcile bookings with iCal events over a window.
#[instrument(skip(conn, params), fields(unit = ?params.unit_id, persist = params.persist), err)]
pub async fn reconcile(conn: &mut PgConnection, params: &ReconcileParams) -> Result<ReconcileOutcome> {
    let now = Utc::now();
    let today = now.date_naive();
    // Do not suspect-cancelled if checkout is older than this
    let grace_past_cutoff = today - chrono::Duration::days(params.grace_days);

    let user_provided_from = params.from.is_some();

    // Airbnb ICS drops older past events, so clamp the lower bound to
    // max(today - 60d, earliest ICS dtstart). Only applied when the caller
    // did not pass an explicit window, which must never be shrunk.
    let mut from = params.from.unwrap_or_else(|| first_day_of_previous_month(today));
    if !user_provided_from {
        let mut base_clamp = today - chrono::Duration::days(60);
        let earliest = IcalEvents::new(&mut *conn).earliest_dtstart(params.unit_id).await?;
        if let Some(earliest) = earliest {
            if earliest > base_clamp {
                base_clamp = earliest;
            }
        }
        if from < base_clamp {
            from = base_clamp;
        }
    }

    let bookings = Bookings::new(&mut *conn)
        .reconcile_candidates(params.unit_id, Some(from), params.to)
        .await?;

    let mut outcome = ReconcileOutcome {
        processed: bookings.len(),
        matched: 0,
        conflicts: 0,
        suspected_cancelled: 0,
        linked: 0,
        items: Vec::with_capacity(bookings.len()),
    };

    for booking in &bookings {
        let (Some(unit_id), Some(check_in), Some(check_out)) = (booking.unit_id, booking.check_in, booking.check_out) else {
            continue;
        };

        let code = reservation_code_of(booking);
        let booking_conf = booking.confirmation_code.clone();
        let booking_hm = booking_conf.as_deref().filter(|c| looks_like_hm(c)).map(String::from);

        // Canonical HM: explicit reservation_code, else HM-shaped confirmation code
        let canonical_hm = code.clone().or_else(|| booking_hm.clone());
        let booking_reservation_url = canonical_hm
            .as_deref()
            .map(|hm| format!("https://www.airbnb.com/hosting/reservations/details/{hm}"));

        let mut match_method = MatchMethod::None;
        let mut warnings: Vec<String> = Vec::new();
        let mut summary: Vec<String> = Vec::new();
        let mut used_overlap = false;
        let mut suppress_date_summary = false;
        let mut overlap_count = None;
        let mut overlap_warning = false;

        // 0) Prefer an existing linked event if it still overlaps and belongs
        // to the same unit
        let mut event: Option<IcalEventDBResponse> = None;
        if let Some(linked_id) = booking.ical_event_id {
            if let Some(prelinked) = IcalEvents::new(&mut *conn).get_by_id(linked_id).await? {
                let overlaps = prelinked.dtstart < check_out && prelinked.dtend > check_in;
                let same_unit = prelinked.unit_id == unit_id;
                if overlaps && same_unit {
                    event = Some(prelinked);
                    match_method = MatchMethod::Linked;
                }
            }
        }

        // 1) Match by canonical HM code
        if event.is_none() {
            if let Some(hm) = canonical_hm.as_deref() {
                event = IcalEvents::new(&mut *conn).find_by_reservation_code(unit_id, hm).await?;
            }
        }

        // 2) Fallback: overlap by date range. A booking with a canonical HM
        // code never falls back to overlap: if its HM is not in the ICS it is
        // probably cancelled or outside the feed window.
        if event.is_none() && !canonical_hm.as_deref().is_some_and(looks_like_hm) {
            let over: Vec<IcalEventDBResponse> = IcalEvents::new(&mut *conn)
                .find_overlapping(unit_id, check_in, check_out)
                .await?
                .into_iter()
                .filter(is_block_like)
                .collect();

            overlap_count = Some(over.len());

            let (picked, _adjacent) = pick_best_overlap(&over, check_in, check_out, code.as_deref().or(booking_conf.as_deref()));
            if let Some(idx) = picked {
                event = Some(over[idx].clone());
                used_overlap = true;
            }
        }

        // 2b) An exact code match always beats an arbitrary overlap pick
        if used_overlap {
            if let Some(hm) = canonical_hm.as_deref() {
                if let Some(exact) = IcalEvents::new(&mut *conn).find_by_reservation_code(unit_id, hm).await? {
                    if event.as_ref().map(|e| e.id) != Some(exact.id) {
                        event = Some(exact);
                        used_overlap = false;
                    }
                }
            }
        }

        // Handoff: Airbnb checkout equals private check-in, or vice versa
        let handoff_ok = event
            .as_ref()
            .map(|e| is_adjacent_handoff(check_in, e) || is_reverse_adjacent_handoff(check_out, e))
            .unwrap_or(false);

        let status;
        if let Some(event) = &event {
            if booking.ical_event_id != Some(event.id) {
                outcome.linked += 1;
            }

            let same_in = check_in == event.dtstart;
            // End-date match depends on source: Airbnb uses tolerant DTEND
            // logic (exporters disagree on exclusivity); private/O2 is exact.
            let same_out = if canonical_hm.as_deref().is_some_and(looks_like_hm) || booking.source == "Airbnb" {
                airbnb_checkout_matches(check_out, event.dtend)
            } else {
                check_out == event.dtend
            };

            let dates_differ = !same_in || !same_out;
            let booking_is_private = !canonical_hm.as_deref().is_some_and(looks_like_hm);
            let event_is_airbnb = event.reservation_code.as_deref().is_some_and(looks_like_hm);
            let hm_mismatch = booking.source == "Airbnb"
                && canonical_hm.is_some()
                && event.reservation_code.is_some()
                && canonical_hm != event.reservation_code;

            if dates_differ && booking_is_private && event_is_airbnb && handoff_ok {
                // Private stay adjacent to an Airbnb night: a handoff, not a
                // conflict. Suppress the noisy date-diff lines.
                status = DateSyncStatus::Matched;
                suppress_date_summary = true;
            } else if hm_mismatch {
                if handoff_ok {
                    status = DateSyncStatus::Matched;
                    suppress_date_summary = true;
                } else if check_out >= grace_past_cutoff {
                    status = DateSyncStatus::SuspectedCancelled;
                    summary.push(format!(
                        "Airbnb: booking code {} not present in iCal; overlapping event shows {} - likely cancelled.",
                        canonical_hm.as_deref().unwrap_or(""),
                        event.reservation_code.as_deref().unwrap_or("")
                    ));
                    suppress_date_summary = true;
                } else if dates_differ {
                    // Old past stay: fall back to date comparison
                    status = DateSyncStatus::Conflict;
                } else {
                    status = DateSyncStatus::Matched;
                }
            } else if dates_differ {
                status = DateSyncStatus::Conflict;
            } else {
                status = DateSyncStatus::Matched;
            }

            if !suppress_date_summary {
                if !same_in {
                    summary.push(format!("iCal changed check-in -> {}", event.dtstart));
                }
                if !same_out {
                    summary.push(format!("iCal changed check-out -> {}", event.dtend));
                }
            }

            // Determine how we matched and warn on Airbnb HM mismatches
            if canonical_hm.is_some() && event.reservation_code == canonical_hm {
                match_method = MatchMethod::Code;
            } else if used_overlap {
                match_method = MatchMethod::Overlap;
                if let Some(event_rc) = event.reservation_code.as_deref() {
                    if !handoff_ok {
                        match canonical_hm.as_deref() {
                            None => warnings.push(format!("Airbnb: event has HM code {event_rc} but booking has no HM code")),
                            Some(hm) if hm != event_rc => {
                                warnings.push(format!("Airbnb: event HM code {event_rc} != booking HM code {hm}"))
                            }
                            _ => {}
                        }
                    }
                }
            }
        } else if booking.source == "Airbnb" && booking_hm.is_some() {
            if check_out >= grace_past_cutoff {
                status = DateSyncStatus::SuspectedCancelled;
                summary.push(format!(
                    "Airbnb: booking code {} not found in iCal - likely cancelled.",
                    booking_hm.as_deref().unwrap_or("")
                ));
            } else {
                // Long past stays are not worth flagging
                status = DateSyncStatus::Matched;
            }
        } else {
            // Nothing to compare against; keep whatever the last run decided
            status = booking.date_sync_status;
        }

        match status {
            DateSyncStatus::Matched => outcome.matched += 1,
            DateSyncStatus::Conflict => outcome.conflicts += 1,
            DateSyncStatus::SuspectedCancelled => outcome.suspected_cancelled += 1,
            DateSyncStatus::None => {}
        }

        // Calendar double-booking: a private stay overlapping a real Airbnb
        // reservation on the same unit
        if booking.source == "Private" {
            let airbnb_over: Vec<IcalEventDBResponse> = IcalEvents::new(&mut *conn)
                .find_overlapping_reservations(unit_id, check_in, check_out)
                .await?
                .into_iter()
                .filter(|ev| ev.reservation_code.as_deref().is_some_and(looks_like_hm))
                .filter(|ev| event.as_ref().map(|linked| linked.id) != Some(ev.id))
                .collect();

            if let Some(primary) = airbnb_over.first() {
                overlap_warning = true;
                let label = primary
                    .reservation_code
                    .clone()
                    .unwrap_or_else(|| format!("event #{}", crate::types::abbrev_uuid(&primary.id)));
                summary.push(format!(
                    "Calendar double-booked: overlaps Airbnb reservation {} ({} -> {}).",
                    label, primary.dtstart, primary.dtend
                ));
            }
        }

        if params.persist {
            Bookings::new(&mut *conn)
                .apply_sync(
                    &BookingSyncDBRequest {
                        booking_id: booking.id,
                        date_sync_status: status,
                        ical_event_id: event.as_ref().map(|e| e.id),
                        overlap_warning: (booking.source == "Private").then_some(overlap_warning),
                        last_updated_via: used_overlap.then(|| "ical-reconcile".to_string()),
                    },
                    now,
                )
                .await?;
        }

        let fingerprint = make_fingerprint(booking, status, event.as_ref());
        let acknowledged = booking
            .ical_ack_signature
            .as_deref()
            .is_some_and(|sig| sig == fingerprint || sig == loose_fingerprint(booking.id, status, canonical_hm.as_deref().or(booking_conf.as_deref())));

        let diffs = match &event {
            Some(e) => {
                let same_in = check_in == e.dtstart;
                let same_out = if canonical_hm.as_deref().is_some_and(looks_like_hm) || booking.source == "Airbnb" {
                    airbnb_checkout_matches(check_out, e.dtend)
                } else {
                    check_out == e.dtend
                };
                DateDiffs {
                    check_in: !same_in && !suppress_date_summary,
                    check_out: !same_out && !suppress_date_summary,
                }
            }
            None => DateDiffs::default(),
        };

        outcome.items.push(ReconcileItem {
            booking_id: booking.id,
            unit_id,
            reservation_code: code,
            confirmation_code: booking_conf,
            check_in,
            check_out,
            linked_event_id: event.as_ref().map(|e| e.id),
            proposed_check_in: event.as_ref().map(|e| e.dtstart),
            proposed_check_out: event.as_ref().map(|e| e.dtend),
            diffs,
            status,
            summary,
            match_method,
            warnings,
            overlap_count,
            overlap_warning,
            unit_name: booking.unit_name.clone(),
            city: booking.city.clone(),
            guest_name: booking.guest_name.clone(),
            payout: booking.payout,
            source: booking.source.clone(),
            reservation_url: event.as_ref().and_then(|e| e.reservation_url.clone()),
            booking_reservation_url,
            last_ical_sync_at: if params.persist { Some(now) } else { booking.last_ical_sync_at },
            fingerprint,
            acknowledged,
        });
    }

    Ok(outcome)
}

// --------------------------- helpers --------------------------- //

/// HM-shaped codes identify Airbnb reservations.
pub fn looks_like_hm(code: &str) -> bool {
    HM_CODE.is_match(code)
}

/// Owners2 private code (O2M...)
fn is_o2_code(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.starts_with("O2M"))
}

/// Only Owners2/private style blocks qualify for overlap matching.
fn is_block_like(event: &IcalEventDBResponse) -> bool {
    let block_type = event
        .event_type
        .as_deref()
        .map(|t| t.to_lowercase())
        .is_some_and(|t| BLOCK_TYPES.contains(&t.as_str()));
    let looks_o2 = event.reservation_code.as_deref().is_some_and(|rc| rc.starts_with("O2"))
        || event.uid.as_deref().is_some_and(|uid| uid.starts_with("o2-"));

    event.is_block || block_type || looks_o2
}

/// Adjacent handoff if event dtend equals booking check-in (iCal DTEND is exclusive).
fn is_adjacent_handoff(booking_check_in: NaiveDate, event: &IcalEventDBResponse) -> bool {
    event.dtend == booking_check_in
}

/// Reverse direction: booking checkout equals event start.
fn is_reverse_adjacent_handoff(booking_check_out: NaiveDate, event: &IcalEventDBResponse) -> bool {
    event.dtstart == booking_check_out
}

/// Airbnb ICS can represent DTEND as either the checkout date (VALUE=DATE,
/// exclusive) or the midnight boundary. Accept equality against either DTEND
/// or DTEND - 1 day to avoid false conflicts.
pub fn airbnb_checkout_matches(booking_check_out: NaiveDate, ics_dtend: NaiveDate) -> bool {
    booking_check_out == ics_dtend || Some(booking_check_out) == ics_dtend.pred_opt()
}

/// Choose the best event from the overlapping candidates:
///  1. exact date match (tolerant DTEND for HM bookings)
///  2. for O2 private bookings, prefer O2M/blocked events
///  3. adjacent handoff, either direction
///  4. largest overlap window
///
/// Returns (index into `events`, adjacent_handoff_used).
fn pick_best_overlap(events: &[IcalEventDBResponse], check_in: NaiveDate, check_out: NaiveDate, booking_code: Option<&str>) -> (Option<usize>, bool) {
    if events.is_empty() {
        return (None, false);
    }

    let booking_is_hm = booking_code.is_some_and(looks_like_hm);
    for (i, ev) in events.iter().enumerate() {
        let end_matches = if booking_is_hm {
            airbnb_checkout_matches(check_out, ev.dtend)
        } else {
            ev.dtend == check_out
        };
        if ev.dtstart == check_in && end_matches {
            return (Some(i), false);
        }
    }

    if is_o2_code(booking_code) {
        for (i, ev) in events.iter().enumerate() {
            let blocked_type = ev.event_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("blocked"));
            if is_o2_code(ev.reservation_code.as_deref()) || blocked_type {
                return (Some(i), false);
            }
        }
    }

    for (i, ev) in events.iter().enumerate() {
        if is_adjacent_handoff(check_in, ev) {
            return (Some(i), true);
        }
    }
    for (i, ev) in events.iter().enumerate() {
        if is_reverse_adjacent_handoff(check_out, ev) {
            return (Some(i), true);
        }
    }

    let mut best = None;
    let mut best_overlap = -1i64;
    for (i, ev) in events.iter().enumerate() {
        let ov_start = ev.dtstart.max(check_in);
        let ov_end = ev.dtend.min(check_out);
        if ov_end > ov_start {
            let days = (ov_end - ov_start).num_days();
            if days > best_overlap {
                best_overlap = days;
                best = Some(i);
            }
        }
    }
    (best.or(Some(0)), false)
}

fn first_day_of_previous_month(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 1 { (today.year() - 1, 12) } else { (today.year(), today.month() - 1) };
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid first of month")
}

fn reservation_code_of(booking: &BookingDBResponse) -> Option<String> {
    if let Some(rc) = booking.reservation_code.as_deref() {
        if !rc.is_empty() {
            return Some(rc.to_string());
        }
    }
    // Some setups store the HM code in confirmation_code
    booking.confirmation_code.as_deref().filter(|c| looks_like_hm(c)).map(String::from)
}

/// Build a stable fingerprint for a booking and its (optional) linked event.
/// Lets the frontend acknowledge a specific reconcile outcome safely: any
/// change to codes, dates, status, or the linked event produces a new value.
pub fn make_fingerprint(booking: &BookingDBResponse, status: DateSyncStatus, event: Option<&IcalEventDBResponse>) -> String {
    let parts = [
        format!("bid={}", booking.id),
        format!("rc={}", reservation_code_of(booking).unwrap_or_default()),
        format!("cc={}", booking.confirmation_code.as_deref().unwrap_or_default()),
        format!("st={}", status_str(status)),
        format!("in={}", booking.check_in.map(|d| d.to_string()).unwrap_or_default()),
        format!("out={}", booking.check_out.map(|d| d.to_string()).unwrap_or_default()),
        format!("euid={}", event.and_then(|e| e.uid.as_deref()).unwrap_or_default()),
        format!("es={}", event.map(|e| e.dtstart.to_string()).unwrap_or_default()),
        format!("ee={}", event.map(|e| e.dtend.to_string()).unwrap_or_default()),
        format!("erc={}", event.and_then(|e| e.reservation_code.as_deref()).unwrap_or_default()),
    ];
    hex::encode(Sha256::digest(parts.join("|").as_bytes()))
}

/// A coarse fingerprint that ignores date diffs, so an acknowledgement can
/// persist across harmless re-syncs that keep the type of issue unchanged.
pub fn loose_fingerprint(booking_id: BookingId, status: DateSyncStatus, code: Option<&str>) -> String {
    let parts = format!("loose|{}|{}|{}", booking_id, status_str(status), code.unwrap_or_default());
    hex::encode(Sha256::digest(parts.as_bytes()))
}

fn status_str(status: DateSyncStatus) -> &'static str {
    match status {
        DateSyncStatus::None => "none",
        DateSyncStatus::Matched => "matched",
        DateSyncStatus::Conflict => "conflict",
        DateSyncStatus::SuspectedCancelled => "suspected_cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_booking, create_test_ical_event, create_test_unit, set_booking_codes};
    use sqlx::PgPool;
    use uuid::Uuid;

    fn event(dtstart: &str, dtend: &str) -> IcalEventDBResponse {
        IcalEventDBResponse {
            id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            uid: None,
            dtstart: dtstart.parse().unwrap(),
            dtend: dtend.parse().unwrap(),
            event_type: Some("reservation".to_string()),
            is_block: false,
            summary: None,
            reservation_code: None,
            reservation_url: None,
            last_seen_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_hm_code_shape() {
        assert!(looks_like_hm("HMABCD1234"));
        assert!(looks_like_hm("HM12345678XYZ"));
        assert!(!looks_like_hm("O2M26010012"));
        assert!(!looks_like_hm("HM123")); // too short
        assert!(!looks_like_hm("hmabcd1234")); // lowercase
    }

    #[test]
    fn test_airbnb_checkout_tolerance() {
        let checkout: NaiveDate = "2026-03-10".parse().unwrap();
        assert!(airbnb_checkout_matches(checkout, "2026-03-10".parse().unwrap()));
        assert!(airbnb_checkout_matches(checkout, "2026-03-11".parse().unwrap()));
        assert!(!airbnb_checkout_matches(checkout, "2026-03-09".parse().unwrap()));
        assert!(!airbnb_checkout_matches(checkout, "2026-03-12".parse().unwrap()));
    }

    #[test]
    fn test_pick_best_overlap_prefers_exact_dates() {
        let check_in: NaiveDate = "2026-03-01".parse().unwrap();
        let check_out: NaiveDate = "2026-03-05".parse().unwrap();

        let sloppy = event("2026-02-27", "2026-03-04");
        let exact = event("2026-03-01", "2026-03-05");
        let events = vec![sloppy, exact];

        let (picked, adjacent) = pick_best_overlap(&events, check_in, check_out, Some("O2M26030001"));
        assert_eq!(picked, Some(1));
        assert!(!adjacent);
    }

    #[test]
    fn test_pick_best_overlap_detects_handoff() {
        let check_in: NaiveDate = "2026-03-05".parse().unwrap();
        let check_out: NaiveDate = "2026-03-08".parse().unwrap();

        // Airbnb stay ends exactly the day the private stay begins
        let airbnb = event("2026-03-01", "2026-03-05");
        let (picked, adjacent) = pick_best_overlap(&[airbnb], check_in, check_out, Some("O2M26030002"));
        assert_eq!(picked, Some(0));
        assert!(adjacent);
    }

    #[test]
    fn test_pick_best_overlap_falls_back_to_largest_window() {
        let check_in: NaiveDate = "2026-03-01".parse().unwrap();
        let check_out: NaiveDate = "2026-03-10".parse().unwrap();

        let short = event("2026-03-08", "2026-03-11");
        let long = event("2026-03-02", "2026-03-09");
        let (picked, adjacent) = pick_best_overlap(&[short, long], check_in, check_out, None);
        assert_eq!(picked, Some(1));
        assert!(!adjacent);
    }

    #[test]
    fn test_fingerprint_changes_with_status() {
        let booking = BookingDBResponse {
            id: Uuid::new_v4(),
            unit_id: Some(Uuid::new_v4()),
            unit_name: None,
            city: None,
            source: "Airbnb".to_string(),
            confirmation_code: Some("HMABCD1234".to_string()),
            reservation_code: None,
            guest_name: None,
            status: "confirmed".to_string(),
            check_in: Some("2026-03-01".parse().unwrap()),
            check_out: Some("2026-03-05".parse().unwrap()),
            guests: None,
            payout: None,
            cleaning_fee: None,
            room_fee: None,
            date_sync_status: DateSyncStatus::None,
            ical_event_id: None,
            last_ical_sync_at: None,
            last_updated_at: None,
            last_updated_via: None,
            overlap_warning: false,
            ical_ack_signature: None,
            ical_ack_at: None,
            ical_ack_user_id: None,
            created_at: Utc::now(),
        };

        let matched = make_fingerprint(&booking, DateSyncStatus::Matched, None);
        let conflicted = make_fingerprint(&booking, DateSyncStatus::Conflict, None);
        assert_ne!(matched, conflicted);

        // Stable for identical inputs
        assert_eq!(matched, make_fingerprint(&booking, DateSyncStatus::Matched, None));
    }

    #[sqlx::test]
    async fn test_code_match_and_conflict_detection(pool: PgPool) {
        let unit = create_test_unit(&pool, "Reconcile 1", None).await;
        let booking = create_test_booking(&pool, unit.id, "HMCODE0001", "2026-03-01", "2026-03-05").await;

        // Event with the same code but shifted dates
        create_test_ical_event(&pool, unit.id, Some("HMCODE0001"), "2026-03-02", "2026-03-06").await;

        let mut conn = pool.acquire().await.unwrap();
        let outcome = reconcile(
            &mut conn,
            &ReconcileParams {
                unit_id: Some(unit.id),
                from: Some("2026-01-01".parse().unwrap()),
                to: None,
                persist: true,
                grace_days: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.conflicts, 1);
        assert_eq!(outcome.linked, 1);
        let item = &outcome.items[0];
        assert_eq!(item.booking_id, booking.id);
        assert_eq!(item.status, DateSyncStatus::Conflict);
        assert_eq!(item.match_method, MatchMethod::Code);
        assert!(item.diffs.check_in);
        // 2026-03-05 checkout vs dtend 2026-03-06 is within Airbnb DTEND tolerance
        assert!(!item.diffs.check_out);

        // Persisted: booking now carries the link and status
        let row: (String, Option<Uuid>) = sqlx::query_as("SELECT date_sync_status, ical_event_id FROM bookings WHERE id = $1")
            .bind(booking.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, "conflict");
        assert!(row.1.is_some());
    }

    #[sqlx::test]
    async fn test_missing_hm_event_is_suspected_cancelled(pool: PgPool) {
        let unit = create_test_unit(&pool, "Reconcile 2", None).await;
        // Future stay, no matching ICS event at all
        let future_in = (Utc::now().date_naive() + chrono::Duration::days(30)).to_string();
        let future_out = (Utc::now().date_naive() + chrono::Duration::days(35)).to_string();
        create_test_booking(&pool, unit.id, "HMGONE0001", &future_in, &future_out).await;

        let mut conn = pool.acquire().await.unwrap();
        let outcome = reconcile(
            &mut conn,
            &ReconcileParams {
                unit_id: Some(unit.id),
                from: None,
                to: None,
                persist: false,
                grace_days: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.suspected_cancelled, 1);
        let item = &outcome.items[0];
        assert_eq!(item.status, DateSyncStatus::SuspectedCancelled);
        assert!(item.summary.iter().any(|s| s.contains("not found in iCal")));
        assert_eq!(item.match_method, MatchMethod::None);
    }

    #[sqlx::test]
    async fn test_private_booking_overlap_match_and_double_booking_warning(pool: PgPool) {
        let unit = create_test_unit(&pool, "Reconcile 3", None).await;
        let booking = create_test_booking(&pool, unit.id, "X", "2026-04-01", "2026-04-05").await;
        set_booking_codes(&pool, booking.id, Some("O2M26040001"), "Private").await;

        // A block covering the stay (overlap match target)...
        let mut block = create_test_ical_event(&pool, unit.id, None, "2026-04-01", "2026-04-05").await;
        sqlx::query("UPDATE ical_events SET is_block = TRUE, event_type = 'blocked' WHERE id = $1")
            .bind(block.id)
            .execute(&pool)
            .await
            .unwrap();
        block.is_block = true;

        // ...and an Airbnb reservation double-booked over the same nights
        create_test_ical_event(&pool, unit.id, Some("HMDBL00001"), "2026-04-03", "2026-04-07").await;

        let mut conn = pool.acquire().await.unwrap();
        let outcome = reconcile(
            &mut conn,
            &ReconcileParams {
                unit_id: Some(unit.id),
                from: Some("2026-03-01".parse().unwrap()),
                to: None,
                persist: true,
                grace_days: 2,
            },
        )
        .await
        .unwrap();

        let item = &outcome.items[0];
        assert_eq!(item.status, DateSyncStatus::Matched);
        assert_eq!(item.match_method, MatchMethod::Overlap);
        assert_eq!(item.linked_event_id, Some(block.id));
        assert!(item.overlap_warning);
        assert!(item.summary.iter().any(|s| s.contains("double-booked")));

        let warned: bool = sqlx::query_scalar("SELECT overlap_warning FROM bookings WHERE id = $1")
            .bind(booking.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(warned);
    }

    #[sqlx::test]
    async fn test_acknowledged_outcome_is_flagged(pool: PgPool) {
        let unit = create_test_unit(&pool, "Reconcile 4", None).await;
        let booking = create_test_booking(&pool, unit.id, "HMACK00001", "2026-05-01", "2026-05-05").await;
        create_test_ical_event(&pool, unit.id, Some("HMACK00001"), "2026-05-02", "2026-05-05").await;

        let params = ReconcileParams {
            unit_id: Some(unit.id),
            from: Some("2026-04-01".parse().unwrap()),
            to: None,
            persist: true,
            grace_days: 2,
        };

        let mut conn = pool.acquire().await.unwrap();
        let first = reconcile(&mut conn, &params).await.unwrap();
        let item = &first.items[0];
        assert_eq!(item.status, DateSyncStatus::Conflict);
        assert!(!item.acknowledged);

        // Operator acknowledges this exact outcome
        sqlx::query("UPDATE bookings SET ical_ack_signature = $2 WHERE id = $1")
            .bind(booking.id)
            .bind(&item.fingerprint)
            .execute(&pool)
            .await
            .unwrap();

        let second = reconcile(&mut conn, &params).await.unwrap();
        assert!(second.items[0].acknowledged);
    }
}
