//! Database repository for imported calendar events.

use crate::db::{
    errors::Result,
    models::ical_events::{IcalEventCreateDBRequest, IcalEventDBResponse},
};
use crate::types::{IcalEventId, UnitId, abbrev_uuid};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgConnection;
use tracing::instrument;

pub struct IcalEvents<'c> {
    db: &'c mut PgConnection,
}

impl<'c> IcalEvents<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    pub async fn create(&mut self, request: &IcalEventCreateDBRequest) -> Result<IcalEventDBResponse> {
        let event = sqlx::query_as::<_, IcalEventDBResponse>(
            r#"
            INSERT INTO ical_events (unit_id, uid, dtstart, dtend, event_type, is_block,
                                     summary, reservation_code, reservation_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(&request.uid)
        .bind(request.dtstart)
        .bind(request.dtend)
        .bind(&request.event_type)
        .bind(request.is_block)
        .bind(&request.summary)
        .bind(&request.reservation_code)
        .bind(&request.reservation_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(event)
    }

    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: IcalEventId) -> Result<Option<IcalEventDBResponse>> {
        let event = sqlx::query_as::<_, IcalEventDBResponse>("SELECT * FROM ical_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(event)
    }

    /// Find an Airbnb reservation event by reservation code for a unit.
    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id), code = %reservation_code), err)]
    pub async fn find_by_reservation_code(&mut self, unit_id: UnitId, reservation_code: &str) -> Result<Option<IcalEventDBResponse>> {
        let event = sqlx::query_as::<_, IcalEventDBResponse>(
            r#"
            SELECT * FROM ical_events
            WHERE unit_id = $1 AND reservation_code = $2 AND LOWER(COALESCE(event_type, '')) = 'reservation'
            LIMIT 1
            "#,
        )
        .bind(unit_id)
        .bind(reservation_code)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(event)
    }

    /// Events intersecting the [from, to) range of a booking for a unit.
    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn find_overlapping(&mut self, unit_id: UnitId, from: NaiveDate, to: NaiveDate) -> Result<Vec<IcalEventDBResponse>> {
        let events = sqlx::query_as::<_, IcalEventDBResponse>(
            r#"
            SELECT * FROM ical_events
            WHERE unit_id = $1 AND dtstart <= $3 AND dtend >= $2
            ORDER BY dtstart
            "#,
        )
        .bind(unit_id)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(events)
    }

    /// Airbnb reservation events strictly overlapping a date range (used for
    /// double-booking detection against private bookings).
    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn find_overlapping_reservations(
        &mut self,
        unit_id: UnitId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<IcalEventDBResponse>> {
        let events = sqlx::query_as::<_, IcalEventDBResponse>(
            r#"
            SELECT * FROM ical_events
            WHERE unit_id = $1
              AND LOWER(COALESCE(event_type, '')) = 'reservation'
              AND dtstart < $3 AND dtend > $2
            ORDER BY dtstart
            "#,
        )
        .bind(unit_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(events)
    }

    /// Earliest dtstart present in the table, optionally per unit.
    ///
    /// Airbnb ICS feeds drop old events, so this bounds how far back the
    /// reconciler may trust "not present in iCal".
    #[instrument(skip(self), err)]
    pub async fn earliest_dtstart(&mut self, unit_id: Option<UnitId>) -> Result<Option<NaiveDate>> {
        let earliest: Option<NaiveDate> = if let Some(unit_id) = unit_id {
            sqlx::query_scalar("SELECT MIN(dtstart) FROM ical_events WHERE unit_id = $1")
                .bind(unit_id)
                .fetch_one(&mut *self.db)
                .await?
        } else {
            sqlx::query_scalar("SELECT MIN(dtstart) FROM ical_events").fetch_one(&mut *self.db).await?
        };

        Ok(earliest)
    }

    /// Most recent feed observation, optionally per unit.
    #[instrument(skip(self), err)]
    pub async fn latest_seen_at(&mut self, unit_id: Option<UnitId>) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> = if let Some(unit_id) = unit_id {
            sqlx::query_scalar("SELECT MAX(last_seen_at) FROM ical_events WHERE unit_id = $1")
                .bind(unit_id)
                .fetch_one(&mut *self.db)
                .await?
        } else {
            sqlx::query_scalar("SELECT MAX(last_seen_at) FROM ical_events").fetch_one(&mut *self.db).await?
        };

        Ok(latest)
    }
}
