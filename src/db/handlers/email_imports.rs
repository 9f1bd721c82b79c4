//! Database repository for parsed Airbnb confirmation emails.

use crate::db::{
    errors::Result,
    models::email_imports::{EmailImportCreateDBRequest, EmailImportDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct EmailImports<'c> {
    db: &'c mut PgConnection,
}

impl<'c> EmailImports<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(code = %request.confirmation_code), err)]
    pub async fn create(&mut self, request: &EmailImportCreateDBRequest) -> Result<EmailImportDBResponse> {
        let record = sqlx::query_as::<_, EmailImportDBResponse>(
            r#"
            INSERT INTO airbnb_email_imports
                (booking_date, source, confirmation_code, guest_name, listing_name, guests,
                 check_in, check_out, payout, cleaning_fee, room_fee)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(request.booking_date)
        .bind(&request.source)
        .bind(&request.confirmation_code)
        .bind(&request.guest_name)
        .bind(&request.listing_name)
        .bind(request.guests)
        .bind(&request.check_in)
        .bind(&request.check_out)
        .bind(request.payout)
        .bind(request.cleaning_fee)
        .bind(request.room_fee)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self), fields(limit), err)]
    pub async fn list_recent(&mut self, limit: i64) -> Result<Vec<EmailImportDBResponse>> {
        let records = sqlx::query_as::<_, EmailImportDBResponse>(
            "SELECT * FROM airbnb_email_imports ORDER BY received_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }
}
