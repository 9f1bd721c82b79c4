//! Database repository for condos.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::condos::{CondoCreateDBRequest, CondoDBResponse, CondoUpdateDBRequest},
    models::units::INACTIVE_STATUSES,
};
use crate::types::{CondoId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing condos.
#[derive(Debug, Clone, Default)]
pub struct CondoFilter {
    /// Only condos that currently have at least one active unit
    pub with_active_units: bool,
}

pub struct Condos<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Condos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_name(&mut self, condo_name: &str) -> Result<Option<CondoDBResponse>> {
        let condo = sqlx::query_as::<_, CondoDBResponse>("SELECT * FROM condos WHERE condo_name = $1")
            .bind(condo_name)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(condo)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Condos<'c> {
    type CreateRequest = CondoCreateDBRequest;
    type UpdateRequest = CondoUpdateDBRequest;
    type Response = CondoDBResponse;
    type Id = CondoId;
    type Filter = CondoFilter;

    #[instrument(skip(self, request), fields(name = %request.condo_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let condo = sqlx::query_as::<_, CondoDBResponse>(
            r#"
            INSERT INTO condos (condo_name, city, door_code, notes, google_maps,
                                hoa_bank, hoa_account_name, hoa_account_nr, hoa_email, hoa_due_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&request.condo_name)
        .bind(&request.city)
        .bind(&request.door_code)
        .bind(&request.notes)
        .bind(&request.google_maps)
        .bind(&request.hoa_bank)
        .bind(&request.hoa_account_name)
        .bind(&request.hoa_account_nr)
        .bind(&request.hoa_email)
        .bind(request.hoa_due_day)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(condo)
    }

    #[instrument(skip(self), fields(condo_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let condo = sqlx::query_as::<_, CondoDBResponse>("SELECT * FROM condos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(condo)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let condos = if filter.with_active_units {
            // Condos with at least one unit still running and not parked in an
            // inactive-like status.
            sqlx::query_as::<_, CondoDBResponse>(
                r#"
                SELECT co.* FROM condos co
                WHERE EXISTS (
                    SELECT 1 FROM units u
                    WHERE u.condo_id = co.id
                      AND u.date_ended IS NULL
                      AND LOWER(COALESCE(u.status, '')) != ALL($1)
                )
                ORDER BY co.condo_name
                "#,
            )
            .bind(INACTIVE_STATUSES.map(String::from).to_vec())
            .fetch_all(&mut *self.db)
            .await?
        } else {
            sqlx::query_as::<_, CondoDBResponse>("SELECT * FROM condos ORDER BY condo_name")
                .fetch_all(&mut *self.db)
                .await?
        };

        Ok(condos)
    }

    #[instrument(skip(self), fields(condo_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM condos WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(condo_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let condo = sqlx::query_as::<_, CondoDBResponse>(
            r#"
            UPDATE condos SET
                city = COALESCE($2, city),
                door_code = COALESCE($3, door_code),
                notes = COALESCE($4, notes),
                google_maps = COALESCE($5, google_maps),
                hoa_bank = COALESCE($6, hoa_bank),
                hoa_account_name = COALESCE($7, hoa_account_name),
                hoa_account_nr = COALESCE($8, hoa_account_nr),
                hoa_email = COALESCE($9, hoa_email),
                hoa_due_day = COALESCE($10, hoa_due_day)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.city)
        .bind(&request.door_code)
        .bind(&request.notes)
        .bind(&request.google_maps)
        .bind(&request.hoa_bank)
        .bind(&request.hoa_account_name)
        .bind(&request.hoa_account_nr)
        .bind(&request.hoa_email)
        .bind(request.hoa_due_day)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(condo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_condo, create_test_unit};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_create_update_roundtrip(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Condos::new(&mut conn);

        let condo = repo
            .create(&CondoCreateDBRequest {
                condo_name: "Aldea Zama".to_string(),
                city: "Tulum".to_string(),
                door_code: Some("1234#".to_string()),
                notes: None,
                google_maps: None,
                hoa_bank: None,
                hoa_account_name: None,
                hoa_account_nr: None,
                hoa_email: None,
                hoa_due_day: Some(5),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                condo.id,
                &CondoUpdateDBRequest {
                    notes: Some("Gate remote in lockbox".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Partial update keeps unset fields
        assert_eq!(updated.city, "Tulum");
        assert_eq!(updated.door_code.as_deref(), Some("1234#"));
        assert_eq!(updated.notes.as_deref(), Some("Gate remote in lockbox"));
        assert_eq!(updated.hoa_due_day, Some(5));
    }

    #[sqlx::test]
    async fn test_duplicate_name_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Condos::new(&mut conn);

        let request = CondoCreateDBRequest {
            condo_name: "Twice".to_string(),
            city: "Playa del Carmen".to_string(),
            door_code: None,
            notes: None,
            google_maps: None,
            hoa_bank: None,
            hoa_account_name: None,
            hoa_account_nr: None,
            hoa_email: None,
            hoa_due_day: None,
        };
        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_active_units_filter(pool: PgPool) {
        let with_unit = create_test_condo(&pool, "Occupied").await;
        let _empty = create_test_condo(&pool, "Empty").await;
        create_test_unit(&pool, "Occupied 101", Some(with_unit.id)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Condos::new(&mut conn);

        let active = repo
            .list(&CondoFilter { with_active_units: true })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].condo_name, "Occupied");

        let all = repo.list(&CondoFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
