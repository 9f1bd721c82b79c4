//! Database repository for unit media (gallery images).

use crate::db::{
    errors::{DbError, Result},
    models::media::{MediaCreateDBRequest, MediaDBResponse, MediaUpdateDBRequest},
};
use crate::types::{MediaId, UnitId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing a unit's media.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaFilter {
    pub published_only: bool,
    pub covers_only: bool,
}

pub struct Media<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Media<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id)), err)]
    pub async fn create(&mut self, request: &MediaCreateDBRequest) -> Result<MediaDBResponse> {
        let media = sqlx::query_as::<_, MediaDBResponse>(
            r#"
            INSERT INTO unit_media (unit_id, storage_key, url, caption, seo_description, tags,
                                    is_published, is_cover, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(&request.storage_key)
        .bind(&request.url)
        .bind(&request.caption)
        .bind(&request.seo_description)
        .bind(&request.tags)
        .bind(request.is_published)
        .bind(request.is_cover)
        .bind(request.sort_order)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(media)
    }

    #[instrument(skip(self), fields(media_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: MediaId) -> Result<Option<MediaDBResponse>> {
        let media = sqlx::query_as::<_, MediaDBResponse>("SELECT * FROM unit_media WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(media)
    }

    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn list_for_unit(&mut self, unit_id: UnitId, filter: MediaFilter) -> Result<Vec<MediaDBResponse>> {
        let media = if filter.covers_only {
            sqlx::query_as::<_, MediaDBResponse>("SELECT * FROM unit_media WHERE unit_id = $1 AND is_cover ORDER BY sort_order, created_at")
                .bind(unit_id)
                .fetch_all(&mut *self.db)
                .await?
        } else if filter.published_only {
            sqlx::query_as::<_, MediaDBResponse>(
                "SELECT * FROM unit_media WHERE unit_id = $1 AND is_published ORDER BY sort_order, created_at",
            )
            .bind(unit_id)
            .fetch_all(&mut *self.db)
            .await?
        } else {
            sqlx::query_as::<_, MediaDBResponse>("SELECT * FROM unit_media WHERE unit_id = $1 ORDER BY sort_order, created_at")
                .bind(unit_id)
                .fetch_all(&mut *self.db)
                .await?
        };

        Ok(media)
    }

    /// Current max sort order for a unit, -1 when the gallery is empty.
    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn max_sort_order(&mut self, unit_id: UnitId) -> Result<i32> {
        let max: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(sort_order), -1) FROM unit_media WHERE unit_id = $1")
            .bind(unit_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(max)
    }

    /// Partial metadata update. Promoting to cover clears the flag on the
    /// unit's other media first, keeping the one-cover-per-unit invariant.
    #[instrument(skip(self, request), fields(media_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: MediaId, request: &MediaUpdateDBRequest) -> Result<MediaDBResponse> {
        if request.is_cover == Some(true) {
            sqlx::query("UPDATE unit_media SET is_cover = FALSE WHERE unit_id = (SELECT unit_id FROM unit_media WHERE id = $1) AND id != $1")
                .bind(id)
                .execute(&mut *self.db)
                .await?;
        }

        let media = sqlx::query_as::<_, MediaDBResponse>(
            r#"
            UPDATE unit_media SET
                caption = CASE WHEN $2 THEN $3 ELSE caption END,
                seo_description = CASE WHEN $4 THEN $5 ELSE seo_description END,
                tags = COALESCE($6, tags),
                is_published = COALESCE($7, is_published),
                is_cover = COALESCE($8, is_cover),
                sort_order = COALESCE($9, sort_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.caption.is_some())
        .bind(request.caption.clone().flatten())
        .bind(request.seo_description.is_some())
        .bind(request.seo_description.clone().flatten())
        .bind(&request.tags)
        .bind(request.is_published)
        .bind(request.is_cover)
        .bind(request.sort_order)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(media)
    }

    /// Apply a full ordering: listed ids get positions 0..n with position 0 as
    /// the cover; everything else loses the cover flag.
    #[instrument(skip(self, order), fields(unit_id = %abbrev_uuid(&unit_id), count = order.len()), err)]
    pub async fn reorder(&mut self, unit_id: UnitId, order: &[MediaId]) -> Result<Vec<MediaDBResponse>> {
        // Clear covers first so the unique index never sees two at once
        sqlx::query("UPDATE unit_media SET is_cover = FALSE WHERE unit_id = $1")
            .bind(unit_id)
            .execute(&mut *self.db)
            .await?;

        let mut updated = Vec::with_capacity(order.len());
        for (position, media_id) in order.iter().enumerate() {
            let row = sqlx::query_as::<_, MediaDBResponse>(
                r#"
                UPDATE unit_media SET sort_order = $3, is_cover = $4, updated_at = NOW()
                WHERE id = $2 AND unit_id = $1
                RETURNING *
                "#,
            )
            .bind(unit_id)
            .bind(media_id)
            .bind(position as i32)
            .bind(position == 0)
            .fetch_optional(&mut *self.db)
            .await?;

            // Ids not belonging to the unit are skipped
            if let Some(row) = row {
                updated.push(row);
            }
        }

        Ok(updated)
    }

    #[instrument(skip(self), fields(media_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: MediaId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM unit_media WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_media, create_test_unit};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_cover_patch_clears_previous_cover(pool: PgPool) {
        let unit = create_test_unit(&pool, "Casa Flora", None).await;
        let first = create_test_media(&pool, unit.id, 0).await;
        let second = create_test_media(&pool, unit.id, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Media::new(&mut conn);

        repo.update(
            first.id,
            &MediaUpdateDBRequest {
                is_cover: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let promoted = repo
            .update(
                second.id,
                &MediaUpdateDBRequest {
                    is_cover: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(promoted.is_cover);

        let covers = repo.list_for_unit(unit.id, MediaFilter { covers_only: true, ..Default::default() }).await.unwrap();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].id, second.id);
    }

    #[sqlx::test]
    async fn test_reorder_sets_cover_to_first(pool: PgPool) {
        let unit = create_test_unit(&pool, "Casa Brisa", None).await;
        let a = create_test_media(&pool, unit.id, 0).await;
        let b = create_test_media(&pool, unit.id, 1).await;
        let c = create_test_media(&pool, unit.id, 2).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Media::new(&mut conn);

        let updated = repo.reorder(unit.id, &[c.id, a.id]).await.unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].id, c.id);
        assert!(updated[0].is_cover);
        assert_eq!(updated[0].sort_order, 0);
        assert!(!updated[1].is_cover);

        // b was left out of the order and must not be a cover
        let b_row = repo.get_by_id(b.id).await.unwrap().unwrap();
        assert!(!b_row.is_cover);
    }

    #[sqlx::test]
    async fn test_caption_can_be_cleared(pool: PgPool) {
        let unit = create_test_unit(&pool, "Casa Nube", None).await;
        let media = create_test_media(&pool, unit.id, 0).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Media::new(&mut conn);

        let with_caption = repo
            .update(
                media.id,
                &MediaUpdateDBRequest {
                    caption: Some(Some("Rooftop at dusk".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(with_caption.caption.as_deref(), Some("Rooftop at dusk"));

        let cleared = repo
            .update(
                media.id,
                &MediaUpdateDBRequest {
                    caption: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.caption, None);
    }
}
