//! Database repository for unit documents.

use crate::db::{
    errors::{DbError, Result},
    models::documents::{DocumentCreateDBRequest, DocumentDBResponse},
};
use crate::types::{DocumentId, TransactionId, UnitId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Documents<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Documents<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(unit_id = %abbrev_uuid(&request.unit_id), category = %request.category), err)]
    pub async fn create(&mut self, request: &DocumentCreateDBRequest) -> Result<DocumentDBResponse> {
        let document = sqlx::query_as::<_, DocumentDBResponse>(
            r#"
            INSERT INTO documents (unit_id, transaction_id, category, filename, storage_key, label, content_type, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.unit_id)
        .bind(request.transaction_id)
        .bind(&request.category)
        .bind(&request.filename)
        .bind(&request.storage_key)
        .bind(&request.label)
        .bind(&request.content_type)
        .bind(&request.uploaded_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(document)
    }

    #[instrument(skip(self), fields(document_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: DocumentId) -> Result<Option<DocumentDBResponse>> {
        let document = sqlx::query_as::<_, DocumentDBResponse>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(document)
    }

    #[instrument(skip(self), fields(unit_id = %abbrev_uuid(&unit_id)), err)]
    pub async fn list_for_unit(&mut self, unit_id: UnitId) -> Result<Vec<DocumentDBResponse>> {
        let documents = sqlx::query_as::<_, DocumentDBResponse>(
            "SELECT * FROM documents WHERE unit_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(unit_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(documents)
    }

    /// A previous upload for the same transaction + category, if any.
    #[instrument(skip(self), fields(transaction_id = %abbrev_uuid(&transaction_id)), err)]
    pub async fn find_for_transaction_category(
        &mut self,
        transaction_id: TransactionId,
        category: &str,
    ) -> Result<Option<DocumentDBResponse>> {
        let document = sqlx::query_as::<_, DocumentDBResponse>(
            "SELECT * FROM documents WHERE transaction_id = $1 AND category = $2 LIMIT 1",
        )
        .bind(transaction_id)
        .bind(category)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(document)
    }

    /// Replace a document's file fields in place, keeping its id.
    #[instrument(skip(self, request), fields(document_id = %abbrev_uuid(&id)), err)]
    pub async fn replace_in_place(&mut self, id: DocumentId, request: &DocumentCreateDBRequest) -> Result<DocumentDBResponse> {
        let document = sqlx::query_as::<_, DocumentDBResponse>(
            r#"
            UPDATE documents SET
                filename = $2,
                storage_key = $3,
                label = $4,
                content_type = $5,
                uploaded_by = $6,
                uploaded_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.filename)
        .bind(&request.storage_key)
        .bind(&request.label)
        .bind(&request.content_type)
        .bind(&request.uploaded_by)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(document)
    }

    #[instrument(skip(self), fields(document_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: DocumentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Transactions;
    use crate::db::models::transactions::{TransactionCreateDBRequest, TransactionType};
    use crate::test_utils::create_test_unit;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn doc_request(unit_id: crate::types::UnitId, transaction_id: Option<TransactionId>, filename: &str) -> DocumentCreateDBRequest {
        DocumentCreateDBRequest {
            unit_id,
            transaction_id,
            category: "Report Payment".to_string(),
            filename: filename.to_string(),
            storage_key: format!("documents/2603/{filename}"),
            label: None,
            content_type: Some("application/pdf".to_string()),
            uploaded_by: Some("ops".to_string()),
        }
    }

    #[sqlx::test]
    async fn test_replace_in_place_keeps_row_id(pool: PgPool) {
        let unit = create_test_unit(&pool, "Docs Casa", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let transaction = Transactions::new(&mut conn)
            .create(&TransactionCreateDBRequest {
                unit_id: unit.id,
                date: "2026-03-05".parse().unwrap(),
                description: "March report payment".to_string(),
                amount: Decimal::new(120000, 2),
                tx_type: TransactionType::Payment,
                cost_center: None,
                transaction_code: None,
                comments: None,
            })
            .await
            .unwrap();

        let mut repo = Documents::new(&mut conn);
        let first = repo.create(&doc_request(unit.id, Some(transaction.id), "receipt-v1.pdf")).await.unwrap();

        let existing = repo
            .find_for_transaction_category(transaction.id, "Report Payment")
            .await
            .unwrap()
            .expect("first upload should be found");
        assert_eq!(existing.id, first.id);

        let replaced = repo
            .replace_in_place(first.id, &doc_request(unit.id, Some(transaction.id), "receipt-v2.pdf"))
            .await
            .unwrap();
        assert_eq!(replaced.id, first.id);
        assert_eq!(replaced.filename, "receipt-v2.pdf");
        assert_ne!(replaced.storage_key, first.storage_key);

        // Still exactly one document for this transaction + category
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE transaction_id = $1 AND category = 'Report Payment'")
            .bind(transaction.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    async fn test_unknown_transaction_category_pair(pool: PgPool) {
        let unit = create_test_unit(&pool, "Docs Casa 2", None).await;

        let mut conn = pool.acquire().await.unwrap();
        let transaction = Transactions::new(&mut conn)
            .create(&TransactionCreateDBRequest {
                unit_id: unit.id,
                date: "2026-03-06".parse().unwrap(),
                description: "Utilities".to_string(),
                amount: Decimal::new(4500, 2),
                tx_type: TransactionType::Charge,
                cost_center: None,
                transaction_code: None,
                comments: None,
            })
            .await
            .unwrap();

        let mut repo = Documents::new(&mut conn);
        repo.create(&doc_request(unit.id, Some(transaction.id), "cfe.pdf")).await.unwrap();

        let miss = repo.find_for_transaction_category(transaction.id, "Contract").await.unwrap();
        assert!(miss.is_none());
    }
}
