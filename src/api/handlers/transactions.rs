//! Unit accounting transactions.

use crate::api::models::transactions::{ListTransactionsQuery, TransactionCreateRequest, TransactionResponse};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::handlers::{Transactions, Units, transactions::TransactionFilter};
use crate::db::models::transactions::{TransactionCreateDBRequest, TransactionType};
use crate::errors::{Error, Result};
use crate::types::{TransactionId, UnitId};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/units/{id}/transactions",
    tag = "transactions",
    summary = "List a unit's transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Transactions by date", body = Vec<TransactionResponse>),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let transactions = Transactions::new(&mut conn)
        .list_for_unit(
            unit_id,
            &TransactionFilter {
                from: query.from,
                to: query.to,
                tx_type: query.tx_type,
            },
        )
        .await?;

    Ok(Json(transactions.iter().map(TransactionResponse::from_db_response).collect()))
}

#[utoipa::path(
    post,
    path = "/units/{id}/transactions",
    tag = "transactions",
    summary = "Record a transaction",
    request_body = TransactionCreateRequest,
    responses(
        (status = 201, description = "Created transaction", body = TransactionResponse),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
    Json(request): Json<TransactionCreateRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>)> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let transaction = Transactions::new(&mut conn)
        .create(&TransactionCreateDBRequest {
            unit_id,
            date: request.date,
            description: request.description,
            amount: request.amount,
            tx_type: request.tx_type.unwrap_or(TransactionType::Charge),
            cost_center: request.cost_center,
            transaction_code: request.transaction_code,
            comments: request.comments,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from_db_response(&transaction))))
}

#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "transactions",
    summary = "Delete a transaction",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<TransactionId>,
) -> Result<Json<serde_json::Value>> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = Transactions::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Transaction".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
