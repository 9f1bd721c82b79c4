//! Employee cash ledger endpoints.
//!
//! Role rules, mirrored from the ledger's paper-trail policy:
//! - plain employees only ever see and touch their own rows
//! - employee-created entries are always Pending and never CashAdvance
//! - approved entries are immutable for employees
//! - an employee-linked user can never approve, reject, or allocate

use crate::api::models::cash_ledger::{
    AllocateRequest, LedgerCreateRequest, LedgerEntryResponse, LedgerListEnvelope, LedgerRowEnvelope, LedgerUpdateRequest,
    ListLedgerQuery,
};
use crate::api::models::employees::{EmployeeOption, EmployeeOptionsResponse};
use crate::api::models::users::CurrentUser;
use crate::auth::is_plain_employee;
use crate::db::handlers::{CashLedger, Employees, Repository, cash_ledger::CashLedgerFilter};
use crate::db::models::cash_ledger::{
    CashLedgerEntryCreateDBRequest, CashLedgerEntryDBResponse, CashLedgerEntryUpdateDBRequest, LedgerEntryType, LedgerStatus,
};
use crate::errors::{Error, Result};
use crate::types::CashLedgerEntryId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

static MONTH_FORMAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

fn validate_month(month: &Option<String>) -> Result<()> {
    if let Some(month) = month {
        if !MONTH_FORMAT.is_match(month) {
            return Err(Error::BadRequest {
                message: "Invalid month format. Expected YYYY-MM.".to_string(),
            });
        }
    }
    Ok(())
}

/// Plain employees may only see their own rows.
fn check_row_visibility(user: &CurrentUser, entry: &CashLedgerEntryDBResponse) -> Result<()> {
    if is_plain_employee(user) && Some(entry.employee_id) != user.employee_id {
        return Err(Error::Forbidden {
            message: "Forbidden".to_string(),
        });
    }
    Ok(())
}

/// The self-approval ban: anyone on the payroll is out, regardless of role.
fn forbid_employee_linked(user: &CurrentUser) -> Result<()> {
    if user.employee_id.is_some() {
        return Err(Error::Forbidden {
            message: "Forbidden".to_string(),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/cash-ledger",
    tag = "cash-ledger",
    summary = "List cash ledger entries",
    params(ListLedgerQuery),
    responses(
        (status = 200, description = "Entries, newest first", body = LedgerListEnvelope),
        (status = 400, description = "Invalid month format")
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListLedgerQuery>,
) -> Result<Json<LedgerListEnvelope>> {
    validate_month(&query.month)?;

    // Plain employees are forced onto their own employee id; admin/manager
    // may filter by any employee.
    let employee_id = if is_plain_employee(&current_user) {
        current_user.employee_id
    } else {
        query.employee_id
    };

    let filter = CashLedgerFilter {
        employee_id,
        status: query.status,
        entry_type: query.entry_type,
        month: query.month,
        division: query.division,
        city: query.city,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = CashLedger::new(&mut conn).list(&filter).await?;

    Ok(Json(LedgerListEnvelope {
        success: true,
        rows: rows.iter().map(LedgerEntryResponse::from_db_response).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/cash-ledger/{id}",
    tag = "cash-ledger",
    summary = "Get one entry",
    responses(
        (status = 200, description = "The entry", body = LedgerRowEnvelope),
        (status = 403, description = "Not your entry"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
) -> Result<Json<LedgerRowEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entry = CashLedger::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Cash ledger entry".to_string(),
        id: id.to_string(),
    })?;

    check_row_visibility(&current_user, &entry)?;

    Ok(Json(LedgerRowEnvelope {
        success: true,
        row: LedgerEntryResponse::from_db_response(&entry),
    }))
}

#[utoipa::path(
    post,
    path = "/cash-ledger",
    tag = "cash-ledger",
    summary = "Create an entry",
    request_body = LedgerCreateRequest,
    responses(
        (status = 201, description = "Created entry (Pending)", body = LedgerRowEnvelope),
        (status = 400, description = "Missing employee"),
        (status = 403, description = "Employees cannot create CashAdvance entries")
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<LedgerCreateRequest>,
) -> Result<(StatusCode, Json<LedgerRowEnvelope>)> {
    let plain = is_plain_employee(&current_user);

    let employee_id = if plain {
        // Employees only ever create rows for themselves
        current_user.employee_id
    } else {
        request.employee_id.or(current_user.employee_id)
    }
    .ok_or_else(|| Error::BadRequest {
        message: "An employee is required for a cash ledger entry".to_string(),
    })?;

    if plain && request.entry_type == LedgerEntryType::CashAdvance {
        return Err(Error::Forbidden {
            message: "Employees cannot create CashAdvance entries.".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Derived fields always come from the employee record, never the payload
    let employee = Employees::new(&mut conn).get_by_id(employee_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Employee".to_string(),
        id: employee_id.to_string(),
    })?;

    let entry_date = request.date.unwrap_or_else(|| Utc::now().date_naive());
    let code = format!(
        "CL-{}{:02}-{}",
        entry_date.year() % 100,
        entry_date.month(),
        employee.employee_code
    );

    let entry = CashLedger::new(&mut conn)
        .create(&CashLedgerEntryCreateDBRequest {
            code,
            employee_id,
            entry_type: request.entry_type,
            amount: request.amount,
            division: Some(employee.division.clone()),
            city: Some(employee.city.clone()),
            cost_centre: Some(format!("{}-{}", employee.division, employee.city)),
            notes: request.notes,
            entry_date: Some(entry_date),
            // Everything starts Pending; approval is a separate, audited step
            status: LedgerStatus::Pending,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LedgerRowEnvelope {
            success: true,
            row: LedgerEntryResponse::from_db_response(&entry),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/cash-ledger/{id}",
    tag = "cash-ledger",
    summary = "Update an entry",
    request_body = LedgerUpdateRequest,
    responses(
        (status = 200, description = "Updated entry", body = LedgerRowEnvelope),
        (status = 403, description = "Employees cannot edit approved entries"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
    Json(mut request): Json<LedgerUpdateRequest>,
) -> Result<Json<LedgerRowEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = CashLedger::new(&mut conn);

    let entry = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Cash ledger entry".to_string(),
        id: id.to_string(),
    })?;

    check_row_visibility(&current_user, &entry)?;

    if is_plain_employee(&current_user) {
        if entry.status == LedgerStatus::Approved {
            return Err(Error::Forbidden {
                message: "Employees cannot edit approved entries.".to_string(),
            });
        }
        // Employees cannot move status or leave admin comments
        request.status = None;
        request.admin_comment = None;
    }

    let updated = repo
        .update(
            id,
            &CashLedgerEntryUpdateDBRequest {
                entry_type: request.entry_type,
                amount: request.amount,
                notes: request.notes,
                admin_comment: request.admin_comment,
                entry_date: request.date,
                status: request.status,
            },
        )
        .await?;

    Ok(Json(LedgerRowEnvelope {
        success: true,
        row: LedgerEntryResponse::from_db_response(&updated),
    }))
}

#[utoipa::path(
    delete,
    path = "/cash-ledger/{id}",
    tag = "cash-ledger",
    summary = "Delete an entry",
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Employees cannot delete approved entries"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = CashLedger::new(&mut conn);

    let entry = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Cash ledger entry".to_string(),
        id: id.to_string(),
    })?;

    check_row_visibility(&current_user, &entry)?;

    if is_plain_employee(&current_user) && entry.status == LedgerStatus::Approved {
        return Err(Error::Forbidden {
            message: "Employees cannot delete approved entries.".to_string(),
        });
    }

    repo.delete(id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/cash-ledger/{id}/approve",
    tag = "cash-ledger",
    summary = "Approve an entry",
    responses(
        (status = 200, description = "Approved entry", body = LedgerRowEnvelope),
        (status = 403, description = "Employee-linked users cannot approve"),
        (status = 404, description = "Not found")
    )
)]
pub async fn approve_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
) -> Result<Json<LedgerRowEnvelope>> {
    forbid_employee_linked(&current_user)?;
    set_entry_status(&state, id, LedgerStatus::Approved).await
}

#[utoipa::path(
    post,
    path = "/cash-ledger/{id}/reject",
    tag = "cash-ledger",
    summary = "Reject an entry",
    responses(
        (status = 200, description = "Rejected entry", body = LedgerRowEnvelope),
        (status = 403, description = "Employee-linked users cannot reject"),
        (status = 404, description = "Not found")
    )
)]
pub async fn reject_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
) -> Result<Json<LedgerRowEnvelope>> {
    forbid_employee_linked(&current_user)?;
    set_entry_status(&state, id, LedgerStatus::Rejected).await
}

async fn set_entry_status(state: &AppState, id: CashLedgerEntryId, status: LedgerStatus) -> Result<Json<LedgerRowEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entry = CashLedger::new(&mut conn).set_status(id, status).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Cash ledger entry".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(LedgerRowEnvelope {
        success: true,
        row: LedgerEntryResponse::from_db_response(&entry),
    }))
}

#[utoipa::path(
    post,
    path = "/cash-ledger/{id}/allocate",
    tag = "cash-ledger",
    summary = "Allocate an entry",
    request_body = AllocateRequest,
    responses(
        (status = 200, description = "Allocated entry", body = LedgerRowEnvelope),
        (status = 403, description = "Employee-linked users cannot allocate"),
        (status = 404, description = "Not found")
    )
)]
pub async fn allocate_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashLedgerEntryId>,
    Json(request): Json<AllocateRequest>,
) -> Result<Json<LedgerRowEnvelope>> {
    forbid_employee_linked(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entry = CashLedger::new(&mut conn)
        .allocate(id, &request.allocation_type, request.allocation_code.as_deref(), current_user.employee_id)
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Cash ledger entry".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(LedgerRowEnvelope {
        success: true,
        row: LedgerEntryResponse::from_db_response(&entry),
    }))
}

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    summary = "Employee options",
    description = "Flat list for form dropdowns.",
    responses((status = 200, description = "Employees", body = EmployeeOptionsResponse))
)]
pub async fn employee_options(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<EmployeeOptionsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let employees = Employees::new(&mut conn).list().await?;

    Ok(Json(EmployeeOptionsResponse {
        success: true,
        employees: employees.iter().map(EmployeeOption::from_db_response).collect(),
    }))
}
