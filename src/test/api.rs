use crate::api::models::users::Role;
use crate::test_utils::{create_test_employee, create_test_unit, session_cookie_for, test_state};
use crate::{AppState, build_router};
use axum::http::{StatusCode, header};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};
use sqlx::PgPool;

fn server_with(state: &AppState) -> TestServer {
    TestServer::new(build_router(state.clone())).expect("test server")
}

#[sqlx::test]
async fn test_unauthenticated_requests_are_rejected(pool: PgPool) {
    let state = test_state(pool);
    let server = server_with(&state);

    let response = server.get("/admin/api/v1/condos").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.get("/admin/api/v1/payouts").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_login_sets_session_cookie(pool: PgPool) {
    let state = test_state(pool.clone());
    crate::create_initial_admin_user("ops@test.local", Some("hunter2!"), &pool).await.unwrap();
    let server = server_with(&state);

    let response = server
        .post("/authentication/login")
        .json(&json!({ "email": "ops@test.local", "password": "hunter2!" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let set_cookie = response.headers().get(header::SET_COOKIE).expect("session cookie");
    assert!(set_cookie.to_str().unwrap().starts_with(&state.config.session_cookie_name));

    let wrong = server
        .post("/authentication/login")
        .json(&json!({ "email": "ops@test.local", "password": "wrong" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_condo_crud_flow(pool: PgPool) {
    let state = test_state(pool);
    let server = server_with(&state);
    let cookie = session_cookie_for(&state, Role::Manager, None);

    // Create
    let created = server
        .post("/admin/api/v1/condos")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "condoName": "Mareas", "city": "Tulum", "hoaDueDay": 5 }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let body: Value = created.json();
    let id = body["id"].as_str().unwrap().to_string();

    // Duplicate name is a conflict
    let duplicate = server
        .post("/admin/api/v1/condos")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "condoName": "Mareas", "city": "Tulum" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    // Missing city is a bad request
    let invalid = server
        .post("/admin/api/v1/condos")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "condoName": "No City" }))
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

    // Partial update keeps unset fields
    let updated = server
        .put(&format!("/admin/api/v1/condos/{id}"))
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "doorCode": "9876#" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let body: Value = updated.json();
    assert_eq!(body["city"], "Tulum");
    assert_eq!(body["doorCode"], "9876#");
    assert_eq!(body["hoaDueDay"], 5);

    // Unknown condo is a 404
    let missing = server
        .get(&format!("/admin/api/v1/condos/{}", uuid::Uuid::new_v4()))
        .add_header(header::COOKIE, cookie.as_str())
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_airbnb_email_import_endpoint(pool: PgPool) {
    let state = test_state(pool.clone());
    let server = server_with(&state);
    let cookie = session_cookie_for(&state, Role::Manager, None);

    let body = "CONFIRMATION CODE HMTEST0001\n\nCasa Prueba\nEntire home/flat\n\nYOU EARN $500.00\n";
    let response = server
        .post("/admin/api/v1/bookings/airbnb-import")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "guestName": "Dana", "body": body }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let parsed: Value = response.json();
    assert_eq!(parsed["code"], "HMTEST0001");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM airbnb_email_imports WHERE confirmation_code = 'HMTEST0001'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // No confirmation code in the body
    let unparseable = server
        .post("/admin/api/v1/bookings/airbnb-import")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "guestName": "Dana", "body": "nothing useful here" }))
        .await;
    assert_eq!(unparseable.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // Empty body
    let empty = server
        .post("/admin/api/v1/bookings/airbnb-import")
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "guestName": "Dana", "body": "" }))
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_payout_report_import_roundtrip(pool: PgPool) {
    let state = test_state(pool);
    let server = server_with(&state);
    let cookie = session_cookie_for(&state, Role::Manager, None);

    let csv = "\
Date,Type,Confirmation code,Start date,End date,Nights,Guest,Listing,Details,Reference code,Currency,Amount,Paid out
2026-02-03,Payout,,,,,,,Bank transfer,P-API-1,USD,,900.00
2026-02-03,Reservation,HMAPI00001,2026-01-28,2026-02-02,5,Dana,Sea View 2B,,,USD,900.00,
";

    let form = MultipartForm::new().add_part("file", Part::bytes(csv.as_bytes().to_vec()).file_name("report.csv").mime_type("text/csv"));
    let imported = server
        .post("/admin/api/v1/payouts/import-report")
        .add_header(header::COOKIE, cookie.as_str())
        .multipart(form)
        .await;
    assert_eq!(imported.status_code(), StatusCode::OK);
    let body: Value = imported.json();
    assert_eq!(body["result"]["batches"], 1);
    assert_eq!(body["result"]["items"], 1);
    assert_eq!(body["result"]["created"], 1);

    let listed = server.get("/admin/api/v1/payouts").add_header(header::COOKIE, cookie.as_str()).await;
    assert_eq!(listed.status_code(), StatusCode::OK);
    let body: Value = listed.json();
    assert_eq!(body["data"][0]["referenceCode"], "P-API-1");
    assert_eq!(body["data"][0]["itemsCount"], 1);

    // Missing file field
    let empty = server
        .post("/admin/api/v1/payouts/import-report")
        .add_header(header::COOKIE, cookie.as_str())
        .multipart(MultipartForm::new())
        .await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_cash_ledger_role_matrix(pool: PgPool) {
    let state = test_state(pool.clone());
    let server = server_with(&state);

    let employee = create_test_employee(&pool, "ANA").await;
    let other = create_test_employee(&pool, "LUZ").await;

    let employee_cookie = session_cookie_for(&state, Role::Employee, Some(employee.id));
    let manager_cookie = session_cookie_for(&state, Role::Manager, None);

    // Employee creates an entry; employeeId in the payload is ignored
    let created = server
        .post("/admin/api/v1/cash-ledger")
        .add_header(header::COOKIE, employee_cookie.as_str())
        .json(&json!({ "employeeId": other.id, "type": "Expense", "amount": "120.00", "notes": "supplies" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["row"]["employeeId"], json!(employee.id));
    assert_eq!(body["row"]["status"], "Pending");
    let entry_id = body["row"]["id"].as_str().unwrap().to_string();

    // Employees cannot create cash advances
    let advance = server
        .post("/admin/api/v1/cash-ledger")
        .add_header(header::COOKIE, employee_cookie.as_str())
        .json(&json!({ "type": "CashAdvance", "amount": "500.00" }))
        .await;
    assert_eq!(advance.status_code(), StatusCode::FORBIDDEN);

    // Employee-linked users cannot approve (self-approval ban)
    let self_approve = server
        .post(&format!("/admin/api/v1/cash-ledger/{entry_id}/approve"))
        .add_header(header::COOKIE, employee_cookie.as_str())
        .await;
    assert_eq!(self_approve.status_code(), StatusCode::FORBIDDEN);

    // A manager not on the payroll approves
    let approved = server
        .post(&format!("/admin/api/v1/cash-ledger/{entry_id}/approve"))
        .add_header(header::COOKIE, manager_cookie.as_str())
        .await;
    assert_eq!(approved.status_code(), StatusCode::OK);
    let body: Value = approved.json();
    assert_eq!(body["row"]["status"], "Approved");

    // Approved entries are immutable for the employee
    let edit = server
        .patch(&format!("/admin/api/v1/cash-ledger/{entry_id}"))
        .add_header(header::COOKIE, employee_cookie.as_str())
        .json(&json!({ "amount": "10.00" }))
        .await;
    assert_eq!(edit.status_code(), StatusCode::FORBIDDEN);

    let delete = server
        .delete(&format!("/admin/api/v1/cash-ledger/{entry_id}"))
        .add_header(header::COOKIE, employee_cookie.as_str())
        .await;
    assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);

    // The other employee never sees the row
    let other_cookie = session_cookie_for(&state, Role::Employee, Some(other.id));
    let foreign = server
        .get(&format!("/admin/api/v1/cash-ledger/{entry_id}"))
        .add_header(header::COOKIE, other_cookie.as_str())
        .await;
    assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);

    // And their listing is forced onto their own id
    let listing = server
        .get("/admin/api/v1/cash-ledger")
        .add_header(header::COOKIE, other_cookie.as_str())
        .await;
    assert_eq!(listing.status_code(), StatusCode::OK);
    let body: Value = listing.json();
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
}

#[sqlx::test]
async fn test_invalid_month_params(pool: PgPool) {
    let state = test_state(pool);
    let server = server_with(&state);
    let cookie = session_cookie_for(&state, Role::Manager, None);

    let response = server
        .get("/admin/api/v1/housekeeping/reconcile?month=26-03&city=Tulum")
        .add_header(header::COOKIE, cookie.as_str())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/admin/api/v1/cash-ledger?month=March")
        .add_header(header::COOKIE, cookie.as_str())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_ical_ack_requires_fingerprint(pool: PgPool) {
    let state = test_state(pool.clone());
    let server = server_with(&state);
    let cookie = session_cookie_for(&state, Role::Manager, None);

    let unit = create_test_unit(&pool, "Ack Unit", None).await;
    let booking = crate::test_utils::create_test_booking(&pool, unit.id, "HMACKAPI01", "2026-06-01", "2026-06-05").await;

    let missing = server
        .post(&format!("/admin/api/v1/ical/ack/{}", booking.id))
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "fingerprint": "" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let unknown = server
        .post(&format!("/admin/api/v1/ical/ack/{}", uuid::Uuid::new_v4()))
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "fingerprint": "abc123" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let acked = server
        .post(&format!("/admin/api/v1/ical/ack/{}", booking.id))
        .add_header(header::COOKIE, cookie.as_str())
        .json(&json!({ "fingerprint": "abc123" }))
        .await;
    assert_eq!(acked.status_code(), StatusCode::OK);
    let body: Value = acked.json();
    assert_eq!(body["bookingId"], json!(booking.id));

    let stored: Option<String> = sqlx::query_scalar("SELECT ical_ack_signature FROM bookings WHERE id = $1")
        .bind(booking.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored.as_deref(), Some("abc123"));
}
