//! Shared helpers for tests: state construction and row factories.

use crate::AppState;
use crate::api::models::users::{CurrentUser, Role};
use crate::config::Config;
use crate::db::file_storage::LocalFileStorage;
use crate::db::models::{
    bookings::BookingDBResponse, condos::CondoDBResponse, employees::EmployeeDBResponse, ical_events::IcalEventDBResponse,
    media::MediaDBResponse, units::UnitDBResponse,
};
use crate::types::{BookingId, CondoId, UnitId};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key".to_string()),
        admin_email: "admin@test.local".to_string(),
        ..Default::default()
    }
}

fn test_storage() -> Arc<LocalFileStorage> {
    let dir = std::env::temp_dir().join(format!("hostdesk-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create test storage dir");
    Arc::new(LocalFileStorage::new(dir))
}

/// State for tests that never touch the pool (extractors, pure handlers).
pub fn state_without_db() -> AppState {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/hostdesk_test")
        .expect("lazy pool");
    AppState::builder()
        .db(pool)
        .config(create_test_config())
        .file_storage(test_storage())
        .build()
}

/// State over a real test pool.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::builder()
        .db(pool)
        .config(create_test_config())
        .file_storage(test_storage())
        .build()
}

/// Session cookie header value for a made-up user with the given role.
pub fn session_cookie_for(state: &AppState, role: Role, employee_id: Option<Uuid>) -> String {
    let user = CurrentUser {
        id: Uuid::new_v4(),
        username: "tester".to_string(),
        email: "tester@example.com".to_string(),
        role,
        employee_id,
    };
    let token = crate::auth::session::create_session_token(&user, &state.config).expect("session token");
    format!("{}={token}", state.config.session_cookie_name)
}

pub async fn create_test_condo(pool: &PgPool, name: &str) -> CondoDBResponse {
    sqlx::query_as::<_, CondoDBResponse>("INSERT INTO condos (condo_name, city) VALUES ($1, 'Tulum') RETURNING *")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("create test condo")
}

pub async fn create_test_unit(pool: &PgPool, name: &str, condo_id: Option<CondoId>) -> UnitDBResponse {
    sqlx::query_as::<_, UnitDBResponse>(
        "INSERT INTO units (unit_name, listing_name, city, condo_id) VALUES ($1, $1, 'Tulum', $2) RETURNING *",
    )
    .bind(name)
    .bind(condo_id)
    .fetch_one(pool)
    .await
    .expect("create test unit")
}

pub async fn create_test_employee(pool: &PgPool, short_name: &str) -> EmployeeDBResponse {
    sqlx::query_as::<_, EmployeeDBResponse>(
        "INSERT INTO employees (employee_code, name, short_name, division, area, city)
         VALUES ($1, $2, $3, 'Housekeepers', 'Cleaning', 'Tulum')
         RETURNING *",
    )
    .bind(format!("EMP-{short_name}"))
    .bind(format!("Employee {short_name}"))
    .bind(short_name)
    .fetch_one(pool)
    .await
    .expect("create test employee")
}

pub async fn create_test_booking(pool: &PgPool, unit_id: UnitId, confirmation_code: &str, check_in: &str, check_out: &str) -> BookingDBResponse {
    sqlx::query_as::<_, BookingDBResponse>(
        "INSERT INTO bookings (unit_id, unit_name, city, source, confirmation_code, guest_name, check_in, check_out)
         SELECT u.id, u.unit_name, u.city, 'Airbnb', $2, 'Test Guest', $3::date, $4::date
         FROM units u WHERE u.id = $1
         RETURNING *",
    )
    .bind(unit_id)
    .bind(confirmation_code)
    .bind(check_in)
    .bind(check_out)
    .fetch_one(pool)
    .await
    .expect("create test booking")
}

/// Adjust a booking's reservation code and source after creation.
pub async fn set_booking_codes(pool: &PgPool, booking_id: BookingId, reservation_code: Option<&str>, source: &str) {
    sqlx::query("UPDATE bookings SET reservation_code = $2, source = $3 WHERE id = $1")
        .bind(booking_id)
        .bind(reservation_code)
        .bind(source)
        .execute(pool)
        .await
        .expect("set booking codes");
}

pub async fn create_test_ical_event(
    pool: &PgPool,
    unit_id: UnitId,
    reservation_code: Option<&str>,
    dtstart: &str,
    dtend: &str,
) -> IcalEventDBResponse {
    sqlx::query_as::<_, IcalEventDBResponse>(
        "INSERT INTO ical_events (unit_id, uid, dtstart, dtend, event_type, reservation_code, reservation_url)
         VALUES ($1, $2, $3::date, $4::date, 'reservation', $5, $6)
         RETURNING *",
    )
    .bind(unit_id)
    .bind(format!("evt-{}@airbnb.example", Uuid::new_v4()))
    .bind(dtstart)
    .bind(dtend)
    .bind(reservation_code)
    .bind(reservation_code.map(|rc| format!("https://www.airbnb.com/hosting/reservations/details/{rc}")))
    .fetch_one(pool)
    .await
    .expect("create test ical event")
}

pub async fn create_test_media(pool: &PgPool, unit_id: UnitId, sort_order: i32) -> MediaDBResponse {
    let key = format!("media/{unit_id}/{}.jpg", Uuid::new_v4());
    sqlx::query_as::<_, MediaDBResponse>(
        "INSERT INTO unit_media (unit_id, storage_key, url, sort_order) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(unit_id)
    .bind(&key)
    .bind(format!("/media/{key}"))
    .bind(sort_order)
    .fetch_one(pool)
    .await
    .expect("create test media")
}
