//! # hostdesk: property-management back office
//!
//! `hostdesk` is the JSON HTTP service behind a short-term-rental back
//! office: booking import and reconciliation, Airbnb payout accounting,
//! housekeeping scheduling and reconciliation, employee cash ledgers, unit
//! documents and media, and monthly reporting. All state lives in a single
//! PostgreSQL schema; uploaded files go to S3 or a local directory.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL (via sqlx) for persistence.
//!
//! The **API layer** ([`api`]) exposes the management surface under
//! `/admin/api/v1/*` plus session endpoints at `/authentication/*`. Handlers
//! are thin: they authenticate via the `CurrentUser` extractor, apply role
//! checks, call into repositories or services, and shape JSON responses.
//!
//! The **database layer** ([`db`]) uses the repository pattern: one
//! repository per table, each borrowing a `PgConnection` so callers choose
//! between pooled connections and transactions. Object storage is abstracted
//! behind the `FileStorage` trait with S3 and local-filesystem backends.
//!
//! The **domain services** carry the interesting logic: free-text scraping of
//! Airbnb confirmation emails and payout report CSVs ([`import`]), and the
//! booking/iCal reconciler plus the housekeeping month view ([`reconcile`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use hostdesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = hostdesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     hostdesk::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod import;
mod openapi;
pub mod reconcile;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use crate::api::models::users::Role;
use crate::auth::password;
use crate::db::file_storage::{FileStorage, create_file_storage};
use crate::db::handlers::Users;
use crate::db::models::users::UserCreateDBRequest;
use crate::openapi::ApiDoc;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{BookingId, CleaningId, CondoId, EmployeeId, PayoutId, UnitId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub file_storage: Arc<dyn FileStorage>,
}

/// Get the hostdesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the user on first startup, or refreshes the password
/// if one was supplied and the user already exists.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_by_email(email).await.map_err(|e| anyhow::anyhow!("Failed to check existing user: {e}"))? {
        if let Some(hash) = password_hash {
            users.set_password(email, &hash).await.map_err(|e| anyhow::anyhow!("Failed to update admin password: {e}"))?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            username: email.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::Admin,
            employee_id: None,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin user: {e}"))?;

    tx.commit().await?;
    Ok(created.id)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> Router {
    // Session endpoints live at the root so they can be masked when deployed
    // behind an SSO proxy
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/me", get(api::handlers::auth::me))
        // Bookings
        .route("/bookings", get(api::handlers::bookings::list_bookings))
        .route("/bookings/airbnb-import", post(api::handlers::bookings::airbnb_import))
        // iCal reconciliation
        .route("/ical/reconcile", get(api::handlers::ical::reconcile_bookings))
        .route("/ical/notifications", get(api::handlers::ical::list_notifications))
        .route("/ical/ack/{booking_id}", post(api::handlers::ical::acknowledge))
        // Payouts
        .route("/payouts", get(api::handlers::payouts::list_payouts))
        .route("/payouts/import-report", post(api::handlers::payouts::import_report))
        .route("/payouts/summary", get(api::handlers::payouts::reservation_summary))
        .route("/payouts/{id}/items", get(api::handlers::payouts::list_payout_items))
        // Housekeeping
        .route(
            "/housekeeping/cleanings",
            get(api::handlers::housekeeping::list_cleanings).post(api::handlers::housekeeping::create_cleaning),
        )
        .route("/housekeeping/cleanings/{id}", patch(api::handlers::housekeeping::update_cleaning))
        .route("/housekeeping/reconcile", get(api::handlers::housekeeping::reconcile_month))
        .route("/housekeeping/recon-notes", put(api::handlers::housekeeping::upsert_recon_note))
        // Condos
        .route("/condos", get(api::handlers::condos::list_condos).post(api::handlers::condos::create_condo))
        .route("/condos/{id}", get(api::handlers::condos::get_condo).put(api::handlers::condos::update_condo))
        // Units, media, documents, transactions
        .route("/units", get(api::handlers::units::list_units))
        .route("/units/{id}", get(api::handlers::units::get_unit))
        .route(
            "/units/{id}/media",
            get(api::handlers::media::list_media).post(api::handlers::media::upload_media),
        )
        .route("/units/{id}/media/order", patch(api::handlers::media::reorder_media))
        .route(
            "/media/{id}",
            patch(api::handlers::media::patch_media).delete(api::handlers::media::delete_media),
        )
        .route("/documents", post(api::handlers::documents::upload_document))
        .route("/documents/{id}", delete(api::handlers::documents::delete_document))
        .route("/units/{id}/documents", get(api::handlers::documents::list_documents))
        .route("/units/{id}/transactions", get(api::handlers::transactions::list_transactions).post(api::handlers::transactions::create_transaction))
        .route("/transactions/{id}", delete(api::handlers::transactions::delete_transaction))
        // Employees and cash ledger
        .route("/employees", get(api::handlers::cash_ledger::employee_options))
        .route(
            "/cash-ledger",
            get(api::handlers::cash_ledger::list_entries).post(api::handlers::cash_ledger::create_entry),
        )
        .route(
            "/cash-ledger/{id}",
            get(api::handlers::cash_ledger::get_entry)
                .patch(api::handlers::cash_ledger::update_entry)
                .delete(api::handlers::cash_ledger::delete_entry),
        )
        .route("/cash-ledger/{id}/approve", post(api::handlers::cash_ledger::approve_entry))
        .route("/cash-ledger/{id}/reject", post(api::handlers::cash_ledger::reject_entry))
        .route("/cash-ledger/{id}/allocate", post(api::handlers::cash_ledger::allocate_entry))
        // Reports
        .route("/reports/unit-month", get(api::handlers::reports::unit_month_report))
        .with_state(state.clone());

    Router::new()
        .merge(auth_routes)
        .nest("/admin/api/v1", api_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
}

/// The running application: connected pool, migrated schema, built router.
pub struct Application {
    state: AppState,
    router: Router,
}

impl Application {
    /// Connect to the database, run migrations, seed the admin user, and
    /// build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPool::connect(&config.database_url).await?;
        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let file_storage = create_file_storage(&config.storage)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create file storage: {e}"))?;

        let state = AppState::builder().db(pool).config(config).file_storage(file_storage).build();
        let router = build_router(state.clone());

        Ok(Self { state, router })
    }

    /// Serve until the shutdown future resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("hostdesk listening on {addr}");

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        self.state.db.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod test;
