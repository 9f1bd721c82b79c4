//! OpenAPI documentation assembly.

use utoipa::OpenApi;

use crate::api::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "hostdesk API",
        description = "Back-office API for property management: bookings, payouts, housekeeping, ledgers, documents and reporting."
    ),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::bookings::airbnb_import,
        handlers::bookings::list_bookings,
        handlers::ical::reconcile_bookings,
        handlers::ical::list_notifications,
        handlers::ical::acknowledge,
        handlers::payouts::import_report,
        handlers::payouts::list_payouts,
        handlers::payouts::list_payout_items,
        handlers::payouts::reservation_summary,
        handlers::housekeeping::list_cleanings,
        handlers::housekeeping::create_cleaning,
        handlers::housekeeping::update_cleaning,
        handlers::housekeeping::reconcile_month,
        handlers::housekeeping::upsert_recon_note,
        handlers::condos::list_condos,
        handlers::condos::create_condo,
        handlers::condos::get_condo,
        handlers::condos::update_condo,
        handlers::units::list_units,
        handlers::units::get_unit,
        handlers::media::upload_media,
        handlers::media::list_media,
        handlers::media::patch_media,
        handlers::media::reorder_media,
        handlers::media::delete_media,
        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::delete_document,
        handlers::cash_ledger::list_entries,
        handlers::cash_ledger::get_entry,
        handlers::cash_ledger::create_entry,
        handlers::cash_ledger::update_entry,
        handlers::cash_ledger::delete_entry,
        handlers::cash_ledger::approve_entry,
        handlers::cash_ledger::reject_entry,
        handlers::cash_ledger::allocate_entry,
        handlers::cash_ledger::employee_options,
        handlers::transactions::list_transactions,
        handlers::transactions::create_transaction,
        handlers::transactions::delete_transaction,
        handlers::reports::unit_month_report,
    ),
    tags(
        (name = "auth", description = "Sessions"),
        (name = "bookings", description = "Booking import and listing"),
        (name = "ical", description = "Booking/iCal reconciliation"),
        (name = "payouts", description = "Payout report import and rollups"),
        (name = "housekeeping", description = "Cleanings and reconciliation"),
        (name = "condos", description = "Condo management"),
        (name = "units", description = "Units"),
        (name = "media", description = "Unit gallery media"),
        (name = "documents", description = "Unit document storage"),
        (name = "cash-ledger", description = "Employee cash ledger"),
        (name = "employees", description = "Employee options"),
        (name = "transactions", description = "Unit accounting transactions"),
        (name = "reports", description = "Report data")
    )
)]
pub struct ApiDoc;
