//! Row models and request/response types for the repository layer.

pub mod bookings;
pub mod cash_ledger;
pub mod cleanings;
pub mod condos;
pub mod documents;
pub mod email_imports;
pub mod employees;
pub mod ical_events;
pub mod media;
pub mod payouts;
pub mod transactions;
pub mod units;
pub mod users;
