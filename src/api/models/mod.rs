//! Request/response data structures for API communication.

pub mod bookings;
pub mod cash_ledger;
pub mod condos;
pub mod documents;
pub mod employees;
pub mod housekeeping;
pub mod ical;
pub mod media;
pub mod payouts;
pub mod reports;
pub mod transactions;
pub mod units;
pub mod users;
