//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` (so callers choose pooled
//! connection vs. transaction), provides strongly-typed operations, and
//! returns row models from [`crate::db::models`]. CRUD-shaped repositories
//! implement the [`Repository`] trait; the rest expose bespoke methods for
//! their queries.
//!
//! Usage pattern:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = Condos::new(&mut tx);
//! let condo = repo.create(&request).await?;
//! tx.commit().await?;
//! ```

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
pub mod repository;
pub mod transactions;
pub mod units;
pub mod users;

pub use bookings::Bookings;
pub use cash_ledger::CashLedger;
pub use cleanings::Cleanings;
pub use condos::Condos;
pub use documents::Documents;
pub use email_imports::EmailImports;
pub use employees::Employees;
pub use ical_events::IcalEvents;
pub use media::Media;
pub use payouts::Payouts;
pub use repository::Repository;
pub use transactions::Transactions;
pub use units::Units;
pub use users::Users;
