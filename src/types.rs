//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for readability at call
//! sites: a `BookingId` and a `UnitId` are both [`Uuid`]s, but function
//! signatures say which one they expect.

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type EmployeeId = Uuid;
pub type CondoId = Uuid;
pub type UnitId = Uuid;
pub type BookingId = Uuid;
pub type IcalEventId = Uuid;
pub type PayoutId = Uuid;
pub type PayoutItemId = Uuid;
pub type CleaningId = Uuid;
pub type CashLedgerEntryId = Uuid;
pub type TransactionId = Uuid;
pub type DocumentId = Uuid;
pub type MediaId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
