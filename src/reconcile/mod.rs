//! Reconciliation services: booking/iCal date sync and housekeeping charges.

pub mod housekeeping;
pub mod ical;
