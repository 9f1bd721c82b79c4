//! Database layer: repositories, row models, and the file-storage backends.
//!
//! Repositories follow the pattern described in [`handlers`]: each one wraps a
//! `&mut PgConnection` so callers decide whether operations run on a pooled
//! connection or inside a transaction.

pub mod errors;
pub mod file_storage;
pub mod handlers;
pub mod models;
