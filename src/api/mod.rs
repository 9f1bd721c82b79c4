//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers, one module per resource
//! - **[`models`]**: Request/response data structures for API communication
//!
//! All endpoints are documented with OpenAPI annotations via `utoipa`; the
//! rendered docs are served at `/admin/docs`.

pub mod handlers;
pub mod models;
