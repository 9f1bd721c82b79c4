use crate::types::{MediaId, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaDBResponse {
    pub id: MediaId,
    pub unit_id: UnitId,
    pub storage_key: String,
    pub url: String,
    pub caption: Option<String>,
    pub seo_description: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub is_cover: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MediaCreateDBRequest {
    pub unit_id: UnitId,
    pub storage_key: String,
    pub url: String,
    pub caption: Option<String>,
    pub seo_description: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub is_cover: bool,
    pub sort_order: i32,
}

/// Partial metadata update. `caption`/`seo_description` use a double Option:
/// outer None = untouched, inner None = cleared.
#[derive(Debug, Clone, Default)]
pub struct MediaUpdateDBRequest {
    pub caption: Option<Option<String>>,
    pub seo_description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub is_cover: Option<bool>,
    pub sort_order: Option<i32>,
}
