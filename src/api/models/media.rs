use crate::db::models::media::MediaDBResponse;
use crate::types::{MediaId, UnitId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMediaQuery {
    pub published: Option<bool>,
    pub covers: Option<bool>,
}

/// Metadata patch. `caption`/`seoDescription` distinguish "absent" (leave as
/// is) from explicit null (clear).
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaPatchRequest {
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub caption: Option<Option<String>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub seo_description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub is_cover: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderRequest {
    #[schema(value_type = Vec<Uuid>)]
    pub order: Vec<MediaId>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    #[schema(value_type = Uuid)]
    pub id: MediaId,
    #[schema(value_type = Uuid)]
    pub unit_id: UnitId,
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

impl MediaResponse {
    pub fn from_db_response(media: &MediaDBResponse) -> Self {
        Self {
            id: media.id,
            unit_id: media.unit_id,
            url: media.url.clone(),
            caption: media.caption.clone(),
            seo_description: media.seo_description.clone(),
            tags: media.tags.clone(),
            is_published: media.is_published,
            is_cover: media.is_cover,
            sort_order: media.sort_order,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}
