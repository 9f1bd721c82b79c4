//! Unit gallery media: upload, listing, metadata, ordering.

use crate::api::models::media::{ListMediaQuery, MediaPatchRequest, MediaResponse, ReorderRequest};
use crate::api::models::users::CurrentUser;
use crate::auth::require_manager;
use crate::db::file_storage::FileStorageRequest;
use crate::db::handlers::{Media, Units, media::MediaFilter};
use crate::db::models::media::{MediaCreateDBRequest, MediaUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{MediaId, UnitId};
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};

struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Accept any file field name (files[], files, file, ...) and flatten.
async fn collect_files(multipart: &mut Multipart, max_bytes: usize) -> Result<(Vec<UploadedFile>, MediaUploadFields)> {
    let mut files = Vec::new();
    let mut fields = MediaUploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let name = field.name().unwrap_or("").to_string();
        if field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("upload.bin").to_string();
            let content_type = field
                .content_type()
                .map(|c| c.to_string())
                .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream().to_string());
            let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                message: format!("Failed to read file chunk: {e}"),
            })?;
            if bytes.is_empty() {
                return Err(Error::BadRequest {
                    message: "Invalid uploaded file".to_string(),
                });
            }
            if bytes.len() > max_bytes {
                return Err(Error::BadRequest {
                    message: format!("File exceeds the maximum upload size of {max_bytes} bytes"),
                });
            }
            files.push(UploadedFile {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read field {name}: {e}"),
        })?;
        match name.as_str() {
            "caption" => fields.caption = Some(value),
            "seo_description" => fields.seo_description = Some(value),
            "is_published" => fields.is_published = value.parse().ok(),
            "is_cover" => fields.is_cover = value.parse().unwrap_or(false),
            "sort_order" => fields.sort_order = value.parse().ok(),
            "tags" | "tags[]" => fields.tags.push(value),
            _ => {} // Ignore unknown fields (forward compatibility)
        }
    }

    Ok((files, fields))
}

#[derive(Default)]
struct MediaUploadFields {
    caption: Option<String>,
    seo_description: Option<String>,
    is_published: Option<bool>,
    is_cover: bool,
    sort_order: Option<i32>,
    tags: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/units/{id}/media",
    tag = "media",
    summary = "Upload media for a unit",
    description = "Single or bulk upload. Bulk uploads are appended after the current gallery and never become the cover.",
    request_body(content_type = "multipart/form-data", description = "Image files plus optional shared fields"),
    responses(
        (status = 201, description = "Created media", body = Vec<MediaResponse>),
        (status = 400, description = "Missing or invalid file"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<MediaResponse>>)> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let (files, fields) = collect_files(&mut multipart, state.config.max_upload_bytes).await?;
    if files.is_empty() {
        return Err(Error::BadRequest {
            message: "Missing file".to_string(),
        });
    }

    let bulk = files.len() > 1;
    let max_sort = Media::new(&mut conn).max_sort_order(unit_id).await?;

    let mut created = Vec::with_capacity(files.len());
    for (idx, file) in files.into_iter().enumerate() {
        let stored = state
            .file_storage
            .store(FileStorageRequest {
                content: file.bytes,
                content_type: file.content_type,
                key_prefix: format!("media/{unit_id}"),
                filename: file.filename,
            })
            .await?;

        let url = format!("/media/{}", stored.storage_key);
        let request = if bulk {
            // Bulk: shared fields, appended to the end, never auto-cover -
            // the ordering endpoint decides the cover
            MediaCreateDBRequest {
                unit_id,
                storage_key: stored.storage_key,
                url,
                caption: None,
                seo_description: None,
                tags: if fields.tags.is_empty() { vec!["gallery".to_string()] } else { fields.tags.clone() },
                is_published: fields.is_published.unwrap_or(true),
                is_cover: false,
                sort_order: max_sort + 1 + idx as i32,
            }
        } else {
            MediaCreateDBRequest {
                unit_id,
                storage_key: stored.storage_key,
                url,
                caption: fields.caption.clone(),
                seo_description: fields.seo_description.clone(),
                tags: fields.tags.clone(),
                is_published: fields.is_published.unwrap_or(false),
                is_cover: fields.is_cover,
                sort_order: fields.sort_order.unwrap_or(0),
            }
        };

        let media = Media::new(&mut conn).create(&request).await?;
        created.push(MediaResponse::from_db_response(&media));
    }

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/units/{id}/media",
    tag = "media",
    summary = "List a unit's media",
    params(ListMediaQuery),
    responses(
        (status = 200, description = "Media in gallery order", body = Vec<MediaResponse>),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn list_media(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
    Query(query): Query<ListMediaQuery>,
) -> Result<Json<Vec<MediaResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut conn).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let media = Media::new(&mut conn)
        .list_for_unit(
            unit_id,
            MediaFilter {
                published_only: query.published.unwrap_or(false),
                covers_only: query.covers.unwrap_or(false),
            },
        )
        .await?;

    Ok(Json(media.iter().map(MediaResponse::from_db_response).collect()))
}

#[utoipa::path(
    patch,
    path = "/media/{id}",
    tag = "media",
    summary = "Update media metadata",
    description = "Promoting an image to cover demotes the unit's previous cover in the same transaction.",
    request_body = MediaPatchRequest,
    responses(
        (status = 200, description = "Updated media", body = MediaResponse),
        (status = 404, description = "Media not found")
    )
)]
pub async fn patch_media(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<MediaId>,
    Json(request): Json<MediaPatchRequest>,
) -> Result<Json<MediaResponse>> {
    require_manager(&current_user)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let media = Media::new(&mut tx)
        .update(
            id,
            &MediaUpdateDBRequest {
                caption: request.caption,
                seo_description: request.seo_description,
                tags: request.tags,
                is_published: request.is_published,
                is_cover: request.is_cover,
                sort_order: request.sort_order,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Media".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(MediaResponse::from_db_response(&media)))
}

#[utoipa::path(
    patch,
    path = "/units/{id}/media/order",
    tag = "media",
    summary = "Reorder a unit's gallery",
    description = "Position 0 becomes the cover; media left out of the order lose the cover flag.",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Reordered media", body = Vec<MediaResponse>),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn reorder_media(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(unit_id): Path<UnitId>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<MediaResponse>>> {
    require_manager(&current_user)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    Units::new(&mut tx).get_by_id(unit_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Unit".to_string(),
        id: unit_id.to_string(),
    })?;

    let updated = Media::new(&mut tx).reorder(unit_id, &request.order).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(updated.iter().map(MediaResponse::from_db_response).collect()))
}

#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "media",
    summary = "Delete media",
    description = "Deletes the stored object first, then the row.",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Media not found")
    )
)]
pub async fn delete_media(State(state): State<AppState>, current_user: CurrentUser, Path(id): Path<MediaId>) -> Result<StatusCode> {
    require_manager(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Media::new(&mut conn);

    let media = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Media".to_string(),
        id: id.to_string(),
    })?;

    state.file_storage.delete(&media.storage_key).await?;
    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
