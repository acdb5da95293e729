use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use common::ImageFeatures;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::{info, instrument, warn};

use crate::entity::{FeatureVector, item, item_image};
use crate::error::{AppError, ErrorBody};
use crate::handlers::item::find_item;
use crate::models::image::{AiAnalysis, ImageResponse, UploadImageResponse};
use crate::services::imaging::decode_upload;
use crate::services::vision::ImageAnalysis;
use crate::state::AppState;
use crate::utils::filename::validate_upload_name;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn image_upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Map a multipart failure, keeping the 413 the body limit produces.
pub(crate) fn multipart_error(err: MultipartError, max_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit: max_size }
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

/// A file pulled out of a multipart form.
pub(crate) struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Read a multipart file field into memory, enforcing `max_size`.
pub(crate) async fn read_file_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let filename = validate_upload_name(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if (buf.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::PayloadTooLarge { limit: max_size });
        }
        buf.extend_from_slice(&chunk);
    }

    if buf.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }

    Ok(UploadedFile {
        filename,
        bytes: Bytes::from(buf),
    })
}

fn parse_bool(value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Validation(format!(
            "is_primary must be a boolean, got {other:?}"
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/images",
    tag = "Item Images",
    operation_id = "uploadItemImage",
    summary = "Upload an image for an item",
    description = "Stores the `file` multipart field, computes its colour histogram and asks the vision model for a description. \
        An optional `is_primary` field marks the image as the item's primary image. \
        Files that cannot be decoded as images are still stored, without dimensions, feature vector or analysis. \
        The item's AI description and tags are taken from the analysis when the image is primary or the item has none yet.",
    params(("id" = i32, Path, description = "Item ID")),
    request_body(content_type = "multipart/form-data", description = "Image file with optional is_primary flag"),
    responses(
        (status = 201, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    find_item(&state.db, id).await?;

    let max_size = state.config.storage.max_upload_size;
    let mut file: Option<UploadedFile> = None;
    let mut is_primary = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        match field.name() {
            Some("file") => file = Some(read_file_field(field, max_size).await?),
            Some("is_primary") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_size))?;
                is_primary = parse_bool(&text)?;
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    // On disk before anything references it.
    let stored = state.uploads.save(&file.bytes, &file.filename).await?;

    let features = decode_upload(file.bytes.clone()).await;
    let analysis = match features {
        Some(ImageFeatures {
            format: Some(ref format),
            ..
        }) => state.vision.analyze_image(&file.bytes, &format.to_lowercase()).await,
        _ => ImageAnalysis::unavailable(),
    };

    let result = record_upload(&state, id, &file, &stored, features, &analysis, is_primary).await;
    let image = match result {
        Ok(image) => image,
        Err(e) => {
            if let Err(cleanup) = state.uploads.delete(&stored.filename).await {
                warn!(filename = %stored.filename, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e);
        }
    };

    info!(
        image_id = image.id,
        has_embedding = image.embedding.is_some(),
        analysed = !analysis.is_empty(),
        "Image uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadImageResponse {
            message: "Image uploaded successfully".into(),
            image_id: image.id,
            image: image.into(),
            ai_analysis: AiAnalysis::from(analysis),
        }),
    ))
}

/// Insert the image row and apply the primary/promotion rules in one
/// transaction.
async fn record_upload(
    state: &AppState,
    item_id: i32,
    file: &UploadedFile,
    stored: &common::storage::StoredUpload,
    features: Option<ImageFeatures>,
    analysis: &ImageAnalysis,
    is_primary: bool,
) -> Result<item_image::Model, AppError> {
    let txn = state.db.begin().await?;

    // The item may have been deleted while the file was being processed.
    let item = find_item(&txn, item_id).await?;

    if is_primary {
        item_image::Entity::update_many()
            .col_expr(item_image::Column::IsPrimary, Expr::value(false))
            .filter(item_image::Column::ItemId.eq(item_id))
            .exec(&txn)
            .await?;
    }

    let (width, height, format, embedding) = match features {
        Some(f) => (
            i32::try_from(f.width).ok(),
            i32::try_from(f.height).ok(),
            f.format,
            Some(FeatureVector(f.vector)),
        ),
        None => (None, None, None, None),
    };

    let image = item_image::ActiveModel {
        item_id: Set(item_id),
        filename: Set(stored.filename.clone()),
        original_filename: Set(file.filename.clone()),
        file_path: Set(stored.path.to_string_lossy().into_owned()),
        file_size: Set(i64::try_from(stored.size).unwrap_or(i64::MAX)),
        content_hash: Set(stored.content_hash.to_hex()),
        width: Set(width),
        height: Set(height),
        format: Set(format),
        ai_description: Set((!analysis.is_empty()).then(|| analysis.description.clone())),
        embedding: Set(embedding),
        is_primary: Set(is_primary),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let item_has_description = item
        .ai_description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if !analysis.is_empty() && (is_primary || !item_has_description) {
        let mut active: item::ActiveModel = item.into();
        active.ai_description = Set(Some(analysis.description.clone()));
        active.ai_tags = Set(analysis.tags.clone().into());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(image)
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/images",
    tag = "Item Images",
    operation_id = "listItemImages",
    summary = "List images of an item",
    description = "Returns the item's images in upload order.",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Image list", body = Vec<ImageResponse>),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    find_item(&state.db, id).await?;

    let images = item_image::Entity::find()
        .filter(item_image::Column::ItemId.eq(id))
        .order_by_asc(item_image::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/images/{image_id}",
    tag = "Item Images",
    operation_id = "getItemImage",
    summary = "Get image metadata",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image metadata", body = ImageResponse),
        (status = 404, description = "Item or image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = find_image_for_item(&state.db, id, image_id).await?;
    Ok(Json(image.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}/images/{image_id}/file",
    tag = "Item Images",
    operation_id = "downloadItemImage",
    summary = "Download the stored image file",
    description = "Streams the stored bytes with a content type guessed from the original filename.",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image content"),
        (status = 404, description = "Item, image or file not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> Result<Response, AppError> {
    let image = find_image_for_item(&state.db, id, image_id).await?;

    let reader = state.uploads.open(&image.filename).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(&image.original_filename)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, image.file_size.to_string())
        .header(header::ETAG, format!("\"{}\"", image.content_hash))
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}/images/{image_id}",
    tag = "Item Images",
    operation_id = "deleteItemImage",
    summary = "Delete an image",
    description = "Removes the image row and its stored file.",
    params(
        ("id" = i32, Path, description = "Item ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Item or image not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let image = find_image_for_item(&state.db, id, image_id).await?;

    item_image::Entity::delete_by_id(image.id)
        .exec(&state.db)
        .await?;

    match state.uploads.delete(&image.filename).await {
        Ok(true) => {}
        Ok(false) => warn!(filename = %image.filename, "Image file was already gone"),
        Err(e) => warn!(filename = %image.filename, error = %e, "Failed to remove image file"),
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_image_for_item<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    image_id: i32,
) -> Result<item_image::Model, AppError> {
    find_item(db, item_id).await?;

    let image = item_image::Entity::find_by_id(image_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))?;

    if image.item_id != item_id {
        return Err(AppError::NotFound("Image not found".into()));
    }
    Ok(image)
}
