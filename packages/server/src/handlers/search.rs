use axum::Json;
use axum::extract::{Multipart, Query, State};
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::handlers::image::{UploadedFile, multipart_error, read_file_field};
use crate::models::item::ItemResponse;
use crate::models::search::*;
use crate::models::shared::validate_tags;
use crate::services::imaging::query_vector;
use crate::services::search::{TextFilter, search_by_vector, search_items};
use crate::state::AppState;

fn resolve_limit<T>(limit: Option<T>, default: T, max: T) -> Result<T, AppError>
where
    T: Copy + PartialOrd + From<u8> + std::fmt::Display,
{
    let limit = limit.unwrap_or(default);
    if limit < T::from(1) || limit > max {
        return Err(AppError::Validation(format!("limit must be 1-{max}")));
    }
    Ok(limit)
}

fn resolve_threshold(threshold: Option<f32>, default: f32) -> Result<f32, AppError> {
    let threshold = threshold.unwrap_or(default);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::Validation(
            "threshold must be between 0 and 1".into(),
        ));
    }
    Ok(threshold)
}

#[utoipa::path(
    get,
    path = "/api/v1/search/items",
    tag = "Search",
    operation_id = "searchItems",
    summary = "Text search over items",
    description = "Case-insensitive substring match of `q` against name, description and AI description, \
        combined with optional category, location and tag filters. Results are ordered by id.",
    params(TextSearchQuery),
    responses(
        (status = 200, description = "Matching items", body = Vec<ItemResponse>),
        (status = 400, description = "Invalid parameters (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(q = ?query.q))]
pub async fn search_text(
    State(state): State<AppState>,
    Query(query): Query<TextSearchQuery>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let cfg = &state.config.search;
    let limit = resolve_limit(query.limit, cfg.default_text_limit, cfg.max_text_limit)?;
    let tags = query.tag_list();
    validate_tags(&tags)?;

    let filter = TextFilter {
        query: query.q,
        category_id: query.category_id,
        location_id: query.location_id,
        tags,
        limit,
    };
    let items = search_items(&state.db, &filter).await?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/search/by-image",
    tag = "Search",
    operation_id = "searchByImage",
    summary = "Find items with visually similar images",
    description = "Compares the colour histogram of the uploaded `file` against every stored image and returns \
        matches at or above `threshold`, most similar first. A query file that cannot be decoded yields an empty result.",
    params(ImageSearchQuery),
    request_body(content_type = "multipart/form-data", description = "Query image in the `file` field"),
    responses(
        (status = 200, description = "Ranked matches", body = ImageSearchResponse),
        (status = 400, description = "Invalid parameters or form (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query, multipart))]
pub async fn search_image(
    State(state): State<AppState>,
    Query(query): Query<ImageSearchQuery>,
    mut multipart: Multipart,
) -> Result<Json<ImageSearchResponse>, AppError> {
    let cfg = &state.config.search;
    let limit = resolve_limit(query.limit, cfg.default_image_limit, cfg.max_image_limit)?;
    let threshold = resolve_threshold(query.threshold, cfg.default_threshold)?;

    let max_size = state.config.storage.max_upload_size;
    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() == Some("file") {
            file = Some(read_file_field(field, max_size).await?);
        }
    }
    let file = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let Some(vector) = query_vector(file.bytes).await else {
        return Ok(Json(ImageSearchResponse {
            results: Vec::new(),
            count: 0,
        }));
    };

    let matches = search_by_vector(&state.db, &vector, threshold, limit).await?;
    info!(count = matches.len(), threshold, limit, "Image search finished");

    let results: Vec<ImageSearchHit> = matches
        .into_iter()
        .map(|m| ImageSearchHit {
            item: m.item.into(),
            similarity: m.similarity,
            matched_image_id: m.image_id,
        })
        .collect();

    Ok(Json(ImageSearchResponse {
        count: results.len(),
        results,
    }))
}
