use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{item, location};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::location::*;
use crate::models::shared::{resolve_paging, trim_optional};
use crate::services::hierarchy::ensure_valid_parent;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/locations",
    tag = "Locations",
    operation_id = "createLocation",
    summary = "Create a new location",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_location(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_location(&payload)?;

    if let Some(parent_id) = payload.parent_id {
        check_parent(&state.db, None, parent_id).await?;
    }

    let now = chrono::Utc::now();
    let model = location::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        location_type: Set(trim_optional(payload.location_type)),
        x_coord: Set(payload.x_coord),
        y_coord: Set(payload.y_coord),
        z_coord: Set(payload.z_coord),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        model_url: Set(trim_optional(payload.model_url)),
        parent_id: Set(payload.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(LocationResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations",
    tag = "Locations",
    operation_id = "listLocations",
    summary = "List locations",
    description = "Returns locations ordered by id, optionally restricted to one `location_type`.",
    params(LocationListQuery),
    responses(
        (status = 200, description = "List of locations", body = Vec<LocationResponse>),
        (status = 400, description = "Invalid paging (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationListQuery>,
) -> Result<Json<Vec<LocationResponse>>, AppError> {
    let (skip, limit) = resolve_paging(query.skip, query.limit)?;

    let mut select = location::Entity::find();
    if let Some(location_type) = trim_optional(query.location_type) {
        select = select.filter(location::Column::LocationType.eq(location_type));
    }

    let locations = select
        .order_by_asc(location::Column::Id)
        .offset(Some(skip))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(locations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    operation_id = "getLocation",
    summary = "Get a location by ID",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = LocationResponse),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LocationResponse>, AppError> {
    let model = find_location(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    operation_id = "updateLocation",
    summary = "Update a location",
    description = "Partially updates a location. Coordinates and other nullable fields are cleared with an explicit null. A new parent must exist and must not be the location itself or one of its descendants.",
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 400, description = "Validation error or hierarchy cycle (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Location or parent not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateLocationRequest>,
) -> Result<Json<LocationResponse>, AppError> {
    validate_update_location(&payload)?;

    if payload == UpdateLocationRequest::default() {
        let existing = find_location(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_location(&txn, id).await?;
    if let Some(Some(parent_id)) = payload.parent_id {
        check_parent(&txn, Some(id), parent_id).await?;
    }

    let mut active: location::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(location_type) = payload.location_type {
        active.location_type = Set(trim_optional(location_type));
    }
    if let Some(x) = payload.x_coord {
        active.x_coord = Set(x);
    }
    if let Some(y) = payload.y_coord {
        active.y_coord = Set(y);
    }
    if let Some(z) = payload.z_coord {
        active.z_coord = Set(z);
    }
    if let Some(lat) = payload.latitude {
        active.latitude = Set(lat);
    }
    if let Some(lon) = payload.longitude {
        active.longitude = Set(lon);
    }
    if let Some(model_url) = payload.model_url {
        active.model_url = Set(trim_optional(model_url));
    }
    if let Some(parent_id) = payload.parent_id {
        active.parent_id = Set(parent_id);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    operation_id = "deleteLocation",
    summary = "Delete a location",
    description = "Deletes a location. Items stored there lose their location and child locations move to the top level.",
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_location(&txn, id).await?;

    item::Entity::update_many()
        .col_expr(item::Column::LocationId, Expr::value(Option::<i32>::None))
        .filter(item::Column::LocationId.eq(id))
        .exec(&txn)
        .await?;
    location::Entity::update_many()
        .col_expr(location::Column::ParentId, Expr::value(Option::<i32>::None))
        .filter(location::Column::ParentId.eq(id))
        .exec(&txn)
        .await?;
    location::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_location<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<location::Model, AppError> {
    location::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".into()))
}

async fn check_parent<C: ConnectionTrait>(
    db: &C,
    id: Option<i32>,
    parent_id: i32,
) -> Result<(), AppError> {
    ensure_valid_parent("location", id, parent_id, |node| async move {
        location::Entity::find_by_id(node)
            .one(db)
            .await
            .map(|found| found.map(|l| l.parent_id))
    })
    .await
}
