use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::entity::{item, item_image};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::handlers::category::find_category;
use crate::handlers::location::find_location;
use crate::models::item::*;
use crate::models::shared::{normalize_tags, resolve_paging, trim_optional};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "Items",
    operation_id = "createItem",
    summary = "Create a new item",
    description = "Creates an inventory item. `category_id` and `location_id` must reference existing rows when given.",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Referenced category or location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_item(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_item(&payload)?;

    if let Some(category_id) = payload.category_id {
        find_category(&state.db, category_id).await?;
    }
    if let Some(location_id) = payload.location_id {
        find_location(&state.db, location_id).await?;
    }

    let now = chrono::Utc::now();
    let new_item = item::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        category_id: Set(payload.category_id),
        location_id: Set(payload.location_id),
        quantity: Set(payload.quantity),
        unit: Set(trim_optional(payload.unit)),
        estimated_value: Set(payload.estimated_value),
        currency: Set(payload.currency.trim().to_string()),
        tags: Set(normalize_tags(payload.tags).into()),
        ai_description: Set(None),
        ai_tags: Set(Vec::new().into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_item.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "Items",
    operation_id = "listItems",
    summary = "List items",
    description = "Returns items ordered by id, optionally filtered by category and location.",
    params(ItemListQuery),
    responses(
        (status = 200, description = "List of items", body = Vec<ItemResponse>),
        (status = 400, description = "Invalid paging (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    let (skip, limit) = resolve_paging(query.skip, query.limit)?;

    let mut select = item::Entity::find();
    if let Some(category_id) = query.category_id {
        select = select.filter(item::Column::CategoryId.eq(category_id));
    }
    if let Some(location_id) = query.location_id {
        select = select.filter(item::Column::LocationId.eq(location_id));
    }

    let items = select
        .order_by_asc(item::Column::Id)
        .offset(Some(skip))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "Items",
    operation_id = "getItem",
    summary = "Get an item by ID",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = ItemResponse),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemResponse>, AppError> {
    let model = find_item(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/items/{id}",
    tag = "Items",
    operation_id = "updateItem",
    summary = "Update an existing item",
    description = "Partially updates an item using PATCH semantics. Omitted fields are left unchanged; nullable fields are cleared with an explicit null. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Item, category or location not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    validate_update_item(&payload)?;

    if payload == UpdateItemRequest::default() {
        let existing = find_item(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_item(&txn, id).await?;
    if let Some(Some(category_id)) = payload.category_id {
        find_category(&txn, category_id).await?;
    }
    if let Some(Some(location_id)) = payload.location_id {
        find_location(&txn, location_id).await?;
    }

    let mut active: item::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(location_id) = payload.location_id {
        active.location_id = Set(location_id);
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(trim_optional(unit));
    }
    if let Some(value) = payload.estimated_value {
        active.estimated_value = Set(value);
    }
    if let Some(ref currency) = payload.currency {
        active.currency = Set(currency.trim().to_string());
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(normalize_tags(tags).into());
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "Items",
    operation_id = "deleteItem",
    summary = "Delete an item by ID",
    description = "Permanently deletes an item together with its images and their stored files.",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_item(&txn, id).await?;

    let images = item_image::Entity::find()
        .filter(item_image::Column::ItemId.eq(id))
        .all(&txn)
        .await?;
    item_image::Entity::delete_many()
        .filter(item_image::Column::ItemId.eq(id))
        .exec(&txn)
        .await?;
    item::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    for image in images {
        if let Err(e) = state.uploads.delete(&image.filename).await {
            warn!(filename = %image.filename, error = %e, "Failed to remove image file");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/describe",
    tag = "Items",
    operation_id = "describeItem",
    summary = "Generate a description for an item",
    description = "Asks the language model for a short description based on the item's name and description. Falls back to the stored description, then the name, when the model is unavailable. Nothing is persisted.",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Generated description", body = DescribeItemResponse),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn describe_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DescribeItemResponse>, AppError> {
    let item = find_item(&state.db, id).await?;

    let description = state
        .vision
        .describe_item(&item.name, item.description.as_deref())
        .await;

    Ok(Json(DescribeItemResponse {
        item_id: item.id,
        description,
    }))
}

pub(crate) async fn find_item<C: ConnectionTrait>(db: &C, id: i32) -> Result<item::Model, AppError> {
    item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))
}
