use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{category, item};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::models::shared::{ListQuery, resolve_paging};
use crate::services::hierarchy::ensure_valid_parent;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a new category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Parent category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_category(&payload)?;

    if let Some(parent_id) = payload.parent_id {
        check_parent(&state.db, None, parent_id).await?;
    }

    let now = chrono::Utc::now();
    let model = category::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        parent_id: Set(payload.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    params(ListQuery),
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryResponse>),
        (status = 400, description = "Invalid paging (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let (skip, limit) = resolve_paging(query.skip, query.limit)?;

    let categories = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .offset(Some(skip))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category by ID",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = CategoryResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    let model = find_category(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Partially updates a category. A new parent must exist and must not be the category itself or one of its descendants.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error or hierarchy cycle (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Category or parent not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    validate_update_category(&payload)?;

    if payload == UpdateCategoryRequest::default() {
        let existing = find_category(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_category(&txn, id).await?;
    if let Some(Some(parent_id)) = payload.parent_id {
        check_parent(&txn, Some(id), parent_id).await?;
    }

    let mut active: category::ActiveModel = existing.into();
    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
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
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Deletes a category. Items in it become uncategorised and child categories move to the top level.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_category(&txn, id).await?;

    item::Entity::update_many()
        .col_expr(item::Column::CategoryId, Expr::value(Option::<i32>::None))
        .filter(item::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    category::Entity::update_many()
        .col_expr(category::Column::ParentId, Expr::value(Option::<i32>::None))
        .filter(category::Column::ParentId.eq(id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

async fn check_parent<C: ConnectionTrait>(
    db: &C,
    id: Option<i32>,
    parent_id: i32,
) -> Result<(), AppError> {
    ensure_valid_parent("category", id, parent_id, |node| async move {
        category::Entity::find_by_id(node)
            .one(db)
            .await
            .map(|found| found.map(|c| c.parent_id))
    })
    .await
}
