use common::embedding::{Ranked, rank};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;

use crate::entity::{item, item_image};
use crate::models::shared::escape_like;

/// Filters for a text search. Empty fields do not constrain the result.
#[derive(Debug, Default)]
pub struct TextFilter {
    pub query: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub tags: Vec<String>,
    pub limit: u64,
}

/// Items whose name, description or AI description contain the query
/// (case-insensitive) and that satisfy every other filter, ordered by id.
pub async fn search_items<C: ConnectionTrait>(
    db: &C,
    filter: &TextFilter,
) -> Result<Vec<item::Model>, DbErr> {
    let mut select = item::Entity::find().order_by_asc(item::Column::Id);

    if let Some(ref q) = filter.query {
        let term = escape_like(q.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let contains = |col: item::Column| {
                Expr::expr(Func::lower(Expr::col(col)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(contains(item::Column::Name))
                    .add(contains(item::Column::Description))
                    .add(contains(item::Column::AiDescription)),
            );
        }
    }
    if let Some(category_id) = filter.category_id {
        select = select.filter(item::Column::CategoryId.eq(category_id));
    }
    if let Some(location_id) = filter.location_id {
        select = select.filter(item::Column::LocationId.eq(location_id));
    }

    // Tag membership lives in a JSON column whose operators differ per
    // backend, so it is checked after the fetch.
    if filter.tags.is_empty() {
        return select.limit(filter.limit).all(db).await;
    }

    let items = select.all(db).await?;
    Ok(items
        .into_iter()
        .filter(|m| m.tags.contains_all(&filter.tags))
        .take(usize::try_from(filter.limit).unwrap_or(usize::MAX))
        .collect())
}

/// One stored image that scored above the threshold, with its owner.
pub struct ImageMatch {
    pub item: item::Model,
    pub image_id: i32,
    pub similarity: f32,
}

/// Scan every stored image with a feature vector and rank it against `query`.
///
/// An item appears once per matching image.
pub async fn search_by_vector<C: ConnectionTrait>(
    db: &C,
    query: &[f32],
    threshold: f32,
    limit: usize,
) -> Result<Vec<ImageMatch>, DbErr> {
    let images = item_image::Entity::find()
        .filter(item_image::Column::Embedding.is_not_null())
        .order_by_asc(item_image::Column::Id)
        .all(db)
        .await?;

    let candidates = images.into_iter().filter_map(|img| {
        let embedding = img.embedding?;
        Some(((img.id, img.item_id), embedding))
    });
    let ranked: Vec<Ranked<(i32, i32)>> = rank(query, candidates, threshold, limit);
    if ranked.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<i32> = ranked.iter().map(|r| r.candidate.1).collect();
    let items = item::Entity::find()
        .filter(item::Column::Id.is_in(item_ids))
        .all(db)
        .await?;

    Ok(ranked
        .into_iter()
        .filter_map(|r| {
            let (image_id, item_id) = r.candidate;
            let item = items.iter().find(|m| m.id == item_id)?.clone();
            Some(ImageMatch {
                item,
                image_id,
                similarity: r.similarity,
            })
        })
        .collect())
}
