use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::TagList;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub category_id: Option<i32>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    pub location_id: Option<i32>,
    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: HasOne<super::location::Entity>,

    pub quantity: i32,
    pub unit: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: String, // ISO-4217 style code, e.g. "USD"

    #[sea_orm(column_type = "Json")]
    pub tags: TagList,

    /// Promoted from the primary (or first analysed) image.
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_description: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub ai_tags: TagList,

    #[sea_orm(has_many)]
    pub images: HasMany<super::item_image::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
