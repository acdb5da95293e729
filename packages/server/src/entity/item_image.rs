use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::FeatureVector;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub item_id: i32,
    #[sea_orm(belongs_to, from = "item_id", to = "id")]
    pub item: HasOne<super::item::Entity>,

    /// Generated name inside the upload directory.
    pub filename: String,
    /// Name the client uploaded the file under.
    pub original_filename: String,
    pub file_path: String,
    /// Size of the stored file in bytes.
    pub file_size: i64,
    /// SHA-256 of the stored bytes.
    pub content_hash: String,

    /// NULL when the upload could not be decoded as an image.
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub ai_description: Option<String>,

    /// 96-bin colour histogram; NULL when decoding failed.
    #[sea_orm(column_type = "Json", nullable)]
    pub embedding: Option<FeatureVector>,

    pub is_primary: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
