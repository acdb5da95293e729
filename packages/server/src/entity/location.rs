use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Free-form kind, e.g. "room", "shelf", "box".
    pub location_type: Option<String>,

    // Position inside a floor plan or 3D model.
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub z_coord: Option<f64>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub model_url: Option<String>,

    /// Enclosing location. The chain of parents never loops back.
    pub parent_id: Option<i32>,

    #[sea_orm(has_many)]
    pub items: HasMany<super::item::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
