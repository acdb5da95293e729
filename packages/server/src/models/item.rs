use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::item;
use crate::error::AppError;

use super::shared::{double_option, validate_description, validate_name, validate_tags};

fn default_quantity() -> i32 {
    1
}

fn default_currency() -> String {
    "USD".into()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateItemRequest {
    #[schema(example = "Desk lamp")]
    pub name: String,
    #[schema(example = "A brass desk lamp")]
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Default: 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[schema(example = "pcs")]
    pub unit: Option<String>,
    pub estimated_value: Option<f64>,
    /// Default: "USD".
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// PATCH body: absent fields stay untouched; nullable fields may be cleared
/// with an explicit `null`.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub location_id: Option<Option<i32>>,
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Option<f64>>,
    pub currency: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    pub quantity: i32,
    pub unit: Option<String>,
    pub estimated_value: Option<f64>,
    pub currency: String,
    pub tags: Vec<String>,
    pub ai_description: Option<String>,
    pub ai_tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemListQuery {
    /// Number of records to skip. Default: 0.
    pub skip: Option<u64>,
    /// Maximum number of records to return (1-100). Default: 100.
    pub limit: Option<u64>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
}

/// Result of `POST /items/{id}/describe`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DescribeItemResponse {
    pub item_id: i32,
    /// Generated text, or the stored description (then the name) when the
    /// vision backend is unavailable.
    pub description: String,
}

impl From<item::Model> for ItemResponse {
    fn from(m: item::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category_id: m.category_id,
            location_id: m.location_id,
            quantity: m.quantity,
            unit: m.unit,
            estimated_value: m.estimated_value,
            currency: m.currency,
            tags: m.tags.0,
            ai_description: m.ai_description,
            ai_tags: m.ai_tags.0,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 0 {
        return Err(AppError::Validation("Quantity must be >= 0".into()));
    }
    Ok(())
}

fn validate_value(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(
            "Estimated value must be a non-negative number".into(),
        ));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), AppError> {
    let currency = currency.trim();
    if currency.is_empty() || currency.chars().count() > 10 {
        return Err(AppError::Validation("Currency must be 1-10 characters".into()));
    }
    Ok(())
}

fn validate_unit(unit: &str) -> Result<(), AppError> {
    if unit.chars().count() > 32 {
        return Err(AppError::Validation("Unit must be at most 32 characters".into()));
    }
    Ok(())
}

pub fn validate_create_item(req: &CreateItemRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_description(req.description.as_deref())?;
    validate_quantity(req.quantity)?;
    if let Some(ref unit) = req.unit {
        validate_unit(unit)?;
    }
    if let Some(value) = req.estimated_value {
        validate_value(value)?;
    }
    validate_currency(&req.currency)?;
    validate_tags(&req.tags)
}

pub fn validate_update_item(req: &UpdateItemRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(Some(ref desc)) = req.description {
        validate_description(Some(desc))?;
    }
    if let Some(quantity) = req.quantity {
        validate_quantity(quantity)?;
    }
    if let Some(Some(ref unit)) = req.unit {
        validate_unit(unit)?;
    }
    if let Some(Some(value)) = req.estimated_value {
        validate_value(value)?;
    }
    if let Some(ref currency) = req.currency {
        validate_currency(currency)?;
    }
    if let Some(ref tags) = req.tags {
        validate_tags(tags)?;
    }
    Ok(())
}
