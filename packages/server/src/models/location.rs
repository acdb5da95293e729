use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::location;
use crate::error::AppError;

use super::shared::{double_option, validate_description, validate_name};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLocationRequest {
    #[schema(example = "Garage shelf B")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "shelf")]
    pub location_type: Option<String>,
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub z_coord: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub model_url: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub location_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub x_coord: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub y_coord: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub z_coord: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub model_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub parent_id: Option<Option<i32>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LocationResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub location_type: Option<String>,
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub z_coord: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub model_url: Option<String>,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationListQuery {
    /// Number of records to skip. Default: 0.
    pub skip: Option<u64>,
    /// Maximum number of records to return (1-100). Default: 100.
    pub limit: Option<u64>,
    /// Exact match on `location_type`.
    pub location_type: Option<String>,
}

impl From<location::Model> for LocationResponse {
    fn from(m: location::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            location_type: m.location_type,
            x_coord: m.x_coord,
            y_coord: m.y_coord,
            z_coord: m.z_coord,
            latitude: m.latitude,
            longitude: m.longitude,
            model_url: m.model_url,
            parent_id: m.parent_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_latitude(lat: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::Validation("Latitude must be between -90 and 90".into()));
    }
    Ok(())
}

fn validate_longitude(lon: f64) -> Result<(), AppError> {
    if !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::Validation(
            "Longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}

fn validate_coords(coords: &[Option<f64>]) -> Result<(), AppError> {
    if coords.iter().flatten().any(|c| !c.is_finite()) {
        return Err(AppError::Validation("Coordinates must be finite numbers".into()));
    }
    Ok(())
}

pub fn validate_create_location(req: &CreateLocationRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_description(req.description.as_deref())?;
    validate_coords(&[req.x_coord, req.y_coord, req.z_coord])?;
    if let Some(lat) = req.latitude {
        validate_latitude(lat)?;
    }
    if let Some(lon) = req.longitude {
        validate_longitude(lon)?;
    }
    Ok(())
}

pub fn validate_update_location(req: &UpdateLocationRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(Some(ref desc)) = req.description {
        validate_description(Some(desc))?;
    }
    validate_coords(&[
        req.x_coord.flatten(),
        req.y_coord.flatten(),
        req.z_coord.flatten(),
    ])?;
    if let Some(Some(lat)) = req.latitude {
        validate_latitude(lat)?;
    }
    if let Some(Some(lon)) = req.longitude {
        validate_longitude(lon)?;
    }
    Ok(())
}
