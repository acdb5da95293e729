pub mod category;
pub mod item;
pub mod item_image;
pub mod location;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Free-form tags, stored as a JSON array of strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct TagList(pub Vec<String>);

impl TagList {
    /// True when every tag in `wanted` is present (case-insensitive).
    pub fn contains_all(&self, wanted: &[String]) -> bool {
        wanted
            .iter()
            .all(|w| self.0.iter().any(|t| t.eq_ignore_ascii_case(w)))
    }
}

impl From<Vec<String>> for TagList {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

/// Colour-histogram signature of an image, stored as a JSON array of floats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct FeatureVector(pub Vec<f32>);

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}
