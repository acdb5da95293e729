use serde::{Deserialize, Serialize};

use super::item::ItemResponse;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TextSearchQuery {
    /// Case-insensitive substring over name, description and AI description.
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Comma-separated; every listed tag must be present on the item.
    #[param(example = "kitchen,brass")]
    pub tags: Option<String>,
    /// Default: 50, max 100.
    pub limit: Option<u64>,
}

impl TextSearchQuery {
    /// Split the comma-separated `tags` parameter, dropping blanks.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageSearchQuery {
    /// Minimum similarity in [0, 1]. Default: 0.5.
    pub threshold: Option<f32>,
    /// Default: 10, max 50.
    pub limit: Option<usize>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageSearchHit {
    pub item: ItemResponse,
    /// Cosine similarity of colour histograms, in [0, 1].
    pub similarity: f32,
    pub matched_image_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageSearchResponse {
    pub results: Vec<ImageSearchHit>,
    pub count: usize,
}
