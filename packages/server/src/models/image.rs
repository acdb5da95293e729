use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::item_image;
use crate::services::vision::ImageAnalysis;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageResponse {
    pub id: i32,
    pub item_id: i32,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    /// SHA-256 of the stored bytes, hex encoded.
    pub content_hash: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[schema(example = "JPEG")]
    pub format: Option<String>,
    pub ai_description: Option<String>,
    /// False when the upload could not be decoded and carries no feature vector.
    pub has_embedding: bool,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<item_image::Model> for ImageResponse {
    fn from(m: item_image::Model) -> Self {
        Self {
            id: m.id,
            item_id: m.item_id,
            filename: m.filename,
            original_filename: m.original_filename,
            file_size: m.file_size,
            content_hash: m.content_hash,
            width: m.width,
            height: m.height,
            format: m.format,
            ai_description: m.ai_description,
            has_embedding: m.embedding.is_some(),
            is_primary: m.is_primary,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AiAnalysis {
    /// Empty when the vision backend was unavailable.
    pub description: String,
    pub tags: Vec<String>,
    /// 0.0 when no analysis was produced.
    pub confidence: f32,
}

impl From<ImageAnalysis> for AiAnalysis {
    fn from(a: ImageAnalysis) -> Self {
        Self {
            description: a.description,
            tags: a.tags,
            confidence: a.confidence,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadImageResponse {
    #[schema(example = "Image uploaded successfully")]
    pub message: String,
    pub image_id: i32,
    pub image: ImageResponse,
    pub ai_analysis: AiAnalysis,
}
