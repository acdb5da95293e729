use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
