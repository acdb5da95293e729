use axum::body::Bytes;
use common::ImageFeatures;
use tracing::{error, warn};

/// Decode an upload on the blocking pool. `None` when the bytes are not an
/// image the decoder understands.
pub async fn decode_upload(bytes: Bytes) -> Option<ImageFeatures> {
    match tokio::task::spawn_blocking(move || common::embedding::analyze(&bytes)).await {
        Ok(Ok(features)) => Some(features),
        Ok(Err(e)) => {
            warn!(error = %e, "Upload is not a decodable image");
            None
        }
        Err(e) => {
            error!(error = %e, "Image decoding task failed");
            None
        }
    }
}

/// Feature vector of a query image, or `None` if it cannot be decoded.
pub async fn query_vector(bytes: Bytes) -> Option<Vec<f32>> {
    match tokio::task::spawn_blocking(move || common::embedding::extract_features(&bytes)).await {
        Ok(Ok(vector)) => Some(vector),
        Ok(Err(e)) => {
            warn!(error = %e, "Query image is not decodable");
            None
        }
        Err(e) => {
            error!(error = %e, "Image decoding task failed");
            None
        }
    }
}
