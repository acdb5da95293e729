pub mod embedding;
pub mod storage;
pub mod tags;

pub use embedding::{ExtractionError, FEATURE_DIM, ImageFeatures, Ranked};
