//! Colour-histogram image signatures and the linear-scan similarity ranking
//! built on top of them.
//!
//! The signature is a global RGB histogram: cheap, resolution independent and
//! sensitive to lighting and framing. It is meant for a small personal catalog,
//! not for semantic visual search.

mod error;
mod histogram;
mod ranking;
mod similarity;

pub use error::ExtractionError;
pub use histogram::{ImageFeatures, analyze, extract_features, histogram};
pub use ranking::{Ranked, rank};
pub use similarity::cosine_similarity;

/// Histogram bins per colour channel.
pub const BINS_PER_CHANNEL: usize = 32;

/// Length of every feature vector (three channels of `BINS_PER_CHANNEL` bins).
pub const FEATURE_DIM: usize = BINS_PER_CHANNEL * 3;

/// Images are resampled to this square size before binning.
pub const CANONICAL_SIZE: u32 = 224;
