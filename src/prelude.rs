//! Convenience re-exports of the main public types.
//!
//! ```
//! use adivinar::prelude::*;
//!
//! let predictor = EnsemblePredictor::new();
//! assert!(predictor.is_empty());
//! ```

pub use crate::ensemble::{EnsemblePredictor, ModelContribution, PatternAnalysis, Prediction};
pub use crate::error::{AdivinarError, Result};
pub use crate::mlp::MlpRegressor;
pub use crate::neighbors::{NeighborPrediction, NeighborRegressor, NeighborWeights};
pub use crate::sample::{Sample, SampleArchive, SampleStore, FORMAT_VERSION};
pub use crate::spectral::{FrequencyAnalyzer, Spectrum};
