//! # adivinar
//!
//! Ensemble numeric pattern prediction in pure Rust.
//!
//! `adivinar` learns from a stream of scalar `(input, output)` observations
//! and predicts outputs for unseen inputs by blending three complementary
//! models: a discrete-Fourier spectral extrapolator, a recency-aware
//! weighted k-nearest-neighbor regressor, and a small trainable
//! feed-forward network. Every prediction carries a confidence derived from
//! how much the models agree, and the sample set round-trips through a
//! versioned JSON archive.
//!
//! ## Quick Start
//!
//! ```
//! use adivinar::prelude::*;
//!
//! let mut predictor = EnsemblePredictor::new().with_random_state(42);
//! predictor.add_sample(1.0, 2.0);
//! predictor.add_sample(2.0, 4.0);
//! predictor.add_sample(3.0, 6.0);
//!
//! let prediction = predictor.predict(4.0);
//! assert!(prediction.value.is_finite());
//! assert!(prediction.confidence > 0.0 && prediction.confidence <= 0.95);
//!
//! let analysis = predictor.analyze_pattern();
//! assert_eq!(analysis.sample_count, 3);
//! assert!((analysis.correlation - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`ensemble`]: the blended multi-model predictor
//! - [`spectral`]: DFT analysis and frequency-domain extrapolation
//! - [`neighbors`]: composite-weighted k-nearest-neighbor regression
//! - [`mlp`]: trainable feed-forward regressor
//! - [`sample`]: sample storage and the versioned archive format
//! - [`stats`]: shared descriptive statistics
//! - [`error`]: the crate-wide error type

pub mod ensemble;
pub mod error;
pub mod mlp;
pub mod neighbors;
pub mod prelude;
pub mod sample;
pub mod spectral;
pub mod stats;

pub use error::{AdivinarError, Result};
