//! Ensemble predictor blending the spectral, neighbor, and network models.
//!
//! [`EnsemblePredictor`] owns a [`SampleStore`] and one instance of each
//! component model, retraining all of them whenever the sample set changes.
//! A query produces a fixed-weight blend of the component estimates plus a
//! confidence derived from how much the components disagree.
//!
//! # Quick Start
//!
//! ```
//! use adivinar::ensemble::EnsemblePredictor;
//!
//! let mut predictor = EnsemblePredictor::new().with_random_state(42);
//! predictor.add_sample(1.0, 2.0);
//! predictor.add_sample(2.0, 4.0);
//! predictor.add_sample(3.0, 6.0);
//!
//! let prediction = predictor.predict(4.0);
//! assert!(prediction.value.is_finite());
//! assert!(prediction.confidence > 0.0 && prediction.confidence <= 0.95);
//! ```

use std::path::Path;

use crate::error::Result;
use crate::mlp::MlpRegressor;
use crate::neighbors::NeighborRegressor;
use crate::sample::{Sample, SampleArchive, SampleStore};
use crate::spectral::FrequencyAnalyzer;
use crate::stats;

const NETWORK_WEIGHT: f64 = 0.4;
const SPECTRAL_WEIGHT: f64 = 0.3;
const NEIGHBOR_WEIGHT: f64 = 0.3;

/// One component model's contribution to a blended prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelContribution {
    /// Component label: `"network"`, `"least squares"`, `"spectral"`, or
    /// `"neighbors"`.
    pub model: &'static str,
    /// The component's raw estimate.
    pub value: f64,
    /// The blend weight applied to the estimate.
    pub weight: f64,
}

/// Result of one ensemble query.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Blended estimate.
    pub value: f64,
    /// Agreement-derived confidence in `[0, 0.95]`.
    pub confidence: f64,
    /// Label naming the strategies that contributed, or the degenerate
    /// case (`"no data"`, `"single point"`).
    pub method: &'static str,
    /// Per-component breakdown; empty below two samples.
    pub contributions: Vec<ModelContribution>,
}

/// Descriptive summary of the stored samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternAnalysis {
    /// Number of stored samples.
    pub sample_count: usize,
    /// Mean of the observed inputs.
    pub avg_input: f64,
    /// Mean of the observed outputs.
    pub avg_output: f64,
    /// Pearson correlation between inputs and outputs.
    pub correlation: f64,
    /// Dominant frequency of the output sequence; 0.0 below two samples.
    pub dominant_frequency: f64,
}

/// Multi-model predictor over scalar `(input, output)` samples.
#[derive(Debug, Clone, Default)]
pub struct EnsemblePredictor {
    store: SampleStore,
    network: MlpRegressor,
    spectral: FrequencyAnalyzer,
    neighbors: NeighborRegressor,
}

impl EnsemblePredictor {
    /// Creates an empty predictor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the network's random seed for reproducible retraining.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.network = self.network.with_random_state(seed);
        self
    }

    /// Sets the neighbor model's neighborhood size (clamped to at least 1).
    #[must_use]
    pub fn with_neighborhood(mut self, k: usize) -> Self {
        self.neighbors.set_k(k);
        self
    }

    /// Read access to the stored samples.
    #[must_use]
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Number of stored samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.store.len()
    }

    /// True when no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Appends a sample and retrains every component model.
    pub fn add_sample(&mut self, input: f64, output: f64) {
        self.store.add(input, output);
        self.retrain();
    }

    /// Drops all samples and resets every component model.
    pub fn clear(&mut self) {
        self.store.clear();
        self.retrain();
    }

    /// Predicts an output for `input`.
    ///
    /// Zero samples yield exactly `(0, 0)`, one sample echoes that sample's
    /// output at confidence 0.1. With two or more samples the component
    /// estimates are blended 0.4 (network) / 0.3 (spectral) / 0.3
    /// (neighbors); a network that is untrained or produced a non-finite
    /// value is replaced by a least-squares line over all samples.
    #[must_use]
    pub fn predict(&self, input: f64) -> Prediction {
        if self.store.is_empty() {
            return Prediction {
                value: 0.0,
                confidence: 0.0,
                method: "no data",
                contributions: Vec::new(),
            };
        }
        if self.store.len() == 1 {
            return Prediction {
                value: self.store.all()[0].output,
                confidence: 0.1,
                method: "single point",
                contributions: Vec::new(),
            };
        }

        let network_raw = self.network.predict(input);
        let network_usable = self.network.is_trained() && network_raw.is_finite();
        let (network_label, network_value) = if network_usable {
            ("network", network_raw)
        } else {
            ("least squares", linear_fallback(self.store.all(), input))
        };

        let contributions = vec![
            ModelContribution {
                model: network_label,
                value: network_value,
                weight: NETWORK_WEIGHT,
            },
            ModelContribution {
                model: "spectral",
                value: self.spectral.predict(input),
                weight: SPECTRAL_WEIGHT,
            },
            ModelContribution {
                model: "neighbors",
                value: self.neighbors.predict(input).value,
                weight: NEIGHBOR_WEIGHT,
            },
        ];

        let value: f64 = contributions.iter().map(|c| c.value * c.weight).sum();
        let variance: f64 = contributions
            .iter()
            .map(|c| c.weight * (c.value - value).powi(2))
            .sum();
        let spread = variance.sqrt() / (value + 1.0).abs().max(1e-8);
        let confidence = (1.0 - spread).clamp(0.0, 0.95);

        Prediction {
            value,
            confidence,
            method: if network_usable {
                "network+spectral+neighbors"
            } else {
                "least-squares+spectral+neighbors"
            },
            contributions,
        }
    }

    /// Summarizes the stored samples.
    #[must_use]
    pub fn analyze_pattern(&self) -> PatternAnalysis {
        let inputs = self.store.inputs();
        let outputs = self.store.outputs();
        PatternAnalysis {
            sample_count: self.store.len(),
            avg_input: stats::mean(&inputs),
            avg_output: stats::mean(&outputs),
            correlation: stats::pearson(&inputs, &outputs),
            dominant_frequency: self.spectral.dominant_frequency(),
        }
    }

    /// Snapshots the stored samples into a versioned archive.
    #[must_use]
    pub fn export(&self) -> SampleArchive {
        self.store.export()
    }

    /// Replaces the stored samples with the archive's and retrains.
    ///
    /// # Errors
    ///
    /// Returns an error when the archive version is unsupported; the
    /// current samples are kept in that case.
    pub fn import(&mut self, archive: SampleArchive) -> Result<()> {
        self.store.import(archive)?;
        self.retrain();
        Ok(())
    }

    /// Writes the sample archive as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.export().save(path)
    }

    /// Loads a JSON archive from `path`, replacing the stored samples.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O, parse, or version failure; the current
    /// samples are kept in that case.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.import(SampleArchive::load(path)?)
    }

    /// Retrains every component from the current store. Below two samples
    /// the spectral and network models reset instead.
    fn retrain(&mut self) {
        self.neighbors.update(self.store.all());
        if self.store.len() >= 2 {
            let inputs = self.store.inputs();
            let outputs = self.store.outputs();
            self.network.train(&inputs, &outputs);
            self.spectral.analyze(&inputs, &outputs);
        } else {
            self.network.reset();
            self.spectral.reset();
        }
    }
}

/// Least-squares line over all samples, evaluated at `input`. Degrades to
/// the mean output when the normal-equation denominator is singular.
fn linear_fallback(samples: &[Sample], input: f64) -> f64 {
    let n = samples.len() as f64;
    if samples.is_empty() {
        return 0.0;
    }
    let sum_x: f64 = samples.iter().map(|s| s.input).sum();
    let sum_y: f64 = samples.iter().map(|s| s.output).sum();
    let sum_xy: f64 = samples.iter().map(|s| s.input * s.output).sum();
    let sum_xx: f64 = samples.iter().map(|s| s.input.powi(2)).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < 1e-8 {
        return sum_y / n;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    slope * input + intercept
}
