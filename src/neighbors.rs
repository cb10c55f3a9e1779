//! Weighted k-nearest-neighbor regression over recent samples.
//!
//! Each stored sample is scored with a composite relevance weight blending
//! inverse distance, exponential recency decay, and directional similarity.
//! The top-k samples feed three sub-estimates (composite-weighted average,
//! inverse-distance-weighted average, local least-squares fit) that are
//! blended with fixed weights into one value plus a component confidence.
//!
//! # Examples
//!
//! ```
//! use adivinar::neighbors::NeighborRegressor;
//! use adivinar::sample::SampleStore;
//!
//! let mut store = SampleStore::new();
//! store.add(1.0, 2.0);
//! store.add(2.0, 4.0);
//! store.add(3.0, 6.0);
//!
//! let mut knn = NeighborRegressor::new(3);
//! knn.update(store.all());
//! let result = knn.predict(2.5);
//! assert!(result.value.is_finite());
//! assert!(result.confidence > 0.0 && result.confidence <= 0.9);
//! ```

use crate::sample::Sample;

const EPSILON: f64 = 1e-8;

/// Relevance factor weights; always renormalized to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborWeights {
    /// Weight of the inverse-distance factor.
    pub distance: f64,
    /// Weight of the recency-decay factor.
    pub recency: f64,
    /// Weight of the directional-similarity factor.
    pub similarity: f64,
}

impl Default for NeighborWeights {
    fn default() -> Self {
        Self {
            distance: 0.6,
            recency: 0.3,
            similarity: 0.1,
        }
    }
}

impl NeighborWeights {
    /// Scales the three weights so they sum to 1 (no-op on a zero sum).
    #[must_use]
    pub fn normalized(self) -> Self {
        let total = self.distance + self.recency + self.similarity;
        if total <= 0.0 {
            return self;
        }
        Self {
            distance: self.distance / total,
            recency: self.recency / total,
            similarity: self.similarity / total,
        }
    }
}

/// Value and component confidence produced by one neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPrediction {
    /// Blended estimate.
    pub value: f64,
    /// Component confidence in `[0, 0.9]`.
    pub confidence: f64,
}

/// A stored sample scored against one query. Recomputed per query,
/// never persisted.
#[derive(Debug, Clone, Copy)]
struct ScoredNeighbor {
    sample: Sample,
    distance: f64,
    composite_weight: f64,
    recency_weight: f64,
}

/// Weighted k-nearest-neighbor regressor.
#[derive(Debug, Clone)]
pub struct NeighborRegressor {
    k: usize,
    weights: NeighborWeights,
    /// Samples sorted by recency, newest first.
    samples: Vec<Sample>,
}

impl Default for NeighborRegressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl NeighborRegressor {
    /// Creates a regressor with the given neighborhood size (clamped ≥ 1).
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            weights: NeighborWeights::default(),
            samples: Vec::new(),
        }
    }

    /// Sets the neighborhood size, clamped to at least 1.
    pub fn set_k(&mut self, k: usize) {
        self.k = k.max(1);
    }

    /// Current neighborhood size.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Replaces the factor weights, renormalizing them to sum to 1.
    ///
    /// Partial overrides start from [`NeighborRegressor::weights`]:
    ///
    /// ```
    /// use adivinar::neighbors::NeighborRegressor;
    ///
    /// let mut knn = NeighborRegressor::new(3);
    /// let mut w = knn.weights();
    /// w.recency = 0.6;
    /// knn.set_weights(w);
    /// let w = knn.weights();
    /// assert!((w.distance + w.recency + w.similarity - 1.0).abs() < 1e-12);
    /// ```
    pub fn set_weights(&mut self, weights: NeighborWeights) {
        self.weights = weights.normalized();
    }

    /// Current (normalized) factor weights.
    #[must_use]
    pub fn weights(&self) -> NeighborWeights {
        self.weights
    }

    /// Replaces the internal sample copy, sorted newest first.
    pub fn update(&mut self, samples: &[Sample]) {
        self.samples = samples.to_vec();
        self.samples
            .sort_by(|a, b| b.inserted_at_ms.cmp(&a.inserted_at_ms));
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Predicts an output for `input` from the most relevant neighbors.
    ///
    /// Zero samples yield `(0, confidence 0)`; a single sample yields its
    /// output with confidence 0.3.
    #[must_use]
    pub fn predict(&self, input: f64) -> NeighborPrediction {
        self.predict_at(input, current_ms())
    }

    /// `predict` with an explicit evaluation timestamp for the recency
    /// decay. Exposed to keep recency weighting testable.
    #[must_use]
    pub fn predict_at(&self, input: f64, now_ms: u64) -> NeighborPrediction {
        if self.samples.is_empty() {
            return NeighborPrediction {
                value: 0.0,
                confidence: 0.0,
            };
        }
        if self.samples.len() == 1 {
            return NeighborPrediction {
                value: self.samples[0].output,
                confidence: 0.3,
            };
        }

        let neighbors = self.top_k(input, now_ms);

        let weighted = weighted_average(&neighbors);
        let inverse_distance = inverse_distance_average(&neighbors);
        let regression = self.local_regression(&neighbors);
        let value = weighted * 0.4 + inverse_distance * 0.4 + regression * 0.2;

        let n = neighbors.len() as f64;
        let avg_distance = neighbors.iter().map(|c| c.distance).sum::<f64>() / n;
        let avg_recency = neighbors.iter().map(|c| c.recency_weight).sum::<f64>() / n;
        let confidence = (0.7 / (avg_distance + 1.0) + 0.3 * avg_recency).min(0.9);

        NeighborPrediction { value, confidence }
    }

    /// Scores every sample against the query and keeps the top k by
    /// composite weight (clamped to the available count).
    fn top_k(&self, input: f64, now_ms: u64) -> Vec<ScoredNeighbor> {
        let oldest = self
            .samples
            .iter()
            .map(|s| s.inserted_at_ms)
            .min()
            .unwrap_or(now_ms);
        let max_age = now_ms.saturating_sub(oldest) as f64;

        let mut scored: Vec<ScoredNeighbor> = self
            .samples
            .iter()
            .map(|&sample| {
                let distance = (input - sample.input).abs();
                let similarity = directional_similarity(input, sample.input);
                let age = now_ms.saturating_sub(sample.inserted_at_ms) as f64;
                let recency_weight = if max_age == 0.0 {
                    1.0
                } else {
                    (-age / (max_age * 0.5)).exp()
                };
                let composite_weight = (1.0 / (distance + EPSILON)) * self.weights.distance
                    + recency_weight * self.weights.recency
                    + (similarity + 1.0) * self.weights.similarity;
                ScoredNeighbor {
                    sample,
                    distance,
                    composite_weight,
                    recency_weight,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.composite_weight
                .partial_cmp(&a.composite_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(self.k.min(scored.len()));
        scored
    }

    /// Ordinary least-squares line over the neighborhood, evaluated at the
    /// most relevant neighbor's input. Degrades to the weighted average
    /// when the normal-equation denominator is numerically singular.
    fn local_regression(&self, neighbors: &[ScoredNeighbor]) -> f64 {
        if neighbors.len() < 2 {
            return neighbors.first().map_or(0.0, |c| c.sample.output);
        }

        let n = neighbors.len() as f64;
        let sum_x: f64 = neighbors.iter().map(|c| c.sample.input).sum();
        let sum_y: f64 = neighbors.iter().map(|c| c.sample.output).sum();
        let sum_xy: f64 = neighbors
            .iter()
            .map(|c| c.sample.input * c.sample.output)
            .sum();
        let sum_xx: f64 = neighbors.iter().map(|c| c.sample.input.powi(2)).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator.abs() < EPSILON {
            return weighted_average(neighbors);
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        slope * neighbors[0].sample.input + intercept
    }
}

/// Ratio-style similarity of two scalars: +1 same sign, -1 opposite,
/// 0 when either operand is zero.
fn directional_similarity(a: f64, b: f64) -> f64 {
    let magnitude = a.abs() * b.abs();
    if magnitude == 0.0 {
        return 0.0;
    }
    (a * b) / magnitude
}

fn weighted_average(neighbors: &[ScoredNeighbor]) -> f64 {
    average_by(neighbors, |c| c.composite_weight)
}

fn inverse_distance_average(neighbors: &[ScoredNeighbor]) -> f64 {
    average_by(neighbors, |c| 1.0 / (c.distance + EPSILON))
}

/// Weighted mean of neighbor outputs, falling back to the plain mean when
/// all weights vanish.
fn average_by(neighbors: &[ScoredNeighbor], weight: impl Fn(&ScoredNeighbor) -> f64) -> f64 {
    if neighbors.is_empty() {
        return 0.0;
    }
    let total: f64 = neighbors.iter().map(&weight).sum();
    if total == 0.0 {
        return neighbors.iter().map(|c| c.sample.output).sum::<f64>() / neighbors.len() as f64;
    }
    neighbors
        .iter()
        .map(|c| c.sample.output * weight(c))
        .sum::<f64>()
        / total
}

fn current_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(input: f64, output: f64, ts: u64) -> Sample {
        Sample {
            input,
            output,
            inserted_at_ms: ts,
        }
    }

    #[test]
    fn test_empty_store_predicts_zero_with_zero_confidence() {
        let knn = NeighborRegressor::new(3);
        let result = knn.predict(1.0);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_single_sample_returns_its_output() {
        let mut knn = NeighborRegressor::new(3);
        knn.update(&[sample(5.0, 9.0, 100)]);
        let result = knn.predict(42.0);
        assert_eq!(result.value, 9.0);
        assert!((result.confidence - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_k_is_clamped_to_at_least_one() {
        let mut knn = NeighborRegressor::new(0);
        assert_eq!(knn.k(), 1);
        knn.set_k(0);
        assert_eq!(knn.k(), 1);
    }

    #[test]
    fn test_k_beyond_sample_count_does_not_fail() {
        let mut knn = NeighborRegressor::new(50);
        knn.update(&[
            sample(1.0, 2.0, 10),
            sample(2.0, 4.0, 20),
            sample(3.0, 6.0, 30),
        ]);
        let result = knn.predict_at(2.0, 1_000);
        assert!(result.value.is_finite());
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_weights_renormalize_to_unit_sum() {
        let mut knn = NeighborRegressor::new(3);
        knn.set_weights(NeighborWeights {
            distance: 2.0,
            recency: 1.0,
            similarity: 1.0,
        });
        let w = knn.weights();
        assert!((w.distance - 0.5).abs() < 1e-12);
        assert!((w.recency - 0.25).abs() < 1e-12);
        assert!((w.similarity - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_update_sorts_newest_first() {
        let mut knn = NeighborRegressor::new(3);
        knn.update(&[
            sample(1.0, 1.0, 10),
            sample(2.0, 2.0, 30),
            sample(3.0, 3.0, 20),
        ]);
        let stamps: Vec<u64> = knn.samples.iter().map(|s| s.inserted_at_ms).collect();
        assert_eq!(stamps, vec![30, 20, 10]);
    }

    #[test]
    fn test_exact_match_dominates_with_k_one() {
        let mut knn = NeighborRegressor::new(1);
        knn.update(&[
            sample(1.0, 10.0, 100),
            sample(5.0, 50.0, 100),
            sample(9.0, 90.0, 100),
        ]);
        // All timestamps equal, so relevance is driven by distance; the
        // exact match at 5.0 is the whole neighborhood.
        let result = knn.predict_at(5.0, 100);
        assert!((result.value - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_linear_neighborhood_prediction_is_reasonable() {
        let mut knn = NeighborRegressor::new(3);
        knn.update(&[
            sample(1.0, 2.0, 100),
            sample(2.0, 4.0, 100),
            sample(3.0, 6.0, 100),
        ]);
        let result = knn.predict_at(2.0, 100);
        // All sub-estimates sit inside the observed output range.
        assert!(result.value > 2.0 && result.value < 6.0);
        assert!(result.confidence > 0.0 && result.confidence <= 0.9);
    }

    #[test]
    fn test_degenerate_regression_falls_back_to_weighted_average() {
        // Identical inputs make the OLS denominator singular.
        let mut knn = NeighborRegressor::new(3);
        knn.update(&[
            sample(2.0, 3.0, 100),
            sample(2.0, 5.0, 100),
            sample(2.0, 7.0, 100),
        ]);
        let result = knn.predict_at(2.0, 100);
        assert!(result.value.is_finite());
        assert!(result.value >= 3.0 && result.value <= 7.0);
    }

    #[test]
    fn test_recency_weight_is_one_when_all_ages_equal() {
        let mut knn = NeighborRegressor::new(2);
        knn.update(&[sample(1.0, 2.0, 500), sample(2.0, 4.0, 500)]);
        // max_age is 0, so both recency weights are 1 and confidence uses
        // the full 0.3 recency term.
        let result = knn.predict_at(1.5, 500);
        let expected_conf = (0.7_f64 / (0.5 + 1.0) + 0.3).min(0.9);
        assert!((result.confidence - expected_conf).abs() < 1e-9);
    }

    #[test]
    fn test_newer_samples_outweigh_older_at_equal_distance() {
        let mut knn = NeighborRegressor::new(1);
        // Equidistant from the query, but one is much fresher.
        knn.update(&[sample(4.0, 40.0, 0), sample(6.0, 60.0, 10_000)]);
        let result = knn.predict_at(5.0, 10_000);
        assert!((result.value - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        let mut knn = NeighborRegressor::new(3);
        knn.update(&[sample(1.0, 1.0, 100), sample(1.0, 1.0, 100)]);
        let result = knn.predict_at(1.0, 100);
        assert!(result.confidence <= 0.9);
    }

    #[test]
    fn test_directional_similarity() {
        assert_eq!(directional_similarity(2.0, 3.0), 1.0);
        assert_eq!(directional_similarity(-2.0, 3.0), -1.0);
        assert_eq!(directional_similarity(0.0, 3.0), 0.0);
        assert_eq!(directional_similarity(2.0, 0.0), 0.0);
    }
}
