//! Trainable feed-forward regressor, retrained from scratch on demand.
//!
//! A small multi-layer perceptron treated as a trainable piecewise
//! function, not a production ML system. Weights are Xavier-initialized,
//! training is per-sample gradient descent with momentum, learning-rate
//! decay, dropout on hidden layers, and early stopping; inputs and outputs
//! are standardized before training and de-normalized on prediction.
//!
//! Randomness (initialization, shuffling, dropout) comes from an
//! injectable seed so training runs are reproducible:
//!
//! ```
//! use adivinar::mlp::MlpRegressor;
//!
//! let inputs = [1.0, 2.0, 3.0, 4.0];
//! let outputs = [5.0, 5.0, 5.0, 5.0];
//!
//! let mut model = MlpRegressor::new().with_random_state(42);
//! model.train(&inputs, &outputs);
//! assert!(model.is_trained());
//! // Constant outputs de-normalize back to the constant.
//! assert!((model.predict(2.5) - 5.0).abs() < 1e-9);
//! ```

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::stats::{mean, std_dev};

const STD_GUARD: f64 = 1e-8;
const LEAKY_ALPHA: f64 = 0.01;

/// One dense layer: flat row-major weights plus biases.
///
/// Shapes are fixed at initialization; `weights.len()` is always
/// `fan_out * fan_in` and `biases.len()` is `fan_out`.
#[derive(Debug, Clone)]
struct Layer {
    fan_in: usize,
    fan_out: usize,
    /// Row-major: `weights[j * fan_in + i]` connects input i to neuron j.
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    fn init(fan_in: usize, fan_out: usize, rng: &mut StdRng) -> Self {
        // Xavier-style bounded uniform scaled to fan-in/fan-out.
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let weights = (0..fan_in * fan_out)
            .map(|_| rng.gen_range(-limit..=limit))
            .collect();
        let biases = (0..fan_out).map(|_| rng.gen_range(-0.1..=0.1)).collect();
        Self {
            fan_in,
            fan_out,
            weights,
            biases,
        }
    }

    fn weight(&self, neuron: usize, input: usize) -> f64 {
        self.weights[neuron * self.fan_in + input]
    }
}

/// Standardization statistics captured at training time.
#[derive(Debug, Clone, Copy)]
struct Normalization {
    input_mean: f64,
    input_std: f64,
    output_mean: f64,
    output_std: f64,
}

/// Complete trained state, replaced wholesale on every retrain so stale
/// normalization statistics can never pair with newer weights.
#[derive(Debug, Clone)]
struct NetworkState {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
    normalization: Normalization,
}

/// Feed-forward regressor over scalar `(input, output)` pairs.
#[derive(Debug, Clone)]
pub struct MlpRegressor {
    hidden_layers: Vec<usize>,
    learning_rate: f64,
    momentum: f64,
    max_epochs: usize,
    target_mse: f64,
    dropout: f64,
    seed: Option<u64>,
    state: Option<NetworkState>,
}

impl Default for MlpRegressor {
    fn default() -> Self {
        Self {
            hidden_layers: vec![32, 16, 8],
            learning_rate: 0.01,
            momentum: 0.9,
            max_epochs: 1000,
            target_mse: 1e-3,
            dropout: 0.2,
            seed: None,
            state: None,
        }
    }
}

impl MlpRegressor {
    /// Creates a regressor with the default architecture (1-32-16-8-1).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hidden layer sizes between the single input and output unit.
    #[must_use]
    pub fn with_hidden_layers(mut self, hidden_layers: Vec<usize>) -> Self {
        self.hidden_layers = hidden_layers;
        self
    }

    /// Sets the initial learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Caps the number of training epochs.
    #[must_use]
    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Fixes the random seed for reproducible initialization, shuffling,
    /// and dropout.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// True once `train` has produced a usable state.
    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Drops any trained state; `predict` returns 0.0 again.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Layer sizes including the input and output units. Reports the
    /// trained network's sizes once trained, the configured ones before.
    #[must_use]
    pub fn layer_sizes(&self) -> Vec<usize> {
        if let Some(state) = &self.state {
            return state.layer_sizes.clone();
        }
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(1);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(1);
        sizes
    }

    /// Total number of weights and biases in the trained network; 0 when
    /// untrained.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.state.as_ref().map_or(0, |state| {
            state
                .layers
                .iter()
                .map(|l| l.weights.len() + l.biases.len())
                .sum()
        })
    }

    /// Retrains the network from scratch on the given series.
    ///
    /// A no-op when the lengths differ or the series are empty; any
    /// previously trained state is kept in that case.
    pub fn train(&mut self, inputs: &[f64], outputs: &[f64]) {
        if inputs.len() != outputs.len() || inputs.is_empty() {
            return;
        }

        let normalization = Normalization {
            input_mean: mean(inputs),
            input_std: std_dev(inputs),
            output_mean: mean(outputs),
            output_std: std_dev(outputs),
        };
        let normalized_inputs: Vec<f64> = inputs
            .iter()
            .map(|x| (x - normalization.input_mean) / (normalization.input_std + STD_GUARD))
            .collect();
        let normalized_outputs: Vec<f64> = outputs
            .iter()
            .map(|y| (y - normalization.output_mean) / (normalization.output_std + STD_GUARD))
            .collect();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let layer_sizes = self.layer_sizes();
        let mut layers: Vec<Layer> = layer_sizes
            .windows(2)
            .map(|pair| Layer::init(pair[0], pair[1], &mut rng))
            .collect();
        let mut previous_deltas: Vec<Vec<f64>> =
            layers.iter().map(|l| vec![0.0; l.weights.len()]).collect();

        let mut learning_rate = self.learning_rate;
        let mut order: Vec<usize> = (0..normalized_inputs.len()).collect();

        for epoch in 0..self.max_epochs {
            order.shuffle(&mut rng);
            let mut total_error = 0.0;

            for &idx in &order {
                let activations =
                    forward(&layers, normalized_inputs[idx], Some((&mut rng, self.dropout)));
                let output = activations[layers.len()][0];
                let target = normalized_outputs[idx];
                total_error += (target - output).powi(2);

                backward(
                    &mut layers,
                    &mut previous_deltas,
                    &activations,
                    target,
                    output,
                    learning_rate,
                    self.momentum,
                );
            }

            if epoch % 100 == 0 {
                learning_rate *= 0.95;
            }
            if total_error / (normalized_inputs.len() as f64) < self.target_mse {
                break;
            }
        }

        self.state = Some(NetworkState {
            layer_sizes,
            layers,
            normalization,
        });
    }

    /// Predicts an output for `input`; 0.0 when untrained.
    #[must_use]
    pub fn predict(&self, input: f64) -> f64 {
        let Some(state) = &self.state else {
            return 0.0;
        };
        let norm = state.normalization;
        let normalized = (input - norm.input_mean) / (norm.input_std + STD_GUARD);
        let activations = forward(&state.layers, normalized, None);
        let output = activations[state.layers.len()][0];
        output * norm.output_std + norm.output_mean
    }
}

/// Forward pass recording every layer's activations. The first hidden
/// layer rectifies, middle layers are leaky, the output layer is linear;
/// dropout applies to non-final layers during training only.
fn forward(layers: &[Layer], input: f64, mut dropout: Option<(&mut StdRng, f64)>) -> Vec<Vec<f64>> {
    let mut activations = Vec::with_capacity(layers.len() + 1);
    activations.push(vec![input]);

    for (index, layer) in layers.iter().enumerate() {
        let current = &activations[index];
        let last = index == layers.len() - 1;
        let mut next = Vec::with_capacity(layer.fan_out);

        for neuron in 0..layer.fan_out {
            let mut sum = layer.biases[neuron];
            for (i, &value) in current.iter().enumerate() {
                sum += value * layer.weight(neuron, i);
            }
            let mut value = if last {
                sum
            } else if index == 0 {
                sum.max(0.0)
            } else if sum > 0.0 {
                sum
            } else {
                LEAKY_ALPHA * sum
            };

            if !last {
                if let Some((rng, rate)) = dropout.as_mut() {
                    if rng.gen::<f64>() < *rate {
                        value = 0.0;
                    } else {
                        value /= 1.0 - *rate;
                    }
                }
            }
            next.push(value);
        }
        activations.push(next);
    }

    activations
}

/// Backpropagates the output error through the layers and applies
/// momentum-smoothed weight updates.
fn backward(
    layers: &mut [Layer],
    previous_deltas: &mut [Vec<f64>],
    activations: &[Vec<f64>],
    target: f64,
    output: f64,
    learning_rate: f64,
    momentum: f64,
) {
    let depth = layers.len();
    let mut errors: Vec<Vec<f64>> = vec![Vec::new(); depth];
    errors[depth - 1] = vec![target - output];

    for layer in (0..depth - 1).rev() {
        let next = &layers[layer + 1];
        let next_errors = &errors[layer + 1];
        let mut layer_errors = Vec::with_capacity(layers[layer].fan_out);
        for neuron in 0..layers[layer].fan_out {
            let mut error = 0.0;
            for (k, &next_error) in next_errors.iter().enumerate() {
                error += next_error * next.weight(k, neuron);
            }
            layer_errors.push(error);
        }
        errors[layer] = layer_errors;
    }

    for (layer_index, layer) in layers.iter_mut().enumerate() {
        let layer_input = &activations[layer_index];
        let deltas = &mut previous_deltas[layer_index];
        for neuron in 0..layer.fan_out {
            let error = errors[layer_index][neuron];
            layer.biases[neuron] += learning_rate * error;
            for (i, &activation) in layer_input.iter().enumerate() {
                let slot = neuron * layer.fan_in + i;
                let delta = learning_rate * error * activation + momentum * deltas[slot];
                layer.weights[slot] += delta;
                deltas[slot] = delta;
            }
        }
    }
}
