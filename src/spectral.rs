//! Frequency-domain analysis of the output sequence.
//!
//! A brute-force O(n²) discrete Fourier transform over the observed
//! outputs, zero-padded to the next power of two when the sequence length
//! is not one already. The analyzer derives a dominant frequency (DC term
//! and mirrored upper half excluded) and extrapolates a query input with a
//! fixed blend of three strategies: sinusoidal projection, piecewise-linear
//! interpolation, and a phase-based cosine estimate.
//!
//! This module is fully deterministic: the same samples always produce the
//! same spectrum and the same prediction.
//!
//! # Examples
//!
//! ```
//! use adivinar::spectral::FrequencyAnalyzer;
//!
//! let inputs: Vec<f64> = (0..8).map(f64::from).collect();
//! let outputs: Vec<f64> = inputs.iter().map(|x| (x * std::f64::consts::FRAC_PI_2).sin()).collect();
//!
//! let mut analyzer = FrequencyAnalyzer::new();
//! analyzer.analyze(&inputs, &outputs);
//! assert!(analyzer.is_analyzed());
//! assert!(analyzer.predict(4.0).is_finite());
//! ```

use std::f64::consts::PI;

const EPSILON: f64 = 1e-8;

/// Spectral decomposition of an output sequence.
///
/// The three vectors are index-aligned (`amplitudes[i]` and `phases[i]`
/// belong to `frequencies[i]`); the whole value is recomputed wholesale on
/// every analysis so partial updates can never break the alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Frequency of each bin, cycles per sample (`k / N`).
    pub frequencies: Vec<f64>,
    /// Normalized amplitude of each bin (`|X_k| / N`).
    pub amplitudes: Vec<f64>,
    /// Phase of each bin in radians.
    pub phases: Vec<f64>,
    /// Frequency of the strongest non-DC bin in the lower half-spectrum.
    pub dominant_frequency: f64,
}

/// Frequency-domain extrapolator over `(input, output)` samples.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalyzer {
    spectrum: Option<Spectrum>,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

impl FrequencyAnalyzer {
    /// Creates an analyzer with no spectral state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the spectrum from scratch for the given series.
    ///
    /// Requires `inputs.len() == outputs.len() >= 2`; anything else resets
    /// the analyzer to the unanalyzed state. The output sequence is
    /// zero-padded to the next power of two before transforming, so the
    /// spectrum length may exceed `outputs.len()`.
    pub fn analyze(&mut self, inputs: &[f64], outputs: &[f64]) {
        if inputs.len() != outputs.len() || inputs.len() < 2 {
            self.reset();
            return;
        }

        self.inputs = inputs.to_vec();
        self.outputs = outputs.to_vec();

        let mut signal = outputs.to_vec();
        signal.resize(outputs.len().next_power_of_two(), 0.0);

        self.spectrum = Some(dft(&signal));
    }

    /// Drops all spectral state.
    pub fn reset(&mut self) {
        self.spectrum = None;
        self.inputs.clear();
        self.outputs.clear();
    }

    /// True once `analyze` has succeeded since the last reset.
    #[must_use]
    pub fn is_analyzed(&self) -> bool {
        self.spectrum.is_some()
    }

    /// The current spectrum, if analyzed.
    #[must_use]
    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.spectrum.as_ref()
    }

    /// Dominant frequency of the last analysis; 0.0 when unanalyzed.
    #[must_use]
    pub fn dominant_frequency(&self) -> f64 {
        self.spectrum
            .as_ref()
            .map_or(0.0, |s| s.dominant_frequency)
    }

    /// Extrapolates an output for `input`.
    ///
    /// Blends the sinusoidal, interpolation, and phase sub-estimates with
    /// fixed weights 0.4 / 0.4 / 0.2. Returns 0.0 before a successful
    /// `analyze`.
    #[must_use]
    pub fn predict(&self, input: f64) -> f64 {
        let Some(spectrum) = &self.spectrum else {
            return 0.0;
        };
        if self.inputs.is_empty() {
            return 0.0;
        }

        let sine = self.predict_sinusoidal(spectrum, input);
        let interpolated = self.predict_interpolated(input);
        let phase = self.predict_phase(spectrum, input);

        sine * 0.4 + interpolated * 0.4 + phase * 0.2
    }

    /// Maps `input` linearly onto `[0, 1]` using the observed input range.
    fn normalized_input(&self, input: f64) -> f64 {
        let min = self.inputs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .inputs
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        (input - min) / (max - min + EPSILON)
    }

    /// Projects the dominant frequency as a sine wave around the mean output.
    fn predict_sinusoidal(&self, spectrum: &Spectrum, input: f64) -> f64 {
        let mean_output = crate::stats::mean(&self.outputs);
        let half = spectrum.amplitudes.len() / 2;
        let max_amplitude = spectrum.amplitudes[1..half.max(1)]
            .iter()
            .copied()
            .fold(0.0, f64::max);
        let t = self.normalized_input(input);
        mean_output + max_amplitude * (2.0 * PI * spectrum.dominant_frequency * t).sin()
    }

    /// Piecewise-linear interpolation around the closest observed input,
    /// extrapolating from the nearest edge pair outside the observed range.
    fn predict_interpolated(&self, input: f64) -> f64 {
        let xs = &self.inputs;
        let ys = &self.outputs;
        if xs.len() < 2 {
            return 0.0;
        }

        let mut closest = 0;
        let mut min_distance = (input - xs[0]).abs();
        for (i, &x) in xs.iter().enumerate().skip(1) {
            let distance = (input - x).abs();
            if distance < min_distance {
                min_distance = distance;
                closest = i;
            }
        }

        let segment = |i: usize, j: usize, anchor: usize| -> f64 {
            let dx = xs[j] - xs[i];
            if dx.abs() < EPSILON {
                // Duplicate abscissae; the nearest output is the best guess.
                return ys[closest];
            }
            let slope = (ys[j] - ys[i]) / dx;
            ys[anchor] + slope * (input - xs[anchor])
        };

        if closest == 0 {
            segment(0, 1, 0)
        } else if closest == xs.len() - 1 {
            segment(closest - 1, closest, closest)
        } else {
            let prev = closest - 1;
            let next = closest + 1;
            let dx = xs[next] - xs[prev];
            if dx.abs() < EPSILON {
                return ys[closest];
            }
            let t = (input - xs[prev]) / dx;
            ys[prev] + t * (ys[next] - ys[prev])
        }
    }

    /// Cosine estimate from the mean phase and half the peak amplitude.
    fn predict_phase(&self, spectrum: &Spectrum, input: f64) -> f64 {
        let mean_output = crate::stats::mean(&self.outputs);
        let mean_phase = crate::stats::mean(&spectrum.phases);
        let amplitude = 0.5
            * spectrum
                .amplitudes
                .iter()
                .copied()
                .fold(0.0, f64::max);
        let t = self.normalized_input(input);
        mean_output + amplitude * (mean_phase + 2.0 * PI * t).cos()
    }
}

/// Brute-force discrete Fourier transform with normalized amplitudes.
fn dft(signal: &[f64]) -> Spectrum {
    let n = signal.len();
    let mut frequencies = Vec::with_capacity(n);
    let mut amplitudes = Vec::with_capacity(n);
    let mut phases = Vec::with_capacity(n);

    for k in 0..n {
        let mut real = 0.0;
        let mut imag = 0.0;
        for (i, &s) in signal.iter().enumerate() {
            let angle = -2.0 * PI * (k as f64) * (i as f64) / n as f64;
            real += s * angle.cos();
            imag += s * angle.sin();
        }
        frequencies.push(k as f64 / n as f64);
        amplitudes.push((real * real + imag * imag).sqrt() / n as f64);
        phases.push(imag.atan2(real));
    }

    // Strongest bin below the Nyquist mirror, DC excluded.
    let mut dominant_index = 0;
    let mut max_amplitude = 0.0;
    for i in 1..n / 2 {
        if amplitudes[i] > max_amplitude {
            max_amplitude = amplitudes[i];
            dominant_index = i;
        }
    }

    let dominant_frequency = frequencies[dominant_index];
    Spectrum {
        frequencies,
        amplitudes,
        phases,
        dominant_frequency,
    }
}
