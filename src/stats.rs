//! Descriptive statistics helpers shared by the predictor components.
//!
//! Population statistics over `f64` slices. Degenerate inputs (empty
//! slices, zero variance) return 0.0 rather than NaN so callers never
//! have to guard against non-finite intermediates.

/// Arithmetic mean; 0.0 for an empty slice.
#[must_use]
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice.
#[must_use]
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Pearson correlation coefficient between two equal-length series.
///
/// Returns 0.0 when the lengths differ, fewer than two points are given,
/// or either series has zero variance.
///
/// # Examples
///
/// ```
/// use adivinar::stats::pearson;
///
/// let x = [1.0, 2.0, 3.0];
/// let y = [2.0, 4.0, 6.0];
/// assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    let numerator: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mx) * (b - my))
        .sum();
    let denom_x: f64 = x.iter().map(|a| (a - mx).powi(2)).sum::<f64>().sqrt();
    let denom_y: f64 = y.iter().map(|b| (b - my).powi(2)).sum::<f64>().sqrt();
    let denom = denom_x * denom_y;
    if denom == 0.0 {
        return 0.0;
    }
    numerator / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_constant_is_zero() {
        assert_eq!(std_dev(&[5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_std_dev_population() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&data) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_hand_computed_fixture() {
        // x = [1, 2, 3, 5], y = [1, 3, 2, 6]
        // mx = 2.75, my = 3.0
        // num = (-1.75)(-2) + (-0.75)(0) + (0.25)(-1) + (2.25)(3) = 10.0
        // denom_x = sqrt(3.0625 + 0.5625 + 0.0625 + 5.0625) = sqrt(8.75)
        // denom_y = sqrt(4 + 0 + 1 + 9) = sqrt(14)
        let x = [1.0, 2.0, 3.0, 5.0];
        let y = [1.0, 3.0, 2.0, 6.0];
        let expected = 10.0 / (8.75_f64.sqrt() * 14.0_f64.sqrt());
        assert!((pearson(&x, &y) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_degenerate_cases() {
        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[3.0]), 0.0);
        // Zero variance in one series.
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
