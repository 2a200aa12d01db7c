//! Squared-error loss helpers.
//!
//! Backprop seeds the output delta with `a - y`, which is the gradient of
//! `½ Σ (a - y)²`. These helpers report that loss family for training and
//! evaluation; they do not take part in the gradient computation.

/// `Σ (pred - target)²`.
///
/// Shape contract: `pred.len() == target.len()`.
#[inline]
pub fn squared_error(pred: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    let mut sum_sq = 0.0_f64;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum_sq = diff.mul_add(diff, sum_sq);
    }
    sum_sq
}

/// `mean((pred - target)²)` over the output components.
#[inline]
pub fn mse(pred: &[f64], target: &[f64]) -> f64 {
    if pred.is_empty() {
        return 0.0;
    }
    squared_error(pred, target) / pred.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn zero_when_equal() {
        let pred = [1.0, -2.0, 0.5];
        assert_eq!(squared_error(&pred, &pred), 0.0);
        assert_eq!(mse(&pred, &pred), 0.0);
    }

    #[test]
    fn sums_and_averages_squares() {
        let pred = [1.0, 3.0];
        let target = [2.0, 1.0];
        assert_relative_eq!(squared_error(&pred, &target), 5.0);
        assert_relative_eq!(mse(&pred, &target), 2.5);
    }

    #[test]
    #[should_panic(expected = "does not match target len")]
    fn panics_on_length_mismatch() {
        squared_error(&[0.0], &[0.0, 1.0]);
    }
}
