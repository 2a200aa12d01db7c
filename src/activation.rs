//! Activation functions.
//!
//! A layer computes a pre-activation value `z = a_prev · w + b` and then applies
//! an activation function element-wise: `a = activation(z)`.
//!
//! The network caches both `z` and `a`. Backprop evaluates the derivative on
//! the cached pre-activation `z`, never on `a`, so any activation can be
//! plugged in without a "derivative from output" identity.

use std::fmt;

/// An element-wise activation together with its derivative.
///
/// Selected at network construction as a type parameter, so the propagation
/// loops are monomorphised for it.
pub trait Activation: Copy + fmt::Debug {
    /// Short lowercase name, used in summaries.
    fn name(&self) -> &'static str;

    fn forward(&self, z: f64) -> f64;

    /// Derivative with respect to the pre-activation `z`.
    fn derivative(&self, z: f64) -> f64;
}

/// Logistic sigmoid, the default activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sigmoid;

impl Activation for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    #[inline]
    fn forward(&self, z: f64) -> f64 {
        sigmoid(z)
    }

    #[inline]
    fn derivative(&self, z: f64) -> f64 {
        d_sigmoid(z)
    }
}

/// Rectified linear unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relu;

impl Activation for Relu {
    fn name(&self) -> &'static str {
        "relu"
    }

    #[inline]
    fn forward(&self, z: f64) -> f64 {
        relu(z)
    }

    #[inline]
    fn derivative(&self, z: f64) -> f64 {
        d_relu(z)
    }
}

/// `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `sigmoid(x) * (1 - sigmoid(x))`.
#[inline]
pub fn d_sigmoid(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

#[inline]
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Subgradient 0 at the kink.
#[inline]
pub fn d_relu(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_basic_values() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
        assert_relative_eq!(sigmoid(2.0) + sigmoid(-2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn d_sigmoid_peaks_at_zero() {
        assert_eq!(d_sigmoid(0.0), 0.25);
        assert!(d_sigmoid(3.0) < 0.25);
        assert_relative_eq!(d_sigmoid(3.0), d_sigmoid(-3.0), epsilon = 1e-12);
    }

    #[test]
    fn d_sigmoid_matches_central_difference() {
        let h = 1e-5;
        for &z in &[-4.0, -1.0, -0.3, 0.0, 0.7, 2.5] {
            let numeric = (sigmoid(z + h) - sigmoid(z - h)) / (2.0 * h);
            assert_relative_eq!(Sigmoid.derivative(z), numeric, epsilon = 1e-8);
        }
    }

    #[test]
    fn relu_and_its_derivative() {
        assert_eq!(Relu.forward(-2.0), 0.0);
        assert_eq!(Relu.forward(3.0), 3.0);
        assert_eq!(Relu.derivative(-2.0), 0.0);
        assert_eq!(Relu.derivative(0.0), 0.0);
        assert_eq!(Relu.derivative(3.0), 1.0);
    }

    #[test]
    fn names() {
        assert_eq!(Sigmoid.name(), "sigmoid");
        assert_eq!(Relu.name(), "relu");
    }
}
