use rand::Rng;

use crate::activation::Activation;
use crate::matrix::{self, Matrix, Transpose};
use crate::{Error, Result};

/// Parameter initialisation scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// Weights and biases drawn uniformly from `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// All parameters zero.
    Zeros,
}

impl Default for Init {
    fn default() -> Self {
        Init::Uniform {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl Init {
    pub fn validate(self) -> Result<()> {
        match self {
            Init::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(Error::InvalidConfig(format!(
                        "init range must be finite with low < high, got [{low}, {high})"
                    )));
                }
                Ok(())
            }
            Init::Zeros => Ok(()),
        }
    }
}

/// One stage of the network: parameters, activation caches, error term and
/// batch gradient accumulators.
///
/// Every matrix is a row vector except `w` / `grad_w`:
/// - `w`, `grad_w`: `(in_dim, out_dim)`
/// - `b`, `z`, `a`, `delta`, `grad_b`: `(1, out_dim)`
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) w: Matrix,
    pub(crate) b: Matrix,
    pub(crate) z: Matrix,
    pub(crate) a: Matrix,
    pub(crate) delta: Matrix,
    pub(crate) grad_w: Matrix,
    pub(crate) grad_b: Matrix,
}

impl Layer {
    /// Layer with every buffer zeroed.
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        Self {
            w: Matrix::new(in_dim, out_dim),
            b: Matrix::new(1, out_dim),
            z: Matrix::new(1, out_dim),
            a: Matrix::new(1, out_dim),
            delta: Matrix::new(1, out_dim),
            grad_w: Matrix::new(in_dim, out_dim),
            grad_b: Matrix::new(1, out_dim),
        }
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        out_dim: usize,
        init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        init.validate()?;

        let mut layer = Self::new(in_dim, out_dim);
        if let Init::Uniform { low, high } = init {
            layer.w.fill_uniform(rng, low, high);
            layer.b.fill_uniform(rng, low, high);
        }
        Ok(layer)
    }

    /// Build a layer around existing parameters; caches and gradients start at zero.
    pub fn from_parts(w: Matrix, b: Matrix) -> Result<Self> {
        if b.shape() != (1, w.n_col()) {
            return Err(Error::InvalidShape(format!(
                "bias shape {:?} does not match weights {:?} (expected (1, {}))",
                b.shape(),
                w.shape(),
                w.n_col()
            )));
        }

        let (in_dim, out_dim) = w.shape();
        Ok(Self {
            z: Matrix::try_new(1, out_dim)?,
            a: Matrix::try_new(1, out_dim)?,
            delta: Matrix::try_new(1, out_dim)?,
            grad_w: Matrix::try_new(in_dim, out_dim)?,
            grad_b: Matrix::try_new(1, out_dim)?,
            w,
            b,
        })
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.w.n_row()
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.w.n_col()
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.w
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.w
    }

    #[inline]
    pub fn biases(&self) -> &Matrix {
        &self.b
    }

    #[inline]
    pub fn biases_mut(&mut self) -> &mut Matrix {
        &mut self.b
    }

    /// Pre-activation cache `z` from the last forward pass.
    #[inline]
    pub fn pre_activation(&self) -> &Matrix {
        &self.z
    }

    /// Post-activation cache `a` from the last forward pass.
    #[inline]
    pub fn activation(&self) -> &Matrix {
        &self.a
    }

    /// Error term from the last backward pass.
    #[inline]
    pub fn delta(&self) -> &Matrix {
        &self.delta
    }

    #[inline]
    pub fn grad_weights(&self) -> &Matrix {
        &self.grad_w
    }

    #[inline]
    pub fn grad_biases(&self) -> &Matrix {
        &self.grad_b
    }

    /// Number of trainable parameters (weights + biases).
    pub fn parameter_count(&self) -> usize {
        self.w.size() + self.b.size()
    }

    /// `z = input · w + b`, `a = activation(z)`.
    #[inline]
    pub(crate) fn forward<A: Activation>(&mut self, input: &Matrix, activation: A) {
        matrix::multiply(input, &self.w, &mut self.z);
        self.z.add_assign(&self.b);
        matrix::apply_into(&self.z, |z| activation.forward(z), &mut self.a);
    }

    /// `grad_w += inputᵀ · delta`, `grad_b += delta`.
    #[inline]
    pub(crate) fn accumulate(&mut self, input: &Matrix) {
        matrix::gemm(
            1.0,
            input,
            Transpose::Yes,
            &self.delta,
            Transpose::No,
            1.0,
            &mut self.grad_w,
        );
        self.grad_b.add_assign(&self.delta);
    }

    /// `w -= lr * grad_w`, `b -= lr * grad_b`, then clear the accumulators.
    #[inline]
    pub(crate) fn apply_gradients(&mut self, lr: f64) {
        self.w.scaled_add_assign(-lr, &self.grad_w);
        self.b.scaled_add_assign(-lr, &self.grad_b);
        self.reset_gradients();
    }

    #[inline]
    pub fn reset_gradients(&mut self) {
        self.grad_w.reset();
        self.grad_b.reset();
    }
}
