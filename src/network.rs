use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::{Activation, Sigmoid};
use crate::matrix::{self, Matrix, Transpose};
use crate::{Error, Init, Layer, Result};

/// Shape and training hyperparameters of a [`Network`].
///
/// `n_layers` counts non-input layers: `n_layers - 1` hidden layers of width
/// `hidden_size` followed by an output layer of width `output_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    pub n_layers: usize,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub batch_size: usize,
    pub lr: f64,
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_layers == 0 {
            return Err(Error::InvalidConfig("n_layers must be > 0".to_owned()));
        }
        if self.input_size == 0 || self.hidden_size == 0 || self.output_size == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer sizes must be > 0, got input={} hidden={} output={}",
                self.input_size, self.hidden_size, self.output_size
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        Ok(())
    }

    /// `(prev_layer_size, this_layer_size)` for layer `l`.
    #[inline]
    pub fn layer_dims(&self, l: usize) -> (usize, usize) {
        let prev = if l == 0 {
            self.input_size
        } else {
            self.hidden_size
        };
        let this = if l + 1 == self.n_layers {
            self.output_size
        } else {
            self.hidden_size
        };
        (prev, this)
    }
}

/// A fully connected feed-forward network trained with mini-batch SGD.
///
/// All buffers (parameters, activation caches, deltas, gradient accumulators,
/// the current input `x` and target `y`) are allocated at construction. The
/// training cycle only overwrites them:
///
/// 1. [`Network::set_input`] / [`Network::set_target`]
/// 2. [`Network::forward`]
/// 3. [`Network::backward`]
/// 4. [`Network::accumulate_gradients`]
/// 5. after the batch, [`Network::update`]
#[derive(Debug, Clone)]
pub struct Network<A: Activation = Sigmoid> {
    config: NetworkConfig,
    layers: Vec<Layer>,
    x: Matrix,
    y: Matrix,
    activation: A,
}

impl Network<Sigmoid> {
    pub fn new_with_seed(config: NetworkConfig, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(config, &mut rng)
    }

    /// Sigmoid network with parameters drawn uniformly from `[0, 1)`.
    pub fn new_with_rng<R: Rng + ?Sized>(config: NetworkConfig, rng: &mut R) -> Result<Self> {
        Self::with_activation(config, Sigmoid, Init::default(), rng)
    }

    /// Sigmoid network with every parameter zero.
    pub fn zeroed(config: NetworkConfig) -> Result<Self> {
        Self::zeroed_with_activation(config, Sigmoid)
    }
}

impl<A: Activation> Network<A> {
    pub fn with_activation<R: Rng + ?Sized>(
        config: NetworkConfig,
        activation: A,
        init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        init.validate()?;

        let mut layers = Vec::with_capacity(config.n_layers);
        for l in 0..config.n_layers {
            let (prev, this) = config.layer_dims(l);
            layers.push(Layer::new_with_rng(prev, this, init, rng)?);
        }

        Self::from_layers(config, layers, activation)
    }

    pub fn zeroed_with_activation(config: NetworkConfig, activation: A) -> Result<Self> {
        config.validate()?;

        let layers = (0..config.n_layers)
            .map(|l| {
                let (prev, this) = config.layer_dims(l);
                Layer::new(prev, this)
            })
            .collect();

        Self::from_layers(config, layers, activation)
    }

    /// Assemble a network around already-built layers.
    pub(crate) fn from_layers(
        config: NetworkConfig,
        layers: Vec<Layer>,
        activation: A,
    ) -> Result<Self> {
        debug_assert_eq!(layers.len(), config.n_layers);
        Ok(Self {
            x: Matrix::try_new(1, config.input_size)?,
            y: Matrix::try_new(1, config.output_size)?,
            config,
            layers,
            activation,
        })
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.config.lr
    }

    #[inline]
    pub fn activation(&self) -> A {
        self.activation
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[inline]
    pub fn layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.layers.get_mut(idx)
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Copy a sample into the input buffer `x`.
    ///
    /// Panics if `input.len() != input_size`.
    pub fn set_input(&mut self, input: &[f64]) {
        assert_eq!(
            input.len(),
            self.config.input_size,
            "input len {} does not match network input_size {}",
            input.len(),
            self.config.input_size
        );
        self.x.copy_from_slice(input);
    }

    /// Copy an expected output into the target buffer `y`.
    ///
    /// Panics if `target.len() != output_size`.
    pub fn set_target(&mut self, target: &[f64]) {
        assert_eq!(
            target.len(),
            self.config.output_size,
            "target len {} does not match network output_size {}",
            target.len(),
            self.config.output_size
        );
        self.y.copy_from_slice(target);
    }

    #[inline]
    pub fn input(&self) -> &Matrix {
        &self.x
    }

    #[inline]
    pub fn target(&self) -> &Matrix {
        &self.y
    }

    /// Output activations `a[L-1]` of the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        match self.layers.last() {
            Some(layer) => layer.a.as_slice(),
            None => &[],
        }
    }

    /// Forward pass on the current input `x`.
    ///
    /// `z[0] = x·w[0] + b[0]`, `z[l] = a[l-1]·w[l] + b[l]`, `a[l] = σ(z[l])`.
    pub fn forward(&mut self) {
        let activation = self.activation;
        for idx in 0..self.layers.len() {
            // Borrow the previous layer immutably and the current one mutably.
            let (left, right) = self.layers.split_at_mut(idx);
            let input = if idx == 0 { &self.x } else { &left[idx - 1].a };
            right[0].forward(input, activation);
        }
    }

    /// Backward pass against the current target `y`.
    ///
    /// You must call `forward` first on the same sample.
    ///
    /// - output: `delta[L-1] = (a[L-1] - y) ⊙ σ'(z[L-1])`
    /// - hidden: `delta[l] = (delta[l+1] · w[l+1]ᵀ) ⊙ σ'(z[l])`
    pub fn backward(&mut self) {
        let activation = self.activation;
        let last = self.layers.len() - 1;

        let out = &mut self.layers[last];
        matrix::subtract(&out.a, &self.y, &mut out.delta);
        out.delta.hadamard_apply(&out.z, |z| activation.derivative(z));

        for idx in (0..last).rev() {
            let (left, right) = self.layers.split_at_mut(idx + 1);
            let cur = &mut left[idx];
            let next = &right[0];
            matrix::gemm(
                1.0,
                &next.delta,
                Transpose::No,
                &next.w,
                Transpose::Yes,
                0.0,
                &mut cur.delta,
            );
            cur.delta.hadamard_apply(&cur.z, |z| activation.derivative(z));
        }
    }

    /// Add this sample's gradients to the batch accumulators.
    ///
    /// `grad_w[l] += a[l-1]ᵀ · delta[l]` (with `x` for `l = 0`), `grad_b[l] += delta[l]`.
    pub fn accumulate_gradients(&mut self) {
        for idx in 0..self.layers.len() {
            let (left, right) = self.layers.split_at_mut(idx);
            let input = if idx == 0 { &self.x } else { &left[idx - 1].a };
            right[0].accumulate(input);
        }
    }

    /// Forward, backward and accumulate for one sample.
    pub fn accumulate_sample(&mut self, input: &[f64], target: &[f64]) {
        self.set_input(input);
        self.set_target(target);
        self.forward();
        self.backward();
        self.accumulate_gradients();
    }

    /// Apply the accumulated gradients of a full batch (`lr / batch_size`) and
    /// clear the accumulators.
    pub fn update(&mut self) {
        self.update_with_batch_len(self.config.batch_size);
    }

    /// Apply accumulated gradients averaged over `batch_len` samples and clear
    /// the accumulators.
    pub fn update_with_batch_len(&mut self, batch_len: usize) {
        assert!(batch_len > 0, "batch_len must be > 0");
        let effective_lr = self.config.lr / batch_len as f64;
        for layer in &mut self.layers {
            layer.apply_gradients(effective_lr);
        }
    }

    pub fn reset_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.reset_gradients();
        }
    }

    /// Forward pass on `input`, returning the output activations.
    pub fn predict(&mut self, input: &[f64]) -> &[f64] {
        self.set_input(input);
        self.forward();
        self.output()
    }

    /// `Σ (a[L-1] - y)²` for the current forward pass and target.
    pub fn squared_error(&self) -> f64 {
        crate::loss::squared_error(self.output(), self.y.as_slice())
    }
}

impl<A: Activation> fmt::Display for Network<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network ({})", self.activation.name())?;
        write!(f, " {}", self.config.input_size)?;
        for layer in &self.layers {
            write!(f, " -> {}", layer.out_dim())?;
        }
        writeln!(f)?;
        for (idx, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "  layer {idx}: w {}x{}, b 1x{}",
                layer.in_dim(),
                layer.out_dim(),
                layer.out_dim()
            )?;
        }
        writeln!(f, "  parameters: {}", self.parameter_count())?;
        write!(
            f,
            "  batch_size: {}, lr: {}",
            self.config.batch_size, self.config.lr
        )
    }
}
