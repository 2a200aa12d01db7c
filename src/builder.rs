//! Network builder.
//!
//! `NetworkBuilder` is the recommended way to define a network. It makes the
//! structure explicit (input width, hidden stack, output width) and validates
//! every hyperparameter before any buffer is allocated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::{Activation, Sigmoid};
use crate::{Error, Init, Network, NetworkConfig, Result};

#[derive(Debug, Clone)]
/// Builder for a [`Network`].
///
/// Example:
///
/// ```rust
/// use mnist_mlp::NetworkBuilder;
///
/// # fn main() -> mnist_mlp::Result<()> {
/// let net = NetworkBuilder::new(784)
///     .hidden_layers(2, 16)
///     .output_size(10)
///     .batch_size(64)
///     .learning_rate(0.1)
///     .build_with_seed(0)?;
/// assert_eq!(net.num_layers(), 3);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_size: usize,
    hidden_count: usize,
    hidden_size: usize,
    output_size: Option<usize>,
    batch_size: usize,
    lr: f64,
    init: Init,
}

impl NetworkBuilder {
    /// Start building a network that accepts inputs of length `input_size`.
    ///
    /// Defaults: no hidden layers, `batch_size = 1`, `lr = 0.1`, init `[0, 1)`.
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            hidden_count: 0,
            hidden_size: 1,
            output_size: None,
            batch_size: 1,
            lr: 0.1,
            init: Init::default(),
        }
    }

    /// Stack `count` hidden layers, each `width` wide.
    pub fn hidden_layers(mut self, count: usize, width: usize) -> Self {
        self.hidden_count = count;
        self.hidden_size = width;
        self
    }

    pub fn output_size(mut self, n: usize) -> Self {
        self.output_size = Some(n);
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.lr = lr;
        self
    }

    /// Draw initial weights and biases uniformly from `[low, high)`.
    pub fn init_range(mut self, low: f64, high: f64) -> Self {
        self.init = Init::Uniform { low, high };
        self
    }

    pub fn init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Resolve and validate the network shape.
    pub fn config(&self) -> Result<NetworkConfig> {
        let output_size = self
            .output_size
            .ok_or_else(|| Error::InvalidConfig("output_size must be set".to_owned()))?;

        let config = NetworkConfig {
            n_layers: self.hidden_count + 1,
            input_size: self.input_size,
            hidden_size: if self.hidden_count == 0 {
                output_size
            } else {
                self.hidden_size
            },
            output_size,
            batch_size: self.batch_size,
            lr: self.lr,
        };
        config.validate()?;
        self.init.validate()?;
        Ok(config)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build a sigmoid network using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        self.build_with_activation(Sigmoid, rng)
    }

    pub fn build_with_activation<A: Activation, R: Rng + ?Sized>(
        self,
        activation: A,
        rng: &mut R,
    ) -> Result<Network<A>> {
        let config = self.config()?;
        Network::with_activation(config, activation, self.init, rng)
    }
}
