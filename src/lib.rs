//! A from-scratch multi-layer perceptron trained on MNIST.
//!
//! `mnist-mlp` implements a dense feed-forward network on top of a small
//! column-major `f64` matrix library, trained by mini-batch stochastic gradient
//! descent with backpropagation. It also reads the MNIST IDX format and stores
//! trained networks in a compact binary checkpoint.
//!
//! # Design goals
//!
//! - Predictable performance: every per-layer buffer (`z`, `a`, `delta`,
//!   gradient accumulators) is allocated once; training reuses them.
//! - Clear contracts: shapes are explicit and validated at the API boundary.
//! - Reproducibility: randomness is injected as `R: rand::Rng`.
//!
//! # Panics vs `Result`
//!
//! - Low-level hot path (panics on misuse): [`matrix`] operations,
//!   [`Network::forward`], [`Network::backward`],
//!   [`Network::accumulate_gradients`], [`Network::update`].
//!   Shape mismatches and out-of-bounds indices are programmer errors and panic
//!   with the matching [`Error`] message.
//! - High-level APIs: [`NetworkBuilder`], [`Network::fit`],
//!   [`Network::evaluate`], [`mnist::load_mnist`], [`Network::load`].
//!   These validate inputs and return [`Result`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - [`Matrix`] is column-major: element `(row, col)` lives at `row + n_row * col`.
//! - Samples are row vectors; layer `l` has weights `(prev, this)` and biases `(1, this)`.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//!
//! # Quick start
//!
//! ```rust
//! use mnist_mlp::{BatchPolicy, Dataset, FitConfig, NetworkBuilder};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> mnist_mlp::Result<()> {
//! let xs = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//! let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let mut train = Dataset::from_rows(&xs, &ys)?;
//!
//! let mut net = NetworkBuilder::new(2)
//!     .hidden_layers(1, 2)
//!     .output_size(1)
//!     .batch_size(1)
//!     .learning_rate(0.1)
//!     .build_with_seed(0)?;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let cfg = FitConfig {
//!     epochs: 50,
//!     batching: BatchPolicy::SlidingWindow,
//! };
//! let report = net.fit(&mut train, &cfg, &mut rng)?;
//! assert_eq!(report.epochs.len(), 50);
//!
//! let eval = net.evaluate(&train)?;
//! assert!(eval.mse.is_finite());
//! # Ok(())
//! # }
//! ```
//!
//! # Driving training by hand
//!
//! ```rust
//! use mnist_mlp::{Network, NetworkConfig};
//!
//! # fn main() -> mnist_mlp::Result<()> {
//! let mut net = Network::new_with_seed(
//!     NetworkConfig {
//!         n_layers: 2,
//!         input_size: 3,
//!         hidden_size: 4,
//!         output_size: 2,
//!         batch_size: 2,
//!         lr: 0.1,
//!     },
//!     0,
//! )?;
//!
//! for (x, y) in [([0.1, -0.2, 0.3], [0.0, 1.0]), ([0.5, 0.5, 0.0], [1.0, 0.0])] {
//!     net.set_input(&x);
//!     net.set_target(&y);
//!     net.forward();
//!     net.backward();
//!     net.accumulate_gradients();
//! }
//! net.update();
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod checkpoint;
#[cfg(feature = "serde")]
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod mnist;
pub mod network;
pub mod train;

pub use activation::{Activation, Relu, Sigmoid};
pub use builder::NetworkBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use layer::{Init, Layer};
pub use matrix::{Matrix, Transpose};
pub use network::{Network, NetworkConfig};
pub use train::{BatchPolicy, EpochReport, EvalReport, FitConfig, FitReport};

#[cfg(feature = "serde")]
pub use config::{TrainingConfig, load_config};
