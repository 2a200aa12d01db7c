//! Run configuration for the `mnist-mlp` binary.
//!
//! Every field is optional in the JSON file; missing fields take the defaults
//! below (784-16-16-10 sigmoid network, 512 samples, batches of 64, lr 0.1,
//! 10 epochs, seed 0).
//!
//! ```json
//! {
//!   "epochs": 20,
//!   "hidden_size": 32,
//!   "n_data": 2048,
//!   "batching": "disjoint"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BatchPolicy, Error, FitConfig, NetworkBuilder, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub epochs: usize,
    /// Non-input layers, output included.
    pub n_layers: usize,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    /// Samples to load from the dataset files.
    pub n_data: usize,
    pub batch_size: usize,
    pub lr: f64,
    pub seed: u64,
    pub batching: BatchPolicy,
    pub init_low: f64,
    pub init_high: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            n_layers: 3,
            input_size: 784,
            hidden_size: 16,
            output_size: 10,
            n_data: 512,
            batch_size: 64,
            lr: 0.1,
            seed: 0,
            batching: BatchPolicy::SlidingWindow,
            init_low: 0.0,
            init_high: 1.0,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if self.n_layers == 0 {
            return Err(Error::InvalidConfig("n_layers must be > 0".to_owned()));
        }
        if self.n_data == 0 {
            return Err(Error::InvalidConfig("n_data must be > 0".to_owned()));
        }
        if self.batch_size > self.n_data {
            return Err(Error::InvalidConfig(format!(
                "batch_size {} exceeds n_data {}",
                self.batch_size, self.n_data
            )));
        }
        // Shape, lr and init range are checked by the builder.
        self.network_builder().config().map(|_| ())
    }

    /// Network hyperparameters as a builder.
    pub fn network_builder(&self) -> NetworkBuilder {
        NetworkBuilder::new(self.input_size)
            .hidden_layers(self.n_layers.saturating_sub(1), self.hidden_size)
            .output_size(self.output_size)
            .batch_size(self.batch_size)
            .learning_rate(self.lr)
            .init_range(self.init_low, self.init_high)
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            epochs: self.epochs,
            batching: self.batching,
        }
    }
}

/// Read, parse and validate a JSON configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let cfg = TrainingConfig::default();
        assert!(cfg.validate().is_ok());

        let net = cfg.network_builder().build_with_seed(cfg.seed).unwrap();
        assert_eq!(net.num_layers(), 3);
        assert_eq!(net.input_size(), 784);
        assert_eq!(net.output_size(), 10);
        assert_eq!(net.layers()[1].weights().shape(), (16, 16));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: TrainingConfig =
            serde_json::from_str(r#"{ "epochs": 3, "batching": "disjoint" }"#).unwrap();
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.batching, BatchPolicy::Disjoint);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.fit_config().epochs, 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<TrainingConfig>(r#"{ "epoch": 3 }"#).is_err());
    }

    #[test]
    fn load_config_validates() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "batch_size": 1024 }}"#).unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hidden_size": 8, "seed": 7 }}"#).unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.hidden_size, 8);
        assert_eq!(cfg.seed, 7);
    }

    #[test]
    fn malformed_json_is_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(load_config(file.path()), Err(Error::Json(_))));
    }
}
