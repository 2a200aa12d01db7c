use rand::Rng;
use tracing::{debug, info};

use crate::activation::Activation;
use crate::{Dataset, Error, Network, Result, loss, metrics};

/// How an epoch's samples are partitioned into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BatchPolicy {
    /// Batches start at every index `0 ..= n - batch_size` and hold exactly
    /// `batch_size` samples, so consecutive batches overlap.
    #[default]
    SlidingWindow,
    /// `ceil(n / batch_size)` consecutive chunks. A shorter final chunk is
    /// averaged over its own length.
    Disjoint,
}

impl BatchPolicy {
    /// `(start, len)` of every batch in one epoch over `n` samples.
    pub fn batches(self, n: usize, batch_size: usize) -> Batches {
        assert!(batch_size > 0, "batch_size must be > 0");
        Batches {
            policy: self,
            n,
            batch_size,
            next: 0,
        }
    }
}

/// Iterator returned by [`BatchPolicy::batches`].
#[derive(Debug, Clone)]
pub struct Batches {
    policy: BatchPolicy,
    n: usize,
    batch_size: usize,
    next: usize,
}

impl Iterator for Batches {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        match self.policy {
            BatchPolicy::SlidingWindow => {
                if start + self.batch_size > self.n {
                    return None;
                }
                self.next += 1;
                Some((start, self.batch_size))
            }
            BatchPolicy::Disjoint => {
                if start >= self.n {
                    return None;
                }
                let len = self.batch_size.min(self.n - start);
                self.next += len;
                Some((start, len))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub epochs: usize,
    pub batching: BatchPolicy,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batching: BatchPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean of `Σ (a - y)²` over every sample visited this epoch.
    pub loss: f64,
    pub updates: usize,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    pub epochs: Vec<EpochReport>,
}

impl FitReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.loss)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    /// Mean over samples of the per-sample output MSE.
    pub mse: f64,
    /// Fraction of samples classified correctly, in `[0, 1]`.
    pub accuracy: f64,
}

impl<A: Activation> Network<A> {
    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_size() {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match network input_size {}",
                data.input_dim(),
                self.input_size()
            )));
        }
        if data.target_dim() != self.output_size() {
            return Err(Error::InvalidData(format!(
                "dataset target_dim {} does not match network output_size {}",
                data.target_dim(),
                self.output_size()
            )));
        }
        Ok(())
    }

    /// Train with mini-batch SGD.
    ///
    /// Every epoch shuffles `data` in place, then for each batch runs
    /// forward / backward / accumulate per sample and applies one update scaled
    /// by `lr / batch_len`. Configuration errors are reported before any
    /// parameter is touched. The per-sample path does not allocate.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        data: &mut Dataset,
        cfg: &FitConfig,
        rng: &mut R,
    ) -> Result<FitReport> {
        self.check_dataset(data)?;
        if cfg.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        let batch_size = self.batch_size();
        if batch_size > data.len() {
            return Err(Error::InvalidConfig(format!(
                "batch_size {batch_size} exceeds dataset size {}",
                data.len()
            )));
        }

        let mut reports = Vec::with_capacity(cfg.epochs);
        self.reset_gradients();

        for epoch in 1..=cfg.epochs {
            data.shuffle(rng);

            let mut total = 0.0_f64;
            let mut seen = 0usize;
            let mut updates = 0usize;
            for (start, len) in cfg.batching.batches(data.len(), batch_size) {
                let mut batch_loss = 0.0_f64;
                for idx in start..start + len {
                    self.accumulate_sample(data.input(idx), data.target(idx));
                    batch_loss += self.squared_error();
                }
                self.update_with_batch_len(len);

                debug!(epoch, start, len, loss = batch_loss / len as f64, "batch");
                total += batch_loss;
                seen += len;
                updates += 1;
            }

            let loss = total / seen as f64;
            info!(epoch, epochs = cfg.epochs, loss, updates, "epoch");
            reports.push(EpochReport {
                epoch,
                loss,
                updates,
            });
        }

        Ok(FitReport { epochs: reports })
    }

    /// Mean MSE and accuracy over `data` (forward passes only).
    pub fn evaluate(&mut self, data: &Dataset) -> Result<EvalReport> {
        self.check_dataset(data)?;

        let mut total = 0.0_f64;
        let mut correct = 0usize;
        for idx in 0..data.len() {
            let target = data.target(idx);
            let out = self.predict(data.input(idx));
            total += loss::mse(out, target);
            if metrics::is_correct(out, target) {
                correct += 1;
            }
        }

        let n = data.len() as f64;
        Ok(EvalReport {
            mse: total / n,
            accuracy: correct as f64 / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::NetworkConfig;

    fn batches(policy: BatchPolicy, n: usize, bs: usize) -> Vec<(usize, usize)> {
        policy.batches(n, bs).collect()
    }

    #[test]
    fn sliding_window_batches_overlap() {
        assert_eq!(
            batches(BatchPolicy::SlidingWindow, 5, 3),
            vec![(0, 3), (1, 3), (2, 3)]
        );
        assert_eq!(batches(BatchPolicy::SlidingWindow, 4, 4), vec![(0, 4)]);
        assert!(batches(BatchPolicy::SlidingWindow, 2, 3).is_empty());
    }

    #[test]
    fn disjoint_batches_cover_every_sample_once() {
        assert_eq!(
            batches(BatchPolicy::Disjoint, 7, 3),
            vec![(0, 3), (3, 3), (6, 1)]
        );
        assert_eq!(batches(BatchPolicy::Disjoint, 6, 3), vec![(0, 3), (3, 3)]);
    }

    fn tiny_net(batch_size: usize) -> Network {
        Network::new_with_seed(
            NetworkConfig {
                n_layers: 2,
                input_size: 2,
                hidden_size: 3,
                output_size: 1,
                batch_size,
                lr: 0.5,
            },
            0,
        )
        .unwrap()
    }

    fn tiny_data() -> Dataset {
        Dataset::from_flat(
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
            vec![0.0, 1.0, 1.0, 1.0],
            2,
            1,
        )
        .unwrap()
    }

    #[test]
    fn fit_rejects_batch_larger_than_dataset() {
        let mut net = tiny_net(5);
        let before = net.clone();
        let err = net
            .fit(
                &mut tiny_data(),
                &FitConfig::default(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(net.layers()[0].weights(), before.layers()[0].weights());
    }

    #[test]
    fn fit_rejects_shape_mismatch_and_zero_epochs() {
        let mut net = tiny_net(1);
        let mut rng = StdRng::seed_from_u64(0);
        let mut wide = Dataset::from_flat(vec![0.0; 3], vec![0.0], 3, 1).unwrap();
        assert!(net.fit(&mut wide, &FitConfig::default(), &mut rng).is_err());

        let cfg = FitConfig {
            epochs: 0,
            ..FitConfig::default()
        };
        assert!(net.fit(&mut tiny_data(), &cfg, &mut rng).is_err());
    }

    #[test]
    fn fit_reports_each_epoch() {
        let mut net = tiny_net(2);
        let cfg = FitConfig {
            epochs: 3,
            batching: BatchPolicy::SlidingWindow,
        };
        let report = net
            .fit(&mut tiny_data(), &cfg, &mut StdRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(report.epochs.len(), 3);
        assert_eq!(report.epochs[2].epoch, 3);
        assert!(report.epochs.iter().all(|e| e.updates == 3));
        assert!(report.final_loss().unwrap().is_finite());
    }

    #[test]
    fn disjoint_fit_updates_once_per_chunk() {
        let mut net = tiny_net(3);
        let cfg = FitConfig {
            epochs: 1,
            batching: BatchPolicy::Disjoint,
        };
        let report = net
            .fit(&mut tiny_data(), &cfg, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(report.epochs[0].updates, 2);
    }

    #[test]
    fn training_reduces_loss() {
        let mut net = tiny_net(1);
        let mut data = tiny_data();
        let before = net.evaluate(&data).unwrap().mse;

        let cfg = FitConfig {
            epochs: 200,
            batching: BatchPolicy::SlidingWindow,
        };
        net.fit(&mut data, &cfg, &mut StdRng::seed_from_u64(2)).unwrap();

        let after = net.evaluate(&data).unwrap();
        assert!(after.mse < before, "mse {} !< {}", after.mse, before);
        assert!((0.0..=1.0).contains(&after.accuracy));
    }
}
