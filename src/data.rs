//! Contiguous dataset storage.
//!
//! The training loop reads samples as slices to avoid per-step allocations.
//! `Dataset` keeps inputs and targets in two row-major buffers:
//! - `inputs.len() == len * input_dim`
//! - `targets.len() == len * target_dim`

use std::fmt;

use rand::Rng;

use crate::{Error, Result};

/// Number of samples printed by `Display` before the preview is cut short.
const DISPLAY_PREVIEW: usize = 8;

/// A supervised dataset: inputs (X) and targets (Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<f64>,
    targets: Vec<f64>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Dataset of `len` all-zero samples.
    pub fn zeros(len: usize, input_dim: usize, target_dim: usize) -> Result<Self> {
        check_dims(input_dim, target_dim)?;
        let size = |dim: usize| {
            len.checked_mul(dim).ok_or_else(|| {
                Error::InvalidData(format!("{len} samples of dim {dim} overflow usize"))
            })
        };
        let (n_inputs, n_targets) = (size(input_dim)?, size(target_dim)?);
        Ok(Self {
            inputs: vec![0.0; n_inputs],
            targets: vec![0.0; n_targets],
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        check_dims(input_dim, target_dim)?;
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {}",
                inputs.len(),
                input_dim
            )));
        }

        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({} * {})",
                targets.len(),
                len,
                target_dim
            )));
        }

        Ok(Self {
            inputs,
            targets,
            len,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows (copied into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidData("inputs must not be empty".to_owned()));
        }

        let input_dim = inputs[0].len();
        let target_dim = targets[0].len();
        check_dims(input_dim, target_dim)?;

        let mut inputs_flat = Vec::with_capacity(inputs.len() * input_dim);
        let mut targets_flat = Vec::with_capacity(targets.len() * target_dim);
        for (i, (x, y)) in inputs.iter().zip(targets).enumerate() {
            if x.len() != input_dim {
                return Err(Error::InvalidData(format!(
                    "input row {i} has len {}, expected {input_dim}",
                    x.len()
                )));
            }
            if y.len() != target_dim {
                return Err(Error::InvalidData(format!(
                    "target row {i} has len {}, expected {target_dim}",
                    y.len()
                )));
            }
            inputs_flat.extend_from_slice(x);
            targets_flat.extend_from_slice(y);
        }

        Ok(Self {
            inputs: inputs_flat,
            targets: targets_flat,
            len: inputs.len(),
            input_dim,
            target_dim,
        })
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row.
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }

    #[inline]
    pub fn input_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.input_dim;
        &mut self.inputs[start..start + self.input_dim]
    }

    #[inline]
    pub fn target_mut(&mut self, idx: usize) -> &mut [f64] {
        let start = idx * self.target_dim;
        &mut self.targets[start..start + self.target_dim]
    }

    /// Keep only the first `len` samples. No-op if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.inputs.truncate(len * self.input_dim);
        self.targets.truncate(len * self.target_dim);
        self.len = len;
    }

    /// Swap samples `i` and `j`, keeping each input paired with its target.
    pub fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        swap_rows(&mut self.inputs, self.input_dim, i, j);
        swap_rows(&mut self.targets, self.target_dim, i, j);
    }

    /// Uniform in-place permutation (Fisher-Yates). Allocation-free.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in 0..self.len {
            let r = rng.gen_range(i..self.len);
            self.swap(i, r);
        }
    }
}

fn check_dims(input_dim: usize, target_dim: usize) -> Result<()> {
    if input_dim == 0 {
        return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
    }
    if target_dim == 0 {
        return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
    }
    Ok(())
}

#[inline]
fn swap_rows(buf: &mut [f64], dim: usize, i: usize, j: usize) {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    let (head, tail) = buf.split_at_mut(hi * dim);
    head[lo * dim..(lo + 1) * dim].swap_with_slice(&mut tail[..dim]);
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dataset: {} samples, input_dim {}, target_dim {}",
            self.len, self.input_dim, self.target_dim
        )?;

        let shown = self.len.min(DISPLAY_PREVIEW);
        writeln!(f, "X:")?;
        for idx in 0..shown {
            write_row(f, self.input(idx))?;
        }
        writeln!(f, "y:")?;
        for idx in 0..shown {
            write_row(f, self.target(idx))?;
        }
        if shown < self.len {
            writeln!(f, "... {} more", self.len - shown)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[f64]) -> fmt::Result {
    for (i, v) in row.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{v:.6}")?;
    }
    writeln!(f)
}
