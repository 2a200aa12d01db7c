//! Binary checkpoint format.
//!
//! Layout (native endianness, `u64` sizes, `f64` values):
//!
//! 1. magic `u32` [`MAGIC`]
//! 2. `n_layers`, `input_size`, `hidden_size`, `output_size` as `u64`
//! 3. per layer, in order: bias values, then weight values (column-major)
//!
//! Batch size and learning rate are training settings, not part of the file;
//! the loader takes them from the caller.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::info;

use crate::activation::{Activation, Sigmoid};
use crate::layer::Layer;
use crate::matrix::Matrix;
use crate::{Error, Network, NetworkConfig, Result};

pub const MAGIC: u32 = 0xDEAD_BEEF;

/// Serialize `net` into `writer`.
pub fn write_to<A, W>(net: &Network<A>, writer: &mut W) -> Result<()>
where
    A: Activation,
    W: Write + ?Sized,
{
    let cfg = net.config();
    writer.write_all(&MAGIC.to_ne_bytes())?;
    for size in [
        cfg.n_layers,
        cfg.input_size,
        cfg.hidden_size,
        cfg.output_size,
    ] {
        writer.write_all(&(size as u64).to_ne_bytes())?;
    }

    for layer in net.layers() {
        for &v in layer.biases().as_slice() {
            writer.write_all(&v.to_ne_bytes())?;
        }
        for &v in layer.weights().as_slice() {
            writer.write_all(&v.to_ne_bytes())?;
        }
    }
    Ok(())
}

/// Deserialize a sigmoid network from `reader`.
pub fn read_from<R: Read + ?Sized>(reader: &mut R, batch_size: usize, lr: f64) -> Result<Network> {
    read_with_activation(reader, Sigmoid, batch_size, lr)
}

pub fn read_with_activation<A: Activation, R: Read + ?Sized>(
    reader: &mut R,
    activation: A,
    batch_size: usize,
    lr: f64,
) -> Result<Network<A>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    let found = u32::from_ne_bytes(magic);
    if found != MAGIC {
        return Err(Error::BadMagic {
            expected: MAGIC,
            found,
        });
    }

    let config = NetworkConfig {
        n_layers: read_size(reader)?,
        input_size: read_size(reader)?,
        hidden_size: read_size(reader)?,
        output_size: read_size(reader)?,
        batch_size,
        lr,
    };
    config.validate()?;

    // No capacity hint: `n_layers` comes from an untrusted header.
    let mut layers = Vec::new();
    for l in 0..config.n_layers {
        let (prev, this) = config.layer_dims(l);
        let b = read_matrix(reader, 1, this)?;
        let w = read_matrix(reader, prev, this)?;
        layers.push(Layer::from_parts(w, b)?);
    }
    Network::from_layers(config, layers, activation)
}

fn read_size<R: Read + ?Sized>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let v = u64::from_ne_bytes(buf);
    usize::try_from(v)
        .map_err(|_| Error::InvalidData(format!("size field {v} does not fit in usize")))
}

/// Read `n_row * n_col` column-major values.
///
/// The buffer grows with the values actually read, so a file shorter than its
/// header claims fails with [`Error::Io`] before any header-sized allocation.
fn read_matrix<R: Read + ?Sized>(reader: &mut R, n_row: usize, n_col: usize) -> Result<Matrix> {
    let len = n_row
        .checked_mul(n_col)
        .ok_or(Error::Allocation { n_row, n_col })?;

    let mut data = Vec::new();
    let mut buf = [0u8; 8];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        data.push(f64::from_ne_bytes(buf));
    }
    Matrix::from_col_major(n_row, n_col, data)
}

impl<A: Activation> Network<A> {
    /// Write a checkpoint to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_to(self, &mut writer)?;
        writer.flush()?;
        info!(
            path = %path.display(),
            layers = self.num_layers(),
            parameters = self.parameter_count(),
            "saved checkpoint"
        );
        Ok(())
    }
}

impl Network<Sigmoid> {
    /// Read a checkpoint from `path`.
    ///
    /// `batch_size` and `lr` are not stored in the file.
    pub fn load(path: impl AsRef<Path>, batch_size: usize, lr: f64) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let net = read_from(&mut reader, batch_size, lr)?;
        info!(
            path = %path.display(),
            layers = net.num_layers(),
            parameters = net.parameter_count(),
            "loaded checkpoint"
        );
        Ok(net)
    }
}
