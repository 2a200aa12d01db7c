//! MNIST IDX readers.
//!
//! Both files start with big-endian `u32` header fields:
//! - images: magic `0x0803`, count, rows, cols, then `count * rows * cols` bytes
//! - labels: magic `0x0801`, count, then `count` bytes
//!
//! Pixels are normalised to `[0, 1]` by `/ 255` and labels expand to one-hot
//! rows when they are assembled into a [`Dataset`].

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::{Dataset, Error, Result};

pub const IMAGES_MAGIC: u32 = 0x0000_0803;
pub const LABELS_MAGIC: u32 = 0x0000_0801;

/// Header of an IDX3 image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Record count announced by the header.
    pub total: usize,
    pub rows: usize,
    pub cols: usize,
}

impl ImageHeader {
    pub fn image_size(&self) -> usize {
        self.rows * self.cols
    }
}

/// Raw image records read from an IDX3 file.
#[derive(Debug, Clone)]
pub struct IdxImages {
    /// Record count announced by the header.
    pub total: usize,
    pub rows: usize,
    pub cols: usize,
    /// `len() * rows * cols` unsigned pixels, one image after another.
    pub pixels: Vec<u8>,
}

impl IdxImages {
    /// Number of images actually read.
    pub fn len(&self) -> usize {
        let size = self.image_size();
        if size == 0 { 0 } else { self.pixels.len() / size }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn image_size(&self) -> usize {
        self.rows * self.cols
    }
}

/// Raw label records read from an IDX1 file.
#[derive(Debug, Clone)]
pub struct IdxLabels {
    pub total: usize,
    pub labels: Vec<u8>,
}

fn read_be_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn check_magic(kind: &str, expected: u32, found: u32) -> Result<()> {
    if found != expected {
        return Err(Error::InvalidData(format!(
            "{kind} file magic number mismatch: expected {expected:#010x}, got {found:#010x}"
        )));
    }
    Ok(())
}

/// Read exactly `len` bytes.
///
/// The buffer grows with the bytes actually present, so a header that lies
/// about its payload fails with [`Error::Io`] instead of forcing a huge
/// allocation.
fn read_payload<R: Read + ?Sized>(reader: &mut R, len: usize, kind: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = (&mut *reader).take(len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{kind} payload truncated: expected {len} bytes, got {read}"),
        )
        .into());
    }
    Ok(buf)
}

/// Read the magic number and dimensions of an image file.
pub fn read_image_header<R: Read + ?Sized>(reader: &mut R) -> Result<ImageHeader> {
    check_magic("image", IMAGES_MAGIC, read_be_u32(reader)?)?;
    Ok(ImageHeader {
        total: read_be_u32(reader)? as usize,
        rows: read_be_u32(reader)? as usize,
        cols: read_be_u32(reader)? as usize,
    })
}

/// Read up to `max_count` images following an already-read `header`.
///
/// A short read in the requested records surfaces as [`Error::Io`].
pub fn read_image_payload<R: Read + ?Sized>(
    reader: &mut R,
    header: ImageHeader,
    max_count: usize,
) -> Result<IdxImages> {
    let ImageHeader { total, rows, cols } = header;
    let count = max_count.min(total);
    let bytes = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .ok_or_else(|| {
            Error::InvalidData(format!("image payload {count}x{rows}x{cols} overflows"))
        })?;

    Ok(IdxImages {
        total,
        rows,
        cols,
        pixels: read_payload(reader, bytes, "image")?,
    })
}

/// Read the header and up to `max_count` images.
pub fn read_images<R: Read + ?Sized>(reader: &mut R, max_count: usize) -> Result<IdxImages> {
    let header = read_image_header(reader)?;
    read_image_payload(reader, header, max_count)
}

/// Read the header and up to `max_count` labels.
pub fn read_labels<R: Read + ?Sized>(reader: &mut R, max_count: usize) -> Result<IdxLabels> {
    check_magic("label", LABELS_MAGIC, read_be_u32(reader)?)?;
    let total = read_be_u32(reader)? as usize;
    let labels = read_payload(reader, max_count.min(total), "label")?;
    Ok(IdxLabels { total, labels })
}

/// Build a dataset from raw IDX records.
///
/// Uses the first `min(images.len(), labels.len())` records.
pub fn to_dataset(images: &IdxImages, labels: &IdxLabels, output_size: usize) -> Result<Dataset> {
    let len = images.len().min(labels.labels.len());
    let input_size = images.image_size();
    let mut data = Dataset::zeros(len, input_size, output_size)?;

    for idx in 0..len {
        let label = labels.labels[idx] as usize;
        if label >= output_size {
            return Err(Error::InvalidData(format!(
                "label {label} at index {idx} does not fit output_size {output_size}"
            )));
        }

        let src = &images.pixels[idx * input_size..(idx + 1) * input_size];
        for (dst, &px) in data.input_mut(idx).iter_mut().zip(src) {
            *dst = f64::from(px) / 255.0;
        }
        data.target_mut(idx)[label] = 1.0;
    }

    Ok(data)
}

/// Load `n` MNIST samples from an image file and a label file.
///
/// Asking for more samples than either file holds clamps to what is
/// available and logs a warning.
pub fn load_mnist(
    images_path: impl AsRef<Path>,
    labels_path: impl AsRef<Path>,
    n: usize,
    input_size: usize,
    output_size: usize,
) -> Result<Dataset> {
    let images_path = images_path.as_ref();
    let labels_path = labels_path.as_ref();

    let mut reader = BufReader::new(File::open(images_path)?);
    let header = read_image_header(&mut reader)?;
    info!(
        path = %images_path.display(),
        total = header.total,
        rows = header.rows,
        cols = header.cols,
        "found images"
    );
    if header.image_size() != input_size {
        return Err(Error::InvalidData(format!(
            "images are {}x{} = {} pixels, network input_size is {input_size}",
            header.rows,
            header.cols,
            header.image_size()
        )));
    }
    let images = read_image_payload(&mut reader, header, n)?;

    let mut reader = BufReader::new(File::open(labels_path)?);
    let labels = read_labels(&mut reader, n)?;
    info!(path = %labels_path.display(), total = labels.total, "found labels");

    let available = images.total.min(labels.total);
    if n > available {
        warn!(
            requested = n,
            available, "dataset holds fewer samples than requested, clamping"
        );
    }

    let data = to_dataset(&images, &labels, output_size)?;
    info!(samples = data.len(), input_size, output_size, "loaded mnist");
    Ok(data)
}
