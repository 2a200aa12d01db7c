use std::io::Write;

use mnist_mlp::{Error, mnist};
use tempfile::NamedTempFile;

fn write_images(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&mnist::IMAGES_MAGIC.to_be_bytes()).unwrap();
    file.write_all(&count.to_be_bytes()).unwrap();
    file.write_all(&rows.to_be_bytes()).unwrap();
    file.write_all(&cols.to_be_bytes()).unwrap();
    file.write_all(pixels).unwrap();
    file.flush().unwrap();
    file
}

fn write_labels(labels: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&mnist::LABELS_MAGIC.to_be_bytes()).unwrap();
    file.write_all(&(labels.len() as u32).to_be_bytes()).unwrap();
    file.write_all(labels).unwrap();
    file.flush().unwrap();
    file
}

/// Three 2x2 images whose pixels encode their index.
fn three_samples() -> (NamedTempFile, NamedTempFile) {
    let pixels = [
        0, 0, 0, 255, //
        255, 255, 0, 0, //
        51, 51, 51, 51,
    ];
    (write_images(3, 2, 2, &pixels), write_labels(&[1, 0, 2]))
}

#[test]
fn loads_normalised_one_hot_samples() {
    let (images, labels) = three_samples();
    let data = mnist::load_mnist(images.path(), labels.path(), 3, 4, 3).unwrap();

    assert_eq!(data.len(), 3);
    assert_eq!(data.input(0), &[0.0, 0.0, 0.0, 1.0]);
    assert_eq!(data.input(2), &[0.2, 0.2, 0.2, 0.2]);
    assert_eq!(data.target(0), &[0.0, 1.0, 0.0]);
    assert_eq!(data.target(1), &[1.0, 0.0, 0.0]);
    assert_eq!(data.target(2), &[0.0, 0.0, 1.0]);
}

#[test]
fn loads_a_prefix_when_fewer_samples_requested() {
    let (images, labels) = three_samples();
    let data = mnist::load_mnist(images.path(), labels.path(), 2, 4, 3).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.input(1), &[1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn oversized_request_is_clamped() {
    let (images, labels) = three_samples();
    let data = mnist::load_mnist(images.path(), labels.path(), 512, 4, 3).unwrap();
    assert_eq!(data.len(), 3);
}

#[test]
fn image_size_must_match_input_size() {
    let (images, labels) = three_samples();
    let err = mnist::load_mnist(images.path(), labels.path(), 3, 784, 3).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn label_out_of_range_is_rejected() {
    let (images, labels) = three_samples();
    let err = mnist::load_mnist(images.path(), labels.path(), 3, 4, 2).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn swapped_files_fail_magic_check() {
    let (images, labels) = three_samples();
    let err = mnist::load_mnist(labels.path(), images.path(), 3, 4, 3).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}

#[test]
fn truncated_image_payload_is_io_error() {
    let images = write_images(3, 2, 2, &[0; 7]);
    let labels = write_labels(&[0, 0, 0]);
    let err = mnist::load_mnist(images.path(), labels.path(), 3, 4, 3).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn oversized_dimensions_are_rejected_before_reading_pixels() {
    let images = write_images(512, 65_535, 65_535, &[]);
    let labels = write_labels(&[0]);
    let err = mnist::load_mnist(images.path(), labels.path(), 512, 784, 10).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)));
}
