//! Dense `f64` matrices.
//!
//! A [`Matrix`] owns one contiguous buffer in column-major order: element
//! `(row, col)` lives at offset `row + n_row * col`. Its shape is fixed at
//! construction.
//!
//! Two layers of API, like the rest of the crate:
//!
//! - Operations (`multiply`, `add`, `hadamard`, `gemm`, ...) write into a caller
//!   provided destination and panic on shape misuse. A mismatched shape is a
//!   programmer error, never data-dependent.
//! - Constructors from external data (`from_col_major`, `from_row_major`,
//!   `try_new`) and the `try_get` / `try_set` accessors return [`Result`].

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;

use crate::matmul::gemm_f64;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    n_row: usize,
    n_col: usize,
}

/// Whether an operand of [`gemm`] is read as-is or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    No,
    Yes,
}

impl Matrix {
    /// Zero-filled `n_row x n_col` matrix.
    ///
    /// Panics if the buffer cannot be allocated; see [`Matrix::try_new`].
    pub fn new(n_row: usize, n_col: usize) -> Self {
        match Self::try_new(n_row, n_col) {
            Ok(m) => m,
            Err(e) => panic!("{e}"),
        }
    }

    /// Zero-filled matrix, reporting size overflow or allocation failure.
    pub fn try_new(n_row: usize, n_col: usize) -> Result<Self> {
        let size = n_row
            .checked_mul(n_col)
            .ok_or(Error::Allocation { n_row, n_col })?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| Error::Allocation { n_row, n_col })?;
        data.resize(size, 0.0);

        Ok(Self { data, n_row, n_col })
    }

    /// Wrap a column-major buffer.
    pub fn from_col_major(n_row: usize, n_col: usize, data: Vec<f64>) -> Result<Self> {
        if n_row.checked_mul(n_col) != Some(data.len()) {
            return Err(Error::InvalidShape(format!(
                "buffer of len {} cannot hold a {n_row}x{n_col} matrix",
                data.len()
            )));
        }
        Ok(Self { data, n_row, n_col })
    }

    /// Copy a row-major buffer into a new matrix.
    pub fn from_row_major(n_row: usize, n_col: usize, values: &[f64]) -> Result<Self> {
        if n_row.checked_mul(n_col) != Some(values.len()) {
            return Err(Error::InvalidShape(format!(
                "buffer of len {} cannot hold a {n_row}x{n_col} matrix",
                values.len()
            )));
        }

        let mut m = Self::try_new(n_row, n_col)?;
        for row in 0..n_row {
            for col in 0..n_col {
                m.data[row + n_row * col] = values[row * n_col + col];
            }
        }
        Ok(m)
    }

    /// A `(1, values.len())` matrix.
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            data: values.to_vec(),
            n_row: 1,
            n_col: values.len(),
        }
    }

    #[inline]
    pub fn n_row(&self) -> usize {
        self.n_row
    }

    #[inline]
    pub fn n_col(&self) -> usize {
        self.n_col
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_row, self.n_col)
    }

    /// Number of elements (`n_row * n_col`).
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The column-major backing buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.n_row || col >= self.n_col {
            return Err(Error::OutOfBounds {
                row,
                col,
                n_row: self.n_row,
                n_col: self.n_col,
            });
        }
        Ok(row + self.n_row * col)
    }

    /// Panics if `row >= n_row` or `col >= n_col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self.offset(row, col) {
            Ok(i) => self.data[i],
            Err(e) => panic!("{e}"),
        }
    }

    /// Panics if `row >= n_row` or `col >= n_col`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        match self.offset(row, col) {
            Ok(i) => self.data[i] = val,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    pub fn try_set(&mut self, row: usize, col: usize, val: f64) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] = val;
        Ok(())
    }

    /// Overwrite `self` with the contents of a same-shaped matrix.
    pub fn copy_from(&mut self, src: &Matrix) {
        check_dst("copy_from", src.shape(), self.shape());
        self.data.copy_from_slice(&src.data);
    }

    /// Overwrite a row vector (or any matrix, in column-major order) from a slice.
    pub fn copy_from_slice(&mut self, values: &[f64]) {
        assert_eq!(
            values.len(),
            self.size(),
            "slice len {} does not match {}x{} matrix",
            values.len(),
            self.n_row,
            self.n_col
        );
        self.data.copy_from_slice(values);
    }

    /// Zero every element.
    #[inline]
    pub fn reset(&mut self) {
        self.data.fill(0.0);
    }

    /// Fill by calling `generator` once per element, in storage order.
    pub fn fill<F: FnMut() -> f64>(&mut self, mut generator: F) {
        for v in &mut self.data {
            *v = generator();
        }
    }

    /// Fill with samples drawn uniformly from `[low, high)`.
    pub fn fill_uniform<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        assert!(low < high, "uniform range [{low}, {high}) is empty");
        self.fill(|| rng.gen_range(low..high));
    }

    /// New matrix with swapped dimensions.
    pub fn transpose(&self) -> Matrix {
        let mut dst = Matrix::new(self.n_col, self.n_row);
        transpose_into(self, &mut dst);
        dst
    }

    /// New matrix with `f` applied to every element.
    pub fn apply<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            data: self.data.iter().map(|&v| f(v)).collect(),
            n_row: self.n_row,
            n_col: self.n_col,
        }
    }

    /// `self += other`.
    pub fn add_assign(&mut self, other: &Matrix) {
        check_same("add_assign", self.shape(), other.shape());
        for (d, &o) in self.data.iter_mut().zip(&other.data) {
            *d += o;
        }
    }

    /// `self += k * other`.
    pub fn scaled_add_assign(&mut self, k: f64, other: &Matrix) {
        check_same("scaled_add_assign", self.shape(), other.shape());
        for (d, &o) in self.data.iter_mut().zip(&other.data) {
            *d = k.mul_add(o, *d);
        }
    }

    /// `self ⊙= f(other)`, elementwise.
    pub fn hadamard_apply<F: Fn(f64) -> f64>(&mut self, other: &Matrix, f: F) {
        check_same("hadamard_apply", self.shape(), other.shape());
        for (d, &o) in self.data.iter_mut().zip(&other.data) {
            *d *= f(o);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        match self.offset(row, col) {
            Ok(i) => &self.data[i],
            Err(e) => panic!("{e}"),
        }
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        match self.offset(row, col) {
            Ok(i) => &mut self.data[i],
            Err(e) => panic!("{e}"),
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.n_row {
            for col in 0..self.n_col {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{:.6}", self.data[row + self.n_row * col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[inline]
fn check_same(op: &'static str, lhs: (usize, usize), rhs: (usize, usize)) {
    if lhs != rhs {
        panic!("{}", Error::ShapeMismatch { op, lhs, rhs });
    }
}

#[inline]
fn check_dst(op: &'static str, expected: (usize, usize), actual: (usize, usize)) {
    if expected != actual {
        panic!("{}", Error::DstMismatch { op, expected, actual });
    }
}

/// `dst = m1 · m2`.
///
/// Panics with `ShapeMismatch` unless `m1.n_col == m2.n_row`, and with
/// `DstMismatch` unless `dst` is `(m1.n_row, m2.n_col)`.
pub fn multiply(m1: &Matrix, m2: &Matrix, dst: &mut Matrix) {
    gemm(1.0, m1, Transpose::No, m2, Transpose::No, 0.0, dst);
}

/// `dst = alpha * op(m1) · op(m2) + beta * dst`.
///
/// Transposed operands are read through swapped strides; nothing is copied.
/// With `beta == 0` the previous contents of `dst` are ignored.
pub fn gemm(
    alpha: f64,
    m1: &Matrix,
    t1: Transpose,
    m2: &Matrix,
    t2: Transpose,
    beta: f64,
    dst: &mut Matrix,
) {
    // (rows, cols, row stride, col stride) of each operand as read.
    let (m, k, rsa, csa) = match t1 {
        Transpose::No => (m1.n_row, m1.n_col, 1, m1.n_row),
        Transpose::Yes => (m1.n_col, m1.n_row, m1.n_row, 1),
    };
    let (k2, n, rsb, csb) = match t2 {
        Transpose::No => (m2.n_row, m2.n_col, 1, m2.n_row),
        Transpose::Yes => (m2.n_col, m2.n_row, m2.n_row, 1),
    };

    if k != k2 {
        panic!(
            "{}",
            Error::ShapeMismatch {
                op: "multiply",
                lhs: (m, k),
                rhs: (k2, n),
            }
        );
    }
    check_dst("multiply", (m, n), dst.shape());

    let rsc = 1;
    let csc = dst.n_row;
    gemm_f64(
        m,
        n,
        k,
        alpha,
        &m1.data,
        rsa,
        csa,
        &m2.data,
        rsb,
        csb,
        beta,
        &mut dst.data,
        rsc,
        csc,
    );
}

#[inline]
fn zip_into<F: Fn(f64, f64) -> f64>(
    op: &'static str,
    m1: &Matrix,
    m2: &Matrix,
    dst: &mut Matrix,
    f: F,
) {
    check_same(op, m1.shape(), m2.shape());
    check_same(op, m1.shape(), dst.shape());
    for ((d, &a), &b) in dst.data.iter_mut().zip(&m1.data).zip(&m2.data) {
        *d = f(a, b);
    }
}

/// `dst = m1 + m2`.
pub fn add(m1: &Matrix, m2: &Matrix, dst: &mut Matrix) {
    zip_into("add", m1, m2, dst, |a, b| a + b);
}

/// `dst = m1 - m2`.
pub fn subtract(m1: &Matrix, m2: &Matrix, dst: &mut Matrix) {
    zip_into("subtract", m1, m2, dst, |a, b| a - b);
}

/// `dst = m1 ⊙ m2` (elementwise product).
pub fn hadamard(m1: &Matrix, m2: &Matrix, dst: &mut Matrix) {
    zip_into("hadamard", m1, m2, dst, |a, b| a * b);
}

/// `dst = k * m`.
pub fn scalar_multiply(m: &Matrix, k: f64, dst: &mut Matrix) {
    apply_into(m, |v| k * v, dst);
}

/// `dst = m + k`, elementwise.
pub fn scalar_add(m: &Matrix, k: f64, dst: &mut Matrix) {
    apply_into(m, |v| v + k, dst);
}

/// `dst = mᵀ`; `dst` must be `(m.n_col, m.n_row)`.
pub fn transpose_into(m: &Matrix, dst: &mut Matrix) {
    check_dst("transpose", (m.n_col, m.n_row), dst.shape());
    for col in 0..m.n_col {
        for row in 0..m.n_row {
            dst.data[col + dst.n_row * row] = m.data[row + m.n_row * col];
        }
    }
}

/// `dst = f(m)`, elementwise.
pub fn apply_into<F: Fn(f64) -> f64>(m: &Matrix, f: F, dst: &mut Matrix) {
    check_dst("apply", m.shape(), dst.shape());
    for (d, &v) in dst.data.iter_mut().zip(&m.data) {
        *d = f(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(n_row: usize, n_col: usize, rows: &[f64]) -> Matrix {
        Matrix::from_row_major(n_row, n_col, rows).unwrap()
    }

    #[test]
    fn storage_is_column_major() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(a.get(1, 2), 6.0);
        assert_eq!(a[(0, 1)], 2.0);
        assert_eq!(a.size(), 6);
    }

    #[test]
    fn new_is_zero_filled() {
        let a = Matrix::new(3, 4);
        assert_eq!(a.shape(), (3, 4));
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn try_new_reports_overflow_as_allocation_error() {
        let err = Matrix::try_new(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, Error::Allocation { .. }));
    }

    #[test]
    fn from_col_major_validates_len() {
        assert!(Matrix::from_col_major(2, 2, vec![0.0; 3]).is_err());
        assert!(Matrix::from_col_major(2, 2, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn multiply_matches_hand_computation() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut c = Matrix::new(2, 2);

        multiply(&a, &b, &mut c);

        assert_eq!(c, m(2, 2, &[22.0, 28.0, 49.0, 64.0]));
    }

    #[test]
    fn gemm_with_transposed_operands_matches_explicit_transpose() {
        let a = m(2, 3, &[1.0, -2.0, 3.0, 0.5, 5.0, -6.0]);
        let b = m(2, 3, &[2.0, 1.0, 0.0, -1.0, 3.0, 4.0]);

        // a · bᵀ
        let mut expected = Matrix::new(2, 2);
        multiply(&a, &b.transpose(), &mut expected);
        let mut got = Matrix::new(2, 2);
        gemm(1.0, &a, Transpose::No, &b, Transpose::Yes, 0.0, &mut got);
        assert_eq!(got, expected);

        // aᵀ · b
        let mut expected = Matrix::new(3, 3);
        multiply(&a.transpose(), &b, &mut expected);
        let mut got = Matrix::new(3, 3);
        gemm(1.0, &a, Transpose::Yes, &b, Transpose::No, 0.0, &mut got);
        assert_eq!(got, expected);
    }

    #[test]
    fn gemm_accumulates_with_beta_one() {
        let x = m(1, 2, &[1.0, 2.0]);
        let d = m(1, 3, &[1.0, 0.0, -1.0]);
        let mut acc = Matrix::new(2, 3);

        gemm(1.0, &x, Transpose::Yes, &d, Transpose::No, 1.0, &mut acc);
        gemm(1.0, &x, Transpose::Yes, &d, Transpose::No, 1.0, &mut acc);

        assert_eq!(acc, m(2, 3, &[2.0, 0.0, -2.0, 4.0, 0.0, -4.0]));
    }

    #[test]
    #[should_panic(expected = "shape mismatch in multiply")]
    fn multiply_rejects_inner_dimension_mismatch() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 3);
        let mut c = Matrix::new(2, 3);
        multiply(&a, &b, &mut c);
    }

    #[test]
    #[should_panic(expected = "destination mismatch in multiply")]
    fn multiply_rejects_wrong_destination() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(3, 4);
        let mut c = Matrix::new(4, 2);
        multiply(&a, &b, &mut c);
    }

    #[test]
    #[should_panic(expected = "shape mismatch in add")]
    fn add_rejects_mismatched_operands() {
        let a = Matrix::new(2, 2);
        let b = Matrix::new(2, 3);
        let mut c = Matrix::new(2, 2);
        add(&a, &b, &mut c);
    }

    #[test]
    #[should_panic(expected = "shape mismatch in hadamard")]
    fn hadamard_rejects_mismatched_destination() {
        let a = Matrix::new(2, 2);
        let b = Matrix::new(2, 2);
        let mut c = Matrix::new(1, 4);
        hadamard(&a, &b, &mut c);
    }

    #[test]
    #[should_panic(expected = "destination mismatch in apply")]
    fn scalar_multiply_rejects_wrong_destination() {
        let a = Matrix::new(2, 2);
        let mut c = Matrix::new(2, 1);
        scalar_multiply(&a, 2.0, &mut c);
    }

    #[test]
    fn elementwise_ops() {
        let a = m(1, 3, &[1.0, 2.0, 3.0]);
        let b = m(1, 3, &[4.0, 5.0, 6.0]);
        let mut c = Matrix::new(1, 3);

        add(&a, &b, &mut c);
        assert_eq!(c.as_slice(), &[5.0, 7.0, 9.0]);
        subtract(&a, &b, &mut c);
        assert_eq!(c.as_slice(), &[-3.0, -3.0, -3.0]);
        hadamard(&a, &b, &mut c);
        assert_eq!(c.as_slice(), &[4.0, 10.0, 18.0]);
        scalar_multiply(&a, 2.0, &mut c);
        assert_eq!(c.as_slice(), &[2.0, 4.0, 6.0]);
        scalar_add(&a, -1.0, &mut c);
        assert_eq!(c.as_slice(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn in_place_helpers() {
        let mut a = m(1, 3, &[1.0, 2.0, 3.0]);
        let b = m(1, 3, &[1.0, 1.0, 1.0]);

        a.add_assign(&b);
        assert_eq!(a.as_slice(), &[2.0, 3.0, 4.0]);
        a.scaled_add_assign(-0.5, &b);
        assert_eq!(a.as_slice(), &[1.5, 2.5, 3.5]);
        a.hadamard_apply(&b, |v| 2.0 * v);
        assert_eq!(a.as_slice(), &[3.0, 5.0, 7.0]);
    }

    #[test]
    fn transpose_swaps_shape_and_contents() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose();
        assert_eq!(t, m(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
    }

    #[test]
    fn apply_and_apply_into_agree() {
        let a = m(2, 2, &[-1.0, 0.0, 1.0, 2.0]);
        let squared = a.apply(|v| v * v);
        let mut dst = Matrix::new(2, 2);
        apply_into(&a, |v| v * v, &mut dst);
        assert_eq!(squared, dst);
        assert_eq!(dst.get(1, 1), 4.0);
    }

    #[test]
    fn fill_reset_and_copy() {
        let mut a = Matrix::new(2, 2);
        let mut next = 0.0;
        a.fill(|| {
            next += 1.0;
            next
        });
        assert_eq!(a.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        let b = a.clone();
        a.reset();
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(b.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        a.copy_from(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn fill_uniform_stays_in_range() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut rng = StdRng::seed_from_u64(7);
        let mut a = Matrix::new(8, 8);
        a.fill_uniform(&mut rng, -1.0, 1.0);
        assert!(a.as_slice().iter().all(|&v| (-1.0..1.0).contains(&v)));
    }

    #[test]
    fn try_accessors_report_out_of_bounds() {
        let mut a = Matrix::new(2, 3);
        assert!(matches!(
            a.try_get(2, 0),
            Err(Error::OutOfBounds { row: 2, col: 0, .. })
        ));
        assert!(matches!(a.try_set(0, 3, 1.0), Err(Error::OutOfBounds { .. })));
        a.try_set(1, 2, 9.0).unwrap();
        assert_eq!(a.try_get(1, 2).unwrap(), 9.0);
    }

    #[test]
    fn display_prints_rows() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.to_string(), "1.000000 2.000000\n3.000000 4.000000\n");
    }
}
