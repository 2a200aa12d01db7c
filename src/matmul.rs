//! Strided GEMM kernel behind every matrix product.
//!
//! `c = alpha * a * b + beta * c`, where each operand is addressed through a
//! (row stride, column stride) pair. Column-major storage is `(1, n_row)`;
//! swapping the two strides reads the same buffer as its transpose.
//!
//! - default: a simple, safe triple-loop implementation
//! - optional: a faster backend via the `matrixmultiply` feature

#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn gemm_f64(
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    rsa: usize,
    csa: usize,
    b: &[f64],
    rsb: usize,
    csb: usize,
    beta: f64,
    c: &mut [f64],
    rsc: usize,
    csc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    debug_assert!(k == 0 || a.len() >= (m - 1) * rsa + (k - 1) * csa + 1);
    debug_assert!(k == 0 || b.len() >= (k - 1) * rsb + (n - 1) * csb + 1);
    debug_assert!(c.len() >= (m - 1) * rsc + (n - 1) * csc + 1);

    #[cfg(feature = "matrixmultiply")]
    {
        // matrixmultiply supports arbitrary strides and ignores `c` when beta == 0.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                beta,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f64;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                let av = a[a0 + p * csa];
                let bv = b[p * rsb + b0];
                acc = av.mul_add(bv, acc);
            }

            let idx = i * rsc + j * csc;
            // beta == 0 overwrites, so stale NaNs in `c` never leak through.
            c[idx] = if beta == 0.0 {
                alpha * acc
            } else {
                alpha * acc + beta * c[idx]
            };
        }
    }
}
