//! Loop nests behind the CPU kernels.
//!
//! Every function works on raw row-major slices: `a` is `m x n`, `b` is
//! `n x p`, `c` is `m x p`. Shapes are validated by the caller; these
//! functions only index.

use crate::element::Element;

/// Naive i-j-k product through temporaries.
///
/// For each output cell, copies row `i` of A and column `j` of B into
/// fresh vectors, multiplies them element-wise into a third vector and
/// reduces that. Allocates `3 * n` elements per cell, `O(m * p * n)`
/// overall. Overwrites `c`.
pub fn naive_ijk<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, p: usize) {
    for i in 0..m {
        for j in 0..p {
            let row: Vec<T> = a[i * n..(i + 1) * n].to_vec();
            let col: Vec<T> = (0..n).map(|k| b[k * p + j]).collect();
            let products: Vec<T> = row.iter().zip(col.iter()).map(|(&x, &y)| x * y).collect();
            c[i * p + j] = products.into_iter().fold(T::zero(), |acc, v| acc + v);
        }
    }
}

/// i-j-k product adding every term straight into `c`: `C += A * B`.
///
/// Each `c[i, j]` is read, modified and written `n` times. The caller
/// decides whether `c` starts zeroed.
pub fn accumulate_ijk<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, p: usize) {
    for i in 0..m {
        for j in 0..p {
            for k in 0..n {
                c[i * p + j] += a[i * n + k] * b[k * p + j];
            }
        }
    }
}

/// i-j-k product summing into a local and storing each cell once.
/// Overwrites `c`.
pub fn local_sum_ijk<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, p: usize) {
    for i in 0..m {
        for j in 0..p {
            let mut sum = T::zero();
            for k in 0..n {
                sum += a[i * n + k] * b[k * p + j];
            }
            c[i * p + j] = sum;
        }
    }
}

/// i-k-j product: `C += A * B`.
///
/// Swapping the j and k loops makes the innermost loop walk rows of both
/// B and C with stride 1.
pub fn accumulate_ikj<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, p: usize) {
    for i in 0..m {
        let c_row = &mut c[i * p..(i + 1) * p];
        for k in 0..n {
            let a_ik = a[i * n + k];
            let b_row = &b[k * p..(k + 1) * p];
            for (c_ij, &b_kj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ik * b_kj;
            }
        }
    }
}

/// Cache-blocked product: `C += A * B`.
///
/// Tiles i, j and k by `block`; tail tiles are clamped to the matrix
/// edge. Each tile accumulates its partial k-sum locally before adding it
/// to `c`.
pub fn accumulate_blocked<T: Element>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    n: usize,
    p: usize,
    block: usize,
) {
    debug_assert!(block > 0);

    for ii in (0..m).step_by(block) {
        let i_end = (ii + block).min(m);
        for kk in (0..n).step_by(block) {
            let k_end = (kk + block).min(n);
            for jj in (0..p).step_by(block) {
                let j_end = (jj + block).min(p);

                for i in ii..i_end {
                    for j in jj..j_end {
                        let mut sum = T::zero();
                        for k in kk..k_end {
                            sum += a[i * n + k] * b[k * p + j];
                        }
                        c[i * p + j] += sum;
                    }
                }
            }
        }
    }
}
