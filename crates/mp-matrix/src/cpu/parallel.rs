//! Row-parallel matmul on the rayon pool.

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::kernel::{check_matmul, MatmulKernel};
use crate::matrix::Matrix;

/// Splits the output into disjoint bands of rows and computes each band
/// with the local-accumulate loop on a rayon worker.
///
/// `threads == 0` runs on the current (global) rayon pool. Any other
/// value builds a dedicated pool of that size once, in [`ParallelKernel::new`];
/// clones share it.
#[derive(Debug, Clone, Default)]
pub struct ParallelKernel {
    threads: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl ParallelKernel {
    /// # Errors
    /// Returns [`MatrixError::ThreadPool`] if the dedicated pool cannot be built.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Ok(Self::default());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mp-matmul-{}", i))
            .build()
            .map_err(|e| MatrixError::ThreadPool(e.to_string()))?;
        debug!("parallel kernel: dedicated pool of {} threads", threads);
        Ok(ParallelKernel {
            threads,
            pool: Some(Arc::new(pool)),
        })
    }

    /// Requested worker count; 0 means the current rayon pool.
    pub fn threads(&self) -> usize {
        self.threads
    }
}

/// Rows per task: aim for a few tasks per worker, never fewer than one row.
fn rows_per_band(m: usize, workers: usize) -> usize {
    (m / (workers.max(1) * 4)).max(1)
}

fn run_bands<T: Element>(a: &[T], b: &[T], c: &mut [T], m: usize, n: usize, p: usize) {
    let band = rows_per_band(m, rayon::current_num_threads());
    c.par_chunks_mut(band * p)
        .enumerate()
        .for_each(|(band_idx, c_band)| {
            let first_row = band_idx * band;
            let rows = c_band.len() / p;
            for r in 0..rows {
                let i = first_row + r;
                for j in 0..p {
                    let mut sum = T::zero();
                    for k in 0..n {
                        sum += a[i * n + k] * b[k * p + j];
                    }
                    c_band[r * p + j] = sum;
                }
            }
        });
}

impl<T: Element> MatmulKernel<T> for ParallelKernel {
    fn name(&self) -> &str {
        "parallel"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        if c.shape().is_empty() {
            return Ok(());
        }
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        let (a, b, c) = (a.as_slice(), b.as_slice(), c.as_mut_slice());

        match &self.pool {
            Some(pool) => pool.install(|| run_bands(a, b, c, m, n, p)),
            None => run_bands(a, b, c, m, n, p),
        }
        Ok(())
    }
}
