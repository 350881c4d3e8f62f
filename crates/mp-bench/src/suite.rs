use approx::RelativeEq;
use log::{debug, info};
use mp_matrix::{BlockedKernel, DType, KernelKind, LocalSumKernel, MatmulKernel, Matrix};

use crate::alloc::{self, AllocStats};
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::random::MatrixGenerator;
use crate::timing::Timing;

/// One kernel measured at one size.
#[derive(Debug, Clone)]
pub struct BenchRecord {
    pub kernel: String,
    pub size: usize,
    pub dtype: DType,
    pub timing: Timing,
    /// Heap traffic of one call writing into an existing output matrix.
    /// `None` unless [`CountingAlloc`](crate::CountingAlloc) is the global
    /// allocator.
    pub allocs: Option<AllocStats>,
    pub gflops: f64,
    /// Mean time of the first kernel in the suite divided by this kernel's.
    pub speedup: f64,
}

/// An ordered set of kernels compared against each other.
///
/// The first kernel is the baseline for speedups.
#[derive(Debug, Clone, Default)]
pub struct BenchSuite {
    kinds: Vec<KernelKind>,
}

impl BenchSuite {
    /// Create a new empty suite.
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Add a kernel to the end of the suite. Duplicates are ignored.
    pub fn with(mut self, kind: KernelKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    /// Add every built-in kernel.
    pub fn with_all(self) -> Self {
        KernelKind::ALL.iter().fold(self, |suite, &k| suite.with(k))
    }

    pub fn kinds(&self) -> &[KernelKind] {
        &self.kinds
    }

    fn build(kind: KernelKind, config: &BenchConfig) -> Result<Box<dyn MatmulKernel<f64>>> {
        let kernel: Box<dyn MatmulKernel<f64>> = match kind {
            KernelKind::Blocked => Box::new(BlockedKernel::new(config.block)?),
            #[cfg(feature = "parallel")]
            KernelKind::Parallel => Box::new(mp_matrix::ParallelKernel::new(config.threads)?),
            other => other.build::<f64>(),
        };
        Ok(kernel)
    }

    /// Run every kernel at every configured size.
    ///
    /// Inputs are `N x N` matrices drawn from a generator seeded with
    /// `config.seed`. Each kernel's product is checked against the
    /// local-sum reference before it is timed.
    pub fn run(&self, config: &BenchConfig) -> Result<Vec<BenchRecord>> {
        config.validate()?;
        if self.kinds.is_empty() {
            return Err(BenchError::InvalidConfig("no kernels selected".to_string()));
        }

        let kernels = self
            .kinds
            .iter()
            .map(|&k| Self::build(k, config))
            .collect::<Result<Vec<_>>>()?;

        let mut generator = MatrixGenerator::new(config.seed);
        let mut records = Vec::with_capacity(config.sizes.len() * kernels.len());

        for &size in &config.sizes {
            info!("benchmarking {} kernels at {}x{}", kernels.len(), size, size);
            let a: Matrix<f64> = generator.uniform(size, size);
            let b: Matrix<f64> = generator.uniform(size, size);
            let reference = LocalSumKernel.matmul(&a, &b)?;

            let mut baseline_ms = None;
            for kernel in &kernels {
                let mut c = Matrix::zeros(size, size);
                kernel.matmul_into(&a, &b, &mut c)?;
                if !c.relative_eq(&reference, config.tolerance, config.tolerance) {
                    return Err(BenchError::Mismatch {
                        kernel: kernel.name().to_string(),
                        size,
                    });
                }

                let (result, allocs) = alloc::measure(|| kernel.matmul_into(&a, &b, &mut c));
                result?;

                let mut failure = None;
                let timing = Timing::measure(config.warmup, config.iterations, || {
                    if let Err(e) = kernel.matmul_into(&a, &b, &mut c) {
                        failure.get_or_insert(e);
                    }
                });
                if let Some(e) = failure {
                    return Err(e.into());
                }

                let mean_ms = timing.mean_ms();
                let baseline = *baseline_ms.get_or_insert(mean_ms);
                let speedup = if mean_ms > 0.0 { baseline / mean_ms } else { 1.0 };
                let gflops = timing.gflops(size, size, size);
                debug!(
                    "{} @ {}: {:.3} ms, {:.2} GFLOPS, {:.1}x",
                    kernel.name(),
                    size,
                    mean_ms,
                    gflops,
                    speedup
                );

                records.push(BenchRecord {
                    kernel: kernel.name().to_string(),
                    size,
                    dtype: a.dtype(),
                    timing,
                    allocs,
                    gflops,
                    speedup,
                });
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchConfig {
        BenchConfig {
            sizes: vec![4, 9],
            warmup: 0,
            iterations: 2,
            block: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_builder_dedups() {
        let suite = BenchSuite::new()
            .with(KernelKind::Naive)
            .with(KernelKind::LocalSum)
            .with(KernelKind::Naive);
        assert_eq!(suite.kinds(), &[KernelKind::Naive, KernelKind::LocalSum]);
        assert_eq!(BenchSuite::new().with_all().kinds(), KernelKind::ALL);
    }

    #[test]
    fn test_run_records() {
        let suite = BenchSuite::new().with_all();
        let records = suite.run(&small_config()).unwrap();
        assert_eq!(records.len(), 2 * KernelKind::ALL.len());

        assert_eq!(records[0].kernel, "naive");
        assert_eq!(records[0].size, 4);
        assert_eq!(records[0].speedup, 1.0);
        assert_eq!(records.last().map(|r| r.size), Some(9));
        for r in &records {
            assert_eq!(r.timing.samples().len(), 2);
            assert!(r.gflops >= 0.0);
            assert_eq!(r.dtype, DType::F64);
            // unit tests run on the system allocator
            assert_eq!(r.allocs, None);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_run_with_dedicated_pool() {
        let config = BenchConfig {
            threads: 2,
            ..small_config()
        };
        let records = BenchSuite::new()
            .with(KernelKind::LocalSum)
            .with(KernelKind::Parallel)
            .run(&config)
            .unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].kernel, "parallel");
    }

    #[test]
    fn test_empty_suite() {
        assert!(matches!(
            BenchSuite::new().run(&small_config()),
            Err(BenchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BenchConfig {
            iterations: 0,
            ..small_config()
        };
        assert!(matches!(
            BenchSuite::new().with(KernelKind::Naive).run(&config),
            Err(BenchError::InvalidConfig(_))
        ));
    }
}
