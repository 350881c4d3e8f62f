use crate::error::{BenchError, Result};

/// Parameters for a benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Square matrix sizes to run, in order.
    pub sizes: Vec<usize>,
    /// Untimed calls per kernel before measuring.
    pub warmup: usize,
    /// Timed calls per kernel.
    pub iterations: usize,
    /// Seed for the input generator.
    pub seed: u64,
    /// Maximum relative error tolerated against the reference product.
    pub tolerance: f64,
    /// Tile edge for the blocked kernel.
    pub block: usize,
    /// Worker threads for the parallel kernel (0 = global pool).
    pub threads: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            sizes: vec![64, 128, 256],
            warmup: 1,
            iterations: 3,
            seed: 42,
            tolerance: 1e-9,
            block: mp_matrix::cpu::DEFAULT_BLOCK,
            threads: 0,
        }
    }
}

impl BenchConfig {
    /// Check that the configuration describes a runnable benchmark.
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::InvalidConfig("no sizes given".to_string()));
        }
        if self.sizes.contains(&0) {
            return Err(BenchError::InvalidConfig("sizes must be > 0".to_string()));
        }
        if self.iterations == 0 {
            return Err(BenchError::InvalidConfig(
                "iterations must be > 0".to_string(),
            ));
        }
        if self.block == 0 {
            return Err(BenchError::InvalidConfig("block must be > 0".to_string()));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(BenchError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
