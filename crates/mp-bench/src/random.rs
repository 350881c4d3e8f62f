use mp_matrix::{Element, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded source of benchmark inputs.
///
/// The same seed always yields the same sequence of matrices.
pub struct MatrixGenerator {
    rng: StdRng,
}

impl MatrixGenerator {
    /// Create a generator with the given seed for reproducibility.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A `rows x cols` matrix with elements drawn uniformly from `[-1, 1)`.
    pub fn uniform<T: Element>(&mut self, rows: usize, cols: usize) -> Matrix<T> {
        self.uniform_in(rows, cols, -1.0, 1.0)
    }

    /// A `rows x cols` matrix with elements drawn uniformly from `[low, high)`.
    ///
    /// # Panics
    /// Panics if `low >= high`.
    pub fn uniform_in<T: Element>(
        &mut self,
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
    ) -> Matrix<T> {
        let rng = &mut self.rng;
        Matrix::from_fn(rows, cols, |_, _| T::from_f64(rng.gen_range(low..high)))
    }
}
