use std::time::{Duration, Instant};

/// Wall-clock samples from repeated calls of one workload.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    samples: Vec<Duration>,
}

impl Timing {
    pub fn from_samples(samples: Vec<Duration>) -> Self {
        Timing { samples }
    }

    /// Run `f` `warmup` times untimed, then `iterations` times timed.
    pub fn measure<F: FnMut()>(warmup: usize, iterations: usize, mut f: F) -> Self {
        for _ in 0..warmup {
            f();
        }

        let mut samples = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let start = Instant::now();
            f();
            samples.push(start.elapsed());
        }
        Timing { samples }
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    pub fn min(&self) -> Duration {
        self.samples.iter().copied().min().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.samples.iter().copied().max().unwrap_or_default()
    }

    pub fn mean(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    pub fn median(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted = self.samples.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2
        } else {
            sorted[mid]
        }
    }

    /// Population standard deviation in seconds.
    pub fn stddev_secs(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean().as_secs_f64();
        let var = self
            .samples
            .iter()
            .map(|s| (s.as_secs_f64() - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64;
        var.sqrt()
    }

    /// Mean time in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        self.mean().as_secs_f64() * 1000.0
    }

    /// Throughput of an `[m x n] @ [n x p]` product at the mean time.
    ///
    /// Counts `2 * m * n * p` floating-point operations.
    pub fn gflops(&self, m: usize, n: usize, p: usize) -> f64 {
        let secs = self.mean().as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        2.0 * (m * n * p) as f64 / secs / 1e9
    }
}
