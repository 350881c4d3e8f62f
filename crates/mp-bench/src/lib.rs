//! `mp-bench` - Benchmarking harness for `mp-matrix` kernels.
//!
//! Generates seeded random inputs, times each kernel over repeated calls,
//! counts its heap allocations, checks every product against a reference
//! and renders a comparison table.

pub mod alloc;
pub mod config;
pub mod error;
pub mod random;
pub mod report;
pub mod suite;
pub mod timing;

pub use alloc::{AllocStats, CountingAlloc};
pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use random::MatrixGenerator;
pub use report::render_table;
pub use suite::{BenchRecord, BenchSuite};
pub use timing::Timing;
