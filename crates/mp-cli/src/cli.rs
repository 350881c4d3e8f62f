use clap::{Args, Parser, Subcommand, ValueEnum};
use mp_bench::BenchConfig;
use mp_matrix::KernelKind;

#[derive(Parser, Debug)]
#[command(
    name = "matperf",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compare matrix-multiplication loop nests and reductions."
)]
pub struct Cli {
    #[command(flatten)]
    pub g: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Worker threads for the global rayon pool and the parallel kernel's
    /// own pool (default: one per core)
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    // verbosity (-v, -vv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Time every selected kernel on random square matrices
    Bench(BenchArgs),
    /// Time row-major vs column-major summation
    Reduce(ReduceArgs),
    /// Multiply [[1,2],[3,4]] by [[5,6],[7,8]] with each required kernel
    Demo,
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Square sizes to run
    #[arg(short, long, value_delimiter = ',', default_values_t = [64, 128, 256])]
    pub sizes: Vec<usize>,

    /// Timed calls per kernel
    #[arg(short, long, default_value_t = 3)]
    pub iterations: usize,

    /// Untimed calls per kernel
    #[arg(short, long, default_value_t = 1)]
    pub warmup: usize,

    /// Seed for the input generator
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Kernels to compare, first is the baseline (default: all)
    #[arg(short, long = "kernel", value_enum)]
    pub kernels: Vec<KernelArg>,

    /// Tile edge for the blocked kernel
    #[arg(short, long, default_value_t = mp_matrix::cpu::DEFAULT_BLOCK)]
    pub block: usize,
}

impl BenchArgs {
    /// Benchmark configuration for these arguments. `threads` is the global
    /// `--threads` value; unset keeps the parallel kernel on the global pool.
    pub fn config(&self, threads: Option<usize>) -> BenchConfig {
        BenchConfig {
            sizes: self.sizes.clone(),
            warmup: self.warmup,
            iterations: self.iterations,
            seed: self.seed,
            block: self.block,
            threads: threads.unwrap_or(0),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ReduceArgs {
    #[arg(long, default_value_t = 2048)]
    pub rows: usize,

    #[arg(long, default_value_t = 2048)]
    pub cols: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(short, long, default_value_t = 5)]
    pub iterations: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum KernelArg {
    Naive,
    Accumulate,
    #[value(alias = "local")]
    LocalSum,
    Ikj,
    Blocked,
    #[value(alias = "mt")]
    Parallel,
}

impl From<KernelArg> for KernelKind {
    fn from(arg: KernelArg) -> Self {
        match arg {
            KernelArg::Naive => KernelKind::Naive,
            KernelArg::Accumulate => KernelKind::Accumulate,
            KernelArg::LocalSum => KernelKind::LocalSum,
            KernelArg::Ikj => KernelKind::Ikj,
            KernelArg::Blocked => KernelKind::Blocked,
            KernelArg::Parallel => KernelKind::Parallel,
        }
    }
}
