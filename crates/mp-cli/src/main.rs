mod cli;
mod globals;

use crate::cli::{BenchArgs, Cli, Command, ReduceArgs};
use crate::globals::{setup_logging, setup_rayon};
use clap::Parser;
use log::{debug, info};
use mp_bench::{render_table, BenchSuite, CountingAlloc, MatrixGenerator, Timing};
use mp_matrix::reduce::{par_sum, sum_col_major, sum_row_major};
use mp_matrix::{KernelKind, Matrix};

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

fn run_bench(args: BenchArgs, threads: Option<usize>) -> anyhow::Result<()> {
    let config = args.config(threads);
    debug!("bench config: {:#?}", config);

    let suite = if args.kernels.is_empty() {
        BenchSuite::new().with_all()
    } else {
        args.kernels
            .into_iter()
            .fold(BenchSuite::new(), |suite, k| suite.with(KernelKind::from(k)))
    };

    let records = suite.run(&config)?;
    println!("{}", render_table(&records));
    Ok(())
}

fn run_reduce(args: ReduceArgs) -> anyhow::Result<()> {
    let m: Matrix<f64> = MatrixGenerator::new(args.seed).uniform(args.rows, args.cols);
    info!("summing a {} matrix", m.shape());

    let mut total = 0.0;
    let row_major = Timing::measure(1, args.iterations, || total = sum_row_major(&m));
    println!("row-major    {:10.3} ms  total = {:.6}", row_major.mean_ms(), total);

    let col_major = Timing::measure(1, args.iterations, || total = sum_col_major(&m));
    println!("column-major {:10.3} ms  total = {:.6}", col_major.mean_ms(), total);

    let chunk = m.cols().max(1);
    let mut par_total = Ok(0.0);
    let parallel = Timing::measure(1, args.iterations, || par_total = par_sum(m.as_slice(), chunk));
    println!("parallel     {:10.3} ms  total = {:.6}", parallel.mean_ms(), par_total?);

    if row_major.mean_ms() > 0.0 {
        println!(
            "column-major / row-major = {:.1}x",
            col_major.mean_ms() / row_major.mean_ms()
        );
    }
    Ok(())
}

fn run_demo() -> anyhow::Result<()> {
    let a = Matrix::<f64>::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
    let b = Matrix::<f64>::from_rows(&[[5.0, 6.0], [7.0, 8.0]])?;

    for kind in KernelKind::REQUIRED {
        let kernel = kind.build::<f64>();
        let c = a.matmul_with(&b, kernel.as_ref())?;
        println!("{:<12} {:?} {:?}", kind.name(), c.row(0), c.row(1));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.g.verbose);
    setup_rayon(cli.g.threads)?;

    match cli.command {
        Command::Bench(args) => run_bench(args, cli.g.threads),
        Command::Reduce(args) => run_reduce(args),
        Command::Demo => run_demo(),
    }
}
