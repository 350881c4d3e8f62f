use anyhow::Context;
use env_logger::Env;

/// Map `-v` count to a log filter; `RUST_LOG` still wins when set.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn setup_logging(verbose: u8) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(verbose)))
        .format_timestamp_millis()
        .try_init();
}

/// Configure the global rayon pool. Only the first call has any effect.
pub fn setup_rayon(threads: Option<usize>) -> anyhow::Result<()> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build_global()
        .context("failed to build global thread pool")
}
