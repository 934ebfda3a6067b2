use candle_core::Device;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphgan::scorer::{eval, Args};

// cargo run --bin scorer -- --data_dir data/movielens --log_dir log/movielens
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let device = Device::cuda_if_available(0)?;
    eval(&args, &device)?;
    Ok(())
}
