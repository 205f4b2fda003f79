use anyhow::Result;
use clap::Parser;
use kernfold_cli::{pipeline, Args};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    pipeline::run(&args, &mut stdout.lock(), &mut stderr.lock())
}
