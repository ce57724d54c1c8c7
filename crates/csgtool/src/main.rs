//! Command-line tool that builds CSG units from primitive shapes.

mod cli;
mod scene;
mod shapes;

fn main() -> eyre::Result<()> {
    use clap::Parser;

    let args = cli::Args::parse();

    color_eyre::install().expect("error initializing panic handler");
    init_logging();

    cli::exec(args)
}

/// Initializes tracing with a filter from `RUST_LOG`, defaulting to warnings.
fn init_logging() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}
