use pricefit_core::cmd::cli::Cli;
use pricefit_core::cmd::config::Config;

use clap::Parser;
use env_logger::{Builder, Env};
use std::process;

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).format_timestamp(None).init();

    let cli = Cli::parse();
    let mut cfg: Config = cli.into_config();
    if let Err(e) = cfg.run() {
        eprintln!("{e}");
        process::exit(1);
    }
}
