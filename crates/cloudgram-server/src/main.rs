//! Cloudgram CLI entry point.

use std::{env, process};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use cloudgram_server::Args;

fn main() {
    // Panics are reported like every other fatal error
    miette::set_panic_hook();

    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default());
    match args.log_filter(env::var("RUST_LOG").ok().as_deref()) {
        Ok(Some(level)) => {
            logger.filter_level(level);
        }
        Ok(None) => {}
        Err(invalid) => {
            eprintln!("Invalid log level: {invalid}. Using 'warn' instead.");
            logger.filter_level(LevelFilter::Warn);
        }
    }
    logger.init();

    info!(version = env!("CARGO_PKG_VERSION"); "Starting Cloudgram");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = cloudgram_server::run(&args) {
        let mut report = String::new();
        miette::GraphicalReportHandler::new()
            .render_report(&mut report, &err)
            .expect("Writing to String buffer is infallible");

        error!("{report}");
        process::exit(1);
    }

    info!("Cloudgram finished");
}
