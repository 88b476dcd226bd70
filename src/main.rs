//! CLI entry point for wave function collapse tile generation

use clap::Parser;
use flexi_logger::Logger;
use log::warn;
use std::sync::atomic::Ordering;
use wavetile::io::cli::{Cli, SampleProcessor};
use wavetile::io::error::invalid_parameter;

fn main() -> wavetile::Result<()> {
    let cli = Cli::parse();

    let spec = cli.log.clone().unwrap_or_else(|| "warn".to_string());
    let _logger = Logger::try_with_str(&spec)
        .and_then(Logger::start)
        .map_err(|e| invalid_parameter("log", &spec, &e))?;

    let processor = SampleProcessor::new(cli);
    let cancel = processor.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
        warn!("Ctrl-C handler unavailable: {e}");
    }

    processor.process()
}
