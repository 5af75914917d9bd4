//! Split the interactive floor plan into one SVG per equipment layer.
//!
//! Usage: cargo run --bin extract-equipment

use std::path::Path;
use std::process;

use layercut::{DEFAULT_EQUIPMENT_DIR, DEFAULT_INTERACTIVE_SVG, ExtractOptions, extract_file};
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = extract_file(
        Path::new(DEFAULT_INTERACTIVE_SVG),
        Path::new(DEFAULT_EQUIPMENT_DIR),
        &ExtractOptions::default(),
    ) {
        error!("{}", err);
        process::exit(1);
    }
}
