//! Tag the children of every layer group in the interactive floor plan.
//!
//! Usage: cargo run --bin process-svg-ids

use std::path::Path;
use std::process;

use layercut::{AnnotateOptions, DEFAULT_INTERACTIVE_SVG, LayercutError, annotate_file};
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match annotate_file(Path::new(DEFAULT_INTERACTIVE_SVG), &AnnotateOptions::default()) {
        Ok(_) => {}
        Err(err @ (LayercutError::XmlParse(_) | LayercutError::InvalidSvg(_))) => {
            error!("XML Parse Error: {}", err);
            process::exit(1);
        }
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}
