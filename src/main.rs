use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use log::{LevelFilter, debug, error, info};

use layercut::{
    AnnotateOptions, ClassMatch, CropOptions, DEFAULT_EQUIPMENT_DIR, DEFAULT_INTERACTIVE_SVG,
    DEFAULT_SOURCE_SVG, EquipmentNames, ExtractOptions, LayercutError, annotate_file, crop_file,
    extract_file, parse_mapping,
};

#[derive(Parser, Debug)]
#[command(name = "layercut")]
#[command(about = "Split, crop and annotate the layers of a composite equipment SVG", long_about = None)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one SVG per layer group, sharing the source's <defs>
    Extract {
        /// Composite SVG to split
        #[arg(short, long, default_value = DEFAULT_INTERACTIVE_SVG)]
        input: PathBuf,

        /// Directory for the equipment files
        #[arg(short, long, default_value = DEFAULT_EQUIPMENT_DIR)]
        output_dir: PathBuf,

        /// Layer to leave out
        #[arg(long, default_value = "Layer_3")]
        background: String,

        /// Extra or replacement layer names (LAYER=NAME)
        #[arg(long = "map", value_name = "LAYER=NAME")]
        mappings: Vec<String>,
    },

    /// Tag the children of every Layer_* group in place
    Annotate {
        /// SVG to rewrite
        #[arg(short, long, default_value = DEFAULT_INTERACTIVE_SVG)]
        input: PathBuf,

        /// Treat any class containing the marker as a substring as already tagged
        #[arg(long)]
        substring_class_match: bool,
    },

    /// Write one tightly cropped SVG per mapped layer
    Crop {
        /// Floor plan to crop from
        #[arg(short, long, default_value = DEFAULT_SOURCE_SVG)]
        input: PathBuf,

        /// Directory for the equipment files
        #[arg(short, long, default_value = DEFAULT_EQUIPMENT_DIR)]
        output_dir: PathBuf,

        /// Margin around each machine, in user units
        #[arg(short, long, default_value = "5")]
        padding: f64,

        /// Extra or replacement layer names (LAYER=NAME)
        #[arg(long = "map", value_name = "LAYER=NAME")]
        mappings: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'info' instead.",
            cli.log_level
        );
        LevelFilter::Info
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(cli:?; "Parsed arguments");

    if let Err(err) = run(cli.command) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), LayercutError> {
    match command {
        Command::Extract {
            input,
            output_dir,
            background,
            mappings,
        } => {
            let options = ExtractOptions {
                background_layer: background,
                names: names_with(&mappings)?,
                ..ExtractOptions::default()
            };
            let report = extract_file(&input, &output_dir, &options)?;
            info!(
                written = report.written.len(),
                skipped = report.skipped.len();
                "Extraction finished"
            );
        }
        Command::Annotate {
            input,
            substring_class_match,
        } => {
            let options = AnnotateOptions {
                class_match: if substring_class_match {
                    ClassMatch::Substring
                } else {
                    ClassMatch::Token
                },
                ..AnnotateOptions::default()
            };
            annotate_file(&input, &options)?;
        }
        Command::Crop {
            input,
            output_dir,
            padding,
            mappings,
        } => {
            let options = CropOptions {
                padding,
                names: names_with(&mappings)?,
            };
            let report = crop_file(&input, &output_dir, &options)?;
            info!(written = report.written.len(); "Cropping finished");
        }
    }
    Ok(())
}

/// Default name table with the command-line overrides applied.
fn names_with(mappings: &[String]) -> Result<EquipmentNames, LayercutError> {
    let mut names = EquipmentNames::default();
    for mapping in mappings {
        let (layer, name) = parse_mapping(mapping)?;
        names.insert(layer, name);
    }
    Ok(names)
}
