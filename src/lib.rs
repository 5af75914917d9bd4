//! layercut - split, crop and annotate the layers of a composite equipment SVG
//!
//! The floor-plan SVG holds one `<g id="Layer_N">` group per kind of
//! equipment. This crate turns it into per-equipment files and tags the
//! groups so a web page can make them interactive.

mod annotate;
mod ast;
mod crop;
mod error;
mod extract;
mod geometry;
mod names;
mod parse;
mod path;
mod serialize;

pub use annotate::*;
pub use ast::*;
pub use crop::*;
pub use error::*;
pub use extract::*;
pub use geometry::*;
pub use names::*;
pub use parse::*;
pub use path::*;
pub use serialize::*;

/// Source SVG the extractor and annotator work on by default.
pub const DEFAULT_INTERACTIVE_SVG: &str = "public/images/fitpung_interactive.svg";
/// Unannotated floor plan the cropper works on by default.
pub const DEFAULT_SOURCE_SVG: &str = "public/images/fitpung.svg";
/// Directory equipment files are written to by default.
pub const DEFAULT_EQUIPMENT_DIR: &str = "public/images/equipment";
