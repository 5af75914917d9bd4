//! Split a composite SVG into one standalone file per layer group.
//!
//! Layers are located by scanning the raw text for `<g id="Layer_N"`, not by
//! parsing. This only works when layers are not nested and appear in
//! document order: each layer's content runs from its own start tag up to
//! the next layer's start tag, and the last one up to the final `</svg>`.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::info;
use regex::Regex;

use crate::ast::{SVG_NS, XLINK_NS};
use crate::error::LayercutError;
use crate::names::EquipmentNames;

static DEFS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<defs>.*?</defs>").expect("defs pattern is valid"));

static LAYER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<g id="(Layer_\d+)""#).expect("layer pattern is valid"));

const EMPTY_DEFS: &str = "<defs></defs>";
const SVG_CLOSE: &str = "</svg>";

/// Extractor settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Layer left out of the output (the floor plan itself)
    pub background_layer: String,
    /// `viewBox` of every generated document
    pub view_box: String,
    pub names: EquipmentNames,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            background_layer: "Layer_3".into(),
            view_box: "0 0 1920 1080".into(),
            names: EquipmentNames::default(),
        }
    }
}

/// A layer located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSlice {
    pub id: String,
    /// Byte range of the layer's raw content in the source
    pub range: Range<usize>,
}

/// One generated equipment document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub layer_id: String,
    /// File stem, without the `.svg` extension
    pub name: String,
    pub svg: String,
}

/// In-memory result of an extraction.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Fragments in document order; names may repeat
    pub fragments: Vec<Fragment>,
    /// Layers that were skipped as background
    pub skipped: Vec<String>,
}

/// What [`extract_file`] wrote.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// Every write in order; a path appears twice when two layers share a name
    pub written: Vec<(String, PathBuf)>,
    pub skipped: Vec<String>,
}

/// The first `<defs>…</defs>` block, or an empty placeholder.
pub fn shared_defs(source: &str) -> &str {
    DEFS_RE
        .find(source)
        .map_or(EMPTY_DEFS, |m| m.as_str())
}

/// Locate every layer group in document order.
pub fn split_layers(source: &str) -> Vec<LayerSlice> {
    let starts: Vec<(usize, &str)> = LAYER_RE
        .captures_iter(source)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str())))
        .collect();

    let doc_end = source.rfind(SVG_CLOSE).unwrap_or(source.len());

    starts
        .iter()
        .enumerate()
        .map(|(i, &(start, id))| {
            let end = starts.get(i + 1).map_or(doc_end, |&(next, _)| next);
            LayerSlice {
                id: id.to_string(),
                // A closing tag before the last layer leaves it empty
                range: start..end.max(start),
            }
        })
        .collect()
}

/// Wrap a layer's raw content into a standalone SVG document.
pub fn fragment_document(defs: &str, layer_content: &str, view_box: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg xmlns=\"{svg_ns}\" xmlns:xlink=\"{xlink_ns}\" viewBox=\"{view_box}\">\n  \
         {defs}\n\
         {layer_content}</svg>",
        svg_ns = SVG_NS,
        xlink_ns = XLINK_NS,
    )
}

/// Build every equipment fragment of `source` without touching the disk.
pub fn extract_fragments(source: &str, options: &ExtractOptions) -> Extraction {
    let defs = shared_defs(source);
    let mut extraction = Extraction::default();

    for layer in split_layers(source) {
        if layer.id == options.background_layer {
            info!(layer = layer.id.as_str(); "Skipping {} (Background Map)", layer.id);
            extraction.skipped.push(layer.id);
            continue;
        }

        let name = options.names.resolve(&layer.id).into_owned();
        let svg = fragment_document(defs, &source[layer.range.clone()], &options.view_box);
        extraction.fragments.push(Fragment {
            layer_id: layer.id,
            name,
            svg,
        });
    }

    extraction
}

/// Read `input`, extract its layers and write them under `output_dir`.
///
/// Existing files are overwritten. When two layers resolve to the same
/// name the later layer's file is the one left on disk.
pub fn extract_file(
    input: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport, LayercutError> {
    let source = fs::read_to_string(input)?;
    fs::create_dir_all(output_dir)?;

    let extraction = extract_fragments(&source, options);
    let layers: Vec<&str> = extraction
        .fragments
        .iter()
        .map(|f| f.layer_id.as_str())
        .collect();
    options.names.warn_shared_names(&layers);

    let mut report = ExtractReport {
        skipped: extraction.skipped,
        ..ExtractReport::default()
    };

    for fragment in extraction.fragments {
        let path = output_dir.join(format!("{}.svg", fragment.name));
        fs::write(&path, &fragment.svg)?;
        info!(
            layer = fragment.layer_id.as_str();
            "Extracted {} to {}",
            fragment.name,
            path.display()
        );
        report.written.push((fragment.layer_id, path));
    }

    Ok(report)
}
