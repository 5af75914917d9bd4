//! Tag the children of every `Layer_*` group for front-end interactivity.
//!
//! Each direct child of a layer gets a stable `id` (only when it has none),
//! a marker class appended to whatever classes it already has, and a
//! `data-parent-layer` back-reference. Running the pass twice changes
//! nothing the second time.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::ast::{Document, Element, SVG_NS};
use crate::error::LayercutError;
use crate::parse::parse_svg;
use crate::serialize::{WriteOptions, serialize};

/// How an existing `class` attribute is searched for the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassMatch {
    /// Whitespace-separated class tokens; `xinteractive-machine` does not count
    #[default]
    Token,
    /// Raw substring containment, as the page's original tooling did
    Substring,
}

/// Annotator settings.
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Groups whose `id` starts with this prefix are layers
    pub layer_prefix: String,
    /// Class appended to every layer child
    pub class_token: String,
    /// Attribute naming the enclosing layer
    pub parent_attr: String,
    pub class_match: ClassMatch,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            layer_prefix: "Layer_".into(),
            class_token: "interactive-machine".into(),
            parent_attr: "data-parent-layer".into(),
            class_match: ClassMatch::default(),
        }
    }
}

/// Counts of what a pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateStats {
    pub layers: usize,
    pub children: usize,
    pub ids_assigned: usize,
    pub classes_added: usize,
}

/// Annotate every layer group of `doc` in place.
pub fn annotate_document(doc: &mut Document, options: &AnnotateOptions) -> AnnotateStats {
    let mut stats = AnnotateStats::default();

    doc.for_each_element_mut(|elem, scope| {
        if !elem.is("g") || elem.namespace(scope) != Some(SVG_NS) {
            return;
        }
        let Some(layer_id) = elem
            .get_attr("id")
            .filter(|id| id.starts_with(options.layer_prefix.as_str()))
            .map(str::to_string)
        else {
            return;
        };

        stats.layers += 1;
        annotate_layer(elem, &layer_id, options, &mut stats);
    });

    stats
}

fn annotate_layer(
    layer: &mut Element,
    layer_id: &str,
    options: &AnnotateOptions,
    stats: &mut AnnotateStats,
) {
    for (index, child) in layer.child_elements_mut().enumerate() {
        let counter = index + 1;

        if child.get_attr("id").is_none_or(str::is_empty) {
            child.set_attr("id", format!("{}_{}", layer_id, counter));
            stats.ids_assigned += 1;
        }

        let existing = child.get_attr("class").unwrap_or("");
        if !has_class(existing, &options.class_token, options.class_match) {
            let class = format!("{} {}", existing, options.class_token)
                .trim()
                .to_string();
            child.set_attr("class", class);
            stats.classes_added += 1;
        }

        child.set_attr(options.parent_attr.as_str(), layer_id);
        stats.children += 1;
    }

    debug!(layer = layer_id; "Annotated layer children");
}

/// Whether `class_attr` already carries `token`.
pub fn has_class(class_attr: &str, token: &str, mode: ClassMatch) -> bool {
    match mode {
        ClassMatch::Token => class_attr.split_whitespace().any(|c| c == token),
        ClassMatch::Substring => class_attr.contains(token),
    }
}

/// Parse, annotate and re-serialize an SVG string.
pub fn annotate_str(
    source: &str,
    options: &AnnotateOptions,
) -> Result<(String, AnnotateStats), LayercutError> {
    let mut doc = parse_svg(source)?;
    let stats = annotate_document(&mut doc, options);
    Ok((serialize(&doc, &WriteOptions::default()), stats))
}

/// Annotate the SVG at `path` in place.
///
/// Nothing is written when the file is not well-formed XML.
pub fn annotate_file(path: &Path, options: &AnnotateOptions) -> Result<AnnotateStats, LayercutError> {
    let source = fs::read_to_string(path)?;
    let (output, stats) = annotate_str(&source, options)?;
    fs::write(path, output)?;

    info!(
        layers = stats.layers,
        ids_assigned = stats.ids_assigned,
        classes_added = stats.classes_added;
        "Processed SVG IDs and Classes while preserving styles."
    );
    Ok(stats)
}
