//! Cut single machines out of the floor plan with a tight `viewBox`.
//!
//! For every mapped layer the first child `<g>` is taken as one machine and
//! the bounds of the shapes inside it become the new document's `viewBox`.
//! Transforms are not applied; the artwork this runs on has none on shapes.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::ast::{Document, Element, SVG_NS, XLINK_NS};
use crate::error::LayercutError;
use crate::geometry::{BBox, Point, path_bounds};
use crate::names::EquipmentNames;
use crate::parse::parse_svg;
use crate::path::parse_path;
use crate::serialize::serialize_element;

/// Cropper settings.
#[derive(Debug, Clone)]
pub struct CropOptions {
    /// Margin added around the machine's bounds, in user units
    pub padding: f64,
    /// Layers to crop, in order, and their output names
    pub names: EquipmentNames,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            padding: 5.0,
            names: EquipmentNames::default(),
        }
    }
}

/// One cropped machine document.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedFragment {
    pub layer_id: String,
    pub name: String,
    /// Padded bounds, i.e. the `viewBox`
    pub view_box: BBox,
    pub svg: String,
}

/// What [`crop_file`] wrote.
#[derive(Debug, Clone, Default)]
pub struct CropReport {
    pub written: Vec<(String, PathBuf)>,
}

/// Crop every mapped layer of `doc`. Layers that are missing or hold no
/// measurable shape are skipped.
pub fn crop_document(doc: &Document, options: &CropOptions) -> Vec<CroppedFragment> {
    let defs = doc
        .first_element_named("defs")
        .map(serialize_element)
        .unwrap_or_default();

    let mut fragments = Vec::new();
    for (layer_id, name) in options.names.iter() {
        let Some(layer) = doc.element_by_id(layer_id) else {
            warn!(layer = layer_id; "Layer {} not found.", layer_id);
            continue;
        };

        let machine = machine_node(layer);
        let Some(bounds) = element_bounds(machine) else {
            warn!(layer = layer_id; "No paths found for {}", name);
            continue;
        };

        let view_box = bounds.padded(options.padding);
        if view_box.width() <= 0.0 || view_box.height() <= 0.0 {
            debug!(layer = layer_id; "Degenerate bounds for {}", name);
            continue;
        }

        let svg = cropped_document(&defs, &serialize_element(machine), &view_box);
        fragments.push(CroppedFragment {
            layer_id: layer_id.to_string(),
            name: name.to_string(),
            view_box,
            svg,
        });
    }
    fragments
}

/// First child `<g>` of the layer, or the layer itself when it has none.
pub fn machine_node(layer: &Element) -> &Element {
    layer
        .child_elements()
        .find(|child| child.is("g"))
        .unwrap_or(layer)
}

/// Union of the bounds of every shape in `elem`'s subtree.
pub fn element_bounds(elem: &Element) -> Option<BBox> {
    let mut bounds: Option<BBox> = None;
    elem.walk(&mut |e| {
        if let Some(b) = shape_bounds(e) {
            bounds = Some(match bounds {
                Some(acc) => acc.union(b),
                None => b,
            });
        }
    });
    bounds
}

/// Bounds of a single basic shape, ignoring its children.
///
/// Missing numeric attributes count as 0; unparsable ones make the shape
/// unmeasurable.
pub fn shape_bounds(elem: &Element) -> Option<BBox> {
    let bbox = match elem.name.local.as_str() {
        "path" => {
            let d = elem.get_attr("d").filter(|d| !d.trim().is_empty())?;
            match parse_path(d) {
                Ok(segments) => path_bounds(&segments)?,
                Err(e) => {
                    debug!("Ignoring path: {}", e);
                    return None;
                }
            }
        }
        "rect" => {
            let x = number_attr(elem, "x")?;
            let y = number_attr(elem, "y")?;
            let w = number_attr(elem, "width")?;
            let h = number_attr(elem, "height")?;
            BBox::from_points([Point::new(x, y), Point::new(x + w, y + h)])?
        }
        "circle" => {
            let cx = number_attr(elem, "cx")?;
            let cy = number_attr(elem, "cy")?;
            let r = number_attr(elem, "r")?.abs();
            BBox::from_points([Point::new(cx - r, cy - r), Point::new(cx + r, cy + r)])?
        }
        "line" => {
            // No default here: a line needs all four coordinates
            let coord = |name: &str| elem.get_attr(name).and_then(leading_number);
            BBox::from_points([
                Point::new(coord("x1")?, coord("y1")?),
                Point::new(coord("x2")?, coord("y2")?),
            ])?
        }
        "polyline" | "polygon" => BBox::from_points(parse_points(elem.get_attr("points")?)?)?,
        _ => return None,
    };
    bbox.is_finite().then_some(bbox)
}

fn number_attr(elem: &Element, name: &str) -> Option<f64> {
    match elem.get_attr(name) {
        None | Some("") => Some(0.0),
        Some(value) => leading_number(value),
    }
}

/// Numeric prefix of `s`, so `"12px"` reads as 12.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let candidate_len = s
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(s.len());
    (1..=candidate_len)
        .rev()
        .find_map(|len| s[..len].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Coordinate pairs of a `points` attribute; a dangling coordinate is dropped.
fn parse_points(points: &str) -> Option<Vec<Point>> {
    let numbers = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    Some(
        numbers
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect(),
    )
}

/// Standalone document for one cropped machine.
pub fn cropped_document(defs: &str, node: &str, view_box: &BBox) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg xmlns=\"{svg_ns}\" xmlns:xlink=\"{xlink_ns}\" viewBox=\"{} {} {} {}\">\n  \
         {defs}\n  \
         {node}\n\
         </svg>",
        view_box.min_x,
        view_box.min_y,
        view_box.width(),
        view_box.height(),
        svg_ns = SVG_NS,
        xlink_ns = XLINK_NS,
    )
}

/// Read `input`, crop every mapped layer and write the results under
/// `output_dir`.
pub fn crop_file(
    input: &Path,
    output_dir: &Path,
    options: &CropOptions,
) -> Result<CropReport, LayercutError> {
    let source = fs::read_to_string(input)?;
    fs::create_dir_all(output_dir)?;
    let doc = parse_svg(&source)?;

    let fragments = crop_document(&doc, options);
    let layers: Vec<&str> = fragments.iter().map(|f| f.layer_id.as_str()).collect();
    options.names.warn_shared_names(&layers);

    let mut report = CropReport::default();
    for fragment in fragments {
        let path = output_dir.join(format!("{}.svg", fragment.name));
        fs::write(&path, &fragment.svg)?;
        let vb = fragment.view_box;
        info!(
            layer = fragment.layer_id.as_str();
            "Saved SINGLE {} to {} (ViewBox: {:.1} {:.1} {:.1} {:.1})",
            fragment.name,
            path.display(),
            vb.min_x,
            vb.min_y,
            vb.width(),
            vb.height()
        );
        report.written.push((fragment.layer_id, path));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        parse_svg(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg">{}</svg>"#,
            body
        ))
        .unwrap()
    }

    fn only(names: &[(&str, &str)]) -> CropOptions {
        CropOptions {
            names: EquipmentNames::from_pairs(names.iter().copied()).unwrap(),
            ..CropOptions::default()
        }
    }

    #[test]
    fn test_crop_rect_machine() {
        let d = doc(
            r#"<g id="Layer_4"><g id="m1"><rect x="10" y="20" width="30" height="40"/></g><g id="m2"><rect x="500" y="500" width="1" height="1"/></g></g>"#,
        );
        let fragments = crop_document(&d, &only(&[("Layer_4", "Treadmill")]));
        assert_eq!(fragments.len(), 1);
        let f = &fragments[0];
        assert_eq!(f.name, "Treadmill");
        assert!(f.svg.contains(r#"viewBox="5 15 40 50""#), "{}", f.svg);
        assert!(f.svg.contains(r#"<g id="m1">"#));
        assert!(!f.svg.contains("m2"));
    }

    #[test]
    fn test_layer_without_subgroup_is_its_own_machine() {
        let d = doc(
            r#"<g id="Layer_5"><circle cx="10" cy="10" r="5"/><line x1="0" y1="0" x2="30" y2="2"/></g>"#,
        );
        let fragments = crop_document(&d, &only(&[("Layer_5", "Bench")]));
        assert_eq!(
            fragments[0].view_box,
            BBox {
                min_x: -5.0,
                min_y: -5.0,
                max_x: 35.0,
                max_y: 20.0,
            }
        );
        assert!(fragments[0].svg.contains(r#"<g id="Layer_5">"#));
    }

    #[test]
    fn test_defs_copied() {
        let d = doc(
            r#"<g id="Layer_4"><path d="M0 0 L10 10"/></g><defs><linearGradient id="grad"/></defs>"#,
        );
        let fragments = crop_document(&d, &only(&[("Layer_4", "Treadmill")]));
        assert!(fragments[0].svg.contains(r#"<defs><linearGradient id="grad"/></defs>"#));
    }

    #[test]
    fn test_missing_and_empty_layers_skipped() {
        let d = doc(r#"<g id="Layer_4"><g><text>label</text></g></g>"#);
        let fragments = crop_document(&d, &only(&[("Layer_4", "A"), ("Layer_9", "B")]));
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_broken_path_ignored() {
        let d = doc(r#"<g id="Layer_4"><path d="Q oops"/><rect width="4" height="4"/></g>"#);
        let fragments = crop_document(&d, &only(&[("Layer_4", "A")]));
        assert!(fragments[0].svg.contains(r#"viewBox="-5 -5 14 14""#));
    }

    #[test]
    fn test_shape_bounds_attribute_rules() {
        let d = doc(
            r#"<rect id="r" width="10px" height="5"/><line id="l" x1="1" y1="1" x2="2"/><polygon id="p" points="0,0 10,5 3"/><rect id="bad" x="abc"/>"#,
        );
        assert_eq!(
            shape_bounds(d.element_by_id("r").unwrap()),
            Some(BBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 10.0,
                max_y: 5.0
            })
        );
        assert_eq!(shape_bounds(d.element_by_id("l").unwrap()), None);
        assert_eq!(
            shape_bounds(d.element_by_id("p").unwrap()),
            Some(BBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 10.0,
                max_y: 5.0
            })
        );
        assert_eq!(shape_bounds(d.element_by_id("bad").unwrap()), None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12px"), Some(12.0));
        assert_eq!(leading_number(" -3.5e1x"), Some(-35.0));
        assert_eq!(leading_number("1e"), Some(1.0));
        assert_eq!(leading_number("px"), None);
    }
}
