//! In-place annotation of files on disk.

use std::fs;

use layercut::{AnnotateOptions, annotate_file, parse_svg};

const PLAN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 1920 1080">
  <defs>
    <style>.st0{fill:#c8c8c8;}</style>
  </defs>
  <g id="Layer_3">
    <image width="1920" height="1080" xlink:href="floor.png"/>
  </g>
  <g id="Layer_4">
    <g class="st0">
      <path d="M0 0h10v10z"/>
    </g>
    <g id="treadmill-b" style="opacity:.5">
      <path d="M20 0h10v10z"/>
    </g>
  </g>
  <g id="Labels">
    <text>Treadmill</text>
  </g>
</svg>
"#;

#[test]
fn test_annotates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    fs::write(&path, PLAN).unwrap();

    let stats = annotate_file(&path, &AnnotateOptions::default()).unwrap();
    // Layer_3, Layer_4, and Layer_4_1: generated ids carry the layer
    // prefix, so a tagged subgroup is visited as a layer in turn
    assert_eq!(stats.layers, 3);
    assert_eq!(stats.children, 4);

    let out = fs::read_to_string(&path).unwrap();
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg "));

    let doc = parse_svg(&out).unwrap();
    let first = doc.element_by_id("Layer_4_1").unwrap();
    assert_eq!(first.get_attr("class"), Some("st0 interactive-machine"));
    assert_eq!(first.get_attr("data-parent-layer"), Some("Layer_4"));

    let second = doc.element_by_id("treadmill-b").unwrap();
    assert_eq!(second.get_attr("style"), Some("opacity:.5"));
    assert_eq!(second.get_attr("class"), Some("interactive-machine"));

    let image = doc.element_by_id("Layer_3_1").unwrap();
    assert!(image.is("image"));

    let nested = doc.element_by_id("Layer_4_1_1").unwrap();
    assert_eq!(nested.get_attr("data-parent-layer"), Some("Layer_4_1"));

    // Styling, prefixes and untouched groups survive
    assert!(out.contains(".st0{fill:#c8c8c8;}"));
    assert!(out.contains(r#"xlink:href="floor.png""#));
    assert!(out.contains("<g id=\"Labels\">\n    <text>Treadmill</text>\n  </g>"));
    assert!(!out.contains("ns0:"));
}

#[test]
fn test_second_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    fs::write(&path, PLAN).unwrap();

    annotate_file(&path, &AnnotateOptions::default()).unwrap();
    let once = fs::read_to_string(&path).unwrap();
    let stats = annotate_file(&path, &AnnotateOptions::default()).unwrap();
    let twice = fs::read_to_string(&path).unwrap();

    assert_eq!(once, twice);
    assert_eq!(stats.ids_assigned, 0);
    assert_eq!(stats.classes_added, 0);
    assert_eq!(twice.matches("interactive-machine interactive-machine").count(), 0);
}

#[test]
fn test_malformed_file_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    let broken = PLAN.replace("</defs>", "");
    fs::write(&path, &broken).unwrap();

    assert!(annotate_file(&path, &AnnotateOptions::default()).is_err());
    assert_eq!(fs::read(&path).unwrap(), broken.as_bytes());
}

#[test]
fn test_no_layers_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    let svg = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <g id=\"Background\"><rect/></g>\n</svg>";
    fs::write(&path, svg).unwrap();

    let stats = annotate_file(&path, &AnnotateOptions::default()).unwrap();
    assert_eq!(stats.layers, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), svg);
}

/// Illustrator exports bind the namespaces through internal DTD entities.
#[test]
fn test_illustrator_entity_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.svg");
    let svg = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
	<!ENTITY ns_svg "http://www.w3.org/2000/svg">
	<!ENTITY ns_xlink "http://www.w3.org/1999/xlink">
]>
<svg version="1.1" xmlns="&ns_svg;" xmlns:xlink="&ns_xlink;" viewBox="0 0 1920 1080">
  <g id="Layer_4"><rect class="st0" width="10" height="10"/></g>
</svg>
"#;
    fs::write(&path, svg).unwrap();

    let stats = annotate_file(&path, &AnnotateOptions::default()).unwrap();
    assert_eq!(stats.layers, 1);
    assert_eq!(stats.ids_assigned, 1);

    let out = fs::read_to_string(&path).unwrap();
    assert!(out.contains("<!ENTITY ns_svg"));
    let doc = parse_svg(&out).unwrap();
    let rect = doc.element_by_id("Layer_4_1").unwrap();
    assert_eq!(rect.get_attr("class"), Some("st0 interactive-machine"));
}
