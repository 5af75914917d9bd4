//! SVG serialization back to XML text.
//!
//! Output keeps element names, attribute order and text exactly as parsed;
//! only escaping is normalised.

use crate::ast::*;

/// Serialization options.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Emit `<?xml version="..." encoding="UTF-8"?>` even when the source had none
    pub xml_declaration: bool,
    /// Emit the source DOCTYPE, if any
    pub doctype: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            doctype: true,
        }
    }
}

/// Serialize a Document to an SVG string.
pub fn serialize(doc: &Document, options: &WriteOptions) -> String {
    let mut out = String::new();

    if options.xml_declaration {
        let version = doc
            .xml_declaration
            .as_ref()
            .map_or("1.0", |decl| decl.version.as_str());
        out.push_str("<?xml version=\"");
        out.push_str(version);
        out.push_str("\" encoding=\"UTF-8\"");
        if let Some(standalone) = doc.xml_declaration.as_ref().and_then(|d| d.standalone) {
            out.push_str(" standalone=\"");
            out.push_str(if standalone { "yes" } else { "no" });
            out.push('"');
        }
        out.push_str("?>\n");
    }

    if options.doctype {
        if let Some(ref dt) = doc.doctype {
            out.push_str("<!DOCTYPE ");
            out.push_str(dt);
            out.push_str(">\n");
        }
    }

    write_element(&mut out, &doc.root);
    out
}

/// Serialize a single element and its subtree.
pub fn serialize_element(elem: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, elem);
    out
}

fn write_element(out: &mut String, elem: &Element) {
    out.push('<');
    out.push_str(&elem.name.full_name());

    for attr in &elem.attributes {
        out.push(' ');
        out.push_str(&attr.name.full_name());
        out.push_str("=\"");
        push_escaped_attr(out, &attr.value);
        out.push('"');
    }

    if elem.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &elem.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&elem.name.full_name());
    out.push('>');
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(elem) => write_element(out, elem),
        Node::Text(text) => push_escaped_text(out, text),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction { target, content } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(c) = content {
                out.push(' ');
                out.push_str(c);
            }
            out.push_str("?>");
        }
    }
}

fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_text(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
