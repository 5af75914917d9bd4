//! SVG parsing from XML.
//!
//! The parser keeps every text node, whitespace included, so a parsed
//! document serializes back with its original layout.

use std::collections::HashMap;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::ast::*;
use crate::error::LayercutError;

// Internal general entities only; parameter and external entities are skipped
static ENTITY_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
        .expect("entity declaration pattern is valid")
});

/// General entities declared in the DOCTYPE's internal subset.
///
/// Illustrator exports declare the namespace URIs this way
/// (`<!ENTITY ns_svg "http://www.w3.org/2000/svg">`) and reference them
/// from attributes, so they must resolve like the predefined ones.
#[derive(Debug, Default)]
struct Entities {
    values: HashMap<String, String>,
}

impl Entities {
    fn from_doctype(doctype: &str) -> Self {
        let mut values: HashMap<String, String> = HashMap::new();
        for caps in ENTITY_DECL_RE.captures_iter(doctype) {
            let (Some(name), Some(value)) = (caps.get(1), caps.get(2).or(caps.get(3))) else {
                continue;
            };
            // The first declaration is binding
            if values.contains_key(name.as_str()) {
                continue;
            }
            // References to earlier entities are expanded once, here
            let expanded = unescape_with(value.as_str(), |n| {
                values
                    .get(n)
                    .map(String::as_str)
                    .or_else(|| resolve_predefined_entity(n))
            })
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.as_str().to_string());
            values.insert(name.as_str().to_string(), expanded);
        }
        Self { values }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    }
}

/// Parse an SVG string into a Document.
///
/// Anything that is not well-formed XML is rejected: unbalanced tags,
/// undefined entities, text or a second element after the root.
pub fn parse_svg(svg: &str) -> Result<Document, LayercutError> {
    let mut reader = Reader::from_str(svg);

    let mut xml_declaration = None;
    let mut doctype = None;
    let mut root = None;
    let mut entities = Entities::default();

    loop {
        match reader.read_event()? {
            Event::Decl(decl) => {
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl.standalone().transpose().ok().flatten().map(|s| {
                        let s = String::from_utf8_lossy(s.as_ref());
                        s == "yes"
                    }),
                });
            }
            Event::DocType(dt) => {
                let dt = String::from_utf8_lossy(&dt).into_owned();
                entities = Entities::from_doctype(&dt);
                doctype = Some(dt);
            }
            Event::Start(start) => {
                root = Some(parse_element(&mut reader, &start, &entities)?);
                break;
            }
            Event::Empty(start) => {
                root = Some(parse_element_start(&start, &entities)?);
                break;
            }
            Event::Text(text) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(LayercutError::InvalidSvg(
                        "Text before root element".into(),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| LayercutError::InvalidSvg("No root element found".into()))?;
    ensure_epilog(&mut reader)?;

    Ok(Document {
        xml_declaration,
        doctype,
        root,
    })
}

/// Only comments, processing instructions and whitespace may follow the root.
fn ensure_epilog(reader: &mut Reader<&[u8]>) -> Result<(), LayercutError> {
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::PI(_) => {}
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            Event::Start(_) | Event::Empty(_) => {
                return Err(LayercutError::InvalidSvg(
                    "Multiple root elements".into(),
                ));
            }
            _ => {
                return Err(LayercutError::InvalidSvg(
                    "Unexpected content after root element".into(),
                ));
            }
        }
    }
}

fn parse_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    entities: &Entities,
) -> Result<Element, LayercutError> {
    let mut element = parse_element_start(start, entities)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start, entities)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_element_start(&start, entities)?));
            }
            Event::End(_) => break,
            Event::Text(text) => {
                let text = text.unescape_with(|name| entities.resolve(name))?;
                // Adjacent text events are merged into one node
                if let Some(Node::Text(prev)) = element.children.last_mut() {
                    prev.push_str(&text);
                } else {
                    element.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => {
                let content = String::from_utf8_lossy(&pi).into_owned();
                let (target, rest) = content
                    .split_once(char::is_whitespace)
                    .map(|(t, r)| (t.to_string(), Some(r.to_string())))
                    .unwrap_or_else(|| (content, None));
                element
                    .children
                    .push(Node::ProcessingInstruction { target, content: rest });
            }
            Event::Eof => {
                return Err(LayercutError::InvalidSvg(format!(
                    "Unexpected end of file inside <{}>",
                    element.name.full_name()
                )));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn parse_element_start(start: &BytesStart, entities: &Entities) -> Result<Element, LayercutError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr =
            attr.map_err(|e| LayercutError::InvalidSvg(format!("Invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value_with(|name| entities.resolve(name))?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    Ok(element)
}
