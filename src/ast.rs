//! Owned XML tree for SVG documents.

/// The SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// The XLink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// A complete SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// XML declaration (e.g., `<?xml version="1.0" encoding="UTF-8"?>`)
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE declaration
    pub doctype: Option<String>,
    /// The root SVG element
    pub root: Element,
}

/// XML declaration attributes.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// An SVG/XML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element name with optional prefix (e.g., "svg", "svg:rect")
    pub name: QName,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

/// A qualified name (possibly with namespace prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    /// Parse a qualified name from a string like "prefix:local" or just "local".
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self::new(s),
        }
    }

    /// The name as written in the source.
    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

/// An attribute on an element.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::new(name),
            value: value.into(),
        }
    }
}

/// A node in the SVG tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction { target: String, content: Option<String> },
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: QName::new(name),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an unprefixed attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == name)
            .map(|a| a.value.as_str())
    }

    /// Set an unprefixed attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.prefix.is_none() && a.name.local == name)
        {
            Some(attr) => attr.value = value.into(),
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Check if this element has a specific local name.
    pub fn is(&self, name: &str) -> bool {
        self.name.local == name
    }

    /// Namespace URI of this element, resolved against `scope`.
    ///
    /// The scope must already include this element's own declarations.
    pub fn namespace<'a>(&self, scope: &'a NamespaceScope) -> Option<&'a str> {
        scope.resolve(self.name.prefix.as_deref())
    }

    /// Iterate over child elements only (skip text, comments, etc.).
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate over child elements mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Pre-order search of this element and its descendants.
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(pred))
    }

    /// Visit this element and all descendants in document order.
    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for child in self.child_elements() {
            child.walk(f);
        }
    }
}

impl Document {
    /// First element (document order) whose `id` equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.root.find(&|e: &Element| e.get_attr("id") == Some(id))
    }

    /// First element (document order) with the given local name.
    pub fn first_element_named(&self, name: &str) -> Option<&Element> {
        self.root.find(&|e: &Element| e.is(name))
    }

    /// Recursively visit all elements mutably, in document order, together
    /// with the namespace bindings in scope at each element.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element, &NamespaceScope)) {
        fn visit(
            elem: &mut Element,
            scope: &mut NamespaceScope,
            f: &mut impl FnMut(&mut Element, &NamespaceScope),
        ) {
            let pushed = scope.enter(elem);
            f(elem, scope);
            for child in elem.child_elements_mut() {
                visit(child, scope, f);
            }
            scope.leave(pushed);
        }
        let mut scope = NamespaceScope::default();
        visit(&mut self.root, &mut scope, &mut f);
    }
}

/// Stack of `xmlns` bindings visible at some point of a traversal.
#[derive(Debug, Default, Clone)]
pub struct NamespaceScope {
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    /// Push the declarations made on `elem`, returning how many were pushed.
    pub fn enter(&mut self, elem: &Element) -> usize {
        let before = self.bindings.len();
        for attr in &elem.attributes {
            match (attr.name.prefix.as_deref(), attr.name.local.as_str()) {
                (None, "xmlns") => self.bindings.push((None, attr.value.clone())),
                (Some("xmlns"), prefix) => self
                    .bindings
                    .push((Some(prefix.to_string()), attr.value.clone())),
                _ => {}
            }
        }
        self.bindings.len() - before
    }

    /// Drop the `count` most recent bindings.
    pub fn leave(&mut self, count: usize) {
        let len = self.bindings.len().saturating_sub(count);
        self.bindings.truncate(len);
    }

    /// Resolve a prefix (`None` for the default namespace) to a URI.
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NS);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
            // xmlns="" undeclares the default namespace
            .filter(|uri| !uri.is_empty())
    }
}
