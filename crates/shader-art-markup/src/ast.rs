// ── Attribute ─────────────────────────────────────────────────────────────

/// A single `name="value"` pair on an element.
///
/// A bare attribute such as `no-gui` has the empty string as its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

// ── Node ──────────────────────────────────────────────────────────────────

/// A child of an element or of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data. Whitespace-only runs between tags are not kept.
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

// ── Element ───────────────────────────────────────────────────────────────

/// One tag in the tree.
///
/// ```html
/// <shader-art autoplay>
///     <uniform type="float" name="speed" value="0.5" min="0" max="2" />
/// </shader-art>
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercased tag name: `"shader-art"`, `"uniform"`, `"script"`.
    pub tag: String,
    /// Attributes in source order. Duplicates keep only the first occurrence.
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Builder-style attribute setter, mostly for constructing trees in code.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Look up an attribute value by (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    /// Direct child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Direct child elements with the given tag, in document order.
    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |el| el.tag == tag)
    }

    /// All descendant elements with the given tag, depth-first in document order.
    /// The element itself is not included.
    pub fn query_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        collect_tagged(&self.children, tag, &mut out);
        out
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_tagged<'a>(nodes: &'a [Node], tag: &str, out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.tag == tag {
                out.push(el);
            }
            collect_tagged(&el.children, tag, out);
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// The top-level parse result: a forest of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    /// All elements with the given tag anywhere in the document.
    pub fn query_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        collect_tagged(&self.nodes, tag, &mut out);
        out
    }

    /// First element with the given tag, depth-first.
    pub fn first(&self, tag: &str) -> Option<&Element> {
        self.query_all(tag).into_iter().next()
    }
}
