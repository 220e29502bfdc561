// ABOUTME: DOM provider boundary and the depth-annotated structures built from it.
// ABOUTME: Defines the DomNode trait and implements it for scraper's ego_tree nodes.

//! DOM input and structural analysis.
//!
//! The analysis engine never parses HTML itself. It consumes any tree that
//! implements [`DomNode`]; an implementation for `scraper`'s node tree is
//! provided so documents parsed with [`parse_document`] can be fed directly.
//!
//! Submodules:
//! - `tree`: depth-annotated structural mirror of the DOM.
//! - `words`: depth-tagged word records in document order.
//! - `stats`: whole-document statistics.

pub mod stats;
pub mod tree;
pub mod words;

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// HTML5 sectioning and semantic elements.
pub const SEMANTIC_TAGS: &[&str] = &[
    "article",
    "section",
    "main",
    "header",
    "footer",
    "nav",
    "aside",
    "figure",
    "figcaption",
];

pub fn is_semantic_tag(tag: &str) -> bool {
    SEMANTIC_TAGS.contains(&tag)
}

/// The kind of a DOM node as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomNodeKind {
    Element,
    Text,
    Comment,
    /// Documents, fragments, doctypes and processing instructions.
    Other,
}

/// A node of an externally parsed DOM tree.
pub trait DomNode: Sized {
    fn kind(&self) -> DomNodeKind;

    /// Lowercase tag name for elements, `None` otherwise.
    fn tag_name(&self) -> Option<String>;

    /// Attributes of an element in document order. Empty for other kinds.
    fn attributes(&self) -> Vec<(String, String)>;

    /// Child nodes in document order.
    fn children(&self) -> Vec<Self>;

    /// Payload of a text node, `None` otherwise.
    fn text(&self) -> Option<&str>;
}

impl<'a> DomNode for NodeRef<'a, Node> {
    fn kind(&self) -> DomNodeKind {
        match self.value() {
            Node::Element(_) => DomNodeKind::Element,
            Node::Text(_) => DomNodeKind::Text,
            Node::Comment(_) => DomNodeKind::Comment,
            _ => DomNodeKind::Other,
        }
    }

    fn tag_name(&self) -> Option<String> {
        match self.value() {
            Node::Element(el) => Some(el.name().to_lowercase()),
            _ => None,
        }
    }

    fn attributes(&self) -> Vec<(String, String)> {
        match self.value() {
            Node::Element(el) => el
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn children(&self) -> Vec<Self> {
        NodeRef::children(self).collect()
    }

    fn text(&self) -> Option<&str> {
        match self.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        }
    }
}

/// Parse an HTML document with scraper's HTML5 parser.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tag names along a DOM path string, stripped of `#id` and `.class` suffixes.
pub fn path_tags(dom_path: &str) -> impl Iterator<Item = &str> {
    dom_path
        .split(" > ")
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let end = segment.find(['#', '.']).unwrap_or(segment.len());
            &segment[..end]
        })
}
