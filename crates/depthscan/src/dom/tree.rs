// ABOUTME: Builds the depth-annotated structural tree from an external DOM.
// ABOUTME: Nodes live in an ego_tree arena; parents are addressed by NodeId, never by reference.

use std::collections::{BTreeMap, HashSet};

use ego_tree::{NodeId, Tree};
use serde::Serialize;

use super::{normalize_spaces, DomNode, DomNodeKind};
use crate::error::AnalysisError;

/// One element of the structural mirror of the DOM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureNode {
    pub tag: String,
    /// Nesting level, the root element is 0.
    pub depth: usize,
    pub attributes: BTreeMap<String, String>,
    /// The node's own text, whitespace-collapsed.
    pub direct_text: String,
    /// Direct text plus every descendant's text.
    pub full_text: String,
    pub dom_path: String,
    /// Debugging aid only. Collisions are possible.
    pub node_id: u64,
}

impl StructureNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Depth-annotated, filtered structural tree of one document.
#[derive(Debug, Clone)]
pub struct StructureTree {
    tree: Tree<StructureNode>,
}

impl StructureTree {
    /// Build the structural tree below `root`.
    ///
    /// Comments, text, doctypes and other non-element nodes never become
    /// structure nodes; text is absorbed into the parent's direct text.
    /// Elements in `ignored_tags` are dropped with their whole subtree.
    pub fn build<N: DomNode>(
        root: Option<&N>,
        ignored_tags: &HashSet<String>,
    ) -> Result<Self, AnalysisError> {
        let root = root.ok_or_else(|| {
            AnalysisError::structural_parse(
                "build tree",
                Some(anyhow::anyhow!("no root node supplied")),
            )
        })?;

        if root.kind() != DomNodeKind::Element {
            return Err(AnalysisError::structural_parse(
                "build tree",
                Some(anyhow::anyhow!("root node is not an element")),
            ));
        }

        let root_node = structure_node(root, 0, "", ignored_tags).ok_or_else(|| {
            AnalysisError::structural_parse(
                "build tree",
                Some(anyhow::anyhow!("root element is an ignored tag")),
            )
        })?;

        let mut tree = Tree::new(root_node);
        let root_id = tree.root().id();
        build_subtree(&mut tree, root_id, root, ignored_tags);

        Ok(Self { tree })
    }

    pub fn root(&self) -> &StructureNode {
        self.tree.root().value()
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn get(&self, id: NodeId) -> Option<&StructureNode> {
        self.tree.get(id).map(|n| n.value())
    }

    /// The parent of a node, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<&StructureNode> {
        self.tree.get(id)?.parent().map(|p| p.value())
    }

    /// Child ids of a node in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.tree.get(id) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => Vec::new(),
        }
    }

    /// Pre-order traversal, root first.
    pub fn iter(&self) -> impl Iterator<Item = &StructureNode> {
        self.tree.root().descendants().map(|n| n.value())
    }

    /// Pre-order traversal yielding ids alongside nodes.
    pub fn iter_with_ids(&self) -> impl Iterator<Item = (NodeId, &StructureNode)> {
        self.tree.root().descendants().map(|n| (n.id(), n.value()))
    }

    /// Number of structure nodes, root included.
    pub fn len(&self) -> usize {
        self.tree.root().descendants().count()
    }
}

/// Create the structure node for an element, or `None` when it is elided.
fn structure_node<N: DomNode>(
    dom: &N,
    depth: usize,
    parent_path: &str,
    ignored_tags: &HashSet<String>,
) -> Option<StructureNode> {
    if dom.kind() != DomNodeKind::Element {
        return None;
    }
    let tag = dom.tag_name()?;
    if ignored_tags.contains(&tag) {
        return None;
    }

    let attributes: BTreeMap<String, String> = dom.attributes().into_iter().collect();
    let dom_path = dom_path(parent_path, &tag, &attributes);
    let node_id = node_id(&dom_path, depth);

    let raw: String = dom
        .children()
        .iter()
        .filter_map(|child| child.text().map(str::to_string))
        .collect();

    Some(StructureNode {
        tag,
        depth,
        attributes,
        direct_text: normalize_spaces(&raw),
        full_text: String::new(),
        dom_path,
        node_id,
    })
}

/// Attach the element children of `dom` below `id`, then fill in the
/// node's full text once every child has completed. Returns that text.
fn build_subtree<N: DomNode>(
    tree: &mut Tree<StructureNode>,
    id: NodeId,
    dom: &N,
    ignored_tags: &HashSet<String>,
) -> String {
    let (depth, path, direct) = match tree.get(id) {
        Some(node) => {
            let v = node.value();
            (v.depth, v.dom_path.clone(), v.direct_text.clone())
        }
        None => return String::new(),
    };

    let mut parts = vec![direct];
    for child in dom.children() {
        let node = match structure_node(&child, depth + 1, &path, ignored_tags) {
            Some(node) => node,
            None => continue,
        };
        let child_id = match tree.get_mut(id) {
            Some(mut parent) => parent.append(node).id(),
            None => continue,
        };
        parts.push(build_subtree(tree, child_id, &child, ignored_tags));
    }

    let full_text = normalize_spaces(&parts.join(" "));
    if let Some(mut node) = tree.get_mut(id) {
        node.value().full_text = full_text.clone();
    }
    full_text
}

fn dom_path(parent_path: &str, tag: &str, attributes: &BTreeMap<String, String>) -> String {
    let mut segment = tag.to_string();
    if let Some(id) = attributes.get("id").map(|s| s.trim()) {
        if !id.is_empty() {
            segment.push('#');
            segment.push_str(id);
        }
    }
    if let Some(class) = attributes.get("class") {
        for name in class.split_whitespace() {
            segment.push('.');
            segment.push_str(name);
        }
    }

    if parent_path.is_empty() {
        segment
    } else {
        format!("{} > {}", parent_path, segment)
    }
}

/// Simple deterministic 31-multiplier string hash of `(path, depth)`.
fn node_id(dom_path: &str, depth: usize) -> u64 {
    format!("{}@{}", dom_path, depth)
        .bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64))
}
