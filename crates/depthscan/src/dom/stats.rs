// ABOUTME: Whole-document statistics over the structural tree and word list.
// ABOUTME: Tag histogram (top 10), max depth, node count and semantic HTML presence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::is_semantic_tag;
use super::tree::StructureTree;
use super::words::WordNode;

const TOP_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Aggregate statistics for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_words: usize,
    /// Sum of word lengths in characters.
    pub total_chars: usize,
    pub total_nodes: usize,
    pub max_depth: usize,
    /// Most frequent tags, highest count first, ties by name.
    pub tag_counts: Vec<TagCount>,
    pub has_semantic_html: bool,
}

/// Compute document statistics in a single pass over the tree.
pub fn calculate_document_stats(tree: &StructureTree, words: &[WordNode]) -> DocumentStats {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut max_depth = 0;
    let mut total_nodes = 0;
    let mut has_semantic_html = false;

    for node in tree.iter() {
        total_nodes += 1;
        *counts.entry(node.tag.as_str()).or_insert(0) += 1;
        max_depth = max_depth.max(node.depth);
        if is_semantic_tag(&node.tag) {
            has_semantic_html = true;
        }
    }

    let mut tag_counts: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    tag_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tag_counts.truncate(TOP_TAGS);

    DocumentStats {
        total_words: words.len(),
        total_chars: words.iter().map(WordNode::char_len).sum(),
        total_nodes,
        max_depth,
        tag_counts,
        has_semantic_html,
    }
}
