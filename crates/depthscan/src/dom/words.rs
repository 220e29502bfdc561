// ABOUTME: Tokenizes structural node text into depth-tagged word records.
// ABOUTME: Words are emitted in pre-order, each carrying its node's depth, path and parent tag.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tree::StructureTree;

// Maximal runs of Unicode letters and digits.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// A word found in a text segment, with character offsets into that segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub content: String,
    pub start: usize,
    pub end: usize,
}

/// One word of the document with its structural context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordNode {
    pub content: String,
    /// Approximate character offset. Absorbed tags and collapsed whitespace
    /// are not accounted for, so only the ordering is meaningful.
    pub start_offset: usize,
    pub end_offset: usize,
    pub depth: usize,
    pub dom_path: String,
    pub parent_tag: String,
    pub parent_attributes: BTreeMap<String, String>,
    /// Contiguous `0..N` in emission order.
    pub word_index: usize,
}

impl WordNode {
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Split text into words, reporting character offsets within `text`.
pub fn extract_words(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars_seen = 0;
    let mut bytes_seen = 0;

    for m in WORD_RE.find_iter(text) {
        chars_seen += text[bytes_seen..m.start()].chars().count();
        let len = m.as_str().chars().count();
        tokens.push(Token {
            content: m.as_str().to_string(),
            start: chars_seen,
            end: chars_seen + len,
        });
        chars_seen += len;
        bytes_seen = m.end();
    }

    tokens
}

/// Emit a `WordNode` for every word of every node's direct text.
///
/// Traversal is pre-order: a node's own text is emitted before any of its
/// children, so text that follows a child element in the markup is still
/// ordered ahead of that child's words.
pub fn annotate_words_with_depth(tree: &StructureTree) -> Vec<WordNode> {
    let mut words = Vec::new();
    let mut global_char_offset = 0usize;

    for node in tree.iter() {
        if node.direct_text.trim().is_empty() {
            continue;
        }

        for token in extract_words(&node.direct_text) {
            words.push(WordNode {
                content: token.content,
                start_offset: global_char_offset + token.start,
                end_offset: global_char_offset + token.end,
                depth: node.depth,
                dom_path: node.dom_path.clone(),
                parent_tag: node.tag.clone(),
                parent_attributes: node.attributes.clone(),
                word_index: words.len(),
            });
        }

        global_char_offset += node.direct_text.chars().count() + 1;
    }

    tracing::trace!(words = words.len(), "annotated words");
    words
}
