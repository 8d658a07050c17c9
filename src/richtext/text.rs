//! Plain-text rendering of rich-text trees.
//!
//! Used by the round-trip checks and the verifier: concatenating the blocks
//! of a document in order must reproduce the source body's text content.

use rustc_hash::FxHashMap;

use super::node::RichTextNode;

/// Labels for inline component references, keyed by placeholder id
/// (usually the resolved registry slug).
pub type InlineLabels = FxHashMap<usize, String>;

/// Render a sequence of block-level nodes to plain text. Blocks are
/// separated by blank lines; inline component references render as
/// `[inline:<label>]`.
pub fn render_nodes(nodes: &[RichTextNode], labels: &InlineLabels) -> String {
    let rendered: Vec<String> = nodes
        .iter()
        .map(|n| render_node(n, labels))
        .filter(|s| !s.is_empty())
        .collect();
    rendered.join("\n\n")
}

fn render_node(node: &RichTextNode, labels: &InlineLabels) -> String {
    match node {
        RichTextNode::Text { value, .. } => value.clone(),
        RichTextNode::ComponentPlaceholder { component_id, .. } => {
            match labels.get(component_id) {
                Some(label) => format!("[inline:{label}]"),
                None => format!("[inline:#{component_id}]"),
            }
        }
        RichTextNode::ComponentTag { name, .. } => format!("[inline:{name}]"),
        RichTextNode::Root { children } => render_nodes(children, labels),
        RichTextNode::List { children, .. } => {
            let items: Vec<String> = children
                .iter()
                .map(|c| render_node(c, labels))
                .filter(|s| !s.is_empty())
                .collect();
            items.join("\n")
        }
        RichTextNode::Heading { children, .. }
        | RichTextNode::Paragraph { children }
        | RichTextNode::ListItem { children }
        | RichTextNode::Link { children, .. } => children
            .iter()
            .map(|c| render_node(c, labels))
            .collect::<Vec<_>>()
            .concat(),
    }
}
