//! Lexical editor-state serialization.
//!
//! Produces the JSON shape Payload's Lexical rich-text field stores:
//! a `root` node with typed children, text formatting as a bitmask, and
//! inline component references as a custom `inlineReference` node.

use serde_json::{Value, json};

use super::node::{Marks, RichTextNode};
use super::text::InlineLabels;

// Lexical text format bits
const FORMAT_BOLD: u64 = 1;
const FORMAT_ITALIC: u64 = 1 << 1;
const FORMAT_STRIKETHROUGH: u64 = 1 << 2;
const FORMAT_CODE: u64 = 1 << 4;

/// Serialize a rich-text run to a Lexical editor state.
pub fn to_lexical(nodes: &[RichTextNode], labels: &InlineLabels) -> Value {
    json!({
        "root": {
            "type": "root",
            "children": nodes.iter().map(|n| node_to_lexical(n, labels)).collect::<Vec<_>>(),
            "direction": "ltr",
            "format": "",
            "indent": 0,
            "version": 1,
        }
    })
}

fn node_to_lexical(node: &RichTextNode, labels: &InlineLabels) -> Value {
    match node {
        RichTextNode::Root { children } => json!({
            "type": "root",
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::Heading { level, children } => json!({
            "type": "heading",
            "tag": format!("h{level}"),
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::Paragraph { children } => json!({
            "type": "paragraph",
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::Text { value, marks } => json!({
            "type": "text",
            "text": value,
            "format": format_bits(marks),
            "detail": 0,
            "mode": "normal",
            "style": "",
            "version": 1,
        }),
        RichTextNode::List { ordered, children } => json!({
            "type": "list",
            "listType": if *ordered { "number" } else { "bullet" },
            "tag": if *ordered { "ol" } else { "ul" },
            "start": 1,
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::ListItem { children } => json!({
            "type": "listitem",
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::Link { url, children } => json!({
            "type": "link",
            "url": url,
            "children": child_values(children, labels),
            "version": 1,
        }),
        RichTextNode::ComponentPlaceholder { component_id, .. } => json!({
            "type": "inlineReference",
            "reference": labels
                .get(component_id)
                .cloned()
                .unwrap_or_else(|| format!("#{component_id}")),
            "version": 1,
        }),
        // Tags are extracted before serialization; an unextracted one keeps
        // its name as an inline reference rather than disappearing
        RichTextNode::ComponentTag { name, .. } => json!({
            "type": "inlineReference",
            "reference": name,
            "version": 1,
        }),
    }
}

fn child_values(children: &[RichTextNode], labels: &InlineLabels) -> Vec<Value> {
    children
        .iter()
        .map(|c| node_to_lexical(c, labels))
        .collect()
}

fn format_bits(marks: &Marks) -> u64 {
    let mut bits = 0;
    if marks.bold {
        bits |= FORMAT_BOLD;
    }
    if marks.italic {
        bits |= FORMAT_ITALIC;
    }
    if marks.strike {
        bits |= FORMAT_STRIKETHROUGH;
    }
    if marks.code {
        bits |= FORMAT_CODE;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::from_markdown;

    fn roots(body: &str) -> Vec<RichTextNode> {
        match from_markdown(body) {
            RichTextNode::Root { children } => children,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_root_shape() {
        let state = to_lexical(&roots("hello"), &InlineLabels::default());
        assert_eq!(state["root"]["type"], "root");
        assert_eq!(state["root"]["children"][0]["type"], "paragraph");
        assert_eq!(
            state["root"]["children"][0]["children"][0]["text"],
            "hello"
        );
    }

    #[test]
    fn test_format_bitmask() {
        let state = to_lexical(&roots("**bold** and `code`"), &InlineLabels::default());
        let inline = &state["root"]["children"][0]["children"];
        let bold = inline
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["text"] == "bold")
            .unwrap();
        assert_eq!(bold["format"], 1);
        let code = inline
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["text"] == "code")
            .unwrap();
        assert_eq!(code["format"], 16);
    }

    #[test]
    fn test_heading_tag_and_list_type() {
        let state = to_lexical(&roots("## Rates\n\n1. one"), &InlineLabels::default());
        let children = state["root"]["children"].as_array().unwrap();
        assert_eq!(children[0]["type"], "heading");
        assert_eq!(children[0]["tag"], "h2");
        assert_eq!(children[1]["type"], "list");
        assert_eq!(children[1]["listType"], "number");
        assert_eq!(children[1]["children"][0]["type"], "listitem");
    }

    #[test]
    fn test_inline_reference_uses_label() {
        let tree = from_markdown("Call <AcmePhone/> now.");
        let (tree, _) = crate::component::extract_components(tree);
        let RichTextNode::Root { children } = tree else {
            unreachable!()
        };
        let mut labels = InlineLabels::default();
        labels.insert(0, "acme-phone".into());
        let state = to_lexical(&children, &labels);
        let inline = state["root"]["children"][0]["children"].as_array().unwrap();
        let reference = inline
            .iter()
            .find(|n| n["type"] == "inlineReference")
            .unwrap();
        assert_eq!(reference["reference"], "acme-phone");
    }
}
