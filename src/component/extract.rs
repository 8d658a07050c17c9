//! Component extraction: replace every `ComponentTag` leaf with a numbered
//! placeholder and collect the usages.

use crate::richtext::RichTextNode;

use super::ComponentUsage;

/// Walk the tree, substituting placeholders for component tags.
///
/// Pure function: consumes the tree, returns the rewritten tree plus the
/// extracted usages. Placeholder ids are assigned in document order and
/// index into the returned usage list.
pub fn extract_components(tree: RichTextNode) -> (RichTextNode, Vec<ComponentUsage>) {
    let mut usages = Vec::new();
    let tree = walk(tree, &mut usages);
    (tree, usages)
}

fn walk(node: RichTextNode, usages: &mut Vec<ComponentUsage>) -> RichTextNode {
    match node {
        RichTextNode::ComponentTag {
            name,
            props,
            placement,
        } => {
            let id = usages.len();
            usages.push(ComponentUsage {
                id,
                name,
                props,
                placement,
            });
            RichTextNode::ComponentPlaceholder {
                component_id: id,
                placement,
            }
        }
        mut other => {
            if let Some(children) = other.children_mut() {
                let owned = std::mem::take(children);
                *children = owned.into_iter().map(|c| walk(c, usages)).collect();
            }
            other
        }
    }
}
