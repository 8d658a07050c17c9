//! Block splitter: tree-with-placeholders + resolved components -> ordered
//! content blocks.
//!
//! Top-to-bottom walk over the root's children. Consecutive non-placeholder
//! nodes accumulate into a pending rich-text buffer; a block-level
//! placeholder flushes the buffer (only when it has content) and emits one
//! component block. A block placeholder nested inside a container (a list
//! item, say) is hoisted out and emitted right after its container. Inline
//! placeholders stay embedded in their rich-text run as inline references.

use serde_json::{Map, Value};

use crate::component::{Resolution, ResolvedComponent};
use crate::debug;
use crate::error::MigrateError;
use crate::richtext::{Placement, RichTextNode};

use super::ContentBlock;

/// What to do when a block-level component failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnUnresolved {
    /// Emit an explicit `unresolved` block and keep going (default: a
    /// migration completes with a failure manifest, not an abort).
    #[default]
    Placeholder,
    /// Fail the document (used when the surrounding schema marks the
    /// component's field required).
    Fail,
}

/// Split the extracted tree into an ordered block sequence.
///
/// `resolved` is indexed by placeholder id (extraction order).
pub fn split_blocks(
    tree: &RichTextNode,
    resolved: &[ResolvedComponent],
    on_unresolved: OnUnresolved,
) -> Result<Vec<ContentBlock>, MigrateError> {
    let children = match tree {
        RichTextNode::Root { children } => children.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut blocks = Vec::new();
    let mut pending: Vec<RichTextNode> = Vec::new();

    for node in children {
        match node {
            RichTextNode::ComponentPlaceholder {
                component_id,
                placement: Placement::Block,
            } => {
                flush(&mut pending, &mut blocks);
                blocks.push(component_block(*component_id, resolved, on_unresolved)?);
            }
            other => {
                let mut node = other.clone();
                let mut hoisted = Vec::new();
                hoist_nested(&mut node, &mut hoisted);
                if !node.is_empty() {
                    pending.push(node);
                }
                for id in hoisted {
                    flush(&mut pending, &mut blocks);
                    blocks.push(component_block(id, resolved, on_unresolved)?);
                }
            }
        }
    }
    flush(&mut pending, &mut blocks);

    Ok(blocks)
}

/// Pull block-level placeholders out of a container subtree, in document
/// order. A rich-text run cannot carry a block component, so they surface
/// as standalone blocks after their container.
fn hoist_nested(node: &mut RichTextNode, hoisted: &mut Vec<usize>) {
    let Some(children) = node.children_mut() else {
        return;
    };
    children.retain_mut(|child| match child {
        RichTextNode::ComponentPlaceholder {
            component_id,
            placement: Placement::Block,
        } => {
            hoisted.push(*component_id);
            false
        }
        other => {
            hoist_nested(other, hoisted);
            true
        }
    });
}

/// Flush the pending buffer as a rich-text block. Empty buffers (two
/// adjacent block components) produce nothing.
fn flush(pending: &mut Vec<RichTextNode>, blocks: &mut Vec<ContentBlock>) {
    if pending.is_empty() {
        return;
    }
    blocks.push(ContentBlock::RichText {
        nodes: std::mem::take(pending),
    });
}

fn component_block(
    component_id: usize,
    resolved: &[ResolvedComponent],
    on_unresolved: OnUnresolved,
) -> Result<ContentBlock, MigrateError> {
    let Some(component) = resolved.iter().find(|r| r.usage.id == component_id) else {
        // Placeholder with no resolution record: internal inconsistency,
        // surface it as an unresolved block rather than panicking
        debug!("split"; "placeholder #{} has no resolution record", component_id);
        let mut fields = Map::new();
        fields.insert("reason".into(), Value::String("missing resolution".into()));
        return Ok(ContentBlock::Component {
            block_type: "unresolved".into(),
            fields,
        });
    };

    match &component.resolution {
        Resolution::Direct { block_type } => {
            let mut fields = Map::new();
            for (k, v) in &component.usage.props {
                fields.insert(k.clone(), Value::String(v.clone()));
            }
            Ok(ContentBlock::Component {
                block_type: block_type.clone(),
                fields,
            })
        }
        Resolution::Registry {
            category,
            slug,
            value,
            provider,
        } => {
            let mut fields = Map::new();
            fields.insert("slug".into(), Value::String(slug.clone()));
            fields.insert("value".into(), value.clone());
            if let Some(provider) = provider {
                fields.insert("provider".into(), Value::String(provider.clone()));
            }
            Ok(ContentBlock::Component {
                block_type: category.clone(),
                fields,
            })
        }
        Resolution::SlugNotFound { category, slug } => match on_unresolved {
            OnUnresolved::Fail => Err(MigrateError::RequiredComponentUnresolved {
                name: component.usage.name.clone(),
                slug: slug.clone(),
            }),
            OnUnresolved::Placeholder => {
                let mut fields = Map::new();
                fields.insert("component".into(), Value::String(component.usage.name.clone()));
                fields.insert("category".into(), Value::String(category.clone()));
                fields.insert("slug".into(), Value::String(slug.clone()));
                fields.insert("reason".into(), Value::String("slug not found".into()));
                Ok(ContentBlock::Component {
                    block_type: "unresolved".into(),
                    fields,
                })
            }
        },
        Resolution::Unmapped => match on_unresolved {
            OnUnresolved::Fail => Err(MigrateError::RequiredComponentUnresolved {
                name: component.usage.name.clone(),
                slug: String::new(),
            }),
            OnUnresolved::Placeholder => {
                let mut fields = Map::new();
                fields.insert("component".into(), Value::String(component.usage.name.clone()));
                fields.insert("reason".into(), Value::String("unmapped component".into()));
                Ok(ContentBlock::Component {
                    block_type: "unresolved".into(),
                    fields,
                })
            }
        },
    }
}
