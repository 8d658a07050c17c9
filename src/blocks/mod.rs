//! Content blocks: the final per-document shape stored in the target
//! collection - rich-text runs interleaved with typed component blocks.

pub mod split;

pub use split::{OnUnresolved, split_blocks};

use serde_json::{Map, Value};

use crate::richtext::text::InlineLabels;
use crate::richtext::{RichTextNode, lexical, text};

/// One stored content block.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// A contiguous run of rich text. Never empty (the splitter guarantees
    /// at least one content node).
    RichText { nodes: Vec<RichTextNode> },
    /// A standalone typed component block.
    Component {
        block_type: String,
        fields: Map<String, Value>,
    },
}

impl ContentBlock {
    /// Serialize to the stored JSON shape: rich text as a Lexical editor
    /// state, component blocks as `blockType` + fields.
    pub fn to_json(&self, labels: &InlineLabels) -> Value {
        match self {
            Self::RichText { nodes } => {
                let mut obj = Map::new();
                obj.insert("blockType".into(), Value::String("richText".into()));
                obj.insert("content".into(), lexical::to_lexical(nodes, labels));
                Value::Object(obj)
            }
            Self::Component { block_type, fields } => {
                let mut obj = Map::new();
                obj.insert("blockType".into(), Value::String(block_type.clone()));
                for (k, v) in fields {
                    obj.insert(k.clone(), v.clone());
                }
                Value::Object(obj)
            }
        }
    }

    /// Plain-text content (empty for component blocks).
    pub fn plain_text(&self, labels: &InlineLabels) -> String {
        match self {
            Self::RichText { nodes } => text::render_nodes(nodes, labels),
            Self::Component { .. } => String::new(),
        }
    }
}

/// Serialize an ordered block sequence for storage.
pub fn blocks_to_json(blocks: &[ContentBlock], labels: &InlineLabels) -> Value {
    Value::Array(blocks.iter().map(|b| b.to_json(labels)).collect())
}
