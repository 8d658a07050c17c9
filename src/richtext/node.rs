//! Rich-text node model.
//!
//! A closed tagged union instead of the stringly-typed JSON trees common in
//! editor formats: block splitting matches on it exhaustively, so a new
//! variant is a compile error at every consumer. Strict tree - every
//! non-leaf owns its children, nothing is shared.

use serde::Serialize;

/// Inline formatting marks carried on text nodes.
///
/// Marks are attributes, not wrapper nodes; a bold-italic run is one text
/// node, which keeps block splitting flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
}

impl Marks {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Where a component tag occurred structurally.
///
/// Determined by the Markdown parser's event kind (HTML block vs inline
/// HTML), never by whitespace heuristics, and preserved through to block
/// splitting: block usages become standalone blocks, inline usages stay
/// embedded in their rich-text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Block,
    Inline,
}

/// Component tag props. Ordered by name; duplicate names that differ only
/// by case collapse at parse time (last occurrence wins).
pub type Props = std::collections::BTreeMap<String, String>;

/// A node in the rich-text tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RichTextNode {
    Root {
        children: Vec<RichTextNode>,
    },
    Heading {
        level: u8,
        children: Vec<RichTextNode>,
    },
    Paragraph {
        children: Vec<RichTextNode>,
    },
    Text {
        value: String,
        marks: Marks,
    },
    List {
        ordered: bool,
        children: Vec<RichTextNode>,
    },
    ListItem {
        children: Vec<RichTextNode>,
    },
    Link {
        url: String,
        children: Vec<RichTextNode>,
    },
    /// Embedded custom tag, opaque at conversion time: the attribute list
    /// is captured, the internals are not interpreted.
    ComponentTag {
        name: String,
        props: Props,
        placement: Placement,
    },
    /// Marker substituted for an extracted component tag.
    ComponentPlaceholder {
        component_id: usize,
        placement: Placement,
    },
}

impl RichTextNode {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
            marks: Marks::default(),
        }
    }

    /// Children of this node, if it is a container.
    pub fn children(&self) -> Option<&[RichTextNode]> {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Link { children, .. } => Some(children),
            Self::Text { .. } | Self::ComponentTag { .. } | Self::ComponentPlaceholder { .. } => {
                None
            }
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<RichTextNode>> {
        match self {
            Self::Root { children }
            | Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::List { children, .. }
            | Self::ListItem { children }
            | Self::Link { children, .. } => Some(children),
            Self::Text { .. } | Self::ComponentTag { .. } | Self::ComponentPlaceholder { .. } => {
                None
            }
        }
    }

    /// True when the node carries no visible content at all (an empty
    /// container, or text that is pure whitespace).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text { value, .. } => value.trim().is_empty(),
            Self::ComponentTag { .. } | Self::ComponentPlaceholder { .. } => false,
            other => other
                .children()
                .is_some_and(|c| c.iter().all(Self::is_empty)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_detection() {
        assert!(RichTextNode::Paragraph { children: vec![] }.is_empty());
        assert!(RichTextNode::text("  \n ").is_empty());
        assert!(!RichTextNode::text("hi").is_empty());
        assert!(
            !RichTextNode::ComponentPlaceholder {
                component_id: 0,
                placement: Placement::Inline
            }
            .is_empty()
        );
    }

    #[test]
    fn test_marks_plain() {
        assert!(Marks::default().is_plain());
        assert!(
            !Marks {
                bold: true,
                ..Default::default()
            }
            .is_plain()
        );
    }
}
