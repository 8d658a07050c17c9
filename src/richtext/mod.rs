//! Rich-text tree: node model, Markdown conversion, rendering.
//!
//! ```text
//! richtext/
//! ├── node.rs     # RichTextNode closed enum, Marks, Placement, Props
//! ├── convert.rs  # Markdown + embedded component tags -> tree
//! ├── lexical.rs  # tree -> Lexical editor-state JSON
//! └── text.rs     # tree -> plain text (round-trip checks, verification)
//! ```

pub mod convert;
pub mod lexical;
pub mod node;
pub mod text;

pub use convert::from_markdown;
pub use node::{Marks, Placement, Props, RichTextNode};
