//! Source corpus handling: enumeration, frontmatter splitting, field-kind
//! inference.
//!
//! ```text
//! source/
//! ├── scan.rs         # recursive *.mdx enumeration (jwalk, sorted)
//! ├── frontmatter.rs  # header/body splitter + YAML-like value parsing
//! └── infer.rs        # corpus-wide field-kind inference (FieldCatalog)
//! ```

pub mod frontmatter;
pub mod infer;
pub mod scan;

pub use frontmatter::{Frontmatter, split_frontmatter};
pub use infer::{FieldCatalog, FieldKind, FieldStat};
pub use scan::{SourceDocument, collect_source_files, read_corpus};
