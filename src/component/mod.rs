//! Embedded component handling: extraction from the rich-text tree and
//! resolution against the component table + registry.
//!
//! ```text
//! component/
//! ├── extract.rs  # tree walk: ComponentTag leaves -> placeholders + usages
//! └── resolve.rs  # ComponentTable lookup + registry slug resolution
//! ```

pub mod extract;
pub mod resolve;

pub use extract::extract_components;
pub use resolve::{
    ComponentRule, ComponentTable, RegistryEntry, RegistryLookup, ResolvedComponent, Resolution,
    resolve_components,
};

use crate::richtext::{Placement, Props};

/// One occurrence of an embedded custom tag.
///
/// Created during extraction, consumed during resolution. The placement
/// marker is structurally significant: block usages become standalone
/// content blocks, inline usages stay embedded in their rich-text run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentUsage {
    /// Placeholder id linking this usage to its position in the tree.
    pub id: usize,
    pub name: String,
    pub props: Props,
    pub placement: Placement,
}
