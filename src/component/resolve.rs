//! Component resolution against the component table and registry store.
//!
//! Resolution never throws: every usage produces a `ResolvedComponent`
//! whose outcome may be a failure record. Migrations complete with a
//! failure manifest rather than aborting, so partial success stays
//! inspectable and retriable.

use serde_json::Value;

use crate::debug;

use super::ComponentUsage;

/// A reusable data value in the registry collection, keyed by unique slug.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegistryEntry {
    pub slug: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Registry lookup: exact slug match, no fuzzy matching.
pub trait RegistryLookup {
    fn find_by_slug(&self, slug: &str) -> Option<RegistryEntry>;
}

/// How a component name maps to target content.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum ComponentRule {
    /// Resolves through the registry: the expected slug is baked into the
    /// rule (the provider identity is encoded in the component name
    /// itself, e.g. `AcmePhone` -> `acme-phone`).
    Registry { category: String, slug: String },
    /// Becomes its own typed block; props pass through as fields.
    Direct { block: String },
}

/// Name -> rule mapping, passed into the resolver explicitly so tests can
/// substitute a small fixture table.
#[derive(Debug, Clone, Default)]
pub struct ComponentTable {
    rules: rustc_hash::FxHashMap<String, ComponentRule>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: ComponentRule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&ComponentRule> {
        self.rules.get(name)
    }

    /// True when any rule needs the registry (used to warn about running
    /// a migration before the registry was seeded).
    pub fn needs_registry(&self) -> bool {
        self.rules
            .values()
            .any(|r| matches!(r, ComponentRule::Registry { .. }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, ComponentRule)>) -> Self {
        Self {
            rules: entries.into_iter().collect(),
        }
    }
}

/// Outcome of resolving one usage.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Registry rule, slug found.
    Registry {
        category: String,
        slug: String,
        value: Value,
        provider: Option<String>,
    },
    /// Direct block rule; no lookup needed.
    Direct { block_type: String },
    /// Registry rule, but the slug is absent from the registry.
    SlugNotFound { category: String, slug: String },
    /// Component name absent from the table.
    Unmapped,
}

/// A usage joined against the table and the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub usage: ComponentUsage,
    pub resolution: Resolution,
}

impl ResolvedComponent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.resolution,
            Resolution::SlugNotFound { .. } | Resolution::Unmapped
        )
    }

    /// Category this usage resolves under, when the table knows it.
    pub fn category(&self) -> Option<&str> {
        match &self.resolution {
            Resolution::Registry { category, .. } | Resolution::SlugNotFound { category, .. } => {
                Some(category)
            }
            Resolution::Direct { block_type } => Some(block_type),
            Resolution::Unmapped => None,
        }
    }

    /// Label for inline references: the registry slug when known,
    /// otherwise the raw component name.
    pub fn inline_label(&self) -> &str {
        match &self.resolution {
            Resolution::Registry { slug, .. } | Resolution::SlugNotFound { slug, .. } => slug,
            Resolution::Direct { .. } | Resolution::Unmapped => &self.usage.name,
        }
    }
}

/// Resolve every usage. Failures are recorded, not thrown.
pub fn resolve_components(
    usages: Vec<ComponentUsage>,
    table: &ComponentTable,
    registry: &dyn RegistryLookup,
) -> Vec<ResolvedComponent> {
    usages
        .into_iter()
        .map(|usage| {
            let resolution = match table.get(&usage.name) {
                None => {
                    debug!("resolve"; "unmapped component <{}>", usage.name);
                    Resolution::Unmapped
                }
                Some(ComponentRule::Direct { block }) => Resolution::Direct {
                    block_type: block.clone(),
                },
                Some(ComponentRule::Registry { category, slug }) => {
                    match registry.find_by_slug(slug) {
                        Some(entry) => Resolution::Registry {
                            category: category.clone(),
                            slug: slug.clone(),
                            value: entry.value,
                            provider: entry.provider,
                        },
                        None => {
                            debug!("resolve"; "slug `{}` not found for <{}>", slug, usage.name);
                            Resolution::SlugNotFound {
                                category: category.clone(),
                                slug: slug.clone(),
                            }
                        }
                    }
                }
            };
            ResolvedComponent { usage, resolution }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::{Placement, Props};
    use serde_json::json;

    struct FixtureRegistry(Vec<RegistryEntry>);

    impl RegistryLookup for FixtureRegistry {
        fn find_by_slug(&self, slug: &str) -> Option<RegistryEntry> {
            self.0.iter().find(|e| e.slug == slug).cloned()
        }
    }

    fn usage(id: usize, name: &str) -> ComponentUsage {
        ComponentUsage {
            id,
            name: name.to_string(),
            props: Props::new(),
            placement: Placement::Inline,
        }
    }

    fn fixture_table() -> ComponentTable {
        let mut table = ComponentTable::new();
        table.insert(
            "AcmePhone",
            ComponentRule::Registry {
                category: "phone".into(),
                slug: "acme-phone".into(),
            },
        );
        table.insert(
            "CharliePhone",
            ComponentRule::Registry {
                category: "phone".into(),
                slug: "charlie-phone".into(),
            },
        );
        table.insert(
            "RatesTableBlock",
            ComponentRule::Direct {
                block: "ratesTable".into(),
            },
        );
        table
    }

    #[test]
    fn test_manifest_lists_exactly_the_failures() {
        let registry = FixtureRegistry(vec![RegistryEntry {
            slug: "acme-phone".into(),
            value: json!("555-1234"),
            provider: Some("acme".into()),
        }]);
        let table = fixture_table();

        let resolved = resolve_components(
            vec![
                usage(0, "AcmePhone"),    // present in registry
                usage(1, "CharliePhone"), // mapped, slug absent
                usage(2, "BravoPhone"),   // not in table at all
            ],
            &table,
            &registry,
        );

        assert_eq!(
            resolved[0].resolution,
            Resolution::Registry {
                category: "phone".into(),
                slug: "acme-phone".into(),
                value: json!("555-1234"),
                provider: Some("acme".into()),
            }
        );
        assert_eq!(
            resolved[1].resolution,
            Resolution::SlugNotFound {
                category: "phone".into(),
                slug: "charlie-phone".into(),
            }
        );
        assert_eq!(resolved[2].resolution, Resolution::Unmapped);

        let failures: Vec<&str> = resolved
            .iter()
            .filter(|r| r.is_failure())
            .map(|r| r.usage.name.as_str())
            .collect();
        assert_eq!(failures, ["CharliePhone", "BravoPhone"]);
    }

    #[test]
    fn test_direct_rule_needs_no_registry() {
        let registry = FixtureRegistry(vec![]);
        let resolved = resolve_components(
            vec![usage(0, "RatesTableBlock")],
            &fixture_table(),
            &registry,
        );
        assert_eq!(
            resolved[0].resolution,
            Resolution::Direct {
                block_type: "ratesTable".into()
            }
        );
        assert!(!resolved[0].is_failure());
    }

    #[test]
    fn test_exact_slug_match_only() {
        let registry = FixtureRegistry(vec![RegistryEntry {
            slug: "acme-phone-tx".into(),
            value: json!("555-0000"),
            provider: None,
        }]);
        let resolved =
            resolve_components(vec![usage(0, "AcmePhone")], &fixture_table(), &registry);
        // `acme-phone-tx` must not fuzzy-match `acme-phone`
        assert!(matches!(
            resolved[0].resolution,
            Resolution::SlugNotFound { .. }
        ));
    }

    #[test]
    fn test_inline_label() {
        let registry = FixtureRegistry(vec![]);
        let resolved = resolve_components(
            vec![usage(0, "AcmePhone"), usage(1, "BravoPhone")],
            &fixture_table(),
            &registry,
        );
        assert_eq!(resolved[0].inline_label(), "acme-phone");
        assert_eq!(resolved[1].inline_label(), "BravoPhone");
    }

    #[test]
    fn test_needs_registry() {
        assert!(fixture_table().needs_registry());
        let direct_only = ComponentTable::from_entries([(
            "RatesTableBlock".to_string(),
            ComponentRule::Direct {
                block: "ratesTable".into(),
            },
        )]);
        assert!(!direct_only.needs_registry());
    }
}
