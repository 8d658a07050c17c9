//! Corpus-wide frontmatter field-kind inference.
//!
//! The declared source schema is known to be incomplete (8 declared fields
//! vs 17 observed in the corpus), so the target schema is derived from the
//! shapes actually present. Inference always runs over the whole corpus
//! before any schema decision; per-file inference would pin a field to the
//! first shape it happens to see.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Frontmatter;

/// Inferred kind of a frontmatter field, widened across the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Date,
    Array,
    ArrayOfObjects,
    Object,
    /// Conflicting shapes across files; schema must fall back to string.
    Mixed,
}

impl FieldKind {
    /// Classify a single value occurrence.
    fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(s) if looks_like_date(s) => Self::Date,
            Value::String(_) | Value::Null => Self::String,
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(Value::is_object) {
                    Self::ArrayOfObjects
                } else {
                    Self::Array
                }
            }
            Value::Object(_) => Self::Object,
        }
    }

    /// Widen two observed kinds into one schema kind.
    fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            // Dates are strings that always looked like dates; one non-date
            // occurrence demotes the field
            (Self::Date, Self::String) | (Self::String, Self::Date) => Self::String,
            // A sometimes-empty array of objects is still array-of-objects
            (Self::Array, Self::ArrayOfObjects) | (Self::ArrayOfObjects, Self::Array) => {
                Self::ArrayOfObjects
            }
            _ => Self::Mixed,
        }
    }
}

// Explicit [0-9] classes: the regex crate is built without unicode-perl,
// which rejects \d at compile time
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}([T ][0-9]{2}:[0-9]{2}(:[0-9]{2})?(\.[0-9]+)?Z?)?$")
        .unwrap()
});

fn looks_like_date(s: &str) -> bool {
    DATE_RE.is_match(s)
}

/// Stats for one field across the corpus.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldStat {
    pub name: String,
    pub kind: FieldKind,
    /// Number of files the field appears in.
    pub occurrences: usize,
}

/// Field catalog built by scanning every frontmatter mapping in the corpus.
#[derive(Debug, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldStat>,
    /// Total number of files scanned.
    pub files: usize,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's frontmatter into the catalog.
    pub fn observe(&mut self, meta: &Frontmatter) {
        self.files += 1;
        for (key, value) in meta {
            let kind = FieldKind::of(value);
            match self.fields.iter_mut().find(|f| f.name == *key) {
                Some(stat) => {
                    stat.kind = stat.kind.widen(kind);
                    stat.occurrences += 1;
                }
                None => self.fields.push(FieldStat {
                    name: key.clone(),
                    kind,
                    occurrences: 1,
                }),
            }
        }
    }

    /// All fields, most frequent first.
    pub fn fields(&self) -> Vec<&FieldStat> {
        let mut sorted: Vec<&FieldStat> = self.fields.iter().collect();
        sorted.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then(a.name.cmp(&b.name)));
        sorted
    }

    pub fn get(&self, name: &str) -> Option<&FieldStat> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields present in the corpus but absent from a declared field list.
    pub fn undeclared<'a>(&'a self, declared: &[String]) -> Vec<&'a FieldStat> {
        self.fields()
            .into_iter()
            .filter(|f| !declared.iter().any(|d| d == &f.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(pairs: &[(&str, Value)]) -> Frontmatter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(FieldKind::of(&json!("hello")), FieldKind::String);
        assert_eq!(FieldKind::of(&json!("2024-03-01")), FieldKind::Date);
        assert_eq!(FieldKind::of(&json!("2024-03-01T10:30:00Z")), FieldKind::Date);
        assert_eq!(FieldKind::of(&json!(42)), FieldKind::Number);
        assert_eq!(FieldKind::of(&json!(true)), FieldKind::Boolean);
        assert_eq!(FieldKind::of(&json!(["a", "b"])), FieldKind::Array);
        assert_eq!(
            FieldKind::of(&json!([{"q": "x"}])),
            FieldKind::ArrayOfObjects
        );
        assert_eq!(FieldKind::of(&json!({"title": "x"})), FieldKind::Object);
    }

    #[test]
    fn test_string_classification_does_not_poison() {
        // First classification compiles the date pattern; a plain string
        // must come back String, not panic
        assert_eq!(FieldKind::of(&json!("not a date")), FieldKind::String);
        assert_eq!(FieldKind::of(&json!("2024-12-31 23:59:59")), FieldKind::Date);
        assert_eq!(FieldKind::of(&json!("2024-12-31T23:59:59.250Z")), FieldKind::Date);
    }

    #[test]
    fn test_widening_across_corpus() {
        let mut catalog = FieldCatalog::new();
        catalog.observe(&meta(&[("published", json!("2024-03-01"))]));
        catalog.observe(&meta(&[("published", json!("2024-04-02"))]));
        assert_eq!(catalog.get("published").unwrap().kind, FieldKind::Date);

        catalog.observe(&meta(&[("published", json!("soon"))]));
        assert_eq!(catalog.get("published").unwrap().kind, FieldKind::String);
        assert_eq!(catalog.get("published").unwrap().occurrences, 3);
    }

    #[test]
    fn test_conflicting_kinds_go_mixed() {
        let mut catalog = FieldCatalog::new();
        catalog.observe(&meta(&[("rate", json!(10.4))]));
        catalog.observe(&meta(&[("rate", json!("10.4 cents"))]));
        assert_eq!(catalog.get("rate").unwrap().kind, FieldKind::Mixed);
    }

    #[test]
    fn test_undeclared_fields() {
        let mut catalog = FieldCatalog::new();
        catalog.observe(&meta(&[
            ("title", json!("x")),
            ("heroImage", json!("/img/a.png")),
        ]));
        let declared = vec!["title".to_string()];
        let undeclared = catalog.undeclared(&declared);
        assert_eq!(undeclared.len(), 1);
        assert_eq!(undeclared[0].name, "heroImage");
    }
}
