//! Frontmatter/content splitter.
//!
//! Separates a raw MDX file into a `---`-delimited header mapping and the
//! Markdown body. The header dialect is the YAML subset the corpus actually
//! uses: `key: value` scalars, quoted strings, `|`/`>` block scalars,
//! indented dash lists (scalars or objects), and one level of nested maps.
//!
//! Values parse into `serde_json::Value` so downstream mapping and the
//! field-kind inference work on one representation. Nested lists stay lists;
//! they are never flattened into strings.

use serde_json::Value;

use crate::error::MigrateError;

/// Ordered frontmatter mapping (serde_json with preserve_order).
pub type Frontmatter = serde_json::Map<String, Value>;

/// Split raw file content into `(frontmatter, body)`.
///
/// Fails with `MalformedHeader` when the file does not start with a
/// `---` ... `---` delimiter pair.
pub fn split_frontmatter(raw: &str) -> Result<(Frontmatter, &str), MigrateError> {
    let trimmed = raw.trim_start_matches('\u{feff}');

    let Some(rest) = trimmed.strip_prefix("---") else {
        return Err(MigrateError::MalformedHeader(
            "file does not start with `---`".into(),
        ));
    };
    // Delimiter line must end after optional whitespace
    let Some(after_open) = rest.find('\n') else {
        return Err(MigrateError::MalformedHeader(
            "opening delimiter has no content after it".into(),
        ));
    };
    if !rest[..after_open].trim().is_empty() {
        return Err(MigrateError::MalformedHeader(
            "unexpected content on opening `---` line".into(),
        ));
    }
    let header_start = &rest[after_open + 1..];

    let Some(close) = find_closing_delimiter(header_start) else {
        return Err(MigrateError::MalformedHeader(
            "no closing `---` delimiter".into(),
        ));
    };

    let header = &header_start[..close.0];
    let body = header_start[close.1..].trim_start_matches('\n');

    let metadata = parse_header(header)?;
    Ok((metadata, body))
}

/// Find the closing `---` line. Returns `(header_end, body_start)` offsets
/// into the header slice.
fn find_closing_delimiter(s: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in s.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        if content.trim_end() == "---" {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    // Header may end at EOF without trailing newline
    if s[offset..].trim_end() == "---" {
        return Some((offset, s.len()));
    }
    None
}

// ============================================================================
// Header Parsing
// ============================================================================

/// One logical line of the header, with its indentation depth.
struct Line<'a> {
    indent: usize,
    content: &'a str,
}

/// Parse the header block into an ordered mapping.
fn parse_header(header: &str) -> Result<Frontmatter, MigrateError> {
    let lines: Vec<Line> = header
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .map(|l| {
            let trimmed = l.trim_start();
            Line {
                indent: l.len() - trimmed.len(),
                content: trimmed.trim_end(),
            }
        })
        .collect();

    let mut map = Frontmatter::new();
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        let Some((key, rest)) = split_key(line.content) else {
            return Err(MigrateError::MalformedHeader(format!(
                "expected `key: value`, got `{}`",
                line.content
            )));
        };
        let (value, next) = parse_value(&lines, i, line.indent, rest)?;
        map.insert(key.to_string(), value);
        i = next;
    }
    Ok(map)
}

/// Split `key: rest` on the first unquoted colon.
fn split_key(content: &str) -> Option<(&str, &str)> {
    let (key, rest) = content.split_once(':')?;
    let key = key.trim();
    // A "key" with spaces is prose (e.g. a folded continuation line that
    // happens to contain a colon), not a mapping entry
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    Some((key, rest.trim()))
}

/// Parse the value for the key at `lines[i]` (indent `indent`).
///
/// Returns the value and the index of the next top-of-level line.
fn parse_value(
    lines: &[Line],
    i: usize,
    indent: usize,
    rest: &str,
) -> Result<(Value, usize), MigrateError> {
    // Block scalar: `key: |` or `key: >`
    if rest == "|" || rest == "|-" || rest == ">" || rest == ">-" {
        let fold = rest.starts_with('>');
        let (text, next) = collect_block_scalar(lines, i + 1, indent, fold);
        return Ok((Value::String(text), next));
    }

    if !rest.is_empty() {
        return Ok((parse_scalar(rest), i + 1));
    }

    // Bare `key:` - inspect the following deeper-indented lines
    let mut j = i + 1;
    if j >= lines.len() || lines[j].indent <= indent {
        // Nothing nested: empty value
        return Ok((Value::String(String::new()), j));
    }

    let child_indent = lines[j].indent;
    if lines[j].content.starts_with("- ") || lines[j].content == "-" {
        let (items, next) = parse_list(lines, j, child_indent)?;
        return Ok((Value::Array(items), next));
    }

    // Nested map or folded continuation lines
    if lines[j].content.contains(':') {
        let mut nested = Frontmatter::new();
        while j < lines.len() && lines[j].indent >= child_indent {
            let Some((key, rest)) = split_key(lines[j].content) else {
                break;
            };
            let (value, next) = parse_value(lines, j, lines[j].indent, rest)?;
            nested.insert(key.to_string(), value);
            j = next;
        }
        return Ok((Value::Object(nested), j));
    }

    // Plain continuation lines fold into a single string
    let mut parts = Vec::new();
    while j < lines.len() && lines[j].indent >= child_indent {
        parts.push(lines[j].content);
        j += 1;
    }
    Ok((Value::String(parts.join(" ")), j))
}

/// Collect a `|` or `>` block scalar body starting at `lines[start]`.
fn collect_block_scalar(lines: &[Line], start: usize, indent: usize, fold: bool) -> (String, usize) {
    let mut parts = Vec::new();
    let mut j = start;
    while j < lines.len() && lines[j].indent > indent {
        parts.push(lines[j].content);
        j += 1;
    }
    let sep = if fold { " " } else { "\n" };
    (parts.join(sep), j)
}

/// Parse an indented dash list starting at `lines[start]` (all items at
/// `item_indent`). Items are scalars or objects (`- key: value` plus
/// deeper-indented follow-up keys).
fn parse_list(
    lines: &[Line],
    start: usize,
    item_indent: usize,
) -> Result<(Vec<Value>, usize), MigrateError> {
    let mut items = Vec::new();
    let mut j = start;

    while j < lines.len() && lines[j].indent == item_indent {
        let content = lines[j].content;
        if content == "-" {
            // Object item with keys on following lines
            j += 1;
            let mut obj = Frontmatter::new();
            while j < lines.len() && lines[j].indent > item_indent {
                let Some((key, rest)) = split_key(lines[j].content) else {
                    break;
                };
                let (value, next) = parse_value(lines, j, lines[j].indent, rest)?;
                obj.insert(key.to_string(), value);
                j = next;
            }
            items.push(Value::Object(obj));
            continue;
        }
        let Some(item) = content.strip_prefix("- ") else {
            break;
        };

        if let Some((key, rest)) = item.split_once(':').and_then(|(k, r)| {
            let k = k.trim();
            (!k.is_empty() && !k.contains(' ')).then_some((k, r.trim()))
        }) {
            // `- key: value` opens an object item; follow-up keys are
            // indented past the dash
            let mut obj = Frontmatter::new();
            obj.insert(key.to_string(), parse_scalar_or_empty(rest));
            j += 1;
            while j < lines.len() && lines[j].indent > item_indent {
                let Some((key, rest)) = split_key(lines[j].content) else {
                    break;
                };
                let (value, next) = parse_value(lines, j, lines[j].indent, rest)?;
                obj.insert(key.to_string(), value);
                j = next;
            }
            items.push(Value::Object(obj));
        } else {
            items.push(parse_scalar(item));
            j += 1;
        }
    }

    Ok((items, j))
}

fn parse_scalar_or_empty(s: &str) -> Value {
    if s.is_empty() {
        Value::String(String::new())
    } else {
        parse_scalar(s)
    }
}

/// Parse a scalar value string to JSON
///
/// Supports:
/// - Quoted strings: `"text"`, `'text'`
/// - Booleans: `true`, `false`
/// - Null: `null`, `~`
/// - Numbers: `123`, `3.14`
/// - Flow arrays: `[a, b, c]`
/// - Strings: everything else (no comma-splitting; inline commas are
///   legitimate in titles and addresses)
pub fn parse_scalar(s: &str) -> Value {
    let s = s.trim();

    // Quoted string: strip quotes, no further coercion
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        return Value::String(s[1..s.len() - 1].to_string());
    }

    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }

    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(n)
    {
        return Value::Number(num);
    }

    // Flow array
    if s.starts_with('[') && s.ends_with(']') {
        let inner = &s[1..s.len() - 1];
        let arr: Vec<Value> = inner
            .split(',')
            .map(|item| parse_scalar(item.trim()))
            .filter(|v| !matches!(v, Value::String(s) if s.is_empty()))
            .collect();
        return Value::Array(arr);
    }

    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_split() {
        let raw = "---\ntitle: \"Acme Energy\"\nstatus: false\n---\n\nCall today.";
        let (meta, body) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("title"), Some(&json!("Acme Energy")));
        assert_eq!(meta.get("status"), Some(&json!(false)));
        assert_eq!(body, "Call today.");
    }

    #[test]
    fn test_missing_header_fails() {
        let err = split_frontmatter("# Just content").unwrap_err();
        assert!(err.to_string().contains("malformed frontmatter"));
    }

    #[test]
    fn test_unclosed_header_fails() {
        assert!(split_frontmatter("---\ntitle: x\n").is_err());
    }

    #[test]
    fn test_scalar_coercion() {
        let raw = "---\ncount: 42\nrate: 10.4\ndraft: true\nempty: null\ncity: Dallas, TX\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("count"), Some(&json!(42)));
        assert_eq!(meta.get("rate"), Some(&json!(10.4)));
        assert_eq!(meta.get("draft"), Some(&json!(true)));
        assert_eq!(meta.get("empty"), Some(&Value::Null));
        // Inline commas are NOT array-coerced
        assert_eq!(meta.get("city"), Some(&json!("Dallas, TX")));
    }

    #[test]
    fn test_dash_list() {
        let raw = "---\ntags:\n  - energy\n  - texas\ntitle: x\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("tags"), Some(&json!(["energy", "texas"])));
        // Following key is not swallowed by the list
        assert_eq!(meta.get("title"), Some(&json!("x")));
    }

    #[test]
    fn test_array_of_objects() {
        let raw = "---\nfaqs:\n  - question: What is it?\n    answer: A plan\n  - question: How much?\n    answer: \"10.4\"\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        let faqs = meta.get("faqs").and_then(Value::as_array).unwrap();
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0]["question"], json!("What is it?"));
        assert_eq!(faqs[1]["answer"], json!("10.4"));
    }

    #[test]
    fn test_block_scalar_literal() {
        let raw = "---\ndescription: |\n  Line one.\n  Line two.\nnext: value\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("description"), Some(&json!("Line one.\nLine two.")));
        assert_eq!(meta.get("next"), Some(&json!("value")));
    }

    #[test]
    fn test_block_scalar_folded() {
        let raw = "---\nsummary: >\n  Folded into\n  one line.\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("summary"), Some(&json!("Folded into one line.")));
    }

    #[test]
    fn test_nested_map() {
        let raw = "---\nseo:\n  title: SEO Title\n  description: Desc\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta["seo"]["title"], json!("SEO Title"));
        assert_eq!(meta["seo"]["description"], json!("Desc"));
    }

    #[test]
    fn test_flow_array() {
        let raw = "---\nstates: [TX, OH]\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        assert_eq!(meta.get("states"), Some(&json!(["TX", "OH"])));
    }

    #[test]
    fn test_nested_list_not_stringified() {
        let raw = "---\nplans:\n  - name: Basic\n    perks:\n      - free nights\n      - no deposit\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        let plans = meta.get("plans").and_then(Value::as_array).unwrap();
        assert_eq!(plans[0]["perks"], json!(["free nights", "no deposit"]));
    }

    #[test]
    fn test_key_order_preserved() {
        let raw = "---\nzebra: 1\nalpha: 2\nmiddle: 3\n---\n";
        let (meta, _) = split_frontmatter(raw).unwrap();
        let keys: Vec<&String> = meta.keys().collect();
        assert_eq!(keys, ["zebra", "alpha", "middle"]);
    }
}
