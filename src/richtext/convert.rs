//! Markdown to rich-text tree conversion using pulldown-cmark.
//!
//! Standard Markdown becomes `RichTextNode` containers; embedded component
//! tags (JSX-style, uppercase first letter) become opaque `ComponentTag`
//! leaves. The block/inline placement of a tag is structural: pulldown-cmark
//! emits `Event::Html` for HTML blocks and `Event::InlineHtml` for tags
//! inside running text, and that distinction is carried on the node.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::debug;

use super::node::{Marks, Placement, Props, RichTextNode};

/// Convert a Markdown body (custom tags intermixed) to a rich-text tree.
pub fn from_markdown(body: &str) -> RichTextNode {
    Converter::new().convert(body)
}

/// Stack frame for tracking open containers.
enum Frame {
    Heading(u8, Vec<RichTextNode>),
    Paragraph(Vec<RichTextNode>),
    List(bool, Vec<RichTextNode>),
    ListItem(Vec<RichTextNode>),
    Link(String, Vec<RichTextNode>),
    /// Raw HTML block being accumulated (may arrive in several chunks).
    HtmlBlock(String),
    /// Fenced/indented code: text collapses to a code-marked run.
    CodeBlock(String),
    /// Container with no counterpart in the node model (blockquote, table
    /// cell); children splice into the parent.
    Transparent(Vec<RichTextNode>),
    /// Container whose content is discarded (image alt text, footnotes).
    Drop,
}

struct Converter {
    stack: Vec<Frame>,
    root: Vec<RichTextNode>,
    bold: u8,
    italic: u8,
    strike: u8,
}

impl Converter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: Vec::new(),
            bold: 0,
            italic: 0,
            strike: 0,
        }
    }

    fn convert(mut self, body: &str) -> RichTextNode {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);

        for event in Parser::new_ext(body, options) {
            self.handle_event(event);
        }

        // Unbalanced input can leave open frames; close them in order
        while let Some(frame) = self.stack.pop() {
            self.finish_frame(frame);
        }

        RichTextNode::Root {
            children: self.root,
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(text.as_ref()),
            Event::Code(code) => self.add_code_span(code.as_ref()),
            Event::Html(html) => self.add_block_html(html.as_ref()),
            Event::InlineHtml(html) => self.add_inline_html(html.as_ref()),
            Event::SoftBreak | Event::HardBreak => self.add_text("\n"),
            Event::InlineMath(src) | Event::DisplayMath(src) => self.add_text(src.as_ref()),
            Event::Rule | Event::FootnoteReference(_) | Event::TaskListMarker(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Frame::Heading(heading_depth(level), Vec::new()),
            Tag::List(start) => Frame::List(start.is_some(), Vec::new()),
            Tag::Item => Frame::ListItem(Vec::new()),
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.to_string(), Vec::new()),
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::CodeBlock(_) => Frame::CodeBlock(String::new()),
            Tag::Emphasis => {
                self.italic += 1;
                return;
            }
            Tag::Strong => {
                self.bold += 1;
                return;
            }
            Tag::Strikethrough => {
                self.strike += 1;
                return;
            }
            Tag::Image { .. } | Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => Frame::Drop,
            // Blockquotes, tables, definition lists: keep the content, lose
            // the container
            _ => Frame::Transparent(Vec::new()),
        };
        self.stack.push(frame);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            _ => {
                if let Some(frame) = self.stack.pop() {
                    self.finish_frame(frame);
                }
            }
        }
    }

    fn finish_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Heading(level, children) => {
                self.add_node(RichTextNode::Heading { level, children });
            }
            Frame::Paragraph(children) => {
                // Pure-whitespace paragraphs never reach the tree
                let node = RichTextNode::Paragraph { children };
                if !node.is_empty() {
                    self.add_node(node);
                }
            }
            Frame::List(ordered, children) => {
                self.add_node(RichTextNode::List { ordered, children });
            }
            Frame::ListItem(children) => {
                self.add_node(RichTextNode::ListItem { children });
            }
            Frame::Link(url, children) => {
                self.add_node(RichTextNode::Link { url, children });
            }
            Frame::HtmlBlock(raw) => {
                for node in parse_component_fragment(&raw, Placement::Block) {
                    self.add_node(node);
                }
            }
            Frame::CodeBlock(text) => {
                let trimmed = text.trim_end_matches('\n');
                if !trimmed.is_empty() {
                    self.add_node(RichTextNode::Paragraph {
                        children: vec![RichTextNode::Text {
                            value: trimmed.to_string(),
                            marks: Marks {
                                code: true,
                                ..Marks::default()
                            },
                        }],
                    });
                }
            }
            Frame::Transparent(children) => {
                for child in children {
                    self.add_node(child);
                }
            }
            Frame::Drop => {}
        }
    }

    fn current_marks(&self) -> Marks {
        Marks {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
            code: false,
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Frame::CodeBlock(buf) | Frame::HtmlBlock(buf)) = self.stack.last_mut() {
            buf.push_str(text);
            return;
        }
        let marks = self.current_marks();
        self.add_node(RichTextNode::Text {
            value: text.to_string(),
            marks,
        });
    }

    fn add_code_span(&mut self, code: &str) {
        let mut marks = self.current_marks();
        marks.code = true;
        self.add_node(RichTextNode::Text {
            value: code.to_string(),
            marks,
        });
    }

    fn add_block_html(&mut self, html: &str) {
        if let Some(Frame::HtmlBlock(buf)) = self.stack.last_mut() {
            buf.push_str(html);
        } else {
            // Html outside an HtmlBlock frame (loose chunk): treat as a
            // one-shot block fragment
            for node in parse_component_fragment(html, Placement::Block) {
                self.add_node(node);
            }
        }
    }

    fn add_inline_html(&mut self, html: &str) {
        for node in parse_component_fragment(html, Placement::Inline) {
            self.add_node(node);
        }
    }

    /// Add a node to the current context (top of stack or root).
    fn add_node(&mut self, node: RichTextNode) {
        match self.stack.last_mut() {
            Some(
                Frame::Heading(_, children)
                | Frame::Paragraph(children)
                | Frame::List(_, children)
                | Frame::ListItem(children)
                | Frame::Link(_, children)
                | Frame::Transparent(children),
            ) => children.push(node),
            Some(Frame::Drop) => {}
            Some(Frame::HtmlBlock(_) | Frame::CodeBlock(_)) | None => self.root.push(node),
        }
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ============================================================================
// Component Tag Parsing
// ============================================================================

/// Parse an HTML fragment with tl, keeping component tags (uppercase first
/// letter, the MDX convention) as opaque leaves and loose text as text.
/// Plain lowercase HTML tags have no target representation and are dropped.
fn parse_component_fragment(html: &str, placement: Placement) -> Vec<RichTextNode> {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        debug!("convert"; "unparseable html fragment: {}", html.trim());
        return Vec::new();
    };

    let parser = dom.parser();
    let mut nodes = Vec::new();
    for handle in dom.children() {
        let Some(node) = handle.get(parser) else {
            continue;
        };
        match node {
            tl::Node::Tag(tag) => {
                // tl keeps the `/` of a space-less self-closing tag on the
                // name (`<AcmePhone/>` parses as name `AcmePhone/`)
                let name = tag
                    .name()
                    .as_utf8_str()
                    .trim_end_matches('/')
                    .to_string();
                if !name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    debug!("convert"; "skipping plain html tag <{}>", name);
                    continue;
                }
                nodes.push(RichTextNode::ComponentTag {
                    props: collect_props(tag),
                    name,
                    placement,
                });
            }
            tl::Node::Raw(bytes) => {
                let text = bytes.as_utf8_str();
                if !text.trim().is_empty() {
                    nodes.push(RichTextNode::text(text.to_string()));
                }
            }
            tl::Node::Comment(_) => {}
        }
    }
    nodes
}

/// Collect a tag's attribute list into props.
///
/// Two legacy serialization defects are deliberately not reproduced here:
/// a valueless or empty attribute stays `""` (never the string `"true"`),
/// and duplicate names differing only by case collapse to one entry with
/// the last occurrence winning.
fn collect_props(tag: &tl::HTMLTag) -> Props {
    let mut props = Props::new();
    for (key, value) in tag.attributes().iter() {
        // A valueless final attribute absorbs the self-closing slash
        // (`<X compact/>` yields the key `compact/`)
        let key: &str = key.as_ref().trim_end_matches('/');
        if key.is_empty() {
            continue;
        }
        let raw = value.map(|v| v.to_string()).unwrap_or_default();
        // MDX expression braces around literal values: state={8} -> 8
        let cleaned = raw
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(&raw)
            .to_string();

        if let Some(existing) = props
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key) && k.as_str() != key)
            .cloned()
        {
            debug!("convert"; "duplicate prop `{}` shadows `{}`", key, existing);
            props.remove(&existing);
        }
        props.insert(key.to_string(), cleaned);
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_children(body: &str) -> Vec<RichTextNode> {
        match from_markdown(body) {
            RichTextNode::Root { children } => children,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_basic_paragraph() {
        let children = root_children("Hello world");
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], RichTextNode::Paragraph { .. }));
    }

    #[test]
    fn test_heading_level() {
        let children = root_children("## Rates");
        match &children[0] {
            RichTextNode::Heading { level, .. } => assert_eq!(*level, 2),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_marks_are_attributes() {
        let children = root_children("plain **bold** *italic* ~~gone~~");
        let RichTextNode::Paragraph { children: inline } = &children[0] else {
            panic!("expected paragraph");
        };
        let texts: Vec<(&str, &Marks)> = inline
            .iter()
            .filter_map(|n| match n {
                RichTextNode::Text { value, marks } => Some((value.as_str(), marks)),
                _ => None,
            })
            .collect();
        assert!(texts.iter().any(|(v, m)| *v == "bold" && m.bold && !m.italic));
        assert!(texts.iter().any(|(v, m)| *v == "italic" && m.italic));
        assert!(texts.iter().any(|(v, m)| *v == "gone" && m.strike));
    }

    #[test]
    fn test_link_and_list() {
        let children = root_children("- [Acme](https://acme.example)\n- two");
        let RichTextNode::List { ordered, children: items } = &children[0] else {
            panic!("expected list");
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
        let RichTextNode::ListItem { children: first } = &items[0] else {
            panic!("expected list item");
        };
        assert!(matches!(
            &first[0],
            RichTextNode::Link { url, .. } if url == "https://acme.example"
        ));
    }

    #[test]
    fn test_ordered_list() {
        let children = root_children("1. one\n2. two");
        assert!(matches!(
            children[0],
            RichTextNode::List { ordered: true, .. }
        ));
    }

    #[test]
    fn test_inline_component_placement() {
        let children = root_children("Call <AcmePhone/> today.");
        let RichTextNode::Paragraph { children: inline } = &children[0] else {
            panic!("expected paragraph");
        };
        let tag = inline
            .iter()
            .find_map(|n| match n {
                RichTextNode::ComponentTag {
                    name, placement, ..
                } => Some((name, placement)),
                _ => None,
            })
            .expect("component tag");
        assert_eq!(tag.0, "AcmePhone");
        assert_eq!(*tag.1, Placement::Inline);
    }

    #[test]
    fn test_block_component_placement_and_props() {
        let children = root_children("intro\n\n<RatesTableBlock state=\"TX\"/>\n\noutro");
        let tag = children
            .iter()
            .find_map(|n| match n {
                RichTextNode::ComponentTag {
                    name,
                    props,
                    placement,
                } => Some((name, props, placement)),
                _ => None,
            })
            .expect("component tag");
        assert_eq!(tag.0, "RatesTableBlock");
        assert_eq!(tag.1.get("state").map(String::as_str), Some("TX"));
        assert_eq!(*tag.2, Placement::Block);
    }

    #[test]
    fn test_self_closing_tag_name_has_no_slash() {
        // No space before `/>`: the raw tag name carries the slash
        let children = root_children("Call <AcmePhone/> now.");
        let RichTextNode::Paragraph { children: inline } = &children[0] else {
            panic!("expected paragraph");
        };
        let name = inline
            .iter()
            .find_map(|n| match n {
                RichTextNode::ComponentTag { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .expect("component tag");
        assert_eq!(name, "AcmePhone");

        let children = root_children("<RatesTableBlock compact/>\n");
        let RichTextNode::ComponentTag { name, props, .. } = &children[0] else {
            panic!("expected component tag");
        };
        assert_eq!(name, "RatesTableBlock");
        assert_eq!(props.get("compact").map(String::as_str), Some(""));
        assert!(!props.keys().any(|k| k.contains('/')));
    }

    #[test]
    fn test_component_name_keeps_case() {
        let children = root_children("<AcmePhone/>\n");
        assert!(matches!(
            &children[0],
            RichTextNode::ComponentTag { name, .. } if name == "AcmePhone"
        ));
    }

    #[test]
    fn test_empty_prop_stays_empty() {
        let children = root_children("<RatesTableBlock state=\"\" compact/>\n");
        let RichTextNode::ComponentTag { props, .. } = &children[0] else {
            panic!("expected component tag");
        };
        assert_eq!(props.get("state").map(String::as_str), Some(""));
        assert_eq!(props.get("compact").map(String::as_str), Some(""));
    }

    #[test]
    fn test_duplicate_cased_props_collapse() {
        let children = root_children("<RatesTableBlock state=\"TX\" State=\"OH\"/>\n");
        let RichTextNode::ComponentTag { props, .. } = &children[0] else {
            panic!("expected component tag");
        };
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("State").map(String::as_str), Some("OH"));
    }

    #[test]
    fn test_plain_html_dropped() {
        let children = root_children("before <br/> after");
        let RichTextNode::Paragraph { children: inline } = &children[0] else {
            panic!("expected paragraph");
        };
        assert!(
            !inline
                .iter()
                .any(|n| matches!(n, RichTextNode::ComponentTag { .. }))
        );
    }

    #[test]
    fn test_code_span_mark() {
        let children = root_children("use `kwh` units");
        let RichTextNode::Paragraph { children: inline } = &children[0] else {
            panic!("expected paragraph");
        };
        assert!(inline.iter().any(|n| matches!(
            n,
            RichTextNode::Text { value, marks } if value == "kwh" && marks.code
        )));
    }

    #[test]
    fn test_blockquote_content_survives() {
        let children = root_children("> quoted wisdom");
        assert!(matches!(children[0], RichTextNode::Paragraph { .. }));
    }

    #[test]
    fn test_mdx_brace_value() {
        let children = root_children("<RatesTableBlock limit={8}/>\n");
        let RichTextNode::ComponentTag { props, .. } = &children[0] else {
            panic!("expected component tag");
        };
        assert_eq!(props.get("limit").map(String::as_str), Some("8"));
    }
}
