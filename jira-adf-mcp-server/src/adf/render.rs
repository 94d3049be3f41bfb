//! Markdown and plain-text rendering of ADF trees

use super::node::{Content, DocumentNode, Mark};

/// Appended after every block-level node
const BLOCK_SEPARATOR: &str = "\n\n";

/// Render content as Markdown.
///
/// Plain strings are legacy (pre-ADF) field values and pass through
/// unchanged; `None` renders as an empty string.
pub fn render(input: Option<&Content>) -> String {
    match input {
        None => String::new(),
        Some(Content::Text(text)) => text.clone(),
        Some(Content::Document(document)) => {
            let mut out = String::new();
            write_nodes(&mut out, &document.content);
            out
        }
        Some(Content::Node(node)) => render_node(node),
    }
}

/// Render a single node and its descendants as Markdown
pub fn render_node(node: &DocumentNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Concatenate the text of every descendant text run.
///
/// No separator is inserted between blocks, so a heading's text runs
/// straight into the text of the block after it.
pub fn extract_plain_text(input: Option<&Content>) -> String {
    let mut out = String::new();
    match input {
        None => {}
        Some(Content::Text(text)) => out.push_str(text),
        Some(Content::Document(document)) => write_plain_text(&mut out, &document.content),
        Some(Content::Node(node)) => write_plain_text(&mut out, std::slice::from_ref(node)),
    }
    out
}

fn write_nodes(out: &mut String, nodes: &[DocumentNode]) {
    for node in nodes {
        write_node(out, node);
    }
}

fn write_node(out: &mut String, node: &DocumentNode) {
    match node {
        DocumentNode::Doc { children } => write_nodes(out, children),
        DocumentNode::Paragraph { children } => {
            write_nodes(out, children);
            out.push_str(BLOCK_SEPARATOR);
        }
        DocumentNode::Heading { level, children } => {
            out.push_str(&"#".repeat(usize::from((*level).clamp(1, 6))));
            out.push(' ');
            write_nodes(out, children);
            out.push_str(BLOCK_SEPARATOR);
        }
        DocumentNode::CodeBlock { language, children } => {
            out.push_str("```");
            out.push_str(language.as_deref().unwrap_or_default());
            out.push('\n');
            write_plain_text(out, children);
            out.push_str("\n```");
            out.push_str(BLOCK_SEPARATOR);
        }
        DocumentNode::BulletList { .. } | DocumentNode::OrderedList { .. } => {
            write_list(out, node, "")
        }
        DocumentNode::ListItem { children } => write_list_item(out, children, ""),
        DocumentNode::Text { value, marks } => write_text(out, value, marks),
        DocumentNode::Unknown { attrs, .. } => {
            let children = node.children();
            if children.is_empty() {
                // mention, emoji, status and friends keep their label in attrs
                if let Some(text) = attrs
                    .as_ref()
                    .and_then(|attrs| attrs.get("text"))
                    .and_then(|text| text.as_str())
                {
                    out.push_str(text);
                }
            } else {
                write_nodes(out, children);
            }
        }
    }
}

/// Write a list whose entries start at `indent`. Only the marker is
/// indented; text inside an entry is written as-is.
fn write_list(out: &mut String, list: &DocumentNode, indent: &str) {
    let ordered = matches!(list, DocumentNode::OrderedList { .. });

    let entries: Vec<String> = list
        .children()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut entry = String::from(indent);
            if ordered {
                entry.push_str(&format!("{}. ", index + 1));
            } else {
                entry.push_str("- ");
            }
            match item {
                DocumentNode::ListItem { children } => write_list_item(&mut entry, children, indent),
                other => entry.push_str(&render_block_inline(other)),
            }
            entry
        })
        .collect();

    out.push_str(&entries.join(BLOCK_SEPARATOR));
    out.push('\n');
}

/// Paragraphs inside a list item render inline, without their blank line.
/// Nested lists go one level deeper than `indent`.
fn write_list_item(out: &mut String, children: &[DocumentNode], indent: &str) {
    let nested_indent = format!("{}  ", indent);
    let parts: Vec<String> = children
        .iter()
        .map(|child| match child {
            DocumentNode::Paragraph { children } => {
                let mut inline = String::new();
                write_nodes(&mut inline, children);
                inline
            }
            DocumentNode::BulletList { .. } | DocumentNode::OrderedList { .. } => {
                let mut nested = String::new();
                write_list(&mut nested, child, &nested_indent);
                nested.pop();
                nested
            }
            other => render_block_inline(other),
        })
        .collect();

    out.push_str(&parts.join("\n"));
}

/// Render a node and drop the separator its block type appends, leaving
/// any newlines that belong to its text
fn render_block_inline(node: &DocumentNode) -> String {
    let mut rendered = render_node(node);
    let suffix = match node {
        DocumentNode::Paragraph { .. }
        | DocumentNode::Heading { .. }
        | DocumentNode::CodeBlock { .. } => BLOCK_SEPARATOR,
        DocumentNode::BulletList { .. } | DocumentNode::OrderedList { .. } => "\n",
        _ => "",
    };
    if rendered.ends_with(suffix) {
        rendered.truncate(rendered.len() - suffix.len());
    }
    rendered
}

/// Marks nest as strong, then emphasis, then code, whatever their order in
/// the source
fn write_text(out: &mut String, value: &str, marks: &[Mark]) {
    let strong = marks.contains(&Mark::Strong);
    let emphasis = marks.contains(&Mark::Emphasis);
    let code = marks.contains(&Mark::Code);

    if strong {
        out.push_str("**");
    }
    if emphasis {
        out.push('*');
    }
    if code {
        out.push('`');
    }
    out.push_str(value);
    if code {
        out.push('`');
    }
    if emphasis {
        out.push('*');
    }
    if strong {
        out.push_str("**");
    }
}

fn write_plain_text(out: &mut String, nodes: &[DocumentNode]) {
    for node in nodes {
        match node {
            DocumentNode::Text { value, .. } => out.push_str(value),
            other => write_plain_text(out, other.children()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adf::node::AdfDocument;
    use serde_json::json;

    fn content(value: serde_json::Value) -> Content {
        Content::from_value(value).expect("test value is document content")
    }

    fn item(text: &str) -> DocumentNode {
        DocumentNode::ListItem {
            children: vec![DocumentNode::paragraph(text)],
        }
    }

    #[test]
    fn test_render_absent_and_plain_string() {
        assert_eq!(render(None), "");
        assert_eq!(render(Some(&Content::from("keep *as* is\n"))), "keep *as* is\n");
    }

    #[test]
    fn test_render_paragraph() {
        let input = content(json!({
            "type": "paragraph",
            "content": [{"type": "text", "text": "Hello world"}]
        }));
        assert_eq!(render(Some(&input)), "Hello world\n\n");
    }

    #[test]
    fn test_render_code_block() {
        let input = content(json!({
            "type": "codeBlock",
            "attrs": {"language": "javascript"},
            "content": [{"type": "text", "text": "x=1;"}]
        }));
        assert_eq!(render(Some(&input)), "```javascript\nx=1;\n```\n\n");
    }

    #[test]
    fn test_render_code_block_without_language_ignores_marks() {
        let node = DocumentNode::CodeBlock {
            language: None,
            children: vec![DocumentNode::Text {
                value: "let x;".to_string(),
                marks: vec![Mark::Strong],
            }],
        };
        assert_eq!(render_node(&node), "```\nlet x;\n```\n\n");
    }

    #[test]
    fn test_render_heading() {
        let input = content(json!({
            "type": "heading",
            "attrs": {"level": 2},
            "content": [{"type": "text", "text": "Section Heading"}]
        }));
        assert_eq!(render(Some(&input)), "## Section Heading\n\n");
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let deep = DocumentNode::Heading {
            level: 9,
            children: vec![DocumentNode::text("Deep")],
        };
        let zero = DocumentNode::Heading {
            level: 0,
            children: vec![DocumentNode::text("Top")],
        };
        assert_eq!(render_node(&deep), "###### Deep\n\n");
        assert_eq!(render_node(&zero), "# Top\n\n");
    }

    #[test]
    fn test_render_single_marks() {
        let render_marked = |mark| {
            render_node(&DocumentNode::Text {
                value: "x".to_string(),
                marks: vec![mark],
            })
        };
        assert_eq!(render_marked(Mark::Strong), "**x**");
        assert_eq!(render_marked(Mark::Emphasis), "*x*");
        assert_eq!(render_marked(Mark::Code), "`x`");
    }

    #[test]
    fn test_combined_marks_nest_in_fixed_order() {
        let forward = DocumentNode::Text {
            value: "x".to_string(),
            marks: vec![Mark::Strong, Mark::Emphasis, Mark::Code],
        };
        let reversed = DocumentNode::Text {
            value: "x".to_string(),
            marks: vec![Mark::Code, Mark::Emphasis, Mark::Strong],
        };
        assert_eq!(render_node(&forward), "***`x`***");
        assert_eq!(render_node(&reversed), "***`x`***");
    }

    #[test]
    fn test_render_bullet_list() {
        let list = DocumentNode::BulletList {
            items: vec![item("one"), item("two")],
        };
        assert_eq!(render_node(&list), "- one\n\n- two\n");
    }

    #[test]
    fn test_render_ordered_list() {
        let list = DocumentNode::OrderedList {
            items: vec![item("first"), item("second"), item("third")],
        };
        assert_eq!(render_node(&list), "1. first\n\n2. second\n\n3. third\n");
    }

    #[test]
    fn test_render_nested_list() {
        let list = DocumentNode::BulletList {
            items: vec![DocumentNode::ListItem {
                children: vec![
                    DocumentNode::paragraph("parent"),
                    DocumentNode::BulletList {
                        items: vec![item("child")],
                    },
                ],
            }],
        };
        assert_eq!(render_node(&list), "- parent\n  - child\n");
    }

    #[test]
    fn test_nested_list_keeps_multiline_text() {
        let list = DocumentNode::BulletList {
            items: vec![DocumentNode::ListItem {
                children: vec![
                    DocumentNode::paragraph("parent"),
                    DocumentNode::BulletList {
                        items: vec![item("line one\nline two"), item("crlf\r\nend")],
                    },
                ],
            }],
        };

        let out = render_node(&list);

        assert_eq!(out, "- parent\n  - line one\nline two\n\n  - crlf\r\nend\n");
        assert!(out.contains("line one\nline two"));
        assert!(out.contains("crlf\r\nend"));
    }

    #[test]
    fn test_deeply_nested_ordered_list() {
        let list = DocumentNode::OrderedList {
            items: vec![DocumentNode::ListItem {
                children: vec![
                    DocumentNode::paragraph("a"),
                    DocumentNode::BulletList {
                        items: vec![DocumentNode::ListItem {
                            children: vec![
                                DocumentNode::paragraph("b"),
                                DocumentNode::OrderedList {
                                    items: vec![item("c")],
                                },
                            ],
                        }],
                    },
                ],
            }],
        };
        assert_eq!(render_node(&list), "1. a\n  - b\n    1. c\n");
    }

    #[test]
    fn test_trailing_newline_inside_list_text_is_kept() {
        let list = DocumentNode::BulletList {
            items: vec![DocumentNode::ListItem {
                children: vec![DocumentNode::Heading {
                    level: 2,
                    children: vec![DocumentNode::text("ends\n")],
                }],
            }],
        };
        assert_eq!(render_node(&list), "- ## ends\n\n");
    }

    #[test]
    fn test_standalone_list_item_renders_inline() {
        assert_eq!(render_node(&item("alone")), "alone");
    }

    #[test]
    fn test_unknown_node_keeps_text() {
        let input = content(json!({
            "type": "panel",
            "attrs": {"panelType": "warning"},
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Careful"}]}
            ]
        }));
        assert_eq!(render(Some(&input)), "Careful\n\n");
    }

    #[test]
    fn test_unknown_inline_leaf_uses_attr_text() {
        let input = content(json!({
            "type": "paragraph",
            "content": [
                {"type": "text", "text": "ping "},
                {"type": "mention", "attrs": {"id": "123", "text": "@Sam"}},
                {"type": "hardBreak"}
            ]
        }));
        assert_eq!(render(Some(&input)), "ping @Sam\n\n");
    }

    #[test]
    fn test_render_document() {
        let document = AdfDocument::new(vec![
            DocumentNode::Heading {
                level: 1,
                children: vec![DocumentNode::text("Title")],
            },
            DocumentNode::paragraph("Body"),
        ]);
        assert_eq!(
            render(Some(&Content::Document(document))),
            "# Title\n\nBody\n\n"
        );
    }

    #[test]
    fn test_plain_text_has_no_separators() {
        let input = content(json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "codeBlock", "content": [{"type": "text", "text": "code"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "bold", "marks": [{"type": "strong"}]}
                ]}
            ]
        }));
        assert_eq!(extract_plain_text(Some(&input)), "Titlecodebold");
    }

    #[test]
    fn test_plain_text_passthrough_and_absent() {
        assert_eq!(extract_plain_text(None), "");
        assert_eq!(extract_plain_text(Some(&Content::from("as is"))), "as is");
    }
}
