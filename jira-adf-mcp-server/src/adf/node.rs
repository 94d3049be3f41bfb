//! Node model for Atlassian Document Format trees
//!
//! JIRA Cloud returns rich-text fields (`description`, `comment.body`) as ADF
//! JSON. This module maps that JSON onto a closed set of node variants with a
//! single [`DocumentNode::Unknown`] fallback, so every node the API may emit
//! has a defined representation.
//!
//! Decoding from JSON never fails: missing attributes fall back to defaults
//! and unrecognized node or mark types are preserved or dropped as described
//! on each item.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Map, Value};

/// The only ADF schema version produced or accepted as a document root
pub const ADF_VERSION: u64 = 1;

/// Inline formatting annotation on a text run
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// `strong`
    Strong,
    /// `em`
    Emphasis,
    /// `code`
    Code,
    /// Any other mark (link, underline, strike, textColor, ...), kept as the
    /// raw mark object. Not rendered, but written back unchanged.
    Other(Value),
}

impl Mark {
    /// Map an ADF mark type to a mark, `None` for types we do not render
    pub fn from_type(mark_type: &str) -> Option<Self> {
        match mark_type {
            "strong" => Some(Mark::Strong),
            "em" => Some(Mark::Emphasis),
            "code" => Some(Mark::Code),
            _ => None,
        }
    }

    /// Decode a raw mark object, `None` when it has no type
    pub fn from_value(value: Value) -> Option<Self> {
        let mark_type = value.get("type").and_then(Value::as_str)?;
        Some(Mark::from_type(mark_type).unwrap_or(Mark::Other(value)))
    }

    /// ADF type name of the mark
    pub fn as_type(&self) -> &str {
        match self {
            Mark::Strong => "strong",
            Mark::Emphasis => "em",
            Mark::Code => "code",
            Mark::Other(raw) => raw.get("type").and_then(Value::as_str).unwrap_or_default(),
        }
    }
}

/// A single element of an ADF tree
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Doc {
        children: Vec<DocumentNode>,
    },
    Paragraph {
        children: Vec<DocumentNode>,
    },
    Heading {
        level: u8,
        children: Vec<DocumentNode>,
    },
    CodeBlock {
        language: Option<String>,
        children: Vec<DocumentNode>,
    },
    BulletList {
        items: Vec<DocumentNode>,
    },
    OrderedList {
        items: Vec<DocumentNode>,
    },
    ListItem {
        children: Vec<DocumentNode>,
    },
    Text {
        value: String,
        marks: Vec<Mark>,
    },
    /// Any node type outside the set above (mention, table, panel, ...).
    /// Attributes are kept verbatim and `children` is `None` only when the
    /// source had no `content` array, so the node serializes back unchanged.
    Unknown {
        raw_type: String,
        attrs: Option<Value>,
        children: Option<Vec<DocumentNode>>,
    },
}

impl DocumentNode {
    /// Plain text run without marks
    pub fn text(value: impl Into<String>) -> Self {
        DocumentNode::Text {
            value: value.into(),
            marks: Vec::new(),
        }
    }

    /// Paragraph holding a single unmarked text run
    pub fn paragraph(value: impl Into<String>) -> Self {
        DocumentNode::Paragraph {
            children: vec![DocumentNode::text(value)],
        }
    }

    /// ADF `type` string of this node
    pub fn node_type(&self) -> &str {
        match self {
            DocumentNode::Doc { .. } => "doc",
            DocumentNode::Paragraph { .. } => "paragraph",
            DocumentNode::Heading { .. } => "heading",
            DocumentNode::CodeBlock { .. } => "codeBlock",
            DocumentNode::BulletList { .. } => "bulletList",
            DocumentNode::OrderedList { .. } => "orderedList",
            DocumentNode::ListItem { .. } => "listItem",
            DocumentNode::Text { .. } => "text",
            DocumentNode::Unknown { raw_type, .. } => raw_type,
        }
    }

    /// Child nodes (list items for lists, nothing for text)
    pub fn children(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Doc { children }
            | DocumentNode::Paragraph { children }
            | DocumentNode::Heading { children, .. }
            | DocumentNode::CodeBlock { children, .. }
            | DocumentNode::ListItem { children } => children,
            DocumentNode::BulletList { items } | DocumentNode::OrderedList { items } => items,
            DocumentNode::Unknown { children, .. } => children.as_deref().unwrap_or_default(),
            DocumentNode::Text { .. } => &[],
        }
    }

    /// Decode a node from ADF JSON, taking ownership of its strings
    pub fn from_value(value: Value) -> Self {
        let mut object = match value {
            Value::Object(object) => object,
            Value::String(text) => return DocumentNode::text(text),
            _ => {
                return DocumentNode::Unknown {
                    raw_type: String::new(),
                    attrs: None,
                    children: None,
                }
            }
        };

        let node_type = match object.remove("type") {
            Some(Value::String(node_type)) => node_type,
            _ => String::new(),
        };
        let content = take_content(&mut object);
        let attrs = object.remove("attrs");

        match node_type.as_str() {
            "doc" => DocumentNode::Doc {
                children: content.unwrap_or_default(),
            },
            "paragraph" => DocumentNode::Paragraph {
                children: content.unwrap_or_default(),
            },
            "heading" => DocumentNode::Heading {
                level: heading_level(attrs.as_ref()),
                children: content.unwrap_or_default(),
            },
            "codeBlock" => DocumentNode::CodeBlock {
                language: attrs
                    .as_ref()
                    .and_then(|attrs| attrs.get("language"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                children: content.unwrap_or_default(),
            },
            "bulletList" => DocumentNode::BulletList {
                items: content.unwrap_or_default(),
            },
            "orderedList" => DocumentNode::OrderedList {
                items: content.unwrap_or_default(),
            },
            "listItem" => DocumentNode::ListItem {
                children: content.unwrap_or_default(),
            },
            "text" => DocumentNode::Text {
                value: match object.remove("text") {
                    Some(Value::String(text)) => text,
                    _ => String::new(),
                },
                marks: take_marks(&mut object),
            },
            _ => DocumentNode::Unknown {
                raw_type: node_type,
                attrs,
                children: content,
            },
        }
    }
}

fn take_content(object: &mut Map<String, Value>) -> Option<Vec<DocumentNode>> {
    match object.remove("content") {
        Some(Value::Array(content)) => {
            Some(content.into_iter().map(DocumentNode::from_value).collect())
        }
        _ => None,
    }
}

fn take_children(object: &mut Map<String, Value>) -> Vec<DocumentNode> {
    take_content(object).unwrap_or_default()
}

fn take_marks(object: &mut Map<String, Value>) -> Vec<Mark> {
    let Some(Value::Array(raw_marks)) = object.remove("marks") else {
        return Vec::new();
    };

    let mut marks = Vec::new();
    for mark in raw_marks.into_iter().filter_map(Mark::from_value) {
        if !marks.contains(&mark) {
            marks.push(mark);
        }
    }
    marks
}

fn heading_level(attrs: Option<&Value>) -> u8 {
    attrs
        .and_then(|attrs| attrs.get("level"))
        .and_then(Value::as_u64)
        .map(|level| u8::try_from(level).unwrap_or(u8::MAX))
        .unwrap_or(1)
}

impl Serialize for Mark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Mark::Other(raw) = self {
            return raw.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("type", self.as_type())?;
        map.end()
    }
}

impl Serialize for DocumentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.node_type())?;

        match self {
            DocumentNode::Heading { level, children } => {
                map.serialize_entry("attrs", &json!({ "level": level }))?;
                map.serialize_entry("content", children)?;
            }
            DocumentNode::CodeBlock { language, children } => {
                if let Some(language) = language {
                    map.serialize_entry("attrs", &json!({ "language": language }))?;
                }
                map.serialize_entry("content", children)?;
            }
            DocumentNode::Text { value, marks } => {
                map.serialize_entry("text", value)?;
                if !marks.is_empty() {
                    map.serialize_entry("marks", marks)?;
                }
            }
            DocumentNode::Unknown {
                attrs, children, ..
            } => {
                if let Some(attrs) = attrs {
                    map.serialize_entry("attrs", attrs)?;
                }
                if let Some(children) = children {
                    map.serialize_entry("content", children)?;
                }
            }
            other => map.serialize_entry("content", other.children())?,
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for DocumentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(DocumentNode::from_value)
    }
}

/// Versioned ADF root, the shape JIRA expects in request bodies
#[derive(Debug, Clone, PartialEq)]
pub struct AdfDocument {
    pub version: u64,
    pub content: Vec<DocumentNode>,
}

impl AdfDocument {
    /// Version 1 document around the given blocks
    pub fn new(content: Vec<DocumentNode>) -> Self {
        Self {
            version: ADF_VERSION,
            content,
        }
    }

    /// Whether `value` is a document root: `type: "doc"` with a positive
    /// integer `version`
    pub fn is_document(value: &Value) -> bool {
        value
            .as_object()
            .and_then(document_version)
            .is_some()
    }

    /// Decode a document root; `None` unless the value has `type: "doc"` and
    /// a positive integer `version`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(mut object) => {
                let version = document_version(&object)?;
                Some(Self {
                    version,
                    content: take_children(&mut object),
                })
            }
            _ => None,
        }
    }
}

fn document_version(object: &Map<String, Value>) -> Option<u64> {
    if object.get("type").and_then(Value::as_str) != Some("doc") {
        return None;
    }
    object
        .get("version")
        .and_then(Value::as_u64)
        .filter(|version| *version > 0)
}

impl Serialize for AdfDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("type", "doc")?;
        map.serialize_entry("content", &self.content)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AdfDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        AdfDocument::from_value(value)
            .ok_or_else(|| de::Error::custom("expected an ADF document with type \"doc\" and a version"))
    }
}

/// Anything a JIRA rich-text field may hold: a full document, a bare node,
/// or a legacy plain-text string
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Document(AdfDocument),
    Node(DocumentNode),
    Text(String),
}

impl Content {
    /// Classify a JSON field value. `null`, numbers, booleans and arrays are
    /// not document content.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Content::Text(text)),
            Value::Object(mut object) => match document_version(&object) {
                Some(version) => Some(Content::Document(AdfDocument {
                    version,
                    content: take_children(&mut object),
                })),
                None => Some(Content::Node(DocumentNode::from_value(Value::Object(
                    object,
                )))),
            },
            _ => None,
        }
    }
}

impl From<AdfDocument> for Content {
    fn from(document: AdfDocument) -> Self {
        Content::Document(document)
    }
}

impl From<DocumentNode> for Content {
    fn from(node: DocumentNode) -> Self {
        Content::Node(node)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Content::Document(document) => document.serialize(serializer),
            Content::Node(node) => node.serialize(serializer),
            Content::Text(text) => serializer.serialize_str(text),
        }
    }
}
