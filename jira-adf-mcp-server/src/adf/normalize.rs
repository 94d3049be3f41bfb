//! Normalization of rich-text input into a versioned document

use super::builder::text_to_tree;
use super::node::{AdfDocument, Content};

/// Turn any accepted input into an [`AdfDocument`].
///
/// An existing document is handed back as-is, moved rather than copied and
/// not re-validated. A bare node is moved into a new version 1 wrapper,
/// including a `doc` node that lacks a version. Strings go through
/// [`text_to_tree`]. Absent or blank input yields `None`.
pub fn ensure_document(input: Option<Content>) -> Option<AdfDocument> {
    match input? {
        Content::Document(document) => Some(document),
        Content::Node(node) => Some(AdfDocument::new(vec![node])),
        Content::Text(text) => text_to_tree(Some(&text)),
    }
}
