//! Atlassian Document Format codec
//!
//! JIRA Cloud stores descriptions and comment bodies as ADF trees. The
//! functions here render those trees for display and build them from the
//! plain text an assistant sends:
//!
//! - [`render`] / [`render_node`]: tree to Markdown
//! - [`extract_plain_text`]: tree to bare text
//! - [`text_to_tree`]: plain text to document
//! - [`ensure_document`]: any accepted input to document
//!
//! All of them are pure and never fail; unrecognized node types degrade to
//! their text content.

pub mod builder;
pub mod node;
pub mod normalize;
pub mod render;

pub use builder::text_to_tree;
pub use node::{AdfDocument, Content, DocumentNode, Mark, ADF_VERSION};
pub use normalize::ensure_document;
pub use render::{extract_plain_text, render, render_node};
