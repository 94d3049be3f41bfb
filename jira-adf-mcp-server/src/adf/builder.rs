//! Plain text to ADF conversion

use super::node::{AdfDocument, DocumentNode};

/// Build a document from plain text, one paragraph per blank-line separated
/// chunk.
///
/// Single newlines stay inside the chunk's text run. Returns `None` for
/// absent or whitespace-only input.
pub fn text_to_tree(text: Option<&str>) -> Option<AdfDocument> {
    let trimmed = text?.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Splitting on "\n\n" and trimming each chunk is equivalent to splitting
    // on runs of two or more newlines; empty chunks come from longer runs.
    let paragraphs: Vec<DocumentNode> = trimmed
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(DocumentNode::paragraph)
        .collect();

    Some(AdfDocument::new(paragraphs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adf::node::ADF_VERSION;

    fn paragraph_texts(document: &AdfDocument) -> Vec<&str> {
        document
            .content
            .iter()
            .map(|paragraph| match paragraph.children() {
                [DocumentNode::Text { value, marks }] if marks.is_empty() => value.as_str(),
                other => panic!("expected a single text run, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_blank_input_yields_none() {
        assert_eq!(text_to_tree(None), None);
        assert_eq!(text_to_tree(Some("")), None);
        assert_eq!(text_to_tree(Some("   ")), None);
        assert_eq!(text_to_tree(Some("\n\n \t\n")), None);
    }

    #[test]
    fn test_two_paragraphs() {
        let document = text_to_tree(Some("First paragraph\n\nSecond paragraph")).unwrap();

        assert_eq!(document.version, ADF_VERSION);
        assert_eq!(document.content.len(), 2);
        assert_eq!(
            paragraph_texts(&document),
            vec!["First paragraph", "Second paragraph"]
        );
    }

    #[test]
    fn test_single_line_is_one_paragraph() {
        let document = text_to_tree(Some("  just one line  ")).unwrap();
        assert_eq!(paragraph_texts(&document), vec!["just one line"]);
    }

    #[test]
    fn test_single_newlines_are_preserved() {
        let document = text_to_tree(Some("line one\nline two\n\nnext")).unwrap();
        assert_eq!(paragraph_texts(&document), vec!["line one\nline two", "next"]);
    }

    #[test]
    fn test_long_newline_runs_are_one_boundary() {
        let document = text_to_tree(Some("a\n\n\nb\n\n\n\n\nc")).unwrap();
        assert_eq!(paragraph_texts(&document), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_whitespace_only_chunks_are_skipped() {
        let document = text_to_tree(Some("a\n\n   \n\nb")).unwrap();
        assert_eq!(paragraph_texts(&document), vec!["a", "b"]);
    }
}
