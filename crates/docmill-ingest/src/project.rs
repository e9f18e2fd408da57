//! Parse-to-text projection for the table/image-aware path.
//!
//! One structural element maps to exactly one chunk; splitting a table
//! mid-structure or merging an image caption into neighboring prose would
//! destroy its meaning. Re-windowing is the chunking engine's business,
//! never this module's.

use docmill_core::{Chunk, Element, ElementKind};

/// Convert normalized elements into one chunk per element.
///
/// Elements whose text trims to empty are skipped, except images, which
/// get a placeholder caption so their position and metadata survive.
/// Offsets are relative to each element's own text.
pub fn project(elements: &[Element]) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();

    for element in elements {
        let Some(text) = projected_text(element) else {
            continue;
        };

        let mut metadata = element.metadata.clone();
        metadata.insert("element_type".into(), element.kind.as_str().into());
        metadata.insert(
            "word_count".into(),
            serde_json::json!(text.split_whitespace().count()),
        );
        if let Some(page) = element.page_number {
            metadata.insert("page_range".into(), page.to_string().into());
        }

        let index = chunks.len();
        chunks.push(Chunk {
            id: index + 1,
            chunk_index: index,
            char_start: 0,
            char_end: text.chars().count(),
            text,
            page_number: element.page_number,
            overlap_with_previous: 0,
            metadata,
        });
    }

    chunks
}

/// Textual representation of one element, or `None` to skip it.
fn projected_text(element: &Element) -> Option<String> {
    let trimmed = element.text.trim();
    if !trimmed.is_empty() {
        return Some(trimmed.to_string());
    }
    if element.kind == ElementKind::Image {
        return Some(match element.page_number {
            Some(page) => format!("[image page {page}]"),
            None => "[image]".to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmill_core::Metadata;

    fn bounding_box(points: &[[f64; 2]]) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("coordinates".into(), serde_json::json!(points));
        metadata
    }

    #[test]
    fn test_one_chunk_per_element_in_order() {
        let elements = vec![
            Element::new("Intro prose.", Some(1), ElementKind::Narrative),
            Element::new("col_a | col_b\n1 | 2", Some(1), ElementKind::Table),
            Element::new("More prose after the table.", Some(1), ElementKind::Narrative),
        ];
        let chunks = project(&elements);

        assert_eq!(chunks.len(), 3);
        // The table stayed its own chunk, never merged with the prose.
        assert_eq!(chunks[1].text, "col_a | col_b\n1 | 2");
        assert_eq!(
            chunks[1].metadata.get("element_type"),
            Some(&serde_json::json!("table"))
        );
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.overlap_with_previous, 0);
        }
    }

    #[test]
    fn test_textless_image_gets_placeholder() {
        let elements = vec![
            Element::new("", Some(4), ElementKind::Image)
                .with_metadata(bounding_box(&[[0.0, 0.0], [120.0, 80.0]])),
            Element::new("", Some(4), ElementKind::Narrative),
        ];
        let chunks = project(&elements);

        // The empty narrative element is skipped, the image is kept.
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "[image page 4]");
        assert_eq!(chunks[0].page_number, Some(4));
        assert!(chunks[0].metadata.contains_key("coordinates"));
    }

    #[test]
    fn test_backend_metadata_passes_through() {
        let mut metadata = Metadata::new();
        metadata.insert("category".into(), "Table".into());
        metadata.insert("text_as_html".into(), "<table/>".into());

        let elements =
            vec![Element::new("a | b", Some(2), ElementKind::Table).with_metadata(metadata)];
        let chunks = project(&elements);

        assert_eq!(
            chunks[0].metadata.get("text_as_html"),
            Some(&serde_json::json!("<table/>"))
        );
        assert_eq!(
            chunks[0].metadata.get("page_range"),
            Some(&serde_json::json!("2"))
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(project(&[]).is_empty());
    }
}
