//! Element normalization: backend-native output to the canonical shape.

use docmill_core::{Element, ElementKind, LoadingMethod};

use crate::backend::{RawElement, RawOutput, RawPage};

/// Map a backend's native output into the canonical element sequence.
///
/// Element order is preserved exactly as emitted by the backend; it is the
/// only ordering guarantee downstream chunking may rely on.
pub fn normalize(backend: LoadingMethod, raw: RawOutput) -> Vec<Element> {
    match raw {
        RawOutput::Pages(pages) => normalize_pages(pages),
        RawOutput::Elements(elements) => normalize_elements(backend, elements),
    }
}

/// Pages become narrative elements; a missing page number defaults to the
/// 1-based sequence position, page-per-page.
fn normalize_pages(pages: Vec<RawPage>) -> Vec<Element> {
    pages
        .into_iter()
        .enumerate()
        .map(|(idx, page)| {
            let page_number = page.page_number.unwrap_or(idx as u32 + 1);
            Element::narrative(page.text, page_number)
        })
        .collect()
}

fn normalize_elements(backend: LoadingMethod, elements: Vec<RawElement>) -> Vec<Element> {
    let count = elements.len();
    let normalized = elements
        .into_iter()
        .map(|raw| {
            let kind = raw
                .category
                .as_deref()
                .map(kind_from_category)
                .unwrap_or(ElementKind::Narrative);

            let mut metadata = raw.metadata;
            if let Some(category) = raw.category {
                metadata.insert("category".into(), category.into());
            }

            Element::new(raw.text, raw.page_number, kind).with_metadata(metadata)
        })
        .collect();

    tracing::debug!("Normalized {} elements from {}", count, backend);
    normalized
}

/// Map a backend category tag onto the canonical element kind.
///
/// Category names follow the unstructured-style vocabulary; anything
/// unrecognized lands in `Other` rather than being dropped.
fn kind_from_category(category: &str) -> ElementKind {
    match category {
        "Table" => ElementKind::Table,
        "Image" | "Figure" | "FigureCaption" => ElementKind::Image,
        "Title" | "Header" | "Headline" | "SectionHeader" => ElementKind::Title,
        "NarrativeText" | "Text" | "UncategorizedText" | "ListItem" | "Paragraph" => {
            ElementKind::Narrative
        }
        _ => ElementKind::Other,
    }
}
