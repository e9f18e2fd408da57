//! The black-box seam to third-party extraction backends.
//!
//! Real extraction (PDF text layers, OCR, layout inference, cloud parsing)
//! lives outside this crate. An [`ExtractionEngine`] hands back its native
//! output shape and the loader adapters turn it into normalized elements.

use async_trait::async_trait;

use docmill_core::{LoadOptions, Metadata};

/// Boxed error from an external backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One page of plain extracted text, as emitted by page-oriented backends.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub text: String,
    /// 1-based page number when the backend reports one.
    pub page_number: Option<u32>,
}

impl RawPage {
    pub fn new(text: impl Into<String>, page_number: Option<u32>) -> Self {
        Self {
            text: text.into(),
            page_number,
        }
    }
}

/// One typed element, as emitted by structure-aware backends.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub text: String,
    pub page_number: Option<u32>,
    /// Backend category tag, e.g. `"Table"`, `"Image"`, `"NarrativeText"`.
    pub category: Option<String>,
    /// Backend metadata (bounding boxes, detected languages, ...).
    pub metadata: Metadata,
}

impl RawElement {
    pub fn new(text: impl Into<String>, page_number: Option<u32>) -> Self {
        Self {
            text: text.into(),
            page_number,
            category: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Native output of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Page-per-page plain text extraction.
    Pages(Vec<RawPage>),
    /// Ordered typed elements with per-element metadata.
    Elements(Vec<RawElement>),
}

impl RawOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Pages(pages) => pages.is_empty(),
            Self::Elements(elements) => elements.is_empty(),
        }
    }
}

/// Capability implemented by every external extraction backend.
///
/// An engine call is atomic: it either returns the complete native output
/// or fails. Engines must not hold process-wide mutable state, so
/// independent pipeline runs can share them concurrently.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    async fn extract(
        &self,
        raw_bytes: &[u8],
        options: &LoadOptions,
    ) -> std::result::Result<RawOutput, BoxError>;
}
