//! Data types for extracted elements, chunks, and result envelopes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::options::{ChunkingStrategy, LoadingMethod};

/// Open metadata mapping. Ordered so serialized envelopes are deterministic.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Kind of a normalized extraction element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Narrative,
    Title,
    Table,
    Image,
    Other,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::Title => "title",
            Self::Table => "table",
            Self::Image => "image",
            Self::Other => "other",
        }
    }

    /// Structural elements must never be merged with neighboring text.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Table | Self::Image)
    }
}

/// One atomic unit extracted from a source document.
///
/// Produced by a loader adapter or the parse projector, immutable once
/// built, and discarded after chunking. Persistence is not a core concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub text: String,
    /// 1-based source page, when the backend knows it.
    pub page_number: Option<u32>,
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Element {
    pub fn new(text: impl Into<String>, page_number: Option<u32>, kind: ElementKind) -> Self {
        Self {
            text: text.into(),
            page_number,
            kind,
            metadata: Metadata::new(),
        }
    }

    /// Plain narrative text on a known page.
    pub fn narrative(text: impl Into<String>, page_number: u32) -> Self {
        Self::new(text, Some(page_number), ElementKind::Narrative)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A contiguous unit of text destined for indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based sequence id within the run.
    pub id: usize,
    /// Dense 0-based position within the run.
    pub chunk_index: usize,
    pub text: String,
    /// Character offset of the chunk's span in its source stream.
    pub char_start: usize,
    pub char_end: usize,
    /// Page of the first contributing character.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Characters actually shared with the previous chunk.
    pub overlap_with_previous: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Chunk {
    /// Number of whitespace-delimited tokens in the chunk text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Result envelope of one load or chunk invocation.
///
/// Built once per pipeline run and handed to the caller; the core never
/// mutates or persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingRun {
    pub filename: String,
    pub total_chunks: usize,
    pub total_pages: usize,
    pub loading_method: LoadingMethod,
    /// `None` for load artifacts that have not been re-chunked yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_method: Option<ChunkingStrategy>,
    /// SHA-256 of the normalized document text, for external artifact keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

impl ChunkingRun {
    /// Assemble an envelope, deriving the chunk and page totals.
    ///
    /// The timestamp is injected by the caller so the construction itself
    /// stays deterministic.
    pub fn new(
        filename: impl Into<String>,
        loading_method: LoadingMethod,
        chunking_method: Option<ChunkingStrategy>,
        content_hash: Option<String>,
        timestamp: DateTime<Utc>,
        chunks: Vec<Chunk>,
    ) -> Self {
        let total_pages = distinct_pages(&chunks);
        Self {
            filename: filename.into(),
            total_chunks: chunks.len(),
            total_pages,
            loading_method,
            chunking_method,
            content_hash,
            timestamp,
            chunks,
        }
    }
}

/// Result envelope of one parse invocation (table/image-aware path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseRun {
    pub filename: String,
    pub total_chunks: usize,
    pub total_pages: usize,
    pub parsing_backend: LoadingMethod,
    /// Extraction strategy the backend ran with (`fast`, `hi_res`, ...).
    pub parsing_method: String,
    pub timestamp: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

impl ParseRun {
    pub fn new(
        filename: impl Into<String>,
        parsing_backend: LoadingMethod,
        parsing_method: impl Into<String>,
        timestamp: DateTime<Utc>,
        chunks: Vec<Chunk>,
    ) -> Self {
        let total_pages = distinct_pages(&chunks);
        Self {
            filename: filename.into(),
            total_chunks: chunks.len(),
            total_pages,
            parsing_backend,
            parsing_method: parsing_method.into(),
            timestamp,
            chunks,
        }
    }
}

fn distinct_pages(chunks: &[Chunk]) -> usize {
    chunks
        .iter()
        .filter_map(|c| c.page_number)
        .collect::<BTreeSet<_>>()
        .len()
}
