//! Backend selection and strategy configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default separator priority list for [`ChunkingStrategy::BySeparators`].
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Extraction backend selected for the load stage.
///
/// Backends are invoked as black boxes behind the `ExtractionEngine` seam;
/// the names here are wire-level identifiers persisted in envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingMethod {
    Pymupdf,
    Pypdf,
    Pdfplumber,
    Unstructured,
    Llamaparser,
}

impl LoadingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pymupdf => "pymupdf",
            Self::Pypdf => "pypdf",
            Self::Pdfplumber => "pdfplumber",
            Self::Unstructured => "unstructured",
            Self::Llamaparser => "llamaparser",
        }
    }

    /// Whether the backend reports typed elements (tables, images, titles)
    /// rather than plain page text.
    pub fn is_structure_aware(&self) -> bool {
        matches!(self, Self::Unstructured | Self::Llamaparser)
    }
}

impl std::fmt::Display for LoadingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoadingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pymupdf" => Ok(Self::Pymupdf),
            "pypdf" => Ok(Self::Pypdf),
            "pdfplumber" => Ok(Self::Pdfplumber),
            "unstructured" => Ok(Self::Unstructured),
            "llamaparser" => Ok(Self::Llamaparser),
            other => Err(Error::Config(format!("unknown loading method: {other}"))),
        }
    }
}

/// Extraction strategy hint forwarded to structure-aware backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    Fast,
    HiRes,
    OcrOnly,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::HiRes => "hi_res",
            Self::OcrOnly => "ocr_only",
        }
    }
}

/// Options forwarded to a loader adapter.
///
/// Each backend recognizes a subset of these keys; unrecognized keys are
/// ignored, matching the permissive pass-through of the extraction
/// backends themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Extraction strategy for structure-aware backends.
    pub strategy: ExtractionStrategy,
    /// Keep page headers and footers in the extracted text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_header_footer: Option<bool>,
    /// Run table-structure inference where the backend supports it.
    pub infer_table_structure: bool,
    /// Extract embedded images where the backend supports it.
    pub extract_images_in_pdf: bool,
    /// Language hints for OCR-capable backends.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::HiRes,
            include_header_footer: None,
            infer_table_structure: true,
            extract_images_in_pdf: true,
            languages: Vec::new(),
        }
    }
}

/// Chunking strategy selected for the chunk stage.
///
/// A closed set: each variant has its own overlap semantics and the engine
/// dispatches on the variant, never through a shared base implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    ByPages,
    FixedSize,
    ByParagraphs,
    BySentences,
    BySeparators,
}

impl ChunkingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByPages => "by_pages",
            Self::FixedSize => "fixed_size",
            Self::ByParagraphs => "by_paragraphs",
            Self::BySentences => "by_sentences",
            Self::BySeparators => "by_separators",
        }
    }

    /// Whether `chunk_size`/`chunk_overlap` participate in this strategy.
    pub fn is_size_based(&self) -> bool {
        !matches!(self, Self::ByPages)
    }
}

impl std::fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "by_pages" => Ok(Self::ByPages),
            "fixed_size" => Ok(Self::FixedSize),
            "by_paragraphs" => Ok(Self::ByParagraphs),
            "by_sentences" => Ok(Self::BySentences),
            "by_separators" => Ok(Self::BySeparators),
            other => Err(Error::Config(format!("unknown chunking strategy: {other}"))),
        }
    }
}

/// Validated parameter set for one chunking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub strategy: ChunkingStrategy,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Priority-ordered separator list, only honored by `by_separators`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separators: Option<Vec<String>>,
}

impl ChunkingOptions {
    pub fn new(strategy: ChunkingStrategy) -> Self {
        Self {
            strategy,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: None,
        }
    }

    pub fn with_size(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = Some(separators);
        self
    }

    /// Effective separator list for `by_separators`.
    pub fn separators(&self) -> Vec<String> {
        match &self.separators {
            Some(list) => list.clone(),
            None => DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check the invariants the chunking engine relies on.
    ///
    /// Runs before any backend is invoked; failures are caller errors.
    pub fn validate(&self) -> Result<()> {
        if self.strategy.is_size_based() {
            if self.chunk_size == 0 {
                return Err(Error::Config(format!(
                    "chunk_size must be positive for {}",
                    self.strategy
                )));
            }
            if self.chunk_overlap >= self.chunk_size {
                return Err(Error::Config(format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    self.chunk_overlap, self.chunk_size
                )));
            }
        }
        if self.strategy == ChunkingStrategy::BySeparators {
            if let Some(list) = &self.separators {
                if list.is_empty() || list.iter().any(|s| s.is_empty()) {
                    return Err(Error::Config(
                        "separators must be a non-empty list of non-empty strings".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self::new(ChunkingStrategy::FixedSize)
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_method_round_trip() {
        for name in ["pymupdf", "pypdf", "pdfplumber", "unstructured", "llamaparser"] {
            let method: LoadingMethod = name.parse().unwrap();
            assert_eq!(method.as_str(), name);
        }
        assert!("docling".parse::<LoadingMethod>().is_err());
    }

    #[test]
    fn test_strategy_wire_names() {
        let json = serde_json::to_string(&ChunkingStrategy::BySeparators).unwrap();
        assert_eq!(json, "\"by_separators\"");
        let parsed: ChunkingStrategy = serde_json::from_str("\"fixed_size\"").unwrap();
        assert_eq!(parsed, ChunkingStrategy::FixedSize);
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_size() {
        let opts = ChunkingOptions::new(ChunkingStrategy::FixedSize).with_size(100, 100);
        assert!(matches!(opts.validate(), Err(Error::Config(_))));

        let opts = ChunkingOptions::new(ChunkingStrategy::FixedSize).with_size(100, 20);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_ignores_size_for_by_pages() {
        let opts = ChunkingOptions::new(ChunkingStrategy::ByPages).with_size(0, 0);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_chunking_options_wire_defaults() {
        let opts: ChunkingOptions =
            serde_json::from_str("{\"strategy\": \"by_sentences\"}").unwrap();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(opts.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert!(opts.separators.is_none());

        let load: LoadOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(load.strategy, ExtractionStrategy::HiRes);
        assert!(load.infer_table_structure);
        assert!(load.extract_images_in_pdf);
    }

    #[test]
    fn test_validate_rejects_empty_separators() {
        let opts = ChunkingOptions::new(ChunkingStrategy::BySeparators).with_separators(vec![]);
        assert!(matches!(opts.validate(), Err(Error::Config(_))));

        let opts = ChunkingOptions::new(ChunkingStrategy::BySeparators);
        assert!(opts.validate().is_ok());
        assert_eq!(opts.separators().len(), 4);
    }
}
