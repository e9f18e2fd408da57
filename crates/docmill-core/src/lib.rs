//! Docmill Core — error taxonomy, strategy configuration, and the
//! element/chunk data model shared across the pipeline.

pub mod config;
pub mod error;
pub mod options;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use options::{
    ChunkingOptions, ChunkingStrategy, ExtractionStrategy, LoadOptions, LoadingMethod,
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATORS,
};
pub use types::{Chunk, ChunkingRun, Element, ElementKind, Metadata, ParseRun};
