//! Docmill Ingest — loader adapters, element normalization, chunking
//! strategies, and pipeline orchestration.
//!
//! The pipeline turns raw document bytes into a uniform chunk sequence:
//!
//! ```text
//! raw bytes ──► ExtractionEngine (black box) ──► RawOutput
//!                       │
//!            DocumentLoader adapter ──► normalize ──► Vec<Element>
//!                       │
//!        ┌──────────────┴──────────────┐
//!   chunking::chunk_elements      project::project
//!   (five strategies)             (one chunk per table/image element)
//!        │                             │
//!   ChunkingRun envelope          ParseRun envelope
//! ```

pub mod backend;
pub mod chunking;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod project;

pub use backend::{BoxError, ExtractionEngine, RawElement, RawOutput, RawPage};
pub use chunking::chunk_elements;
pub use loader::{adapter_for, DocumentLoader, LoaderRegistry};
pub use normalize::normalize;
pub use pipeline::{LoadRequest, ParseRequest, Pipeline, RunState};
pub use project::project;
