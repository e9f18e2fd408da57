//! Pipeline orchestration: Load -> (Parse) -> Chunk.
//!
//! Each run is independent and stateless with respect to other runs;
//! stages execute sequentially because each stage's output is the next
//! stage's only input. Failures surface as typed errors with no partial
//! envelope; retry policy belongs to the caller.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use docmill_core::{
    Chunk, ChunkingOptions, ChunkingRun, ChunkingStrategy, Element, Error, LoadOptions,
    LoadingMethod, ParseRun, PipelineConfig, Result,
};

use crate::chunking::chunk_elements;
use crate::loader::LoaderRegistry;
use crate::project::project;

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Parsing,
    Chunking,
    Done,
    Failed,
}

/// Tracks one run's state transitions for diagnostics.
struct RunGuard {
    id: Uuid,
    state: RunState,
}

impl RunGuard {
    fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RunState::Idle,
        }
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!("Run {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: &Error) {
        tracing::warn!("Run {} failed during {:?}: {}", self.id, self.state, error);
        self.state = RunState::Failed;
    }
}

/// Input to the load stage.
pub struct LoadRequest<'a> {
    pub filename: &'a str,
    pub raw_bytes: &'a [u8],
    pub method: LoadingMethod,
    pub options: LoadOptions,
}

/// Input to the parse stage (table/image-aware path).
pub struct ParseRequest<'a> {
    pub filename: &'a str,
    pub raw_bytes: &'a [u8],
    pub backend: LoadingMethod,
    pub options: LoadOptions,
}

/// Sequences loading, parsing, and chunking over registered adapters.
pub struct Pipeline {
    registry: LoaderRegistry,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(registry: LoaderRegistry, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    /// Extract a document into a load artifact: one chunk per page group,
    /// ready for persistence or later re-chunking.
    pub async fn load(&self, request: &LoadRequest<'_>) -> Result<ChunkingRun> {
        let mut run = RunGuard::start();
        match self.load_inner(&mut run, request).await {
            Ok(envelope) => {
                run.advance(RunState::Done);
                tracing::info!(
                    "Loaded {} via {} into {} chunks over {} pages",
                    request.filename,
                    request.method,
                    envelope.total_chunks,
                    envelope.total_pages
                );
                Ok(envelope)
            }
            Err(error) => {
                run.fail(&error);
                Err(error)
            }
        }
    }

    async fn load_inner(
        &self,
        run: &mut RunGuard,
        request: &LoadRequest<'_>,
    ) -> Result<ChunkingRun> {
        run.advance(RunState::Loading);
        let elements = self
            .run_loader(request.method, request.raw_bytes, &request.options)
            .await?;

        run.advance(RunState::Chunking);
        let hash = content_hash(&elements);
        let chunks = chunk_elements(&elements, &ChunkingOptions::new(ChunkingStrategy::ByPages))?;

        Ok(ChunkingRun::new(
            request.filename,
            request.method,
            None,
            Some(hash),
            Utc::now(),
            chunks,
        ))
    }

    /// Re-chunk a previously loaded artifact under the given strategy.
    ///
    /// Strategy parameters are validated before any work happens; an
    /// invalid configuration is a caller error.
    pub fn chunk(&self, artifact: &ChunkingRun, options: &ChunkingOptions) -> Result<ChunkingRun> {
        let mut run = RunGuard::start();
        match self.chunk_inner(&mut run, artifact, options) {
            Ok(envelope) => {
                run.advance(RunState::Done);
                tracing::info!(
                    "Re-chunked {} with {} into {} chunks",
                    artifact.filename,
                    options.strategy,
                    envelope.total_chunks
                );
                Ok(envelope)
            }
            Err(error) => {
                run.fail(&error);
                Err(error)
            }
        }
    }

    fn chunk_inner(
        &self,
        run: &mut RunGuard,
        artifact: &ChunkingRun,
        options: &ChunkingOptions,
    ) -> Result<ChunkingRun> {
        options.validate()?;

        run.advance(RunState::Chunking);
        let elements = elements_from_chunks(&artifact.chunks);
        let chunks = chunk_elements(&elements, options)?;

        Ok(ChunkingRun::new(
            artifact.filename.clone(),
            artifact.loading_method,
            Some(options.strategy),
            artifact.content_hash.clone(),
            Utc::now(),
            chunks,
        ))
    }

    /// Load and re-chunk in one sequential run.
    pub async fn load_and_chunk(
        &self,
        request: &LoadRequest<'_>,
        options: &ChunkingOptions,
    ) -> Result<ChunkingRun> {
        let mut run = RunGuard::start();
        let result = async {
            options.validate()?;

            run.advance(RunState::Loading);
            let elements = self
                .run_loader(request.method, request.raw_bytes, &request.options)
                .await?;

            run.advance(RunState::Chunking);
            let hash = content_hash(&elements);
            let chunks = chunk_elements(&elements, options)?;

            Ok(ChunkingRun::new(
                request.filename,
                request.method,
                Some(options.strategy),
                Some(hash),
                Utc::now(),
                chunks,
            ))
        }
        .await;

        match result {
            Ok(envelope) => {
                run.advance(RunState::Done);
                Ok(envelope)
            }
            Err(error) => {
                run.fail(&error);
                Err(error)
            }
        }
    }

    /// Parse a document through a structure-aware backend, projecting each
    /// table/image/text element into exactly one chunk.
    pub async fn parse(&self, request: &ParseRequest<'_>) -> Result<ParseRun> {
        let mut run = RunGuard::start();
        match self.parse_inner(&mut run, request).await {
            Ok(envelope) => {
                run.advance(RunState::Done);
                tracing::info!(
                    "Parsed {} via {} into {} chunks",
                    request.filename,
                    request.backend,
                    envelope.total_chunks
                );
                Ok(envelope)
            }
            Err(error) => {
                run.fail(&error);
                Err(error)
            }
        }
    }

    async fn parse_inner(&self, run: &mut RunGuard, request: &ParseRequest<'_>) -> Result<ParseRun> {
        if !request.backend.is_structure_aware() {
            return Err(Error::Config(format!(
                "unsupported parsing backend: {}",
                request.backend
            )));
        }

        run.advance(RunState::Loading);
        let elements = self
            .run_loader(request.backend, request.raw_bytes, &request.options)
            .await?;

        run.advance(RunState::Parsing);
        let chunks = project(&elements);

        Ok(ParseRun::new(
            request.filename,
            request.backend,
            request.options.strategy.as_str(),
            Utc::now(),
            chunks,
        ))
    }

    /// Dispatch to the registered adapter under the configured timeout.
    async fn run_loader(
        &self,
        method: LoadingMethod,
        raw_bytes: &[u8],
        options: &LoadOptions,
    ) -> Result<Vec<Element>> {
        let loader = self.registry.get(method).ok_or_else(|| {
            Error::Config(format!("no loader registered for backend: {method}"))
        })?;

        match tokio::time::timeout(self.config.load_timeout, loader.load(raw_bytes, options)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                backend: method,
                seconds: self.config.load_timeout.as_secs(),
            }),
        }
    }
}

/// Rebuild elements from a load artifact's page chunks for re-chunking.
fn elements_from_chunks(chunks: &[Chunk]) -> Vec<Element> {
    chunks
        .iter()
        .map(|chunk| Element::new(
            chunk.text.clone(),
            chunk.page_number,
            docmill_core::ElementKind::Narrative,
        ))
        .collect()
}

/// SHA-256 over the normalized element texts.
pub fn content_hash(elements: &[Element]) -> String {
    let mut hasher = Sha256::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n\n");
        }
        hasher.update(element.text.as_bytes());
    }
    hex::encode(hasher.finalize())
}
