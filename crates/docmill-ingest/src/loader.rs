//! Loader adapters: one per extraction backend, behind one capability.
//!
//! An adapter owns a black-box [`ExtractionEngine`] and produces normalized
//! elements from raw document bytes. The orchestrator selects adapters by
//! backend name through the [`LoaderRegistry`] dispatch table without
//! knowing backend internals.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use docmill_core::{Element, Error, LoadOptions, LoadingMethod, Result};

use crate::backend::{ExtractionEngine, RawOutput};
use crate::normalize::normalize;

/// Capability shared by every loader adapter.
///
/// `load` is atomic: on any backend failure the call returns an error and
/// no partial element sequence. Adapters never write to storage.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    fn backend(&self) -> LoadingMethod;

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>>;
}

/// Run the engine and classify its failure under the adapter's backend.
async fn extract_raw(
    backend: LoadingMethod,
    engine: &dyn ExtractionEngine,
    raw_bytes: &[u8],
    options: &LoadOptions,
) -> Result<RawOutput> {
    engine
        .extract(raw_bytes, options)
        .await
        .map_err(|e| Error::Load {
            backend,
            cause: e.to_string(),
        })
}

/// Load path shared by the page-oriented adapters.
///
/// These backends extract a text layer page by page; typed elements in the
/// output mean the engine was wired to the wrong adapter.
async fn load_page_oriented(
    backend: LoadingMethod,
    engine: &dyn ExtractionEngine,
    raw_bytes: &[u8],
    options: &LoadOptions,
) -> Result<Vec<Element>> {
    let raw = extract_raw(backend, engine, raw_bytes, options).await?;
    match raw {
        RawOutput::Pages(_) => Ok(normalize(backend, raw)),
        RawOutput::Elements(_) => Err(Error::Load {
            backend,
            cause: "backend returned typed elements where page text was expected".into(),
        }),
    }
}

/// PyMuPDF adapter: fast text-layer extraction, page per page.
pub struct PymupdfLoader {
    engine: Arc<dyn ExtractionEngine>,
}

impl PymupdfLoader {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DocumentLoader for PymupdfLoader {
    fn backend(&self) -> LoadingMethod {
        LoadingMethod::Pymupdf
    }

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>> {
        load_page_oriented(self.backend(), self.engine.as_ref(), raw_bytes, options).await
    }
}

/// pypdf adapter: pure-text page extraction.
pub struct PypdfLoader {
    engine: Arc<dyn ExtractionEngine>,
}

impl PypdfLoader {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DocumentLoader for PypdfLoader {
    fn backend(&self) -> LoadingMethod {
        LoadingMethod::Pypdf
    }

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>> {
        load_page_oriented(self.backend(), self.engine.as_ref(), raw_bytes, options).await
    }
}

/// pdfplumber adapter: layout-aware page text extraction.
pub struct PdfplumberLoader {
    engine: Arc<dyn ExtractionEngine>,
}

impl PdfplumberLoader {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DocumentLoader for PdfplumberLoader {
    fn backend(&self) -> LoadingMethod {
        LoadingMethod::Pdfplumber
    }

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>> {
        load_page_oriented(self.backend(), self.engine.as_ref(), raw_bytes, options).await
    }
}

/// unstructured adapter: layout inference with typed elements.
///
/// Honors the extraction strategy, header/footer inclusion, table-structure
/// inference, image extraction, and language hints.
pub struct UnstructuredLoader {
    engine: Arc<dyn ExtractionEngine>,
}

impl UnstructuredLoader {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DocumentLoader for UnstructuredLoader {
    fn backend(&self) -> LoadingMethod {
        LoadingMethod::Unstructured
    }

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>> {
        tracing::debug!(
            "Partitioning with unstructured: strategy={} tables={} images={} languages={:?}",
            options.strategy.as_str(),
            options.infer_table_structure,
            options.extract_images_in_pdf,
            options.languages
        );
        // Older text-layer deployments answer with plain pages; both shapes
        // normalize cleanly.
        let raw = extract_raw(self.backend(), self.engine.as_ref(), raw_bytes, options).await?;
        Ok(normalize(self.backend(), raw))
    }
}

/// LlamaParse adapter: cloud parsing service with typed elements.
pub struct LlamaParseLoader {
    engine: Arc<dyn ExtractionEngine>,
}

impl LlamaParseLoader {
    pub fn new(engine: Arc<dyn ExtractionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DocumentLoader for LlamaParseLoader {
    fn backend(&self) -> LoadingMethod {
        LoadingMethod::Llamaparser
    }

    async fn load(&self, raw_bytes: &[u8], options: &LoadOptions) -> Result<Vec<Element>> {
        if !options.languages.is_empty() {
            tracing::debug!("LlamaParse language hints: {:?}", options.languages);
        }
        let raw = extract_raw(self.backend(), self.engine.as_ref(), raw_bytes, options).await?;
        Ok(normalize(self.backend(), raw))
    }
}

/// Build the adapter for a backend name around the given engine.
pub fn adapter_for(
    method: LoadingMethod,
    engine: Arc<dyn ExtractionEngine>,
) -> Arc<dyn DocumentLoader> {
    match method {
        LoadingMethod::Pymupdf => Arc::new(PymupdfLoader::new(engine)),
        LoadingMethod::Pypdf => Arc::new(PypdfLoader::new(engine)),
        LoadingMethod::Pdfplumber => Arc::new(PdfplumberLoader::new(engine)),
        LoadingMethod::Unstructured => Arc::new(UnstructuredLoader::new(engine)),
        LoadingMethod::Llamaparser => Arc::new(LlamaParseLoader::new(engine)),
    }
}

/// Name-to-adapter dispatch table.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<LoadingMethod, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its backend name, replacing any previous
    /// registration for that backend.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) -> &mut Self {
        self.loaders.insert(loader.backend(), loader);
        self
    }

    /// Register the standard adapter for `method` around `engine`.
    pub fn register_engine(
        &mut self,
        method: LoadingMethod,
        engine: Arc<dyn ExtractionEngine>,
    ) -> &mut Self {
        self.register(adapter_for(method, engine))
    }

    pub fn get(&self, method: LoadingMethod) -> Option<Arc<dyn DocumentLoader>> {
        self.loaders.get(&method).cloned()
    }

    /// Registered backend names, in stable order.
    pub fn backends(&self) -> Vec<LoadingMethod> {
        self.loaders.keys().copied().collect()
    }
}
