// ─── Orchestrator ───
// Owns the pack list, file registry, and metadata cache for one merging
// session, and sequences analysis over load / remove / reorder / edit /
// emit events. Every state-changing event invalidates the deep-analysis
// result and re-runs the cheap pass.

pub mod report;

pub use report::{AnalysisReport, PackSummary};

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::core::archive::ArchiveReader;
use crate::core::emit::{self, EmitOptions};
use crate::core::error::{MergerError, MergerResult};
use crate::core::http::Fetcher;
use crate::core::log::{DiagnosticSink, Severity};
use crate::core::metadata::{parse_mod_metadata, MetadataCache, ModMetadata};
use crate::core::pack::{
    load_pack, FileCategory, FileOrigin, FileRecord, Loader, Pack, PackType,
};
use crate::core::resolve::{check_compatibility, resolve, validate_dependencies};

/// How many fetch+parse operations run concurrently during deep analysis.
/// The orchestrator awaits each full batch before dispatching the next,
/// bounding peak memory and inbound connections.
const ANALYSIS_BATCH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

/// A merging session: the single logical actor that owns all mutable
/// state. Pack list order is the priority order; index 0 is the head
/// pack.
pub struct MergerSession {
    packs: Vec<Pack>,
    files: Vec<FileRecord>,
    cache: MetadataCache,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn DiagnosticSink>,
    deep_performed: bool,
    analysis_in_progress: bool,
}

impl MergerSession {
    pub fn new(fetcher: Arc<dyn Fetcher>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            packs: Vec::new(),
            files: Vec::new(),
            cache: MetadataCache::new(),
            fetcher,
            sink,
            deep_performed: false,
            analysis_in_progress: false,
        }
    }

    // ── Accessors ───────────────────────────────────────

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn deep_analysis_performed(&self) -> bool {
        self.deep_performed
    }

    pub fn summaries(&self) -> Vec<PackSummary> {
        self.packs
            .iter()
            .map(|pack| PackSummary::build(pack, &self.files))
            .collect()
    }

    // ── State-changing events ───────────────────────────

    /// Load a pack archive from disk; the pack is named after the file
    /// stem.
    pub async fn load_pack_from_path(&mut self, path: &Path) -> MergerResult<AnalysisReport> {
        let bytes = tokio::fs::read(path).await.map_err(|e| MergerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pack")
            .to_string();
        self.load_pack(&name, bytes)
    }

    /// Load a pack archive and append it at the lowest priority.
    ///
    /// A pack whose name matches an already-loaded pack is skipped with a
    /// warning rather than rejected.
    pub fn load_pack(&mut self, name: &str, bytes: Vec<u8>) -> MergerResult<AnalysisReport> {
        if self.packs.iter().any(|p| p.name == name) {
            self.sink.log(
                &format!("Pack '{name}' is already loaded; skipping"),
                Severity::Warning,
            );
            return Ok(self.quick_analysis());
        }

        let loaded = load_pack(name, bytes, self.packs.first())?;
        info!(
            "Loaded pack '{}' ({} files, {} / {})",
            name,
            loaded.files.len(),
            loaded.pack.minecraft_version,
            loaded.pack.loader
        );

        self.packs.push(loaded.pack);
        self.files.extend(loaded.files);
        self.invalidate();
        Ok(self.quick_analysis())
    }

    /// Remove a pack and every file record it owns.
    pub fn remove_pack(&mut self, pack_id: &str) -> MergerResult<AnalysisReport> {
        let index = self
            .packs
            .iter()
            .position(|p| p.id == pack_id)
            .ok_or_else(|| MergerError::PackNotFound(pack_id.to_string()))?;

        let removed = self.packs.remove(index);
        self.files.retain(|f| f.pack_id != removed.id);
        info!("Removed pack '{}'", removed.name);

        self.invalidate();
        Ok(self.quick_analysis())
    }

    /// Move a pack one slot up or down in the priority order. Moving past
    /// either end is a no-op.
    pub fn reorder(&mut self, index: usize, direction: ReorderDirection) -> MergerResult<AnalysisReport> {
        if index >= self.packs.len() {
            return Err(MergerError::PackNotFound(format!("index {index}")));
        }

        let target = match direction {
            ReorderDirection::Up => index.checked_sub(1),
            ReorderDirection::Down => {
                (index + 1 < self.packs.len()).then_some(index + 1)
            }
        };

        if let Some(target) = target {
            self.packs.swap(index, target);
            self.invalidate();
        }
        Ok(self.quick_analysis())
    }

    /// Edit the detected minecraft version / loader of a standard pack.
    pub fn edit_pack(
        &mut self,
        pack_id: &str,
        minecraft_version: Option<String>,
        loader: Option<Loader>,
    ) -> MergerResult<AnalysisReport> {
        let pack = self
            .packs
            .iter_mut()
            .find(|p| p.id == pack_id)
            .ok_or_else(|| MergerError::PackNotFound(pack_id.to_string()))?;

        if pack.pack_type != PackType::Standard {
            return Err(MergerError::Other(format!(
                "pack '{}' is indexed; its version and loader are fixed by its index",
                pack.name
            )));
        }

        if let Some(version) = minecraft_version {
            pack.minecraft_version = version;
        }
        if let Some(loader) = loader {
            pack.loader = loader;
        }

        self.invalidate();
        Ok(self.quick_analysis())
    }

    // ── Analysis ────────────────────────────────────────

    /// Cheap pass: conflict resolution over whatever metadata is already
    /// present, plus head-pack compatibility checks. No network.
    pub fn quick_analysis(&mut self) -> AnalysisReport {
        let conflicts = resolve(&self.packs, &mut self.files);
        let compatibility = check_compatibility(&self.packs);

        AnalysisReport {
            compatibility,
            conflicts,
            dependencies: Vec::new(),
            deep: false,
        }
    }

    /// Rich pass: populate metadata for every mod file (bounded batches
    /// of fetch+parse), re-resolve, and validate dependencies.
    pub async fn deep_analysis(&mut self) -> MergerResult<AnalysisReport> {
        if self.analysis_in_progress {
            return Err(MergerError::AnalysisInProgress);
        }

        let quick = self.quick_analysis();
        if !quick.compatible() {
            return Err(MergerError::CompatibilityBlocked);
        }

        self.analysis_in_progress = true;
        self.enrich_metadata().await;
        self.analysis_in_progress = false;

        let conflicts = resolve(&self.packs, &mut self.files);
        let compatibility = check_compatibility(&self.packs);
        let dependencies = validate_dependencies(&self.files);

        self.deep_performed = true;
        Ok(AnalysisReport {
            compatibility,
            conflicts,
            dependencies,
            deep: true,
        })
    }

    /// Populate `metadata` on every mod-category file that lacks it, so
    /// the rich pass can compare real mod identities instead of filename
    /// slugs. Cache hits resolve immediately; misses are fetched and
    /// parsed in submission order, `ANALYSIS_BATCH` at a time.
    async fn enrich_metadata(&mut self) {
        let mut jobs: Vec<EnrichJob> = Vec::new();

        for (index, record) in self.files.iter().enumerate() {
            if record.category != FileCategory::Mods || record.metadata.is_some() {
                continue;
            }

            let key = record.source_key();
            if let Some(hit) = self.cache.get(&key) {
                jobs.push(EnrichJob {
                    index,
                    key,
                    file_name: record.file_name.clone(),
                    source: JobSource::Cached(hit.metadata.clone()),
                });
                continue;
            }

            let source = match &record.origin {
                FileOrigin::Remote { urls, .. } => JobSource::Fetch(urls.clone()),
                FileOrigin::Local { entry_path } => {
                    let pack = self.packs.iter().find(|p| p.id == record.pack_id);
                    JobSource::Read(pack.map(|p| p.archive.read_bytes(entry_path)))
                }
            };
            jobs.push(EnrichJob {
                index,
                key,
                file_name: record.file_name.clone(),
                source,
            });
        }

        if jobs.is_empty() {
            return;
        }
        debug!("Enriching metadata for {} files", jobs.len());

        let mut pending = jobs.into_iter();
        loop {
            let batch: Vec<EnrichJob> = pending.by_ref().take(ANALYSIS_BATCH).collect();
            if batch.is_empty() {
                break;
            }

            let futures = batch.into_iter().map(|job| {
                let fetcher = Arc::clone(&self.fetcher);
                let sink = Arc::clone(&self.sink);
                async move { job.run(fetcher.as_ref(), sink.as_ref()).await }
            });

            // join_all preserves submission order, so the consumer below
            // is deterministic regardless of completion order.
            for outcome in join_all(futures).await {
                if outcome.store {
                    self.cache
                        .insert(outcome.key, outcome.metadata.clone(), outcome.raw_bytes);
                }
                self.files[outcome.index].metadata = Some(outcome.metadata);
            }
        }
    }

    // ── Emit ────────────────────────────────────────────

    /// Produce the merged artifact. Refused while compatibility issues
    /// are outstanding.
    pub async fn emit(
        &mut self,
        options: &EmitOptions,
        progress: Option<emit::ProgressFn<'_>>,
    ) -> MergerResult<Vec<u8>> {
        if !check_compatibility(&self.packs).is_empty() {
            return Err(MergerError::CompatibilityBlocked);
        }

        emit::emit(
            &self.packs,
            &self.files,
            &self.cache,
            self.fetcher.as_ref(),
            options,
            progress,
        )
        .await
    }

    /// Any state change discards deep-analysis results, including partial
    /// progress from an interrupted run.
    fn invalidate(&mut self) {
        self.deep_performed = false;
        self.analysis_in_progress = false;
    }
}

// ── Enrichment jobs ─────────────────────────────────────

struct EnrichJob {
    index: usize,
    key: String,
    file_name: String,
    source: JobSource,
}

enum JobSource {
    /// Cache hit: metadata is already known.
    Cached(ModMetadata),
    /// Local entry, pre-read from the owning pack's archive.
    Read(Option<MergerResult<Vec<u8>>>),
    /// Remote file: try each URL in order.
    Fetch(Vec<String>),
}

struct EnrichOutcome {
    index: usize,
    key: String,
    metadata: ModMetadata,
    raw_bytes: Option<Vec<u8>>,
    /// Whether the consumer should store this outcome in the cache.
    /// Hits are already cached; failed reads must stay retryable.
    store: bool,
}

impl EnrichJob {
    async fn run(self, fetcher: &dyn Fetcher, sink: &dyn DiagnosticSink) -> EnrichOutcome {
        let (bytes, keep_blob) = match self.source {
            JobSource::Cached(metadata) => {
                return EnrichOutcome {
                    index: self.index,
                    key: self.key,
                    metadata,
                    raw_bytes: None,
                    store: false,
                };
            }
            JobSource::Read(read) => (
                read.unwrap_or_else(|| {
                    Err(MergerError::PackNotFound(self.file_name.clone()))
                }),
                false,
            ),
            JobSource::Fetch(urls) => (fetch_any(fetcher, &urls, &self.file_name).await, true),
        };

        match bytes {
            Ok(bytes) => {
                let raw = keep_blob.then(|| bytes.clone());
                let metadata = match ArchiveReader::from_bytes(bytes) {
                    Ok(archive) => parse_mod_metadata(&archive, &self.file_name, sink),
                    Err(e) => {
                        sink.log(
                            &format!("{} is not a readable archive: {e}", self.file_name),
                            Severity::Warning,
                        );
                        ModMetadata::fallback(&self.file_name)
                    }
                };
                EnrichOutcome {
                    index: self.index,
                    key: self.key,
                    metadata,
                    raw_bytes: raw,
                    store: true,
                }
            }
            Err(e) => {
                sink.log(
                    &format!("Could not read {}: {e}", self.file_name),
                    Severity::Danger,
                );
                EnrichOutcome {
                    index: self.index,
                    key: self.key,
                    metadata: ModMetadata::fallback(&self.file_name),
                    raw_bytes: None,
                    store: false,
                }
            }
        }
    }
}

async fn fetch_any(
    fetcher: &dyn Fetcher,
    urls: &[String],
    file_name: &str,
) -> MergerResult<Vec<u8>> {
    let mut last_err = MergerError::Other(format!("no download URL for {file_name}"));
    for url in urls {
        match fetcher.fetch(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}
