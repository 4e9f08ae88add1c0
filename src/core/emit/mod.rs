// ─── Merge Emitter ───
// Streams the surviving file set into one of two artifacts: a portable
// instance archive with every file materialized, or an index-descriptor
// archive where remote files stay references. Payload entries are stored
// uncompressed: they are already-compressed JARs.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{MergerError, MergerResult};
use crate::core::http::Fetcher;
use crate::core::metadata::MetadataCache;
use crate::core::pack::{FileOrigin, FileRecord, IndexFile, ModrinthIndex, Pack, MODRINTH_INDEX};

/// Output format of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// Every surviving file materialized at its original path.
    FullArchive,
    /// `modrinth.index.json` + `overrides/` for local files; remote files
    /// stay pass-through descriptors.
    IndexDescriptor,
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub mode: EmitMode,
    /// `versionId` written to the index descriptor.
    pub version_id: String,
    /// Pack name written to the index descriptor.
    pub name: String,
}

/// Monotone percentage callback.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// Produce the merged artifact as zip bytes.
///
/// Walks packs in priority order and each pack's surviving files in
/// loader order; the first file at a path wins (later ones were already
/// excluded by resolution — skipping here is a second line of defense).
pub async fn emit(
    packs: &[Pack],
    files: &[FileRecord],
    cache: &MetadataCache,
    fetcher: &dyn Fetcher,
    options: &EmitOptions,
    progress: Option<ProgressFn<'_>>,
) -> MergerResult<Vec<u8>> {
    let head = packs
        .first()
        .ok_or_else(|| MergerError::EmitFailed("no packs loaded".to_string()))?;

    let by_id: HashMap<&str, &Pack> = packs.iter().map(|p| (p.id.as_str(), p)).collect();

    // Collect phase: surviving files, deterministic pack order.
    let selected: Vec<&FileRecord> = packs
        .iter()
        .flat_map(|pack| files.iter().filter(move |f| f.pack_id == pack.id))
        .filter(|f| f.enabled)
        .collect();
    let total = selected.len().max(1);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut descriptors: Vec<IndexFile> = Vec::new();
    let mut processed = 0usize;

    for record in selected {
        if !seen.insert(record.path.as_str()) {
            continue;
        }

        let pack = by_id
            .get(record.pack_id.as_str())
            .ok_or_else(|| MergerError::PackNotFound(record.pack_id.clone()))?;

        match (options.mode, &record.origin) {
            (EmitMode::FullArchive, FileOrigin::Local { entry_path }) => {
                let bytes = pack.archive.read_bytes(entry_path)?;
                writer.start_file(record.path.as_str(), stored)?;
                writer.write_all(&bytes)?;
            }
            (EmitMode::FullArchive, FileOrigin::Remote { urls, .. }) => {
                let bytes = remote_bytes(record, urls, cache, fetcher).await?;
                writer.start_file(record.path.as_str(), stored)?;
                writer.write_all(&bytes)?;
            }
            (EmitMode::IndexDescriptor, FileOrigin::Local { entry_path }) => {
                let bytes = pack.archive.read_bytes(entry_path)?;
                writer.start_file(format!("overrides/{}", record.path), stored)?;
                writer.write_all(&bytes)?;
            }
            (EmitMode::IndexDescriptor, FileOrigin::Remote { urls, descriptor }) => {
                // Pass-through: no bytes move for remote files.
                let mut descriptor = descriptor.clone();
                descriptor.path = record.path.clone();
                descriptor.downloads = urls.clone();
                descriptors.push(descriptor);
            }
        }

        processed += 1;
        if let Some(report) = progress {
            report(((processed * 100) / total) as u8);
        }
    }

    // Manifest phase: only the index-descriptor format carries one.
    if options.mode == EmitMode::IndexDescriptor {
        let dependencies = match &head.index {
            Some(index) => index.dependencies.clone(),
            None => [
                ("minecraft".to_string(), head.minecraft_version.clone()),
                (head.loader.to_string(), "latest".to_string()),
            ]
            .into_iter()
            .collect(),
        };

        let index = ModrinthIndex {
            format_version: 1,
            game: "minecraft".to_string(),
            version_id: options.version_id.clone(),
            name: options.name.clone(),
            files: descriptors,
            dependencies,
        };

        writer.start_file(MODRINTH_INDEX, stored)?;
        writer.write_all(&serde_json::to_vec_pretty(&index)?)?;
    }

    let out = writer
        .finish()
        .map_err(|e| MergerError::EmitFailed(e.to_string()))?
        .into_inner();

    if let Some(report) = progress {
        report(100);
    }
    info!("Emitted {} bytes ({} files)", out.len(), processed);

    Ok(out)
}

/// Bytes for a remote file: cached blob first, then a fresh fetch trying
/// each download URL in order.
async fn remote_bytes(
    record: &FileRecord,
    urls: &[String],
    cache: &MetadataCache,
    fetcher: &dyn Fetcher,
) -> MergerResult<Vec<u8>> {
    if let Some(bytes) = cache
        .get(&record.source_key())
        .and_then(|entry| entry.raw_bytes.clone())
    {
        return Ok(bytes);
    }

    let mut last_err = MergerError::EmitFailed(format!("no download URL for {}", record.path));
    for url in urls {
        match fetcher.fetch(url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}
