// ─── Manifest Parser ───
// Extracts structured mod metadata from an archive. Strategy, first hit
// wins: fabric.mod.json, then META-INF/mods.toml, then a fallback record
// derived from the file name. Parse failures never abort analysis; they
// degrade to the fallback and a diagnostic.

mod cache;
mod fabric;
mod forge;

pub use cache::{CacheEntry, MetadataCache};

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::archive::ArchiveReader;
use crate::core::log::{DiagnosticSink, Severity};

pub const FABRIC_MANIFEST: &str = "fabric.mod.json";
pub const FORGE_MANIFEST: &str = "META-INF/mods.toml";

/// Nested-archive recursion cap. Real packs nest two levels; anything
/// deeper is treated as pathological input.
const MAX_NESTING: u8 = 4;

/// One declared mod: identity, version, and its requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModEntry {
    pub id: String,
    pub version: String,
    pub name: Option<String>,
    /// `mod_id → version_range`, as written in the manifest.
    pub depends: BTreeMap<String, String>,
    /// Alias identifiers this mod also satisfies.
    pub provides: Vec<String>,
}

impl ModEntry {
    /// Fallback entry used when no manifest could be read.
    pub fn fallback(file_name: &str) -> Self {
        Self {
            id: file_name.to_string(),
            version: "unknown".to_string(),
            name: None,
            depends: BTreeMap::new(),
            provides: Vec::new(),
        }
    }
}

/// Everything a single archive declares: its own mods plus any mods it
/// bundles as nested archives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModMetadata {
    pub mods: Vec<ModEntry>,
    pub bundled: Vec<ModEntry>,
}

impl ModMetadata {
    pub fn fallback(file_name: &str) -> Self {
        Self {
            mods: vec![ModEntry::fallback(file_name)],
            bundled: Vec::new(),
        }
    }

    /// The first declared mod; its dependencies are the ones validated.
    pub fn primary(&self) -> Option<&ModEntry> {
        self.mods.first()
    }
}

/// Parse an archive's manifest into a `ModMetadata`. Never fails: any
/// parse error at any level yields the fallback record and a diagnostic.
pub fn parse_mod_metadata(
    archive: &ArchiveReader,
    file_name: &str,
    sink: &dyn DiagnosticSink,
) -> ModMetadata {
    parse_at_depth(archive, file_name, 0, sink)
}

fn parse_at_depth(
    archive: &ArchiveReader,
    file_name: &str,
    depth: u8,
    sink: &dyn DiagnosticSink,
) -> ModMetadata {
    if archive.contains(FABRIC_MANIFEST) {
        match fabric::parse(archive, depth, sink) {
            Ok(metadata) => return metadata,
            Err(e) => {
                sink.log(
                    &format!("Could not parse {FABRIC_MANIFEST} in {file_name}: {e}"),
                    Severity::Warning,
                );
                return ModMetadata::fallback(file_name);
            }
        }
    }

    if archive.contains(FORGE_MANIFEST) {
        match forge::parse(archive) {
            Ok(metadata) => return metadata,
            Err(e) => {
                sink.log(
                    &format!("Could not parse {FORGE_MANIFEST} in {file_name}: {e}"),
                    Severity::Warning,
                );
                return ModMetadata::fallback(file_name);
            }
        }
    }

    ModMetadata::fallback(file_name)
}

/// Parse a nested archive entry. Called from the fabric path for each
/// `jars[*].file` reference; depth is bounded by `MAX_NESTING`.
fn parse_nested(
    parent: &ArchiveReader,
    entry_path: &str,
    depth: u8,
    sink: &dyn DiagnosticSink,
) -> Option<ModMetadata> {
    if depth >= MAX_NESTING {
        sink.log(
            &format!("Skipping nested archive {entry_path}: nesting too deep"),
            Severity::Warning,
        );
        return None;
    }

    let nested_name = entry_path.rsplit('/').next().unwrap_or(entry_path);

    let bytes = match parent.read_bytes(entry_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            sink.log(
                &format!("Could not read nested archive {entry_path}: {e}"),
                Severity::Warning,
            );
            return None;
        }
    };

    match ArchiveReader::from_bytes(bytes) {
        Ok(inner) => Some(parse_at_depth(&inner, nested_name, depth + 1, sink)),
        Err(e) => {
            sink.log(
                &format!("Nested archive {entry_path} is not a valid zip: {e}"),
                Severity::Warning,
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log::capture::CaptureSink;
    use crate::core::testing::build_zip;

    fn parse(bytes: Vec<u8>, file_name: &str) -> ModMetadata {
        let archive = ArchiveReader::from_bytes(bytes).unwrap();
        parse_mod_metadata(&archive, file_name, &CaptureSink::default())
    }

    #[test]
    fn fabric_manifest_wins_over_forge() {
        let bytes = build_zip(&[
            (
                FABRIC_MANIFEST,
                br#"{"id": "alpha", "version": "1.0.0"}"# as &[u8],
            ),
            (
                FORGE_MANIFEST,
                b"modId=\"beta\"\nversion=\"2.0.0\"",
            ),
        ]);
        let metadata = parse(bytes, "alpha.jar");
        assert_eq!(metadata.primary().unwrap().id, "alpha");
    }

    #[test]
    fn no_manifest_falls_back_to_file_name() {
        let bytes = build_zip(&[("assets/logo.png", b"png" as &[u8])]);
        let metadata = parse(bytes, "mystery-mod.jar");
        let primary = metadata.primary().unwrap();
        assert_eq!(primary.id, "mystery-mod.jar");
        assert_eq!(primary.version, "unknown");
        assert!(primary.depends.is_empty());
    }

    #[test]
    fn malformed_fabric_manifest_falls_back_with_diagnostic() {
        let bytes = build_zip(&[(FABRIC_MANIFEST, b"{ not json" as &[u8])]);
        let archive = ArchiveReader::from_bytes(bytes).unwrap();
        let sink = CaptureSink::default();
        let metadata = parse_mod_metadata(&archive, "broken.jar", &sink);

        assert_eq!(metadata.primary().unwrap().id, "broken.jar");
        assert_eq!(sink.messages.lock().len(), 1);
    }

    #[test]
    fn nested_jars_land_in_bundled() {
        let inner = build_zip(&[(
            FABRIC_MANIFEST,
            br#"{"id": "bundled-lib", "version": "0.3.0"}"# as &[u8],
        )]);
        let outer = build_zip(&[
            (
                FABRIC_MANIFEST,
                br#"{
                    "id": "host",
                    "version": "2.0.0",
                    "jars": [{"file": "META-INF/jars/lib.jar"}]
                }"# as &[u8],
            ),
            ("META-INF/jars/lib.jar", inner.as_slice()),
        ]);

        let metadata = parse(outer, "host.jar");
        assert_eq!(metadata.primary().unwrap().id, "host");
        assert_eq!(metadata.bundled.len(), 1);
        assert_eq!(metadata.bundled[0].id, "bundled-lib");
    }

    #[test]
    fn unreadable_nested_jar_is_skipped_not_fatal() {
        let outer = build_zip(&[
            (
                FABRIC_MANIFEST,
                br#"{
                    "id": "host",
                    "version": "2.0.0",
                    "jars": [{"file": "META-INF/jars/garbage.jar"}]
                }"# as &[u8],
            ),
            ("META-INF/jars/garbage.jar", b"not a zip at all"),
        ]);

        let archive = ArchiveReader::from_bytes(outer).unwrap();
        let sink = CaptureSink::default();
        let metadata = parse_mod_metadata(&archive, "host.jar", &sink);

        assert_eq!(metadata.primary().unwrap().id, "host");
        assert!(metadata.bundled.is_empty());
        assert!(!sink.messages.lock().is_empty());
    }
}
