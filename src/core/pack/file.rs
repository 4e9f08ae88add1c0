use serde::Serialize;

use crate::core::metadata::{MetadataCache, ModMetadata};
use crate::core::pack::index::IndexFile;
use crate::core::pack::model::FileCategory;

/// Where a file's bytes live.
#[derive(Debug, Clone)]
pub enum FileOrigin {
    /// An entry inside the owning pack's archive.
    Local { entry_path: String },
    /// A downloadable file declared by an index, with its original
    /// descriptor retained for pass-through emission.
    Remote {
        urls: Vec<String>,
        descriptor: IndexFile,
    },
}

/// A single asset belonging to some pack, plus its resolution state.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Target path in the merged instance (relative, slash-separated).
    pub path: String,
    pub file_name: String,
    pub pack_id: String,
    pub category: FileCategory,
    pub origin: FileOrigin,
    pub enabled: bool,
    pub is_duplicate: bool,
    /// Name of the pack whose copy won, when this one was excluded.
    pub kept_source: Option<String>,
    pub conflict_reason: Option<String>,
    pub metadata: Option<ModMetadata>,
}

impl FileRecord {
    pub fn new(path: String, pack_id: String, category: FileCategory, origin: FileOrigin) -> Self {
        let file_name = path
            .rsplit('/')
            .next()
            .unwrap_or(path.as_str())
            .to_string();

        Self {
            path,
            file_name,
            pack_id,
            category,
            origin,
            enabled: true,
            is_duplicate: false,
            kept_source: None,
            conflict_reason: None,
            metadata: None,
        }
    }

    /// Stable metadata-cache key for this file's source.
    pub fn source_key(&self) -> String {
        match &self.origin {
            FileOrigin::Remote { urls, .. } => urls
                .first()
                .cloned()
                .unwrap_or_else(|| format!("remote:{}", self.path)),
            FileOrigin::Local { entry_path } => {
                MetadataCache::local_key(&self.pack_id, entry_path)
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.origin, FileOrigin::Remote { .. })
    }
}

/// Flattened view of a file record for an embedding layer.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub file_name: String,
    pub pack_id: String,
    pub category: FileCategory,
    pub remote: bool,
    pub enabled: bool,
    pub is_duplicate: bool,
    pub kept_source: Option<String>,
    pub conflict_reason: Option<String>,
}

impl From<&FileRecord> for FileSummary {
    fn from(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            file_name: record.file_name.clone(),
            pack_id: record.pack_id.clone(),
            category: record.category,
            remote: record.is_remote(),
            enabled: record.enabled,
            is_duplicate: record.is_duplicate,
            kept_source: record.kept_source.clone(),
            conflict_reason: record.conflict_reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_path_segment() {
        let record = FileRecord::new(
            "mods/sodium-0.5.8.jar".to_string(),
            "p1".to_string(),
            FileCategory::Mods,
            FileOrigin::Local {
                entry_path: "mods/sodium-0.5.8.jar".to_string(),
            },
        );
        assert_eq!(record.file_name, "sodium-0.5.8.jar");
    }

    #[test]
    fn source_key_uses_url_for_remote() {
        let descriptor = IndexFile {
            path: "mods/x.jar".to_string(),
            hashes: Default::default(),
            env: None,
            downloads: vec!["https://cdn.example/x.jar".to_string()],
            file_size: 0,
        };
        let record = FileRecord::new(
            "mods/x.jar".to_string(),
            "p1".to_string(),
            FileCategory::Mods,
            FileOrigin::Remote {
                urls: descriptor.downloads.clone(),
                descriptor,
            },
        );
        assert_eq!(record.source_key(), "https://cdn.example/x.jar");
    }

    #[test]
    fn source_key_scopes_local_files_by_pack() {
        let make = |pack: &str| {
            FileRecord::new(
                "mods/x.jar".to_string(),
                pack.to_string(),
                FileCategory::Mods,
                FileOrigin::Local {
                    entry_path: "mods/x.jar".to_string(),
                },
            )
        };
        assert_ne!(make("a").source_key(), make("b").source_key());
    }
}
