use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of `modrinth.index.json` (the `.mrpack` index format).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModrinthIndex {
    pub format_version: u32,
    pub game: String,
    pub version_id: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<IndexFile>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// An entry in the index's `files` array. Hashes and env are carried
/// opaquely so pass-through emission preserves the original descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    pub path: String,
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<serde_json::Value>,
    pub downloads: Vec<String>,
    #[serde(default)]
    pub file_size: u64,
}

/// CurseForge `manifest.json`, reduced to pack-level metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct CurseManifest {
    pub minecraft: CurseMinecraft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurseMinecraft {
    pub version: String,
    #[serde(default, rename = "modLoaders")]
    pub mod_loaders: Vec<CurseModLoader>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurseModLoader {
    pub id: String,
}
