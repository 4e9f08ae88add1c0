use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::core::archive::{is_dir_entry, ArchiveReader};
use crate::core::error::{MergerError, MergerResult};
use crate::core::pack::file::{FileOrigin, FileRecord};
use crate::core::pack::index::{CurseManifest, ModrinthIndex};
use crate::core::pack::model::{FileCategory, Loader, Pack, PackType};

pub const MODRINTH_INDEX: &str = "modrinth.index.json";
const CURSE_MANIFEST: &str = "manifest.json";
const INSTANCE_CFG: &str = "instance.cfg";
const OVERRIDES_PREFIX: &str = "overrides/";

/// Fallbacks when nothing in the archive (or the head pack) tells us the
/// target version and loader. Editable by the user afterwards.
pub const DEFAULT_MINECRAFT_VERSION: &str = "1.20.1";
pub const DEFAULT_LOADER: Loader = Loader::Fabric;

/// A freshly classified pack plus its file records, in loader order
/// (index order for indexed packs, zip entry order for standard packs).
pub struct LoadedPack {
    pub pack: Pack,
    pub files: Vec<FileRecord>,
}

/// Open and classify an input archive.
///
/// Indexed packs (those carrying `modrinth.index.json`) yield remote
/// records from the index plus local records for `overrides/` content.
/// Everything else is a standard pack: each non-directory entry becomes a
/// local record and pack-level metadata is sniffed from well-known files.
pub fn load_pack(name: &str, bytes: Vec<u8>, head: Option<&Pack>) -> MergerResult<LoadedPack> {
    let archive = ArchiveReader::from_bytes(bytes)
        .map_err(|e| MergerError::InvalidPack(format!("{name}: {e}")))?;

    let id = Uuid::new_v4().to_string();

    let mut loaded = if archive.contains(MODRINTH_INDEX) {
        load_indexed(name, id, archive)?
    } else {
        load_standard(name, id, archive)
    };

    // Inherit unknowns from the head pack, then fall back to defaults.
    if loaded.pack.minecraft_version.is_empty() {
        loaded.pack.minecraft_version = head
            .map(|h| h.minecraft_version.clone())
            .unwrap_or_else(|| DEFAULT_MINECRAFT_VERSION.to_string());
    }
    if loaded.pack.loader == Loader::Unknown {
        loaded.pack.loader = head.map(|h| h.loader).unwrap_or(DEFAULT_LOADER);
    }

    Ok(loaded)
}

// ── Indexed packs ───────────────────────────────────────

fn load_indexed(name: &str, id: String, archive: ArchiveReader) -> MergerResult<LoadedPack> {
    let text = archive
        .read_string(MODRINTH_INDEX)
        .map_err(|e| MergerError::InvalidPack(format!("{name}: {e}")))?;
    let index: ModrinthIndex = serde_json::from_str(&text)
        .map_err(|e| MergerError::InvalidPack(format!("{name}: malformed index: {e}")))?;

    let mut files = Vec::new();

    // Index entries download at install time; they are all mods from the
    // merger's point of view.
    for entry in &index.files {
        files.push(FileRecord::new(
            entry.path.clone(),
            id.clone(),
            FileCategory::Mods,
            FileOrigin::Remote {
                urls: entry.downloads.clone(),
                descriptor: entry.clone(),
            },
        ));
    }

    for entry in archive.entry_names() {
        if is_dir_entry(entry) || !entry.starts_with(OVERRIDES_PREFIX) {
            continue;
        }
        let stripped = &entry[OVERRIDES_PREFIX.len()..];
        if stripped.is_empty() {
            continue;
        }
        files.push(FileRecord::new(
            stripped.to_string(),
            id.clone(),
            FileCategory::classify(stripped),
            FileOrigin::Local {
                entry_path: entry.clone(),
            },
        ));
    }

    let minecraft_version = index
        .dependencies
        .get("minecraft")
        .cloned()
        .unwrap_or_default();
    let loader = loader_from_dependency_keys(index.dependencies.keys().map(String::as_str));

    Ok(LoadedPack {
        pack: Pack {
            id,
            name: name.to_string(),
            minecraft_version,
            loader,
            pack_type: PackType::Indexed,
            archive,
            index: Some(index),
        },
        files,
    })
}

/// Pick the loader from index dependency keys by substring, in priority
/// order. A bare `forge` key only wins when no key mentions neoforge.
fn loader_from_dependency_keys<'a>(keys: impl Iterator<Item = &'a str> + Clone) -> Loader {
    let has = |needle: &str| keys.clone().any(|k| k.contains(needle));

    if has("fabric") {
        Loader::Fabric
    } else if has("forge") && !has("neoforge") {
        Loader::Forge
    } else if has("neoforge") {
        Loader::NeoForge
    } else if has("quilt") {
        Loader::Quilt
    } else if has("liteloader") {
        Loader::LiteLoader
    } else {
        Loader::Fabric
    }
}

// ── Standard packs ──────────────────────────────────────

fn load_standard(name: &str, id: String, archive: ArchiveReader) -> LoadedPack {
    let files = archive
        .entry_names()
        .iter()
        .filter(|entry| !is_dir_entry(entry))
        .map(|entry| {
            FileRecord::new(
                entry.clone(),
                id.clone(),
                FileCategory::classify(entry),
                FileOrigin::Local {
                    entry_path: entry.clone(),
                },
            )
        })
        .collect();

    let (minecraft_version, loader) = sniff_standard_metadata(&archive);

    LoadedPack {
        pack: Pack {
            id,
            name: name.to_string(),
            minecraft_version: minecraft_version.unwrap_or_default(),
            loader: loader.unwrap_or(Loader::Unknown),
            pack_type: PackType::Standard,
            archive,
            index: None,
        },
        files,
    }
}

/// Detect `(minecraft_version, loader)` for a standard pack. Sources are
/// consulted in order and the scan stops once both fields are known.
fn sniff_standard_metadata(archive: &ArchiveReader) -> (Option<String>, Option<Loader>) {
    let mut version: Option<String> = None;
    let mut loader: Option<Loader> = None;

    // 1. CurseForge manifest.
    if let Ok(text) = archive.read_string(CURSE_MANIFEST) {
        if let Ok(manifest) = serde_json::from_str::<CurseManifest>(&text) {
            version = Some(manifest.minecraft.version);
            if let Some(entry) = manifest.minecraft.mod_loaders.first() {
                let token = entry.id.split('-').next().unwrap_or(&entry.id);
                loader = Some(Loader::from_token(token));
            }
        }
    }
    if version.is_some() && loader.is_some() {
        return (version, loader);
    }

    // 2. MultiMC / Prism instance.cfg.
    if let Ok(text) = archive.read_string(INSTANCE_CFG) {
        if version.is_none() {
            version = intended_version_re()
                .captures(&text)
                .map(|c| c[1].trim().to_string());
        }
        if loader.is_none() && text.contains("LWJGL") {
            loader = Some(if text.contains("Fabric") {
                Loader::Fabric
            } else {
                Loader::Forge
            });
        }
    }
    if version.is_some() && loader.is_some() {
        return (version, loader);
    }

    // 3. Filename heuristics over mods/ entries.
    for entry in archive.entry_names() {
        if version.is_some() && loader.is_some() {
            break;
        }
        if is_dir_entry(entry) || FileCategory::classify(entry) != FileCategory::Mods {
            continue;
        }
        let file_name = entry.rsplit('/').next().unwrap_or(entry);

        if version.is_none() {
            version = minecraft_version_re()
                .find(file_name)
                .map(|m| m.as_str().to_string());
        }
        if loader.is_none() {
            loader = Loader::detect_in(file_name);
            if loader.is_none() && file_name.to_ascii_lowercase().ends_with(".litemod") {
                loader = Some(Loader::LiteLoader);
            }
        }
    }

    (version, loader)
}

fn intended_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^IntendedVersion=(.+)$").expect("static regex"))
}

fn minecraft_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"1\.\d+(\.\d+)?").expect("static regex"))
}
