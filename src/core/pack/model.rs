use serde::{Deserialize, Serialize};

use crate::core::archive::ArchiveReader;
use crate::core::pack::index::ModrinthIndex;

/// Supported mod loaders — strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Fabric,
    Forge,
    NeoForge,
    Quilt,
    LiteLoader,
    Unknown,
}

impl std::fmt::Display for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Loader::Fabric => write!(f, "fabric"),
            Loader::Forge => write!(f, "forge"),
            Loader::NeoForge => write!(f, "neoforge"),
            Loader::Quilt => write!(f, "quilt"),
            Loader::LiteLoader => write!(f, "liteloader"),
            Loader::Unknown => write!(f, "unknown"),
        }
    }
}

impl Loader {
    /// Exact (case-insensitive) token match, e.g. the prefix of a
    /// CurseForge `modLoaders[].id` like `fabric-0.15.11`.
    pub fn from_token(token: &str) -> Loader {
        match token.to_ascii_lowercase().as_str() {
            "fabric" => Loader::Fabric,
            "forge" => Loader::Forge,
            "neoforge" => Loader::NeoForge,
            "quilt" => Loader::Quilt,
            "liteloader" => Loader::LiteLoader,
            _ => Loader::Unknown,
        }
    }

    /// Filename heuristic: first loader whose name appears as a
    /// case-insensitive substring.
    pub fn detect_in(text: &str) -> Option<Loader> {
        let lower = text.to_ascii_lowercase();
        for (needle, loader) in [
            ("fabric", Loader::Fabric),
            ("forge", Loader::Forge),
            ("quilt", Loader::Quilt),
            ("neoforge", Loader::NeoForge),
            ("liteloader", Loader::LiteLoader),
        ] {
            if lower.contains(needle) {
                return Some(loader);
            }
        }
        None
    }
}

/// How the archive describes its contents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackType {
    /// Carries a `modrinth.index.json` describing remote downloads.
    Indexed,
    /// Contains all of its files directly.
    Standard,
}

/// Where a file lands in the merged instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Mods,
    ResourcePacks,
    ShaderPacks,
    Configs,
    Others,
}

impl FileCategory {
    /// Classify a slash-separated relative path by its directory.
    pub fn classify(path: &str) -> FileCategory {
        let matches_dir = |dir: &str| {
            path.starts_with(dir) || path.contains(&format!("/{dir}"))
        };

        if matches_dir("mods/") {
            FileCategory::Mods
        } else if matches_dir("resourcepacks/") {
            FileCategory::ResourcePacks
        } else if matches_dir("shaderpacks/") {
            FileCategory::ShaderPacks
        } else if matches_dir("config/") || matches_dir("scripts/") {
            FileCategory::Configs
        } else {
            FileCategory::Others
        }
    }
}

/// A loaded input pack. Immutable after load except for
/// `minecraft_version` and `loader`, which may be user-edited on
/// standard packs.
pub struct Pack {
    /// Process-unique opaque identifier.
    pub id: String,
    pub name: String,
    pub minecraft_version: String,
    pub loader: Loader,
    pub pack_type: PackType,
    pub archive: ArchiveReader,
    /// Parsed index descriptor, for indexed packs only.
    pub index: Option<ModrinthIndex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_leading_directory() {
        assert_eq!(FileCategory::classify("mods/sodium.jar"), FileCategory::Mods);
        assert_eq!(
            FileCategory::classify("resourcepacks/pack.zip"),
            FileCategory::ResourcePacks
        );
        assert_eq!(
            FileCategory::classify("shaderpacks/bsl.zip"),
            FileCategory::ShaderPacks
        );
        assert_eq!(
            FileCategory::classify("config/sodium.json"),
            FileCategory::Configs
        );
        assert_eq!(
            FileCategory::classify("scripts/startup.zs"),
            FileCategory::Configs
        );
        assert_eq!(FileCategory::classify("options.txt"), FileCategory::Others);
    }

    #[test]
    fn classify_matches_nested_directories() {
        assert_eq!(
            FileCategory::classify(".minecraft/mods/sodium.jar"),
            FileCategory::Mods
        );
    }

    #[test]
    fn loader_token_parsing() {
        assert_eq!(Loader::from_token("Fabric"), Loader::Fabric);
        assert_eq!(Loader::from_token("neoforge"), Loader::NeoForge);
        assert_eq!(Loader::from_token("rift"), Loader::Unknown);
    }

    #[test]
    fn loader_substring_detection_is_ordered() {
        assert_eq!(Loader::detect_in("sodium-fabric-0.5.8.jar"), Some(Loader::Fabric));
        assert_eq!(Loader::detect_in("jei-forge-15.2.jar"), Some(Loader::Forge));
        assert_eq!(Loader::detect_in("plain-mod.jar"), None);
    }
}
