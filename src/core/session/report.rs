use serde::Serialize;

use crate::core::pack::{FileCategory, FileRecord, FileSummary, Loader, Pack, PackType};
use crate::core::resolve::{CompatIssue, ConflictRecord, DependencyIssue};

/// Aggregate result of an analysis pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub compatibility: Vec<CompatIssue>,
    pub conflicts: Vec<ConflictRecord>,
    /// Populated by deep analysis only.
    pub dependencies: Vec<DependencyIssue>,
    pub deep: bool,
}

impl AnalysisReport {
    /// Whether deep analysis and emit are currently allowed.
    pub fn compatible(&self) -> bool {
        self.compatibility.is_empty()
    }
}

/// Flattened per-pack view for an embedding layer.
#[derive(Debug, Clone, Serialize)]
pub struct PackSummary {
    pub id: String,
    pub name: String,
    pub minecraft_version: String,
    pub loader: Loader,
    pub pack_type: PackType,
    pub file_count: usize,
    pub mod_count: usize,
    pub enabled_count: usize,
    pub files: Vec<FileSummary>,
}

impl PackSummary {
    pub fn build(pack: &Pack, files: &[FileRecord]) -> Self {
        let own: Vec<&FileRecord> = files.iter().filter(|f| f.pack_id == pack.id).collect();

        Self {
            id: pack.id.clone(),
            name: pack.name.clone(),
            minecraft_version: pack.minecraft_version.clone(),
            loader: pack.loader,
            pack_type: pack.pack_type,
            file_count: own.len(),
            mod_count: own
                .iter()
                .filter(|f| f.category == FileCategory::Mods)
                .count(),
            enabled_count: own.iter().filter(|f| f.enabled).count(),
            files: own.iter().map(|f| FileSummary::from(*f)).collect(),
        }
    }
}
