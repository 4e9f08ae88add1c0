use serde::Serialize;

use crate::core::log::Severity;
use crate::core::pack::Pack;

/// Why two packs cannot merge as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatKind {
    VersionMismatch,
    LoaderMismatch,
}

/// Advisory mismatch between the head pack and another pack. Any issue
/// blocks deep analysis and emit until the user resolves it.
#[derive(Debug, Clone, Serialize)]
pub struct CompatIssue {
    pub kind: CompatKind,
    pub severity: Severity,
    pub message: String,
    pub head_pack: String,
    pub other_pack: String,
}

/// Compare every pack against the head pack (index 0), one issue per
/// deviating pack per mismatched field.
pub fn check_compatibility(packs: &[Pack]) -> Vec<CompatIssue> {
    let mut issues = Vec::new();

    let Some(head) = packs.first() else {
        return issues;
    };

    for pack in &packs[1..] {
        if pack.minecraft_version != head.minecraft_version {
            issues.push(CompatIssue {
                kind: CompatKind::VersionMismatch,
                severity: Severity::Danger,
                message: format!(
                    "{} targets Minecraft {} but {} targets {}",
                    pack.name, pack.minecraft_version, head.name, head.minecraft_version
                ),
                head_pack: head.name.clone(),
                other_pack: pack.name.clone(),
            });
        }
        if pack.loader != head.loader {
            issues.push(CompatIssue {
                kind: CompatKind::LoaderMismatch,
                severity: Severity::Danger,
                message: format!(
                    "{} uses the {} loader but {} uses {}",
                    pack.name, pack.loader, head.name, head.loader
                ),
                head_pack: head.name.clone(),
                other_pack: pack.name.clone(),
            });
        }
    }

    issues
}
