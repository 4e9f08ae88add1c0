use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::core::pack::{FileCategory, FileRecord, Pack};
use crate::core::version::compare;

/// What kind of collision was detected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Version,
    Duplicate,
}

/// For version conflicts: which side survived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    KeepThis,
    KeepOther,
}

/// One detected conflict, reported per file.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictRecord {
    pub kind: ConflictKind,
    pub mod_id: Option<String>,
    pub this_version: Option<String>,
    pub other_version: Option<String>,
    pub file_name: String,
    pub other_file: String,
    pub resolution: Option<ConflictResolution>,
}

struct RegisteredMod {
    version: String,
    pack_name: String,
    file_name: String,
}

/// Mark every file kept or excluded under the pack priority order.
///
/// Packs are walked in list order (index 0 is the head pack and has the
/// highest priority); files within a pack are walked in the order the
/// loader produced. The pass is pure over in-memory data and can run any
/// number of times: every run resets resolution state first, so the
/// outcome is a function of the current pack order alone.
pub fn resolve(packs: &[Pack], files: &mut [FileRecord]) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    let mut path_registry: HashMap<String, (String, String)> = HashMap::new();
    let mut mod_registry: HashMap<String, RegisteredMod> = HashMap::new();
    let mut slug_registry: HashMap<String, (String, String)> = HashMap::new();

    for pack in packs {
        for record in files.iter_mut().filter(|f| f.pack_id == pack.id) {
            record.enabled = true;
            record.is_duplicate = false;
            record.kept_source = None;
            record.conflict_reason = None;

            // The path check applies to every file.
            if let Some((kept_pack, kept_file)) = path_registry.get(&record.path) {
                record.enabled = false;
                record.is_duplicate = true;
                record.kept_source = Some(kept_pack.clone());
                record.conflict_reason = Some("Exact path duplicate".to_string());
                conflicts.push(ConflictRecord {
                    kind: ConflictKind::Duplicate,
                    mod_id: None,
                    this_version: None,
                    other_version: None,
                    file_name: record.file_name.clone(),
                    other_file: kept_file.clone(),
                    resolution: None,
                });
                continue;
            }

            let has_mods = record
                .metadata
                .as_ref()
                .is_some_and(|m| !m.mods.is_empty());

            if has_mods {
                let metadata = record.metadata.clone().unwrap_or_default();

                // Excluded when any already-registered version is strictly
                // newer than ours.
                let mut shadowed_by: Option<(&RegisteredMod, &str, &str)> = None;
                for entry in &metadata.mods {
                    if let Some(registered) = mod_registry.get(&entry.id) {
                        if compare(&registered.version, &entry.version) == Ordering::Greater {
                            shadowed_by = Some((registered, &entry.id, &entry.version));
                            break;
                        }
                    }
                }

                if let Some((registered, mod_id, this_version)) = shadowed_by {
                    record.enabled = false;
                    record.is_duplicate = true;
                    record.kept_source = Some(registered.pack_name.clone());
                    record.conflict_reason =
                        Some(format!("Older version (Mod ID: {mod_id})"));
                    conflicts.push(ConflictRecord {
                        kind: ConflictKind::Version,
                        mod_id: Some(mod_id.to_string()),
                        this_version: Some(this_version.to_string()),
                        other_version: Some(registered.version.clone()),
                        file_name: record.file_name.clone(),
                        other_file: registered.file_name.clone(),
                        resolution: Some(ConflictResolution::KeepOther),
                    });
                    continue;
                }

                for entry in &metadata.mods {
                    // A strictly newer copy in a lower-priority pack stays
                    // enabled; the earlier registration keeps priority but
                    // the disagreement is reported.
                    let newer_than = mod_registry.get(&entry.id).map(|registered| {
                        (
                            compare(&entry.version, &registered.version) == Ordering::Greater,
                            registered.version.clone(),
                            registered.file_name.clone(),
                        )
                    });

                    match newer_than {
                        None => {
                            mod_registry.insert(
                                entry.id.clone(),
                                RegisteredMod {
                                    version: entry.version.clone(),
                                    pack_name: pack.name.clone(),
                                    file_name: record.file_name.clone(),
                                },
                            );
                        }
                        Some((true, other_version, other_file)) => {
                            conflicts.push(ConflictRecord {
                                kind: ConflictKind::Version,
                                mod_id: Some(entry.id.clone()),
                                this_version: Some(entry.version.clone()),
                                other_version: Some(other_version),
                                file_name: record.file_name.clone(),
                                other_file,
                                resolution: Some(ConflictResolution::KeepThis),
                            });
                        }
                        Some((false, _, _)) => {}
                    }
                }
            } else if record.category == FileCategory::Mods {
                // No metadata to compare; fall back to filename identity.
                let slug = mod_slug(&record.file_name);
                if let Some((kept_pack, kept_file)) = slug_registry.get(&slug) {
                    record.enabled = false;
                    record.is_duplicate = true;
                    record.kept_source = Some(kept_pack.clone());
                    record.conflict_reason =
                        Some(format!("Possible duplicate of {kept_file}"));
                    conflicts.push(ConflictRecord {
                        kind: ConflictKind::Duplicate,
                        mod_id: None,
                        this_version: None,
                        other_version: None,
                        file_name: record.file_name.clone(),
                        other_file: kept_file.clone(),
                        resolution: None,
                    });
                    continue;
                }
                slug_registry.insert(slug, (pack.name.clone(), record.file_name.clone()));
            }

            path_registry.insert(
                record.path.clone(),
                (pack.name.clone(), record.file_name.clone()),
            );
        }
    }

    conflicts
}

/// Normalized identity for a mod JAR without metadata: the file name with
/// its extension and version suffix removed.
///
/// `journeymap-5.9.7-fabric.jar` → `journeymap`
pub fn mod_slug(file_name: &str) -> String {
    let len = file_name.len();
    let base = if len >= 4
        && file_name.is_char_boundary(len - 4)
        && file_name[len - 4..].eq_ignore_ascii_case(".jar")
    {
        &file_name[..len - 4]
    } else {
        file_name
    };

    let mut cut = base.len();
    for (i, c) in base.char_indices() {
        if c != '-' && c != '+' {
            continue;
        }
        let rest = &base[i + 1..];
        let mut chars = rest.chars();
        match chars.next() {
            Some(d) if d.is_ascii_digit() => {
                cut = i;
                break;
            }
            Some('v') | Some('V') => {
                if chars.next().is_some_and(|d| d.is_ascii_digit()) {
                    cut = i;
                    break;
                }
            }
            _ => {}
        }
    }

    base[..cut].trim().to_ascii_lowercase()
}
