use std::collections::HashMap;

use serde::Serialize;

use crate::core::pack::FileRecord;
use crate::core::version::satisfies;

/// Dependencies on the platform or runtime itself are not mods the merger
/// could supply; requirements on these ids are skipped.
const PLATFORM_IDS: &[&str] = &[
    "minecraft",
    "java",
    "fabricloader",
    "fabric",
    "quiltloader",
    "forge",
    "neoforge",
    "liteloader",
    "mixinextras",
    "mixinextra",
    "mixins",
    "cloth-config",
    "cloth-config2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Missing,
    Outdated,
}

/// A required dependency that the resolved mod set does not satisfy.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyIssue {
    pub kind: DependencyKind,
    pub mod_id: String,
    pub required_by: String,
    pub required_range: String,
    pub present_version: Option<String>,
}

struct PresentMod {
    version: String,
}

fn is_platform_id(id: &str) -> bool {
    PLATFORM_IDS.iter().any(|p| p.eq_ignore_ascii_case(id))
}

/// Validate the dependencies of every surviving mod against the set of
/// mods actually present.
///
/// Presence counts real entries (primary and bundled) first; `provides`
/// aliases fill in only where no real entry claims the id. Only primary
/// entries have their requirements checked — a bundled library's own
/// dependencies are its host's concern.
pub fn validate_dependencies(files: &[FileRecord]) -> Vec<DependencyIssue> {
    let surviving: Vec<&FileRecord> = files
        .iter()
        .filter(|f| f.enabled && !f.is_duplicate)
        .collect();

    let mut presence: HashMap<String, PresentMod> = HashMap::new();

    for file in &surviving {
        let Some(metadata) = &file.metadata else {
            continue;
        };
        for entry in metadata.mods.iter().chain(metadata.bundled.iter()) {
            presence.entry(entry.id.clone()).or_insert(PresentMod {
                version: entry.version.clone(),
            });
        }
    }

    // Aliases never shadow a real entry.
    for file in &surviving {
        let Some(metadata) = &file.metadata else {
            continue;
        };
        for entry in metadata.mods.iter().chain(metadata.bundled.iter()) {
            for alias in &entry.provides {
                presence.entry(alias.clone()).or_insert(PresentMod {
                    version: entry.version.clone(),
                });
            }
        }
    }

    let mut issues = Vec::new();

    for file in &surviving {
        let Some(primary) = file.metadata.as_ref().and_then(|m| m.primary()) else {
            continue;
        };

        for (dep_id, range) in &primary.depends {
            if is_platform_id(dep_id) {
                continue;
            }

            match presence.get(dep_id) {
                None => issues.push(DependencyIssue {
                    kind: DependencyKind::Missing,
                    mod_id: dep_id.clone(),
                    required_by: primary.id.clone(),
                    required_range: range.clone(),
                    present_version: None,
                }),
                Some(present) if !satisfies(&present.version, range) => {
                    issues.push(DependencyIssue {
                        kind: DependencyKind::Outdated,
                        mod_id: dep_id.clone(),
                        required_by: primary.id.clone(),
                        required_range: range.clone(),
                        present_version: Some(present.version.clone()),
                    });
                }
                Some(_) => {}
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{ModEntry, ModMetadata};
    use crate::core::pack::{FileCategory, FileOrigin};

    fn mod_file(id: &str, version: &str, depends: &[(&str, &str)]) -> FileRecord {
        let mut record = FileRecord::new(
            format!("mods/{id}.jar"),
            "p1".to_string(),
            FileCategory::Mods,
            FileOrigin::Local {
                entry_path: format!("mods/{id}.jar"),
            },
        );
        record.metadata = Some(ModMetadata {
            mods: vec![ModEntry {
                id: id.to_string(),
                version: version.to_string(),
                name: None,
                depends: depends
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                provides: Vec::new(),
            }],
            bundled: Vec::new(),
        });
        record
    }

    #[test]
    fn outdated_dependency_is_reported_with_present_version() {
        let files = vec![
            mod_file("a", "1.0.0", &[("b", ">=2.0.0")]),
            mod_file("b", "1.5.0", &[]),
        ];
        let issues = validate_dependencies(&files);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DependencyKind::Outdated);
        assert_eq!(issues[0].mod_id, "b");
        assert_eq!(issues[0].required_by, "a");
        assert_eq!(issues[0].required_range, ">=2.0.0");
        assert_eq!(issues[0].present_version.as_deref(), Some("1.5.0"));
    }

    #[test]
    fn missing_dependency_is_reported() {
        let files = vec![mod_file("a", "1.0.0", &[("b", "*")])];
        let issues = validate_dependencies(&files);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DependencyKind::Missing);
        assert_eq!(issues[0].mod_id, "b");
        assert!(issues[0].present_version.is_none());
    }

    #[test]
    fn platform_ids_are_ignored() {
        let files = vec![mod_file(
            "a",
            "1.0.0",
            &[("minecraft", "1.20.x"), ("fabricloader", ">=0.15"), ("Java", ">=17")],
        )];
        assert!(validate_dependencies(&files).is_empty());
    }

    #[test]
    fn provides_alias_satisfies_a_dependency() {
        let mut provider = mod_file("libfoo", "3.0.0", &[]);
        provider
            .metadata
            .as_mut()
            .unwrap()
            .mods[0]
            .provides
            .push("foo-api".to_string());

        let files = vec![provider, mod_file("a", "1.0.0", &[("foo-api", ">=2.0.0")])];
        assert!(validate_dependencies(&files).is_empty());
    }

    #[test]
    fn real_entry_beats_provided_alias() {
        // libfoo provides "foo-api" at 9.9.9, but a real (older) foo-api
        // exists; the real version is authoritative.
        let mut provider = mod_file("libfoo", "9.9.9", &[]);
        provider
            .metadata
            .as_mut()
            .unwrap()
            .mods[0]
            .provides
            .push("foo-api".to_string());

        let files = vec![
            provider,
            mod_file("foo-api", "1.0.0", &[]),
            mod_file("a", "1.0.0", &[("foo-api", ">=2.0.0")]),
        ];
        let issues = validate_dependencies(&files);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DependencyKind::Outdated);
        assert_eq!(issues[0].present_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn bundled_entries_count_as_present() {
        let mut host = mod_file("host", "1.0.0", &[]);
        host.metadata.as_mut().unwrap().bundled.push(ModEntry {
            id: "inner-lib".to_string(),
            version: "2.0.0".to_string(),
            name: None,
            depends: Default::default(),
            provides: Vec::new(),
        });

        let files = vec![host, mod_file("a", "1.0.0", &[("inner-lib", ">=2.0.0")])];
        assert!(validate_dependencies(&files).is_empty());
    }

    #[test]
    fn bundled_dependencies_are_not_validated() {
        let mut host = mod_file("host", "1.0.0", &[]);
        host.metadata.as_mut().unwrap().bundled.push(ModEntry {
            id: "inner-lib".to_string(),
            version: "2.0.0".to_string(),
            name: None,
            depends: [("ghost".to_string(), "*".to_string())].into_iter().collect(),
            provides: Vec::new(),
        });

        assert!(validate_dependencies(&[host]).is_empty());
    }

    #[test]
    fn disabled_files_are_invisible() {
        let mut old = mod_file("b", "9.0.0", &[]);
        old.enabled = false;
        old.is_duplicate = true;

        let files = vec![mod_file("a", "1.0.0", &[("b", ">=2.0.0")]), old];
        let issues = validate_dependencies(&files);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DependencyKind::Missing);
    }
}
