use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::{ModEntry, ModMetadata, FORGE_MANIFEST};
use crate::core::archive::ArchiveReader;
use crate::core::error::MergerResult;

// mods.toml is scanned by regex rather than a full TOML parser: only
// `modId`, `version` and mandatory `[[dependencies.<id>]]` blocks are
// consumed, and real-world files bend the grammar (templated versions,
// stray whitespace) in ways a strict parser rejects.

fn mod_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^\s*modId\s*=\s*"([^"]+)""#).expect("static regex"))
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^\s*version\s*=\s*"([^"]+)""#).expect("static regex"))
}

fn version_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"versionRange\s*=\s*"([^"]*)""#).expect("static regex")
    })
}

fn mandatory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*mandatory\s*=\s*true").expect("static regex"))
}

pub(super) fn parse(archive: &ArchiveReader) -> MergerResult<ModMetadata> {
    let text = archive.read_string(FORGE_MANIFEST)?;

    let id = mod_id_re()
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let version = version_re()
        .captures(&text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut depends = BTreeMap::new();
    // Each `[[dependencies.<owner>]]` block declares one dependency; the
    // target id is the block's own `modId` field.
    for block in text.split("[[dependencies.").skip(1) {
        let body = match block.find("[[") {
            Some(end) => &block[..end],
            None => block,
        };

        if !mandatory_re().is_match(body) {
            continue;
        }

        let Some(dep_id) = mod_id_re().captures(body).map(|c| c[1].to_string()) else {
            continue;
        };
        let range = version_range_re()
            .captures(body)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        depends.insert(dep_id, range);
    }

    Ok(ModMetadata {
        mods: vec![ModEntry {
            id,
            version,
            name: None,
            depends,
            provides: Vec::new(),
        }],
        bundled: Vec::new(),
    })
}
