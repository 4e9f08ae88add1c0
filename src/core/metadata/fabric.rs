use std::collections::BTreeMap;

use serde::Deserialize;

use super::{parse_nested, ModEntry, ModMetadata, FABRIC_MANIFEST};
use crate::core::archive::ArchiveReader;
use crate::core::error::MergerResult;
use crate::core::log::DiagnosticSink;

/// `fabric.mod.json`, reduced to the fields the merger consumes.
#[derive(Debug, Deserialize)]
struct FabricManifest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    depends: BTreeMap<String, RangeValue>,
    #[serde(default)]
    provides: ProvidesField,
    #[serde(default)]
    jars: Vec<NestedJar>,
}

#[derive(Debug, Deserialize)]
struct NestedJar {
    file: String,
}

/// Dependency ranges appear as a single string or a list of alternatives.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangeValue {
    One(String),
    Many(Vec<String>),
}

impl RangeValue {
    fn into_range(self) -> String {
        match self {
            RangeValue::One(s) => s,
            RangeValue::Many(parts) => parts.join(" "),
        }
    }
}

/// `provides` is written either as an array of ids or as an object whose
/// keys are the ids; only the identifiers are kept.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProvidesField {
    List(Vec<String>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl Default for ProvidesField {
    fn default() -> Self {
        ProvidesField::List(Vec::new())
    }
}

impl ProvidesField {
    fn into_ids(self) -> Vec<String> {
        match self {
            ProvidesField::List(ids) => ids,
            ProvidesField::Map(map) => map.into_keys().collect(),
        }
    }
}

pub(super) fn parse(
    archive: &ArchiveReader,
    depth: u8,
    sink: &dyn DiagnosticSink,
) -> MergerResult<ModMetadata> {
    let text = archive.read_string(FABRIC_MANIFEST)?;
    let manifest: FabricManifest = serde_json::from_str(&text)?;

    let primary = ModEntry {
        id: manifest.id.unwrap_or_else(|| "unknown".to_string()),
        version: manifest.version.unwrap_or_else(|| "unknown".to_string()),
        name: manifest.name,
        depends: manifest
            .depends
            .into_iter()
            .map(|(id, range)| (id, range.into_range()))
            .collect(),
        provides: manifest.provides.into_ids(),
    };

    let mut bundled = Vec::new();
    for jar in manifest.jars {
        if let Some(nested) = parse_nested(archive, &jar.file, depth, sink) {
            bundled.extend(nested.mods);
            bundled.extend(nested.bundled);
        }
    }

    Ok(ModMetadata {
        mods: vec![primary],
        bundled,
    })
}
