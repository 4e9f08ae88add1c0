// ─── Archive Reader ───
// Lazy random-access view over a zip held in memory. Entries can be read
// any number of times; nothing is decompressed until first read.

use std::collections::HashSet;
use std::io::{Cursor, Read};

use parking_lot::Mutex;
use zip::ZipArchive;

use crate::core::error::{MergerError, MergerResult};

pub struct ArchiveReader {
    archive: Mutex<ZipArchive<Cursor<Vec<u8>>>>,
    /// Entry names in central-directory order (directory markers included).
    entry_names: Vec<String>,
    lookup: HashSet<String>,
}

impl ArchiveReader {
    /// Open a zip container over owned bytes (a local file read or a
    /// downloaded blob).
    pub fn from_bytes(bytes: Vec<u8>) -> MergerResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        // Collect names via by_index so the original entry order survives;
        // file_names() iterates in hash order.
        let mut entry_names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            entry_names.push(entry.name().to_string());
        }
        let lookup = entry_names.iter().cloned().collect();

        Ok(Self {
            archive: Mutex::new(archive),
            entry_names,
            lookup,
        })
    }

    /// All entry paths, in archive order. Directory markers (trailing `/`)
    /// are included; callers skip them with [`is_dir_entry`].
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }

    /// Exact-path existence lookup.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup.contains(path)
    }

    /// Read an entry fully into memory.
    pub fn read_bytes(&self, path: &str) -> MergerResult<Vec<u8>> {
        let mut archive = self.archive.lock();
        let mut entry = archive
            .by_name(path)
            .map_err(|_| MergerError::EntryNotFound(path.to_string()))?;

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read an entry as UTF-8 text (lossy on invalid sequences).
    pub fn read_string(&self, path: &str) -> MergerResult<String> {
        let bytes = self.read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Whether an entry path is a directory marker.
pub fn is_dir_entry(name: &str) -> bool {
    name.ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::build_zip;

    #[test]
    fn lists_entries_in_archive_order() {
        let bytes = build_zip(&[
            ("mods/b.jar", b"bb"),
            ("mods/a.jar", b"aa"),
            ("config/", b""),
            ("config/x.toml", b"k = 1"),
        ]);
        let archive = ArchiveReader::from_bytes(bytes).unwrap();
        assert_eq!(
            archive.entry_names(),
            &["mods/b.jar", "mods/a.jar", "config/", "config/x.toml"]
        );
    }

    #[test]
    fn entries_are_rereadable() {
        let bytes = build_zip(&[("hello.txt", b"hi there")]);
        let archive = ArchiveReader::from_bytes(bytes).unwrap();
        assert_eq!(archive.read_bytes("hello.txt").unwrap(), b"hi there");
        assert_eq!(archive.read_string("hello.txt").unwrap(), "hi there");
    }

    #[test]
    fn missing_entry_is_an_error() {
        let bytes = build_zip(&[("a.txt", b"a")]);
        let archive = ArchiveReader::from_bytes(bytes).unwrap();
        assert!(matches!(
            archive.read_bytes("nope.txt"),
            Err(MergerError::EntryNotFound(_))
        ));
    }

    #[test]
    fn malformed_container_is_rejected() {
        assert!(ArchiveReader::from_bytes(b"not a zip".to_vec()).is_err());
    }

    #[test]
    fn dir_markers_are_detectable() {
        assert!(is_dir_entry("config/"));
        assert!(!is_dir_entry("config/x.toml"));
    }
}
