// ─── Pack Loader ───
// Classifies input archives as indexed (.mrpack-style) or standard,
// enumerates their files, and sniffs pack-level minecraft version and
// loader.

pub mod file;
pub mod index;
pub mod loader;
pub mod model;

pub use file::{FileOrigin, FileRecord, FileSummary};
pub use index::{IndexFile, ModrinthIndex};
pub use loader::{load_pack, LoadedPack, MODRINTH_INDEX};
pub use model::{FileCategory, Loader, Pack, PackType};
