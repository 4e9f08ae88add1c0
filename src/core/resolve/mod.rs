// ─── Conflict Resolution ───
// Pure, synchronous passes over the in-memory file list: priority-ordered
// conflict resolution, head-pack compatibility checks, and dependency
// validation against the surviving mod set.

pub mod compat;
pub mod deps;
pub mod resolver;

pub use compat::{check_compatibility, CompatIssue, CompatKind};
pub use deps::{validate_dependencies, DependencyIssue, DependencyKind};
pub use resolver::{mod_slug, resolve, ConflictKind, ConflictRecord, ConflictResolution};
