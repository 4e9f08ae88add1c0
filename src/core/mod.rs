// ─── Packweld Core ───
// Modular engine for merging heterogeneous Minecraft modpacks.
//
// Architecture:
//   core/
//     version/  — Version triples + range satisfaction (5 grammars)
//     archive/  — Lazy random-access zip reader
//     metadata/ — Mod manifest parsing (fabric / forge / fallback) + cache
//     pack/     — Pack classification, file records, index models
//     resolve/  — Conflict resolution, compatibility + dependency checks
//     emit/     — Merge pipeline: full-archive and index-descriptor output
//     session/  — Orchestrator over load / reorder / remove / emit events

pub mod archive;
pub mod emit;
pub mod error;
pub mod http;
pub mod log;
pub mod metadata;
pub mod pack;
pub mod resolve;
pub mod session;
pub mod version;
