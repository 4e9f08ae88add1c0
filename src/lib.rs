//! Packweld: a modpack merging engine.
//!
//! Ingests multiple Minecraft modpack archives of heterogeneous formats
//! (`.mrpack`-style indexed packs, CurseForge exports, MultiMC instances,
//! bare zips), reconciles them into a single coherent pack under a
//! priority order, and emits either a portable instance archive or an
//! index-based pack descriptor.
//!
//! The entry point is [`core::session::MergerSession`]; everything else
//! is reachable through it. Diagnostics flow through
//! [`core::log::DiagnosticSink`]; callers that want structured logging
//! initialize a `tracing` subscriber themselves.

pub mod core;

pub use crate::core::emit::{EmitMode, EmitOptions};
pub use crate::core::error::{MergerError, MergerResult};
pub use crate::core::http::{build_http_client, Fetcher, HttpFetcher};
pub use crate::core::log::{DiagnosticSink, Severity, TracingSink};
pub use crate::core::session::{AnalysisReport, MergerSession, PackSummary, ReorderDirection};
