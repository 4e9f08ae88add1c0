use tracing::{debug, error, info, warn};

/// Severity attached to a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Accent,
    Warning,
    Danger,
}

/// Sink for non-fatal diagnostics produced during analysis and emit.
///
/// Manifest parse failures, skipped duplicate packs and network errors are
/// reported here; they never abort the enclosing operation. An embedding
/// layer can implement this to surface messages in its own UI.
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, message: &str, severity: Severity);
}

/// Default sink: forwards diagnostics to `tracing` at mapped levels.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success => info!("{message}"),
            Severity::Accent => debug!("{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Danger => error!("{message}"),
        }
    }
}
