use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire merging engine.
/// Every module returns `Result<T, MergerError>`.
#[derive(Debug, Error)]
pub enum MergerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry not found: {0}")]
    EntryNotFound(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Pack ────────────────────────────────────────────
    #[error("Invalid pack archive: {0}")]
    InvalidPack(String),

    #[error("Pack not found: {0}")]
    PackNotFound(String),

    // ── Analysis ────────────────────────────────────────
    #[error("An analysis is already in progress")]
    AnalysisInProgress,

    #[error("Blocked by unresolved compatibility issues")]
    CompatibilityBlocked,

    // ── Emit ────────────────────────────────────────────
    #[error("Emit failed: {0}")]
    EmitFailed(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type MergerResult<T> = Result<T, MergerError>;

impl From<std::io::Error> for MergerError {
    fn from(source: std::io::Error) -> Self {
        MergerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl MergerError {
    pub fn kind(&self) -> &'static str {
        match self {
            MergerError::Io { .. } => "io",
            MergerError::Http(_) | MergerError::DownloadFailed { .. } => "network",
            MergerError::Zip(_) | MergerError::EntryNotFound(_) => "archive",
            MergerError::Json(_) => "parsing",
            MergerError::InvalidPack(_) | MergerError::PackNotFound(_) => "pack",
            MergerError::AnalysisInProgress | MergerError::CompatibilityBlocked => "analysis",
            MergerError::EmitFailed(_) => "emit",
            MergerError::Other(_) => "generic",
        }
    }

    /// Recoverable errors leave the session usable; the caller may retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MergerError::EmitFailed(_))
    }
}
