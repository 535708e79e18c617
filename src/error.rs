//! Error types for the store, persistence, configuration and export stages.

use std::fmt;

use thiserror::Error;

/// Which collection an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Experience,
    Education,
    Skill,
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Experience => "experience",
            EntityKind::Education => "education",
            EntityKind::Skill => "skill",
            EntityKind::Project => "project",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} entry '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid resume JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("cannot read font '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    Parse(#[from] ttf_parser::FaceParsingError),
}

/// Failure of any export stage. The whole export fails with exactly one of
/// these and no file is delivered.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("render target '#{0}' not found in document")]
    RenderTargetMissing(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Assemble(String),

    #[error("delivery failed: {0}")]
    Delivery(#[from] std::io::Error),

    #[error("an export is already in progress")]
    Busy,
}

impl ExportError {
    /// The single generic notification shown to the user for any failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::Busy => "An export is already running. Please wait for it to finish.",
            _ => "Failed to export resume. Please try again.",
        }
    }
}
