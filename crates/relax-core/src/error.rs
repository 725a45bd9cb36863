use std::fmt;

/// Kind of asynchronously loaded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Audio,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Errors produced by the sandbox.
///
/// Only configuration errors escape [`crate::Sandbox::new`]; everything else
/// is logged and contained inside the sandbox.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to load {kind} '{locator}': {reason}")]
    ResourceLoad {
        kind: ResourceKind,
        locator: String,
        reason: String,
    },

    #[error("audio playback rejected: {0}")]
    PlaybackRejected(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("sandbox has been torn down")]
    Disposed,
}

impl SandboxError {
    pub fn image_load(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            kind: ResourceKind::Image,
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    pub fn audio_load(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            kind: ResourceKind::Audio,
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}
