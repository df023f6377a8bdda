//! Error type shared by every Tone Bridge crate.
//!
//! Components return `BridgeResult` and leave the fallback decision to the
//! caller; the orchestrator turns every failure that originates on the
//! producer side into a consumer-safe message instead of propagating it.

use thiserror::Error;

/// Errors raised inside the mediation layer
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }
}

/// Result alias used across the workspace
pub type BridgeResult<T> = Result<T, BridgeError>;
