//! Error types for the revscope analysis toolkit.
//!
//! Absence of a finding is never an error: analyzers report empty or false
//! results. Only structurally invalid input or a missing required resource
//! surfaces here.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for revscope operations.
#[derive(Debug, Error)]
pub enum RevscopeError {
    /// Buffer access outside the valid range
    #[error("Out of bounds access: offset {offset} + length {length} exceeds size {size}")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Regex pattern failed to compile
    #[error("Pattern error: {0}")]
    InvalidPattern(String),

    /// File access errors carrying the offending path
    #[error("I/O error on {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File exceeds the configured load limit
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes")]
    FileTooLarge { limit: u64, found: u64 },

    /// Hook installation requested on a platform without a hook backend
    #[error("API hooking not implemented for platform: {0}")]
    UnsupportedPlatform(String),

    /// Decompiler backend could not be reached
    #[error("Decompiler {0} is not available")]
    BackendUnavailable(String),

    /// Backend is reachable but has no strategy for the operation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// External tool could not be spawned or exited unsuccessfully
    #[error("Tool invocation failed: {0}")]
    ToolInvocation(String),

    /// Bounded operation exceeded its time budget
    #[error("Operation timeout after {budget:?}")]
    Timeout { budget: Duration },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for revscope operations
pub type Result<T> = std::result::Result<T, RevscopeError>;

impl From<serde_json::Error> for RevscopeError {
    fn from(err: serde_json::Error) -> Self {
        RevscopeError::Serialization(err.to_string())
    }
}

impl RevscopeError {
    /// True for failures of an external collaborator (missing tool, timeout,
    /// unreachable backend) that a session records instead of aborting on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RevscopeError::ToolInvocation(_)
                | RevscopeError::Timeout { .. }
                | RevscopeError::BackendUnavailable(_)
                | RevscopeError::NotImplemented(_)
        )
    }
}
