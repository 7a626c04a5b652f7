//! Error types for directory operations.

use std::fmt;

use thiserror::Error;

/// The kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Group => write!(f, "Group"),
        }
    }
}

/// Errors that can occur while reading or mutating the directory.
///
/// All errors are surfaced synchronously; nothing is retried internally and a
/// failed mutation leaves the directory exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// An entity with the same name is already registered.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    /// The named entity is not registered.
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: EntityKind, name: String },

    /// An identifier was empty or otherwise unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nesting `child` under `parent` would close a cycle.
    #[error("Adding group '{child}' to group '{parent}' would create a cycle")]
    CycleDetected { child: String, parent: String },
}

impl DirectoryError {
    /// Create an `AlreadyExists` error.
    pub fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Create a `NotFound` error.
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;
