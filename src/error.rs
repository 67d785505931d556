// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types for the ROS1 bag writer.

use std::fmt;

/// Errors that can occur while writing a ROS1 bag file.
#[derive(Debug)]
pub enum BagError {
    /// The destination path already existed when `open()` was called.
    FileExists {
        /// Path that already existed.
        path: String,
    },

    /// An underlying I/O operation failed.
    Io(std::io::Error),

    /// An operation was attempted before `open()` succeeded.
    NotOpen,

    /// `getBytes()`/`into_bytes()` was called on an already-closed writer a
    /// second time, or a write was attempted after `close()`.
    AlreadyClosed,

    /// `add_connection` was called without a `msgdef`/`md5sum` and the
    /// `msgtype` had no entry in the predefined schema table.
    SchemaRequired {
        /// The message type that had no schema available.
        msgtype: String,
    },

    /// `add_connection` was called with a tuple identical to an existing
    /// connection's `(topic, msgtype, msgdef, md5sum, callerid, latching)`.
    DuplicateConnection {
        /// The topic of the conflicting connection.
        topic: String,
        /// The message type of the conflicting connection.
        msgtype: String,
    },

    /// `write()` was called with a handle that does not name a registered
    /// connection on this writer.
    UnknownConnection {
        /// The connection id that was not found.
        id: u32,
    },

    /// `into_bytes()` was called on a writer constructed with a file path.
    WrongMode,

    /// `into_bytes()` was called before `close()`.
    NotClosed,

    /// A feature outside the writer's fixed configuration was requested,
    /// e.g. a compression format other than `"none"`.
    Unsupported {
        /// Description of the unsupported feature.
        feature: String,
    },
}

impl BagError {
    /// Build a [`BagError::FileExists`].
    pub fn file_exists(path: impl Into<String>) -> Self {
        BagError::FileExists { path: path.into() }
    }

    /// Build a [`BagError::SchemaRequired`].
    pub fn schema_required(msgtype: impl Into<String>) -> Self {
        BagError::SchemaRequired {
            msgtype: msgtype.into(),
        }
    }

    /// Build a [`BagError::DuplicateConnection`].
    pub fn duplicate_connection(topic: impl Into<String>, msgtype: impl Into<String>) -> Self {
        BagError::DuplicateConnection {
            topic: topic.into(),
            msgtype: msgtype.into(),
        }
    }

    /// Build a [`BagError::UnknownConnection`].
    pub fn unknown_connection(id: u32) -> Self {
        BagError::UnknownConnection { id }
    }

    /// Build a [`BagError::Unsupported`].
    pub fn unsupported(feature: impl Into<String>) -> Self {
        BagError::Unsupported {
            feature: feature.into(),
        }
    }
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BagError::FileExists { path } => write!(f, "file already exists: {path}"),
            BagError::Io(err) => write!(f, "I/O error: {err}"),
            BagError::NotOpen => write!(f, "writer is not open"),
            BagError::AlreadyClosed => write!(f, "writer is already closed"),
            BagError::SchemaRequired { msgtype } => write!(
                f,
                "no msgdef/md5sum given and no predefined schema for '{msgtype}'"
            ),
            BagError::DuplicateConnection { topic, msgtype } => write!(
                f,
                "duplicate connection for topic '{topic}' ({msgtype}) with identical schema and extension fields"
            ),
            BagError::UnknownConnection { id } => write!(f, "unknown connection id: {id}"),
            BagError::WrongMode => write!(f, "into_bytes() requires an in-memory writer"),
            BagError::NotClosed => write!(f, "writer must be closed before into_bytes()"),
            BagError::Unsupported { feature } => write!(f, "unsupported: {feature}"),
        }
    }
}

impl std::error::Error for BagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BagError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BagError {
    fn from(err: std::io::Error) -> Self {
        BagError::Io(err)
    }
}

/// Result type for bag writer operations.
pub type Result<T> = std::result::Result<T, BagError>;
