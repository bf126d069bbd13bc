//! # Error Types
//!
//! Error handling for the savekeep persistence engine.

use thiserror::Error;

/// Error types that can occur while persisting or restoring records.
///
/// Only a small subset of these ever reaches callers of the coordinator:
/// decode-side failures (corruption, checksum and cipher errors) are
/// logged by the store and degraded to "no data". Write-side failures
/// are surfaced so that a lost save is never silent.
///
/// # Error Categories
///
/// - **Write Errors**: I/O and persistence failures while storing a record
/// - **Integrity Errors**: Checksum mismatches and malformed envelopes
/// - **Codec Errors**: Serialization and cipher failures
/// - **Input Errors**: Profile identifiers that cannot address a file
///
/// # Examples
///
/// ```rust
/// use savekeep_core::SaveError;
///
/// let error = SaveError::corrupted("truncated header");
/// assert!(error.is_corruption());
/// ```
#[derive(Error, Debug)]
pub enum SaveError {
    /// Backing storage operation failure
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Profile identifier cannot be used as a storage key
    #[error("Invalid profile id {id:?}: {reason}")]
    InvalidProfileId { id: String, reason: String },

    /// Stored bytes are not a valid record envelope
    #[error("Corrupted record: {details}")]
    Corrupted { details: String },

    /// Payload checksum does not match the envelope header
    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Cipher could not transform the payload
    #[error("Cipher error: {message}")]
    Cipher { message: String },

    /// JSON serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results in the savekeep crates.
pub type Result<T> = std::result::Result<T, SaveError>;

impl SaveError {
    /// Creates a new persistence error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use savekeep_core::SaveError;
    ///
    /// let error = SaveError::persistence("Disk full");
    /// ```
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Creates a new invalid profile id error.
    pub fn invalid_profile_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProfileId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new corruption error with the given details.
    pub fn corrupted(details: impl Into<String>) -> Self {
        Self::Corrupted {
            details: details.into(),
        }
    }

    /// Creates a new cipher error with the given message.
    pub fn cipher(message: impl Into<String>) -> Self {
        Self::Cipher {
            message: message.into(),
        }
    }

    /// Creates a new internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Determines whether this error describes unreadable stored bytes.
    ///
    /// Corruption errors are the ones a store degrades to "absent"
    /// instead of propagating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use savekeep_core::SaveError;
    ///
    /// let mismatch = SaveError::ChecksumMismatch { expected: 1, actual: 2 };
    /// assert!(mismatch.is_corruption());
    ///
    /// let io = SaveError::persistence("permission denied");
    /// assert!(!io.is_corruption());
    /// ```
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Corrupted { .. }
                | Self::ChecksumMismatch { .. }
                | Self::Cipher { .. }
                | Self::Serialization(_)
        )
    }
}
