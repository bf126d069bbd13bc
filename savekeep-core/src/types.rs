//! # Core Types
//!
//! Identifiers and timestamps shared across the savekeep crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{Result, SaveError};

/// Longest profile identifier accepted by [`ProfileId::new`].
pub const MAX_PROFILE_ID_LEN: usize = 64;

/// Identifier of a save profile.
///
/// A profile id addresses exactly one file under the storage root, so it is
/// restricted to 1–64 ASCII letters, digits, `_` and `-`. That keeps it from
/// escaping the root directory or colliding with temporary and backup files.
///
/// # Examples
///
/// ```rust
/// use savekeep_core::ProfileId;
///
/// let id = ProfileId::new("slot1").unwrap();
/// assert_eq!(id.as_str(), "slot1");
///
/// assert!(ProfileId::new("").is_err());
/// assert!(ProfileId::new("../escape").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a profile identifier, validating its characters.
    ///
    /// # Errors
    /// * `SaveError::InvalidProfileId` if the id is empty, too long, or
    ///   contains characters outside `[A-Za-z0-9_-]`
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(SaveError::invalid_profile_id(id, "must not be empty"));
        }

        if id.len() > MAX_PROFILE_ID_LEN {
            return Err(SaveError::invalid_profile_id(
                id,
                format!("longer than {} characters", MAX_PROFILE_ID_LEN),
            ));
        }

        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(SaveError::invalid_profile_id(
                id.clone(),
                format!("contains unsupported character {:?}", bad),
            ));
        }

        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProfileId {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProfileId {
    type Error = SaveError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProfileId {
    type Error = SaveError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Wall-clock save timestamp in milliseconds since the Unix epoch.
///
/// Timestamps stamped through [`Timestamp::next_after`] are strictly
/// increasing even when two saves land within the same millisecond or the
/// system clock steps backwards.
///
/// # Examples
///
/// ```rust
/// use savekeep_core::Timestamp;
///
/// let first = Timestamp::new(u64::MAX - 1);
/// let second = Timestamp::next_after(first);
/// assert!(second > first);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The timestamp of a record that has never been saved.
    pub const NEVER: Timestamp = Timestamp(0);

    /// Creates a timestamp from a raw millisecond value.
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current wall-clock time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Returns the current time, bumped past `previous` if the clock has not
    /// moved beyond it.
    ///
    /// The result is strictly greater than `previous` for every input below
    /// `u64::MAX`. At `u64::MAX` the value saturates and is returned unchanged;
    /// that is roughly 584 million years of milliseconds past the epoch, so a
    /// stamp can only get there if it was written by hand.
    pub fn next_after(previous: Timestamp) -> Self {
        let now = Self::now();
        if now > previous {
            now
        } else {
            Self(previous.0.saturating_add(1))
        }
    }

    /// Returns the numeric value in milliseconds.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned when a participant is registered, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
