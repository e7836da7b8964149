#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// A participant identifier in canonical form (trimmed, uppercase).
///
/// Holding a `ParticipantId` says nothing about whether the identifier is
/// well formed; master records may carry identifiers that would fail
/// questionnaire validation and still act as merge keys.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ModelError> {
        let canonical = Self::canonicalize(value.as_ref());
        if canonical.is_empty() {
            return Err(ModelError::EmptyParticipantId);
        }
        Ok(Self(canonical))
    }

    /// Trim surrounding whitespace and uppercase.
    pub fn canonicalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Zero-based data-row position of a record within its source file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RowId(usize);

impl RowId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RowId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
