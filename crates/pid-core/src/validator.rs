//! Participant identifier format rules.

/// Accepted identifier lengths, in characters, after trimming.
pub const PID_LENGTHS: [usize; 2] = [6, 7];

/// Outcome of checking one raw identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PidCheck {
    Valid,
    /// Blank after trimming, or a missing-value placeholder.
    Missing,
    WrongLength,
    NonAlphanumeric,
}

impl PidCheck {
    pub const ALL: [PidCheck; 4] = [
        PidCheck::Valid,
        PidCheck::Missing,
        PidCheck::WrongLength,
        PidCheck::NonAlphanumeric,
    ];

    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Missing => "missing",
            Self::WrongLength => "wrong length",
            Self::NonAlphanumeric => "non-alphanumeric",
        }
    }
}

/// Classify a raw identifier. Case is not significant.
pub fn classify_pid(raw: &str) -> PidCheck {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PidCheck::Missing;
    }
    if !trimmed.chars().all(char::is_alphanumeric) {
        return PidCheck::NonAlphanumeric;
    }
    if !PID_LENGTHS.contains(&trimmed.chars().count()) {
        return PidCheck::WrongLength;
    }
    PidCheck::Valid
}

/// Whether `raw` is a well-formed participant identifier.
pub fn is_valid(raw: &str) -> bool {
    classify_pid(raw).is_valid()
}
