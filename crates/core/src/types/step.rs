//! Checkout steps and widget languages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// One stage of the guided pickup checkout.
///
/// Steps are strictly ordered: `name → email → phone → date → time → note`.
/// Submitting the note places the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Name,
    Email,
    Phone,
    Date,
    Time,
    Note,
}

impl CheckoutStep {
    /// All steps in checkout order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Date,
        Self::Time,
        Self::Note,
    ];

    /// The step after this one, or `None` after the note (submission).
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Name => Some(Self::Email),
            Self::Email => Some(Self::Phone),
            Self::Phone => Some(Self::Date),
            Self::Date => Some(Self::Time),
            Self::Time => Some(Self::Note),
            Self::Note => None,
        }
    }

    /// The step before this one, or `None` for the first step.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Name => None,
            Self::Email => Some(Self::Name),
            Self::Phone => Some(Self::Email),
            Self::Date => Some(Self::Phone),
            Self::Time => Some(Self::Date),
            Self::Note => Some(Self::Time),
        }
    }

    /// Stable lowercase name, as persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::Time => "time",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when parsing a [`Language`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language '{0}', expected fi, sv or en")]
pub struct LanguageError(pub String);

/// Widget language. Menu content is language-scoped on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fi,
    Sv,
    En,
}

impl Language {
    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fi => "fi",
            Self::Sv => "sv",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fi" => Ok(Self::Fi),
            "sv" => Ok(Self::Sv),
            "en" => Ok(Self::En),
            other => Err(LanguageError(other.to_owned())),
        }
    }
}
