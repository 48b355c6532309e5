//! Language codes for translated content.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LanguageCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageCodeError {
    /// The input is not a 2-3 letter ASCII tag.
    #[error("language code must be 2-3 ASCII letters (got {0:?})")]
    Invalid(String),
}

/// A lowercase ISO 639 primary language tag (`en`, `fr`, `it`, ...).
///
/// Region subtags are dropped on parse (`pt-BR` becomes `pt`): translated
/// content is stored per language, not per locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a language tag.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageCodeError::Invalid`] if the primary subtag is not
    /// 2-3 ASCII letters.
    pub fn parse(s: &str) -> Result<Self, LanguageCodeError> {
        let primary = s.trim().split(['-', '_']).next().unwrap_or_default();
        let valid = (2..=3).contains(&primary.len())
            && primary.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            return Err(LanguageCodeError::Invalid(s.to_owned()));
        }
        Ok(Self(primary.to_ascii_lowercase()))
    }

    /// English, the language catalog content is authored in.
    #[must_use]
    pub fn english() -> Self {
        Self("en".to_owned())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LanguageCode {
    type Err = LanguageCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = LanguageCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}
