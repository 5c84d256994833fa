use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LanguageError {
    #[error("please select a language")]
    Empty,

    #[error("unsupported language: {0}")]
    Unknown(String),
}

/// Languages the backend serves content for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    Es,
    De,
    It,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Fr, Language::Es, Language::De, Language::It];

    /// Two-letter code used in URLs and persisted state.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Es => "es",
            Language::De => "de",
            Language::It => "it",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Fr => "Français",
            Language::Es => "Español",
            Language::De => "Deutsch",
            Language::It => "Italian",
        }
    }

    /// BCP 47 tag for speech output.
    #[must_use]
    pub fn speech_locale(self) -> &'static str {
        match self {
            Language::Fr => "fr-FR",
            Language::Es => "es-ES",
            Language::De => "de-DE",
            Language::It => "it-IT",
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
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LanguageError::Empty);
        }
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LanguageError::Unknown(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(" FR ".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!("it".parse::<Language>().unwrap(), Language::It);
    }

    #[test]
    fn rejects_empty_and_unknown_codes() {
        assert_eq!("".parse::<Language>().unwrap_err(), LanguageError::Empty);
        assert_eq!(
            "pt".parse::<Language>().unwrap_err(),
            LanguageError::Unknown("pt".into())
        );
    }
}
