//! Input checks and answer comparison shared by every game.

use thiserror::Error;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("expected a single letter, got {0:?}")]
    NotALetter(String),

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Where correctness of a response is decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationStrategy {
    /// The client compares the response to the item's expected answer.
    LocalCompare,
    /// The server judges the response; the client renders its verdict.
    RemoteConfirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameKind {
    Quiz,
    DragDrop,
    GuessWord,
    Bingo,
}

impl GameKind {
    #[must_use]
    pub fn strategy(self) -> ValidationStrategy {
        match self {
            GameKind::Quiz | GameKind::DragDrop => ValidationStrategy::LocalCompare,
            GameKind::GuessWord | GameKind::Bingo => ValidationStrategy::RemoteConfirm,
        }
    }
}

/// Trimmed, case-insensitive equality.
#[must_use]
pub fn answers_match(expected: &str, response: &str) -> bool {
    expected.trim().to_lowercase() == response.trim().to_lowercase()
}

/// # Errors
///
/// Returns `ValidationError::Empty` if `value` is blank.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed)
}

/// Accept exactly one alphabetic character (accented letters included).
///
/// # Errors
///
/// Returns `ValidationError::Empty` for blank input and
/// `ValidationError::NotALetter` for anything else that is not one letter.
pub fn parse_letter(input: &str) -> Result<char, ValidationError> {
    let trimmed = require_text("letter", input)?;
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(c),
        _ => Err(ValidationError::NotALetter(trimmed.to_string())),
    }
}

/// # Errors
///
/// Returns `ValidationError::InvalidEmail` unless there is a local part,
/// an `@`, and a dot somewhere in the domain after it.
pub fn validate_email(email: &str) -> Result<&str, ValidationError> {
    let email = require_text("email", email)?;
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
    if local.is_empty() || !domain_ok || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

/// # Errors
///
/// Returns `ValidationError::PasswordTooShort` below `MIN_PASSWORD_LEN` characters.
pub fn validate_password(password: &str) -> Result<&str, ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_compare_case_insensitively() {
        assert!(answers_match("Cat", " cat "));
        assert!(answers_match("Éclair", "éclair"));
        assert!(!answers_match("cat", "dog"));
    }

    #[test]
    fn letter_must_be_single_alphabetic() {
        assert_eq!(parse_letter(" a ").unwrap(), 'a');
        assert_eq!(parse_letter("é").unwrap(), 'é');
        assert_eq!(
            parse_letter("").unwrap_err(),
            ValidationError::Empty { field: "letter" }
        );
        assert!(matches!(parse_letter("ab"), Err(ValidationError::NotALetter(_))));
        assert!(matches!(parse_letter("7"), Err(ValidationError::NotALetter(_))));
    }

    #[test]
    fn email_needs_domain_with_dot() {
        assert!(validate_email("ana@example.com").is_ok());
        assert_eq!(validate_email("ana@example").unwrap_err(), ValidationError::InvalidEmail);
        assert_eq!(validate_email("@example.com").unwrap_err(), ValidationError::InvalidEmail);
    }

    #[test]
    fn server_judged_games_use_remote_confirm() {
        assert_eq!(GameKind::Quiz.strategy(), ValidationStrategy::LocalCompare);
        assert_eq!(GameKind::DragDrop.strategy(), ValidationStrategy::LocalCompare);
        assert_eq!(GameKind::GuessWord.strategy(), ValidationStrategy::RemoteConfirm);
        assert_eq!(GameKind::Bingo.strategy(), ValidationStrategy::RemoteConfirm);
    }
}
