//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters other than digits, spaces, and `+-()`.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The input contains no digits at all.
    #[error("phone number must contain at least one digit")]
    NoDigits,
}

/// A phone number stored in its display form.
///
/// Accepts digits plus the usual separators (`+`, `-`, `(`, `)`, spaces).
/// No attempt is made at full E.164 validation; order contact details and
/// profiles only need a plausibility check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum length of a phone number.
    pub const MAX_LENGTH: usize = 20;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains characters
    /// outside digits and separators, or has no digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        for c in s.chars() {
            if !c.is_ascii_digit() && !matches!(c, '+' | '-' | '(' | ')' | ' ') {
                return Err(PhoneError::InvalidCharacter(c));
            }
        }

        if !s.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NoDigits);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Phone::parse("+7 (912) 555-01-02").is_ok());
        assert!(Phone::parse("89125550102").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "1".repeat(21);
        assert!(matches!(
            Phone::parse(&long),
            Err(PhoneError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert!(matches!(
            Phone::parse("555-HELP"),
            Err(PhoneError::InvalidCharacter('H'))
        ));
    }

    #[test]
    fn test_parse_no_digits() {
        assert!(matches!(Phone::parse("+-()"), Err(PhoneError::NoDigits)));
    }
}
