//! Email address newtype shared by users and the verification flow.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by [`EmailAddress::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    /// The address was empty once trimmed.
    Empty,
    /// The address did not match the accepted shape.
    Invalid,
    /// The address exceeded the storage limit.
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email must not be empty"),
            Self::Invalid => write!(f, "email must be a valid address"),
            Self::TooLong { max } => write!(f, "email must be at most {max} characters"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately coarse: one @, non-empty local part, dotted domain.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised (trimmed, lowercased) email address.
///
/// ## Invariants
/// - Non-empty, at most [`EMAIL_MAX`] characters.
/// - Matches the coarse `local@domain.tld` shape; full RFC validation is
///   left to the mail infrastructure that actually delivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        Self::from_owned(email.as_ref().to_owned())
    }

    fn from_owned(email: String) -> Result<Self, EmailValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(EmailValidationError::TooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(EmailValidationError::Invalid);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", EmailValidationError::Empty)]
    #[case("   ", EmailValidationError::Empty)]
    #[case("no-at-sign", EmailValidationError::Invalid)]
    #[case("two@@signs.example", EmailValidationError::Invalid)]
    #[case("missing@tld", EmailValidationError::Invalid)]
    #[case("spaced name@example.com", EmailValidationError::Invalid)]
    fn rejects_invalid_addresses(#[case] raw: &str, #[case] expected: EmailValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid address rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_oversized_addresses() {
        let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        let err = EmailAddress::new(&raw).expect_err("oversized rejected");
        assert_eq!(err, EmailValidationError::TooLong { max: EMAIL_MAX });
    }

    #[rstest]
    #[case("  Promoter@Example.COM  ", "promoter@example.com")]
    #[case("admin@promo.plan", "admin@promo.plan")]
    fn normalises_case_and_whitespace(#[case] raw: &str, #[case] expected: &str) {
        let email = EmailAddress::new(raw).expect("valid address");
        assert_eq!(email.as_str(), expected);
    }
}
