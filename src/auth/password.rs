//! Password validation and hashing.

use std::fmt::Display;

use crate::Error;

/// A password that has been checked against common weak-password patterns.
///
/// Validation estimates guessability with zxcvbn rather than enforcing
/// character-class rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// The minimum zxcvbn score for a password to be accepted.
    const MINIMUM_SCORE: zxcvbn::Score = zxcvbn::Score::Three;

    /// Create a validated password from a raw password string.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] if the password is too easy to guess. The
    /// error string contains feedback for choosing a stronger password where
    /// zxcvbn provides it.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let entropy = zxcvbn::zxcvbn(raw_password, &[]);

        if entropy.score() >= Self::MINIMUM_SCORE {
            return Ok(Self(raw_password.to_owned()));
        }

        let feedback = entropy
            .feedback()
            .map(|feedback| {
                let mut parts = Vec::new();

                if let Some(warning) = feedback.warning() {
                    parts.push(warning.to_string());
                }

                parts.extend(
                    feedback
                        .suggestions()
                        .iter()
                        .map(|suggestion| suggestion.to_string()),
                );

                parts.join(" ")
            })
            .unwrap_or_else(|| "Try a longer password or passphrase.".to_owned());

        Err(Error::TooWeak(feedback))
    }

    /// Create a validated password without checking its strength.
    ///
    /// Intended for tests that need a fixed, known password.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The default bcrypt cost factor.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the underlying hashing library fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Validate and hash a raw password in one step.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] if the password fails validation or
    /// [Error::HashingError] if hashing fails.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Wrap an existing hash string, e.g. one loaded from the database.
    pub fn new_unchecked(hash: String) -> Self {
        Self(hash)
    }

    /// Check whether `raw_password` matches this hash.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if the stored hash cannot be parsed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        bcrypt::verify(raw_password, &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
