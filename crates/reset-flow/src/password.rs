//! Password strength rules for the reset step.

use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A single strength rule. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
}

impl PasswordRule {
    /// All rules in the order they are checked.
    pub const ALL: [PasswordRule; 4] = [
        PasswordRule::MinLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
    ];

    /// Whether `password` satisfies this rule.
    pub fn is_satisfied_by(self, password: &str) -> bool {
        match self {
            PasswordRule::MinLength => password.chars().count() >= MIN_PASSWORD_LENGTH,
            PasswordRule::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordRule::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    /// Checklist label shown next to the rule.
    pub fn label(self) -> &'static str {
        match self {
            PasswordRule::MinLength => "At least 8 characters",
            PasswordRule::Uppercase => "One uppercase letter",
            PasswordRule::Lowercase => "One lowercase letter",
            PasswordRule::Digit => "One number",
        }
    }
}

/// Password validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingDigit,

    #[error("Passwords do not match")]
    Mismatch,
}

impl From<PasswordRule> for PasswordError {
    fn from(rule: PasswordRule) -> Self {
        match rule {
            PasswordRule::MinLength => PasswordError::TooShort,
            PasswordRule::Uppercase => PasswordError::MissingUppercase,
            PasswordRule::Lowercase => PasswordError::MissingLowercase,
            PasswordRule::Digit => PasswordError::MissingDigit,
        }
    }
}

/// Check `password` against every rule; the first failing rule wins.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    match PasswordRule::ALL
        .into_iter()
        .find(|rule| !rule.is_satisfied_by(password))
    {
        Some(rule) => Err(rule.into()),
        None => Ok(()),
    }
}

/// Per-rule results for a live checklist.
pub fn password_checklist(password: &str) -> Vec<(PasswordRule, bool)> {
    PasswordRule::ALL
        .into_iter()
        .map(|rule| (rule, rule.is_satisfied_by(password)))
        .collect()
}

/// The confirmation field must repeat the new password exactly.
pub fn check_confirmation(new_password: &str, confirm_password: &str) -> Result<(), PasswordError> {
    if new_password == confirm_password {
        Ok(())
    } else {
        Err(PasswordError::Mismatch)
    }
}
