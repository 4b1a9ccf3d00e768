//! Client-side form rules checked before any request is built.
//!
//! Every rule has its own `ValidationError` variant whose `Display` output is
//! the message shown to the user. Rules are evaluated in a fixed order and
//! the first failure is reported.

use std::sync::LazyLock;

use regex::Regex;

/// Symbols accepted as the "special character" class of a password.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

/// Minimum password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// A single failed form rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one digit")]
    PasswordMissingDigit,

    #[error("Password must contain at least one of @$!%*?&")]
    PasswordMissingSymbol,

    #[error("Amount is required")]
    AmountRequired,

    #[error("Amount must be a number, got '{0}'")]
    AmountNotNumeric(String),

    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Description is required")]
    DescriptionRequired,

    #[error("Category is required")]
    CategoryRequired,

    #[error("'{0}' is not a known category")]
    UnknownCategory(String),
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Length first, then uppercase, lowercase, digit and symbol classes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(ValidationError::PasswordMissingSymbol);
    }
    Ok(())
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

pub fn validate_sign_up(username: &str, email: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    validate_sign_in(email, password)
}
