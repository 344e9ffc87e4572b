//! Input validation rules for signup, login and post creation.
//!
//! # Invariants
//! - Validation is pure and independent of any stored record.
//! - Length rules count UTF-16 code units, so a non-BMP character such as an
//!   emoji counts as two, matching names stored by the browser build.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum display-name length accepted at signup.
pub const MIN_NAME_CHARS: usize = 3;
/// Minimum password length accepted at signup and login.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Locally correctable input problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NameTooShort,
    InvalidEmail,
    WeakPassword,
    PasswordMismatch,
    MissingFields,
}

impl ValidationError {
    /// Sentence suitable for showing next to the offending form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NameTooShort => "Name must be at least 3 characters long",
            Self::InvalidEmail => "Please enter a valid email address",
            Self::WeakPassword => "Password must be at least 6 characters long",
            Self::PasswordMismatch => "Passwords do not match",
            Self::MissingFields => "Please fill in all fields",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::NameTooShort => "name too short",
            Self::InvalidEmail => "invalid email",
            Self::WeakPassword => "weak password",
            Self::PasswordMismatch => "password mismatch",
            Self::MissingFields => "missing fields",
        };
        f.write_str(message)
    }
}

impl Error for ValidationError {}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if utf16_len(name) < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if utf16_len(password) < MIN_PASSWORD_CHARS {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Rejects empty title or content. Whitespace-only text counts as present.
pub fn validate_post_fields(title: &str, content: &str) -> Result<(), ValidationError> {
    if title.is_empty() || content.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}
