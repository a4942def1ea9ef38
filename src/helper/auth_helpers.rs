use crate::models::Role;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_PASSWORD_CHARS: usize = 6;

/// Everything that can go wrong before or during authentication. Validation
/// variants are produced without touching the database.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingCredentials,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,
    #[error("Name is required.")]
    MissingName,
    #[error("No account found for this email.")]
    AccountNotFound,
    #[error("Incorrect password.")]
    WrongPassword,
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Authentication failed. Please try again.")]
    Backend,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_looks_valid(email: &str) -> bool {
    // Loose shape check; real deliverability is not our problem.
    let re = EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(email)
}

/// Validation that runs before any store access (login).
pub fn validate_login(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if !email_looks_valid(email.trim()) {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// Validation that runs before any store access (signup). Same rules as
/// login plus a non-empty display name.
pub fn validate_signup(email: &str, password: &str, name: &str) -> Result<(), AuthError> {
    validate_login(email, password)?;
    if name.trim().is_empty() {
        return Err(AuthError::MissingName);
    }
    Ok(())
}

/// Validation for a password update on an already-authenticated session:
/// only the replacement password itself is checked here.
pub fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// Role derivation is a pure function of the email: the reserved admin
/// address (compared case-insensitively) is always admin, any other
/// authenticated email is a regular user. Guests are the absence of a
/// session, never a stored role.
pub fn resolve_role(email: &str, admin_email: &str) -> Role {
    if email.trim().eq_ignore_ascii_case(admin_email.trim()) {
        Role::Admin
    } else {
        Role::User
    }
}
