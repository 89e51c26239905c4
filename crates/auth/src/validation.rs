use app_error::{AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Basic local@domain shape: non-space, '@', non-space, '.', non-space.
    // Comparison elsewhere is exact-match, case-sensitive.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

/// Validates an email address
pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::validation(
            "email",
            "please provide a valid email address",
        ));
    }

    Ok(())
}

/// Validates a password against the configured minimum length
pub fn validate_password(password: &str, min_length: usize) -> AppResult<()> {
    if password.len() < min_length {
        return Err(AppError::validation(
            "password",
            &format!("must be at least {} characters long", min_length),
        ));
    }

    Ok(())
}

/// Validates a name
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name", "cannot be empty"));
    }

    Ok(())
}

/// Sanitizes a string input by trimming whitespace. Never applied to
/// passwords, where leading or trailing spaces are meaningful.
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}
