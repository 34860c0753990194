//! Field-level request validation shared by the handlers.

use crate::error::AppError;
use regex::Regex;

const MOBILE_PATTERN: &str = "^[0-9]{10}$";

/// The field must be present and non-empty after trimming.
pub fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_email(field: &str, value: &str) -> Result<(), AppError> {
    require(field, value)?;
    if !value.contains('@') || value.trim().len() < 3 {
        return Err(AppError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

/// Ten digits, no separators; the frontend collects numbers in this shape.
pub fn require_mobile(field: &str, value: &str) -> Result<(), AppError> {
    require(field, value)?;
    let re = Regex::new(MOBILE_PATTERN)
        .map_err(|e| AppError::Internal(format!("mobile pattern: {e}")))?;
    if !re.is_match(value.trim()) {
        return Err(AppError::Validation(format!(
            "{field} must be a 10-digit mobile number"
        )));
    }
    Ok(())
}

pub fn require_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if !allowed.contains(&value) {
        return Err(AppError::Validation(format!(
            "{field} must be one of {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require("name", "").is_err());
        assert!(require("name", "   ").is_err());
        assert!(require("name", "Asha").is_ok());
    }

    #[test]
    fn email_needs_an_at_sign() {
        assert!(require_email("email", "a@b").is_ok());
        assert!(require_email("email", "nodomain").is_err());
        assert!(require_email("email", "@").is_err());
    }

    #[test]
    fn mobile_must_be_ten_digits() {
        assert!(require_mobile("mobile", "9876543210").is_ok());
        assert!(require_mobile("mobile", "12345").is_err());
        assert!(require_mobile("mobile", "98765abcde").is_err());
        assert!(require_mobile("mobile", "+919876543210").is_err());
    }

    #[test]
    fn enums_are_closed() {
        assert!(require_one_of("mode", "online", &["online", "offline"]).is_ok());
        assert!(require_one_of("mode", "hybrid", &["online", "offline"]).is_err());
    }
}
