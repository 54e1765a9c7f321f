//! Input validation functions
//!
//! Field validators for registration and password changes. Each returns the
//! message surfaced to the client on failure, so route handlers can build
//! field-level error lists.

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    use validator::ValidateEmail;

    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 100 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Valid email is required".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a person name field (first or last)
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if name.len() > 50 {
        return Err("Name must be at most 50 characters".to_string());
    }
    Ok(())
}

/// Validate an optional phone number
///
/// Digits with an optional leading `+` and common separators.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.len() > 20 {
        return Err("Phone number too long".to_string());
    }
    let phone_regex = regex_lite::Regex::new(r"^\+?[0-9][0-9 \-()]{5,18}$").unwrap();
    if !phone_regex.is_match(phone) {
        return Err("Valid phone number is required".to_string());
    }
    Ok(())
}

/// Validate date of birth: must not be in the future
pub fn validate_date_of_birth(dob: chrono::NaiveDate) -> Result<(), String> {
    let today = chrono::Utc::now().date_naive();
    if dob > today {
        return Err("Date of birth cannot be in the future".to_string());
    }
    Ok(())
}
