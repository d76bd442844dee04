/// Validation utilities for user input

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Validate email format
pub fn validate_email(email: &str) -> ValidationResult {
    if email.is_empty() {
        return ValidationResult::err("Email is required");
    }

    let Some((user, domain)) = email.split_once('@') else {
        return ValidationResult::err("Invalid email format");
    };

    if domain.contains('@') {
        return ValidationResult::err("Invalid email format");
    }

    if user.is_empty() {
        return ValidationResult::err("Email username cannot be empty");
    }

    if domain.is_empty() || !domain.contains('.') {
        return ValidationResult::err("Invalid email domain");
    }

    ValidationResult::ok()
}

/// Validate a new admin password (length only, the backend enforces the rest)
pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return ValidationResult::err("Mínimo 6 caracteres");
    }

    ValidationResult::ok()
}

/// Validate a rate as typed in the admin form: digits with at most one decimal comma.
///
/// Empty input is valid (it means 0%).
pub fn validate_rate_input(input: &str) -> ValidationResult {
    let mut commas = 0;
    for c in input.chars() {
        match c {
            '0'..='9' => {}
            ',' => {
                commas += 1;
                if commas > 1 {
                    return ValidationResult::err("Use only one decimal comma");
                }
            }
            _ => return ValidationResult::err(format!("Invalid rate {:?}: use digits and a comma", input)),
        }
    }

    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("admin@store.com").is_valid);
        assert!(validate_email("user@domain.co.uk").is_valid);
        assert!(!validate_email("").is_valid);
        assert!(!validate_email("invalid").is_valid);
        assert!(!validate_email("@example.com").is_valid);
        assert!(!validate_email("test@").is_valid);
        assert!(!validate_email("a@b@c.com").is_valid);
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("secret").is_valid);
        assert!(validate_password("çãéõ12").is_valid);
        let short = validate_password("12345");
        assert!(!short.is_valid);
        assert_eq!(short.error.as_deref(), Some("Mínimo 6 caracteres"));
        assert!(!validate_password("").is_valid);
    }

    #[test]
    fn test_rate_input_validation() {
        assert!(validate_rate_input("").is_valid);
        assert!(validate_rate_input("4").is_valid);
        assert!(validate_rate_input("4,5").is_valid);
        assert!(validate_rate_input(",5").is_valid);
        assert!(validate_rate_input("12,").is_valid);
        assert!(!validate_rate_input("4.5").is_valid);
        assert!(!validate_rate_input("1,2,3").is_valid);
        assert!(!validate_rate_input("-1").is_valid);
        assert!(!validate_rate_input("abc").is_valid);
    }
}
