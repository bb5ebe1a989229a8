//! Input validation for the three free-form credential fields.
//!
//! These are pure `&str -> bool` predicates; nothing here ever mutates
//! the caller's string.

/// At least 4 characters after trimming surrounding whitespace.
pub fn check_username(username: &str) -> bool {
    username.trim().len() >= 4
}

/// Exactly four decimal digits, and not the reserved sentinel `"0000"`.
pub fn check_pin(pin: &str) -> bool {
    let trimmed = pin.trim();
    trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) && trimmed != "0000"
}

/// At least 4 characters after trimming surrounding whitespace.
pub fn check_password(password: &str) -> bool {
    password.trim().len() >= 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_rules() {
        assert!(!check_pin("0000"));
        assert!(check_pin("1234"));
        assert!(!check_pin("12a4"));
        assert!(!check_pin("123"));
        assert!(!check_pin("12345"));
    }

    #[test]
    fn username_rules() {
        assert!(!check_username("abc"));
        assert!(check_username("abcd"));
        assert!(!check_username("   "));
        assert!(check_username("  abcd  "));
    }

    #[test]
    fn password_rules() {
        assert!(!check_password("abc"));
        assert!(check_password("abcd"));
    }
}
