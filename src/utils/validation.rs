// src/utils/validation.rs

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use validator::ValidationError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

// Letters, whitespace, hyphens and apostrophes.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("name regex is valid"));

pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("invalid_email")
            .with_message(Cow::Borrowed("Invalid email format")));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if !NAME_RE.is_match(name) {
        return Err(ValidationError::new("invalid_name")
            .with_message(Cow::Borrowed("Invalid name format")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(validate_email_format("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email_format("missing-at.example.com").is_err());
        assert!(validate_email_format("a@b.c").is_err());
        assert!(validate_email_format("a b@example.com").is_err());
    }

    #[test]
    fn display_name_charset() {
        assert!(validate_display_name("Mary-Jane O'Neil").is_ok());
        assert!(validate_display_name("<script>").is_err());
        assert!(validate_display_name("Agent 47").is_err());
    }
}
