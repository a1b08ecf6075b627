//! Input validation for queue, counter and feedback requests.
//!
//! Every function returns [`CoreError::Validation`] with a message that can be
//! shown to the user unchanged.

use crate::error::CoreError;

/// Lowest accepted feedback rating.
pub const MIN_RATING: i16 = 1;
/// Highest accepted feedback rating.
pub const MAX_RATING: i16 = 5;

/// Maximum length of a counter display name.
pub const MAX_COUNTER_NAME_LEN: usize = 100;

/// Maximum length of free-text feedback comments.
pub const MAX_COMMENTS_LEN: usize = 2000;

/// Both name and phone are needed to join the queue without an account.
pub fn validate_customer_details(name: &str, phone: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || phone.trim().is_empty() {
        return Err(CoreError::Validation(
            "Please enter your name and phone number".into(),
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

pub fn validate_comments(comments: Option<&str>) -> Result<(), CoreError> {
    match comments {
        Some(text) if text.chars().count() > MAX_COMMENTS_LEN => Err(CoreError::Validation(
            format!("Comments must be at most {MAX_COMMENTS_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

pub fn validate_counter_number(number: i32) -> Result<(), CoreError> {
    if number <= 0 {
        return Err(CoreError::Validation(
            "Counter number must be a positive integer".into(),
        ));
    }
    Ok(())
}

pub fn validate_counter_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Counter name is required".into()));
    }
    if trimmed.chars().count() > MAX_COUNTER_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Counter name must be at most {MAX_COUNTER_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Reject a set of required fields if any is blank.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_customer_details_rejected() {
        assert!(validate_customer_details("", "555").is_err());
        assert!(validate_customer_details("Ana", "   ").is_err());
        assert!(validate_customer_details("Ana", "555-0101").is_ok());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn long_comments_rejected() {
        let long = "x".repeat(MAX_COMMENTS_LEN + 1);
        assert!(validate_comments(Some(&long)).is_err());
        assert!(validate_comments(Some("quick and friendly")).is_ok());
        assert!(validate_comments(None).is_ok());
    }

    #[test]
    fn counter_number_must_be_positive() {
        assert!(validate_counter_number(0).is_err());
        assert!(validate_counter_number(-3).is_err());
        assert!(validate_counter_number(7).is_ok());
    }

    #[test]
    fn counter_name_rules() {
        assert!(validate_counter_name("  ").is_err());
        assert!(validate_counter_name(&"n".repeat(MAX_COUNTER_NAME_LEN + 1)).is_err());
        assert!(validate_counter_name("Billing").is_ok());
    }

    #[test]
    fn missing_fields_are_listed() {
        let err = require_fields(&[("email", "a@b.c"), ("password", ""), ("full_name", " ")])
            .unwrap_err();
        match err {
            CoreError::Validation(msg) => {
                assert_eq!(msg, "Missing required fields: password, full_name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
