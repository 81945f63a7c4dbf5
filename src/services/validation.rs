use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

pub const USERNAME_MAX: usize = 10;
pub const EMAIL_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 4;
pub const NAME_MAX: usize = 50;
pub const COMMENT_MAX: usize = 500;

/// Largest amount a `NUMERIC(12, 2)` column holds.
fn money_limit() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

pub fn username(value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request("username is required"));
    }
    if value.chars().count() > USERNAME_MAX {
        return Err(AppError::bad_request(format!(
            "username must be at most {USERNAME_MAX} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn email(value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.chars().count() > EMAIL_MAX {
        return Err(AppError::bad_request(format!(
            "email must be at most {EMAIL_MAX} characters"
        )));
    }
    if !is_valid_email(value) {
        return Err(AppError::bad_request("invalid email address"));
    }
    Ok(value.to_string())
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

pub fn password(value: &str) -> AppResult<&str> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(AppError::bad_request(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(value)
}

/// `None` when the caller left the password blank.
pub fn optional_password(value: Option<&str>) -> AppResult<Option<&str>> {
    match value {
        Some(p) if !p.trim().is_empty() => password(p).map(Some),
        _ => Ok(None),
    }
}

/// Names of products, categories and authors.
pub fn name(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    if value.chars().count() > NAME_MAX {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {NAME_MAX} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed optional text; blank becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn version(value: Option<String>) -> AppResult<Option<String>> {
    let value = optional_text(value);
    if let Some(v) = &value {
        if v.chars().count() > NAME_MAX {
            return Err(AppError::bad_request(format!(
                "version must be at most {NAME_MAX} characters"
            )));
        }
    }
    Ok(value)
}

/// Non-negative amount with at most two decimal places.
pub fn money(field: &str, value: Decimal) -> AppResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::bad_request(format!("{field} cannot be negative")));
    }
    if value.normalize().scale() > 2 {
        return Err(AppError::bad_request(format!(
            "{field} must have at most 2 decimal places"
        )));
    }
    if value >= money_limit() {
        return Err(AppError::bad_request(format!("{field} is too large")));
    }
    Ok(value.round_dp(2))
}

pub fn rating(value: i32) -> AppResult<i32> {
    if !(1..=5).contains(&value) {
        return Err(AppError::bad_request("rating must be between 1 and 5"));
    }
    Ok(value)
}

pub fn comment(value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::bad_request("comment cannot be empty"));
    }
    if value.chars().count() > COMMENT_MAX {
        return Err(AppError::bad_request(format!(
            "comment must be at most {COMMENT_MAX} characters"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn username_is_trimmed_and_bounded() {
        assert_eq!(username("  alice ").unwrap(), "alice");
        assert!(username("").is_err());
        assert!(username("abcdefghijk").is_err());
        assert!(username("abcdefghij").is_ok());
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert!(email("ana@example.com").is_ok());
        assert!(email("ana@localhost").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("ana example@x.com").is_err());
        assert!(email("a@b@c.com").is_err());
        let long = format!("{}@example.com", "a".repeat(45));
        assert!(email(&long).is_err());
    }

    #[test]
    fn blank_password_means_unchanged() {
        assert_eq!(optional_password(None).unwrap(), None);
        assert_eq!(optional_password(Some("   ")).unwrap(), None);
        assert_eq!(optional_password(Some("abcd")).unwrap(), Some("abcd"));
        assert!(optional_password(Some("abc")).is_err());
    }

    #[test]
    fn money_rejects_negative_and_fractional_cents() {
        let ok = Decimal::from_str("12.50").unwrap();
        assert_eq!(money("price", ok).unwrap(), ok);
        assert!(money("price", Decimal::from_str("-0.01").unwrap()).is_err());
        assert!(money("price", Decimal::from_str("1.005").unwrap()).is_err());
        assert!(money("price", Decimal::from_str("1.500").unwrap()).is_ok());
        assert!(money("price", Decimal::ZERO).is_ok());
    }

    #[test]
    fn rating_and_comment_bounds() {
        assert!(rating(0).is_err());
        assert!(rating(6).is_err());
        assert_eq!(rating(5).unwrap(), 5);
        assert!(comment("   ").is_err());
        assert!(comment(&"x".repeat(501)).is_err());
        assert_eq!(comment("  great  ").unwrap(), "great");
    }
}
