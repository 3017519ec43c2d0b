use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

lazy_static! {
    // RFC 5322 simplified, anchored
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap();

    static ref CURRENCY_REGEX: Regex = Regex::new(r"^[A-Za-z]{3}$").unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub fn is_valid_currency(code: &str) -> bool {
    CURRENCY_REGEX.is_match(code)
}

/// Collects field-level problems for one request body
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} is required", field));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.errors.push(format!("{} must be a valid email address", field));
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_LENGTH {
            self.errors.push(format!(
                "{} must be at least {} characters",
                field, MIN_PASSWORD_LENGTH
            ));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: Option<Decimal>) -> &mut Self {
        if matches!(value, Some(v) if v < Decimal::ZERO) {
            self.errors.push(format!("{} must not be negative", field));
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.errors.push(format!(
                "{} must be one of: {}",
                field,
                allowed.join(", ")
            ));
        }
        self
    }

    pub fn currency(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_currency(value) {
            self.errors
                .push(format!("{} must be a three-letter currency code", field));
        }
        self
    }

    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.errors.push(message.into());
        }
        self
    }

    /// All problems joined for the response body, or `Ok(())`
    pub fn finish(&self) -> Result<(), String> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.join("; "))
        }
    }
}
