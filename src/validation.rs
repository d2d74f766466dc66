//! Validation Support
//!
//! Field rules applied to incoming payloads before any query runs. Each
//! validator either returns the typed value or a [`ValidationError`];
//! payload builders collect every failure into [`ValidationErrors`] so a
//! request reports all of its problems at once.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::entities::Status;
use crate::errors::ApiError;

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Keeps the value on success, records the error otherwise.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation_failed(errors.errors.into_iter().map(|e| e.message).collect())
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::validation_failed(vec![error.message])
    }
}

/// Field validators. Each takes the raw submitted text.
pub mod validators {
    use super::{
        DATE_RE, Decimal, EMAIL_MAX_LEN, EMAIL_RE, NAME_MAX_LEN, NaiveDate, PHONE_RE, Status,
        ValidationError,
    };

    /// Upper bound of a DECIMAL(10,2) column.
    const SALARY_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    pub fn validate_required<'a>(
        field: &str,
        label: &str,
        value: Option<&'a str>,
    ) -> Result<&'a str, ValidationError> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ValidationError::new(field, format!("{label} is required")))
    }

    pub fn validate_name(value: &str) -> Result<String, ValidationError> {
        let name = value.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "Name is required"));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(ValidationError::new(
                "name",
                format!("Name must be at most {NAME_MAX_LEN} characters"),
            ));
        }
        Ok(name.to_string())
    }

    /// `YYYY-MM-DD`, a real calendar date, not after `today`.
    pub fn validate_dob(value: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        let value = value.trim();
        let invalid = || ValidationError::new("dob", "Invalid date format. Use YYYY-MM-DD");
        if !DATE_RE.is_match(value) {
            return Err(invalid());
        }
        let dob = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
        if dob > today {
            return Err(ValidationError::new(
                "dob",
                "Date of birth cannot be in the future",
            ));
        }
        Ok(dob)
    }

    pub fn validate_phone(value: &str) -> Result<String, ValidationError> {
        let phone = value.trim();
        if PHONE_RE.is_match(phone) {
            Ok(phone.to_string())
        } else {
            Err(ValidationError::new("phone", "Invalid phone number"))
        }
    }

    /// Emails are stored lowercased so uniqueness ignores case on every backend.
    pub fn validate_email(value: &str) -> Result<String, ValidationError> {
        let email = value.trim();
        if email.len() > EMAIL_MAX_LEN {
            return Err(ValidationError::new(
                "email",
                format!("Email must be at most {EMAIL_MAX_LEN} characters"),
            ));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::new("email", "Invalid email address"));
        }
        Ok(email.to_lowercase())
    }

    /// Non-negative, at most two decimal places are kept.
    pub fn validate_salary(value: &str) -> Result<Decimal, ValidationError> {
        let salary: Decimal = value
            .trim()
            .parse()
            .map_err(|_| ValidationError::new("salary", "Salary must be a number"))?;
        if salary.is_sign_negative() && !salary.is_zero() {
            return Err(ValidationError::new("salary", "Salary must not be negative"));
        }
        let salary = salary.round_dp(2);
        if salary > SALARY_MAX {
            return Err(ValidationError::new(
                "salary",
                format!("Salary must be at most {SALARY_MAX}"),
            ));
        }
        Ok(salary)
    }

    pub fn validate_status(value: &str) -> Result<Status, ValidationError> {
        value
            .parse()
            .map_err(|e: crate::entities::status::ParseStatusError| {
                ValidationError::new("status", e.to_string())
            })
    }

    pub fn validate_department_id(value: &str) -> Result<i32, ValidationError> {
        value
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ValidationError::new("department_id", "Department ID must be a number"))
    }
}

#[cfg(test)]
mod tests {
    use super::validators::*;
    use super::*;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.check(validate_phone("+447911123456")).is_some());
        assert!(errors.is_empty());
        assert!(errors.check(validate_phone("12")).is_some());
        assert!(errors.check(validate_phone("0123")).is_none());
        assert_eq!(errors.errors().len(), 1);

        let api: ApiError = errors.into();
        assert_eq!(api.user_message(), "Invalid phone number");
    }

    #[test]
    fn required_trims() {
        assert!(validate_required("name", "Name", None).is_err());
        assert!(validate_required("name", "Name", Some("  ")).is_err());
        assert_eq!(validate_required("name", "Name", Some(" Ann ")).unwrap(), "Ann");
        assert_eq!(
            validate_required("dob", "Date of birth", None).unwrap_err().message,
            "Date of birth is required"
        );
    }

    #[test]
    fn name_rules() {
        assert_eq!(validate_name("  Ann  ").unwrap(), "Ann");
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn dob_rules() {
        assert_eq!(
            validate_dob("1990-02-28", today()).unwrap(),
            NaiveDate::from_ymd_opt(1990, 2, 28).unwrap()
        );
        assert!(validate_dob("1990-2-28", today()).is_err());
        assert!(validate_dob("1990-02-30", today()).is_err());
        assert!(validate_dob("2025-06-01", today()).is_ok());
        assert_eq!(
            validate_dob("2025-06-02", today()).unwrap_err().message,
            "Date of birth cannot be in the future"
        );
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("ann@example.com").is_ok());
        assert!(validate_email("ann@example").is_err());
        assert!(validate_email("ann example@x.io").is_err());
        let long = format!("{}@example.com", "a".repeat(95));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(
            validate_email("  Ann.Lee@Example.COM ").unwrap(),
            "ann.lee@example.com"
        );
    }

    #[test]
    fn salary_rules() {
        assert_eq!(
            validate_salary("50000").unwrap(),
            Decimal::from_str("50000").unwrap()
        );
        assert_eq!(
            validate_salary("1234.567").unwrap(),
            Decimal::from_str("1234.57").unwrap()
        );
        assert!(validate_salary("0").is_ok());
        assert!(validate_salary("-1").is_err());
        assert!(validate_salary("lots").is_err());
        assert!(validate_salary("99999999.99").is_ok());
        assert!(validate_salary("100000000").is_err());
    }

    #[test]
    fn status_and_department() {
        assert_eq!(validate_status("inactive").unwrap(), Status::Inactive);
        assert_eq!(
            validate_status("retired").unwrap_err().message,
            "Status must be either active or inactive"
        );
        assert_eq!(validate_department_id("7").unwrap(), 7);
        assert!(validate_department_id("seven").is_err());
        assert!(validate_department_id("0").is_err());
    }
}
