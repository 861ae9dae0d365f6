//! User validation utilities
//!
//! Each field has an ordered list of validators. All of them run and their
//! failures are collected, so a caller can show every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\w+\-.]+@[a-z\d\-]+(\.[a-z\d\-]+)*\.[a-z]+$").unwrap()
});

/// A validated user attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Blank,
    TooLong { max: usize },
    TooShort { min: usize },
    Invalid,
    Taken,
    ConfirmationMismatch,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "can't be blank"),
            Self::TooLong { max } => write!(f, "is too long (maximum is {} characters)", max),
            Self::TooShort { min } => write!(f, "is too short (minimum is {} characters)", min),
            Self::Invalid => write!(f, "is invalid"),
            Self::Taken => write!(f, "has already been taken"),
            Self::ConfirmationMismatch => write!(f, "doesn't match confirmation"),
        }
    }
}

/// A single violation attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub reason: Reason,
}

impl FieldError {
    pub fn new(field: Field, reason: Reason) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// All violations found for one input, in validator order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, reason: Reason) {
        self.0.push(FieldError::new(field, reason));
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Reasons recorded against `field`
    pub fn on(&self, field: Field) -> Vec<&Reason> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| &e.reason)
            .collect()
    }

    pub fn contains(&self, field: Field, reason: &Reason) -> bool {
        self.0.iter().any(|e| e.field == field && &e.reason == reason)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Distinct fields with at least one violation, sorted
    pub fn fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.0.iter().map(|e| e.field).collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Human-readable messages keyed by field name, for rendering forms
    pub fn messages(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut map: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        for error in &self.0 {
            map.entry(error.field.as_str())
                .or_default()
                .push(error.reason.to_string());
        }

        map
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}

/// A single check over one field value.
///
/// Only `presence` reports empty input; the other validators pass it through.
pub type Validator = fn(&str) -> Option<Reason>;

pub const NAME_VALIDATORS: &[Validator] = &[presence, max_length::<MAX_NAME_LENGTH>];

pub const EMAIL_VALIDATORS: &[Validator] =
    &[presence, max_length::<MAX_EMAIL_LENGTH>, email_format];

pub const PASSWORD_VALIDATORS: &[Validator] = &[presence, min_length::<MIN_PASSWORD_LENGTH>];

pub fn presence(value: &str) -> Option<Reason> {
    value.trim().is_empty().then_some(Reason::Blank)
}

pub fn max_length<const MAX: usize>(value: &str) -> Option<Reason> {
    (value.chars().count() > MAX).then_some(Reason::TooLong { max: MAX })
}

pub fn min_length<const MIN: usize>(value: &str) -> Option<Reason> {
    let len = value.chars().count();
    (len > 0 && len < MIN).then_some(Reason::TooShort { min: MIN })
}

pub fn email_format(value: &str) -> Option<Reason> {
    (!value.is_empty() && !EMAIL_PATTERN.is_match(value)).then_some(Reason::Invalid)
}

/// Run every validator for `field` over `value`
pub fn run_validators(field: Field, validators: &[Validator], value: &str) -> ValidationErrors {
    validators
        .iter()
        .filter_map(|validate| validate(value))
        .map(|reason| FieldError::new(field, reason))
        .collect::<Vec<_>>()
        .into()
}

/// Case-fold an email for storage and comparison
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

pub fn validate_name(name: &str) -> ValidationErrors {
    run_validators(Field::Name, NAME_VALIDATORS, name)
}

/// Validate an email; expects the normalized form
pub fn validate_email(email: &str) -> ValidationErrors {
    run_validators(Field::Email, EMAIL_VALIDATORS, email)
}

/// Validate a new password together with its confirmation
pub fn validate_password(password: &str, confirmation: &str) -> ValidationErrors {
    let mut errors = run_validators(Field::Password, PASSWORD_VALIDATORS, password);

    if password != confirmation {
        errors.add(Field::Password, Reason::ConfirmationMismatch);
    }

    errors
}

/// Validate everything a signup needs except email uniqueness
pub fn validate_new_user(
    name: &str,
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> ValidationErrors {
    let mut errors = validate_name(name);
    errors.merge(validate_email(&normalize_email(email)));
    errors.merge(validate_password(password, password_confirmation));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_new_user() {
        let errors = validate_new_user("Taro", "taro@example.com", "secret1", "secret1");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_name() {
        let errors = validate_name("");
        assert_eq!(errors.on(Field::Name), vec![&Reason::Blank]);

        let errors = validate_name("   ");
        assert!(errors.contains(Field::Name, &Reason::Blank));
    }

    #[test]
    fn test_name_length_boundary() {
        assert!(validate_name(&"a".repeat(50)).is_empty());
        assert_eq!(
            validate_name(&"a".repeat(51)).on(Field::Name),
            vec![&Reason::TooLong { max: 50 }]
        );
    }

    #[test]
    fn test_name_length_counts_characters() {
        // 50 multi-byte characters are still 50 characters
        assert!(validate_name(&"あ".repeat(50)).is_empty());
    }

    #[test]
    fn test_email_too_long() {
        let errors = validate_email(&"a".repeat(256));
        assert!(errors.contains(Field::Email, &Reason::TooLong { max: 255 }));
    }

    #[test]
    fn test_blank_email_reports_only_blank() {
        let errors = validate_email("");
        assert_eq!(errors.on(Field::Email), vec![&Reason::Blank]);
    }

    #[test]
    fn test_email_format() {
        let valid = [
            "user@example.com",
            "USER@foo.COM",
            "A_US-ER@foo.bar.org",
            "first.last@foo.jp",
            "alice+bob@baz.cn",
        ];
        for email in valid {
            assert!(validate_email(email).is_empty(), "{email} should be valid");
        }

        let invalid = [
            "user@example,com",
            "user_at_foo.org",
            "user.name@example.",
            "foo@bar_baz.com",
            "foo@bar+baz.com",
            "foo@bar..com",
        ];
        for email in invalid {
            assert!(
                validate_email(email).contains(Field::Email, &Reason::Invalid),
                "{email} should be invalid"
            );
        }
    }

    #[test]
    fn test_blank_password() {
        let errors = validate_password("", "");
        assert_eq!(errors.on(Field::Password), vec![&Reason::Blank]);
    }

    #[test]
    fn test_password_too_short() {
        let errors = validate_password("taka", "taka");
        assert_eq!(
            errors.on(Field::Password),
            vec![&Reason::TooShort { min: 6 }]
        );
        assert!(validate_password("takahiro", "takahiro").is_empty());
    }

    #[test]
    fn test_password_confirmation_mismatch() {
        let errors = validate_password("secret1", "secret2");
        assert!(errors.contains(Field::Password, &Reason::ConfirmationMismatch));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let errors = validate_new_user("", &"a".repeat(256), "taka", "taka");

        assert_eq!(errors.fields(), vec![Field::Name, Field::Email, Field::Password]);
        assert!(errors.len() >= 3);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("ExamPle@example.com"), "example@example.com");
    }

    #[test]
    fn test_messages_keyed_by_field() {
        let errors = validate_new_user("", "taro@example.com", "taka", "taka");
        let messages = errors.messages();

        assert_eq!(messages["name"], vec!["can't be blank".to_string()]);
        assert_eq!(
            messages["password"],
            vec!["is too short (minimum is 6 characters)".to_string()]
        );
        assert!(!messages.contains_key("email"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(validate_name("").into_result().is_err());
    }
}
