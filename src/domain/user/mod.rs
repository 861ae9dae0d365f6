//! User domain
//!
//! This module provides domain types and traits for user identity,
//! including the user entity, field validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{DigestKind, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    email_format, max_length, min_length, normalize_email, presence, run_validators,
    validate_email, validate_name, validate_new_user, validate_password, Field, FieldError,
    Reason, ValidationErrors, Validator, EMAIL_VALIDATORS, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH,
    MIN_PASSWORD_LENGTH, NAME_VALIDATORS, PASSWORD_VALIDATORS,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
