//! Structural validation of incoming requests
//!
//! Runs before the service is called. Failures become `InvalidArgument`
//! with the validator's message; nothing is silently corrected.

use crate::core::error::ApiError;
use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

/// Digits with an optional leading `+`, 7 to 15 digits, after removing
/// common separators (spaces, dashes, dots, parentheses)
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{7,15}$").expect("static phone pattern is valid")
    });

    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if regex.is_match(&compact) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone must hold 7 to 15 digits with an optional leading +".into());
        Err(err)
    }
}

/// Fields of a create request that carry validation rules
#[derive(Debug, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 99, message = "name must be 1 to 99 characters"))]
    pub name: String,

    #[validate(email(message = "email is malformed"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(length(min = 1, max = 255, message = "move_from must be 1 to 255 characters"))]
    pub move_from: String,

    #[validate(length(min = 1, max = 255, message = "move_to must be 1 to 255 characters"))]
    pub move_to: String,
}

/// Fields of an update request that carry validation rules. Absent fields
/// are not checked.
#[derive(Debug, Validate)]
pub struct UpdateOrderInput {
    #[validate(length(min = 1, max = 99, message = "name must be 1 to 99 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "email is malformed"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "move_from must be at most 255 characters"))]
    pub move_from: Option<String>,

    #[validate(length(max = 255, message = "move_to must be at most 255 characters"))]
    pub move_to: Option<String>,
}

/// Run the derived rules and map failures to `InvalidArgument`
pub fn check(input: &impl Validate) -> Result<(), ApiError> {
    input.validate().map_err(ApiError::from)
}

/// Enum membership: the code must name a defined variant
pub fn enum_code<E>(field: &'static str, code: i32) -> Result<E, ApiError>
where
    E: TryFrom<i32>,
{
    E::try_from(code).map_err(|_| ApiError::validation(format!("{field}: undefined value {code}")))
}
