//! Input validation for user payloads.
//!
//! # Rules
//! - `name`: required string, at most 255 characters
//! - `email`: required, valid address (uniqueness is checked against the store)
//! - `password`: required string, at least 6 characters
//!
//! On update every rule applies only when the field is present.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::users::model::UserPayload;

const NAME_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;

/// Field name → messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the given data was invalid")]
pub struct ValidationErrors {
    pub fields: FieldErrors,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self { fields }
    }

    pub fn email_taken() -> Self {
        Self::single("email", "The email has already been taken.")
    }
}

/// Fields of a valid update request; absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Sometimes,
}

/// Fields of a valid create request; the password is still plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validate a create request.
pub fn validate_create(payload: &UserPayload) -> Result<CreateFields, ValidationErrors> {
    let fields = validate(payload, Presence::Required)?;
    match (fields.name, fields.email, fields.password) {
        (Some(name), Some(email), Some(password)) => Ok(CreateFields { name, email, password }),
        (name, email, _) => {
            let missing = if name.is_none() {
                "name"
            } else if email.is_none() {
                "email"
            } else {
                "password"
            };
            Err(ValidationErrors::single(missing, format!("The {} field is required.", missing)))
        }
    }
}

/// Validate an update request. Absent fields stay `None`.
pub fn validate_update(payload: &UserPayload) -> Result<ValidatedFields, ValidationErrors> {
    validate(payload, Presence::Sometimes)
}

fn validate(payload: &UserPayload, presence: Presence) -> Result<ValidatedFields, ValidationErrors> {
    let mut errors = FieldErrors::new();

    let name = string_field("name", payload.name.as_ref(), presence, &mut errors, |name, errs| {
        if name.chars().count() > NAME_MAX {
            errs.push(format!("The name field must not be greater than {} characters.", NAME_MAX));
        }
    });

    let email = string_field("email", payload.email.as_ref(), presence, &mut errors, |email, errs| {
        if !email_regex().is_match(email) {
            errs.push("The email field must be a valid email address.".to_string());
        }
    });

    let password = string_field("password", payload.password.as_ref(), presence, &mut errors, |pw, errs| {
        if pw.chars().count() < PASSWORD_MIN {
            errs.push(format!("The password field must be at least {} characters.", PASSWORD_MIN));
        }
    });

    if errors.is_empty() {
        Ok(ValidatedFields { name, email, password })
    } else {
        Err(ValidationErrors { fields: errors })
    }
}

fn string_field<F>(
    field: &str,
    value: Option<&Value>,
    presence: Presence,
    errors: &mut FieldErrors,
    rules: F,
) -> Option<String>
where
    F: FnOnce(&str, &mut Vec<String>),
{
    let mut messages = Vec::new();

    let result = match value {
        None if presence == Presence::Sometimes => None,
        None | Some(Value::Null) if presence == Presence::Required => {
            messages.push(format!("The {} field is required.", field));
            None
        }
        // Blank strings count as null: missing on create, not a string on update.
        Some(Value::String(s)) if s.trim().is_empty() => {
            messages.push(match presence {
                Presence::Required => format!("The {} field is required.", field),
                Presence::Sometimes => format!("The {} field must be a string.", field),
            });
            None
        }
        Some(Value::String(s)) => {
            rules(s, &mut messages);
            Some(s.clone())
        }
        Some(_) | None => {
            messages.push(format!("The {} field must be a string.", field));
            None
        }
    };

    if messages.is_empty() {
        result
    } else {
        errors.insert(field.to_string(), messages);
        None
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}
