//! Client-side form checks, run before any network call.
//!
//! Each form reports the first failing field, in field order, as a
//! [`ClientError::Validation`] carrying the message shown inline.

use crate::error::{ClientError, Result};
use validator::{Validate, ValidationErrors};

const FILL_ALL: &str = "Please fill out all fields.";

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please fill out all fields."))]
    pub email: String,
    #[validate(length(min = 1, message = "Please fill out all fields."))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        checked(self.validate(), &["email", "password"])
    }
}

#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Please fill out all fields."))]
    pub name: String,
    #[validate(length(min = 1, message = "Please fill out all fields."))]
    pub email: String,
    #[validate(length(min = 1, message = "Please fill out all fields."))]
    pub password: String,
}

impl RegisterForm {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        checked(self.validate(), &["name", "email", "password"])
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ForgotPasswordForm {
    #[validate(length(min = 1, message = "Please enter your email."))]
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        checked(self.validate(), &["email"])
    }
}

/// New password plus confirmation.
#[derive(Debug, Clone, Validate)]
pub struct PasswordResetForm {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

impl PasswordResetForm {
    pub fn new(password: &str, password_confirmation: &str) -> Self {
        Self {
            password: password.to_string(),
            password_confirmation: password_confirmation.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        checked(self.validate(), &["password", "password_confirmation"])
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "All fields are required"))]
    pub name: String,
    #[validate(length(min = 1, message = "All fields are required"))]
    pub email: String,
}

impl ProfileForm {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        checked(self.validate(), &["name", "email"])
    }
}

fn checked(result: std::result::Result<(), ValidationErrors>, order: &[&str]) -> Result<()> {
    result.map_err(|errors| ClientError::Validation(first_message(&errors, order)))
}

fn first_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let fields = errors.field_errors();
    order
        .iter()
        .filter_map(|name| fields.get(*name))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| FILL_ALL.to_string())
}
